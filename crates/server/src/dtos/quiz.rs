use chrono::{DateTime, Utc};
use database::{
    entities::{answer, question, quiz, tag, taken_quiz},
    services::quiz::{QuizDetail, QuizProgress},
};
use models::render::tag_badge;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub html_badge: String,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            html_badge: tag_badge(&tag.name, &tag.color),
            id: tag.id,
            name: tag.name,
            color: tag.color,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizResponse {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub tag: Option<TagResponse>,
}

impl QuizResponse {
    pub fn new(quiz: quiz::Model, tag: Option<tag::Model>) -> Self {
        Self {
            id: quiz.id,
            owner_id: quiz.owner_id,
            name: quiz.name,
            tag: tag.map(TagResponse::from),
        }
    }
}

/// A selectable answer; correctness is never shown to students
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerOption {
    pub id: i32,
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResponse {
    pub id: i32,
    pub quiz_id: i32,
    pub text: String,
    pub answers: Vec<AnswerOption>,
}

impl QuestionResponse {
    pub fn new(question: question::Model, answers: Vec<answer::Model>) -> Self {
        Self {
            id: question.id,
            quiz_id: question.quiz_id,
            text: question.text,
            answers: answers
                .into_iter()
                .map(|answer| AnswerOption {
                    id: answer.id,
                    text: answer.text,
                })
                .collect(),
        }
    }
}

/// Answer as seen by the quiz owner
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerResponse {
    pub id: i32,
    pub question_id: i32,
    pub text: String,
    pub is_correct: bool,
}

impl From<answer::Model> for AnswerResponse {
    fn from(answer: answer::Model) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            text: answer.text,
            is_correct: answer.is_correct,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizDetailResponse {
    pub quiz: QuizResponse,
    pub questions: Vec<QuestionResponse>,
}

impl From<QuizDetail> for QuizDetailResponse {
    fn from(detail: QuizDetail) -> Self {
        Self {
            quiz: QuizResponse::new(detail.quiz, detail.tag),
            questions: detail
                .questions
                .into_iter()
                .map(|(question, answers)| QuestionResponse::new(question, answers))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizProgressResponse {
    Pending {
        remaining: usize,
    },
    Completed {
        taken_quiz_id: i32,
        correct: u64,
        total: u64,
        score: f64,
        passed: bool,
    },
}

impl From<QuizProgress> for QuizProgressResponse {
    fn from(progress: QuizProgress) -> Self {
        match progress {
            QuizProgress::Pending { remaining } => Self::Pending { remaining },
            QuizProgress::Completed {
                taken,
                correct,
                total,
                score,
                passed,
            } => Self::Completed {
                taken_quiz_id: taken.id,
                correct,
                total,
                score,
                passed,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TakenQuizResponse {
    pub id: i32,
    pub quiz_id: i32,
    pub quiz_name: Option<String>,
    pub score: f64,
    pub date: DateTime<Utc>,
}

impl TakenQuizResponse {
    pub fn new(taken: taken_quiz::Model, quiz: Option<quiz::Model>) -> Self {
        Self {
            id: taken.id,
            quiz_id: taken.quiz_id,
            quiz_name: quiz.map(|quiz| quiz.name),
            score: taken.score,
            date: taken.date,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InterestsRequest {
    pub tags: Vec<i32>,
}
