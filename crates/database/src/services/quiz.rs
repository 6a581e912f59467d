use crate::{
    entities::{answer, question, quiz, student, student_answer, student_interest, tag, taken_quiz},
    error::ServiceError,
    services::account::AccountService,
};
use chrono::Utc;
use log::info;
use models::render::DEFAULT_TAG_COLOR;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionTrait,
};
use std::collections::HashSet;

/// Minimum score for a quiz to count as passed
pub const PASS_MARK: f64 = 50.0;

/// Where a student stands after answering one question
#[derive(Debug, Clone, PartialEq)]
pub enum QuizProgress {
    Pending {
        remaining: usize,
    },
    Completed {
        taken: taken_quiz::Model,
        correct: u64,
        total: u64,
        score: f64,
        passed: bool,
    },
}

/// A quiz with its questions, each with its answers
#[derive(Debug, Clone)]
pub struct QuizDetail {
    pub quiz: quiz::Model,
    pub tag: Option<tag::Model>,
    pub questions: Vec<(question::Model, Vec<answer::Model>)>,
}

/// Percentage of correct answers rounded to two decimals
pub fn score(correct: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = correct as f64 / total as f64 * 100.0;
    (percentage * 100.0).round() / 100.0
}

pub struct QuizService;

impl QuizService {
    pub async fn create_tag(
        db: &DatabaseConnection,
        name: String,
        color: Option<String>,
    ) -> Result<tag::Model, DbErr> {
        let tag = tag::ActiveModel {
            name: Set(name),
            color: Set(color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_owned())),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Created tag {} ({})", tag.id, tag.name);
        Ok(tag)
    }

    pub async fn list_tags(db: &DatabaseConnection) -> Result<Vec<tag::Model>, DbErr> {
        tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await
    }

    pub async fn create_quiz(
        db: &DatabaseConnection,
        owner_id: i32,
        name: String,
        tag_id: i32,
    ) -> Result<quiz::Model, ServiceError> {
        if tag::Entity::find_by_id(tag_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound("tag"));
        }

        let quiz = quiz::ActiveModel {
            owner_id: Set(owner_id),
            name: Set(name),
            tag_id: Set(tag_id),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Created quiz {} for tag {tag_id}", quiz.id);
        Ok(quiz)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<Option<quiz::Model>, DbErr> {
        quiz::Entity::find_by_id(id).one(db).await
    }

    pub async fn add_question(
        db: &DatabaseConnection,
        quiz_id: i32,
        text: String,
    ) -> Result<question::Model, ServiceError> {
        if quiz::Entity::find_by_id(quiz_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound("quiz"));
        }

        let question = question::ActiveModel {
            quiz_id: Set(quiz_id),
            text: Set(text),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(question)
    }

    /// The question with the quiz it belongs to
    pub async fn get_question(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<(question::Model, quiz::Model)>, DbErr> {
        let found = question::Entity::find_by_id(id)
            .find_also_related(quiz::Entity)
            .one(db)
            .await?;

        Ok(found.and_then(|(question, quiz)| quiz.map(|quiz| (question, quiz))))
    }

    pub async fn add_answer(
        db: &DatabaseConnection,
        question_id: i32,
        text: String,
        is_correct: bool,
    ) -> Result<answer::Model, ServiceError> {
        if question::Entity::find_by_id(question_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("question"));
        }

        let answer = answer::ActiveModel {
            question_id: Set(question_id),
            text: Set(text),
            is_correct: Set(is_correct),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(answer)
    }

    pub async fn get_quiz(
        db: &DatabaseConnection,
        quiz_id: i32,
    ) -> Result<Option<QuizDetail>, DbErr> {
        let Some((quiz, tag)) = quiz::Entity::find_by_id(quiz_id)
            .find_also_related(tag::Entity)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let questions = question::Entity::find()
            .filter(question::Column::QuizId.eq(quiz.id))
            .order_by_asc(question::Column::Text)
            .find_with_related(answer::Entity)
            .all(db)
            .await?;

        Ok(Some(QuizDetail {
            quiz,
            tag,
            questions,
        }))
    }

    /// Replaces the student's interests with `tag_ids`
    pub async fn set_interests(
        db: &DatabaseConnection,
        student_id: i32,
        tag_ids: &[i32],
    ) -> Result<Vec<tag::Model>, ServiceError> {
        let txn = db.begin().await?;
        Self::require_student(&txn, student_id).await?;

        let unique: HashSet<i32> = tag_ids.iter().copied().collect();
        let tags = tag::Entity::find()
            .filter(tag::Column::Id.is_in(unique.iter().copied()))
            .order_by_asc(tag::Column::Name)
            .all(&txn)
            .await?;
        if tags.len() != unique.len() {
            return Err(ServiceError::NotFound("tag"));
        }

        student_interest::Entity::delete_many()
            .filter(student_interest::Column::StudentId.eq(student_id))
            .exec(&txn)
            .await?;

        for tag in &tags {
            student_interest::ActiveModel {
                student_id: Set(student_id),
                tag_id: Set(tag.id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!("Student {student_id} now follows {} tags", tags.len());

        Ok(tags)
    }

    pub async fn interests(
        db: &DatabaseConnection,
        student_id: i32,
    ) -> Result<Vec<tag::Model>, DbErr> {
        tag::Entity::find()
            .inner_join(student_interest::Entity)
            .filter(student_interest::Column::StudentId.eq(student_id))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await
    }

    /// Quizzes matching the student's interests that have questions and were not taken yet
    pub async fn available_quizzes(
        db: &DatabaseConnection,
        student_id: i32,
    ) -> Result<Vec<(quiz::Model, Option<tag::Model>)>, DbErr> {
        let interest_ids: Vec<i32> = student_interest::Entity::find()
            .select_only()
            .column(student_interest::Column::TagId)
            .filter(student_interest::Column::StudentId.eq(student_id))
            .into_tuple()
            .all(db)
            .await?;
        if interest_ids.is_empty() {
            return Ok(Vec::new());
        }

        let taken_ids: Vec<i32> = taken_quiz::Entity::find()
            .select_only()
            .column(taken_quiz::Column::QuizId)
            .filter(taken_quiz::Column::StudentId.eq(student_id))
            .into_tuple()
            .all(db)
            .await?;

        let with_questions: HashSet<i32> = question::Entity::find()
            .select_only()
            .column(question::Column::QuizId)
            .distinct()
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let quizzes = quiz::Entity::find()
            .find_also_related(tag::Entity)
            .filter(quiz::Column::TagId.is_in(interest_ids))
            .filter(quiz::Column::Id.is_not_in(taken_ids))
            .order_by_asc(quiz::Column::Name)
            .all(db)
            .await?;

        Ok(quizzes
            .into_iter()
            .filter(|(quiz, _)| with_questions.contains(&quiz.id))
            .collect())
    }

    /// Questions of the quiz the student has not answered, ordered by text
    pub async fn unanswered_questions<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
        quiz_id: i32,
    ) -> Result<Vec<question::Model>, DbErr> {
        let answered: Vec<i32> = student_answer::Entity::find()
            .select_only()
            .column(answer::Column::QuestionId)
            .inner_join(answer::Entity)
            .filter(student_answer::Column::StudentId.eq(student_id))
            .into_tuple()
            .all(conn)
            .await?;

        question::Entity::find()
            .filter(question::Column::QuizId.eq(quiz_id))
            .filter(question::Column::Id.is_not_in(answered))
            .order_by_asc(question::Column::Text)
            .order_by_asc(question::Column::Id)
            .all(conn)
            .await
    }

    /// The next question to show, with its answers
    pub async fn next_question(
        db: &DatabaseConnection,
        student_id: i32,
        quiz_id: i32,
    ) -> Result<Option<(question::Model, Vec<answer::Model>)>, DbErr> {
        let unanswered = Self::unanswered_questions(db, student_id, quiz_id).await?;
        let Some(question) = unanswered.into_iter().next() else {
            return Ok(None);
        };

        let answers = answer::Entity::find()
            .filter(answer::Column::QuestionId.eq(question.id))
            .order_by_asc(answer::Column::Id)
            .all(db)
            .await?;

        Ok(Some((question, answers)))
    }

    async fn require_student<C: ConnectionTrait>(conn: &C, student_id: i32) -> Result<(), ServiceError> {
        match student::Entity::find_by_id(student_id).one(conn).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound("student")),
        }
    }

    /// Records the student's answer; completes the quiz once every question is answered
    pub async fn submit_answer(
        db: &DatabaseConnection,
        student_id: i32,
        quiz_id: i32,
        answer_id: i32,
    ) -> Result<QuizProgress, ServiceError> {
        let txn = db.begin().await?;
        Self::require_student(&txn, student_id).await?;

        if quiz::Entity::find_by_id(quiz_id).one(&txn).await?.is_none() {
            return Err(ServiceError::NotFound("quiz"));
        }

        let already_taken = taken_quiz::Entity::find()
            .filter(taken_quiz::Column::StudentId.eq(student_id))
            .filter(taken_quiz::Column::QuizId.eq(quiz_id))
            .one(&txn)
            .await?
            .is_some();
        if already_taken {
            return Err(ServiceError::invalid("quiz", "You already answered this quiz."));
        }

        let answer = answer::Entity::find_by_id(answer_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("answer"))?;

        let unanswered = Self::unanswered_questions(&txn, student_id, quiz_id).await?;
        if !unanswered.iter().any(|q| q.id == answer.question_id) {
            return Err(ServiceError::invalid(
                "answer",
                "Select an answer to one of the remaining questions of this quiz.",
            ));
        }

        student_answer::ActiveModel {
            student_id: Set(student_id),
            answer_id: Set(answer.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let remaining = unanswered.len() - 1;
        if remaining > 0 {
            txn.commit().await?;
            return Ok(QuizProgress::Pending { remaining });
        }

        let total = question::Entity::find()
            .filter(question::Column::QuizId.eq(quiz_id))
            .count(&txn)
            .await?;
        let correct = student_answer::Entity::find()
            .inner_join(answer::Entity)
            .join(JoinType::InnerJoin, answer::Relation::Question.def())
            .filter(student_answer::Column::StudentId.eq(student_id))
            .filter(question::Column::QuizId.eq(quiz_id))
            .filter(answer::Column::IsCorrect.eq(true))
            .count(&txn)
            .await?;
        let score = score(correct, total);

        let taken = taken_quiz::ActiveModel {
            student_id: Set(student_id),
            quiz_id: Set(quiz_id),
            score: Set(score),
            date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        AccountService::award_points(&txn, student_id, correct as i32).await?;
        txn.commit().await?;

        info!("Student {student_id} completed quiz {quiz_id} with {score}%");
        Ok(QuizProgress::Completed {
            taken,
            correct,
            total,
            score,
            passed: score >= PASS_MARK,
        })
    }

    /// Quizzes the student completed, newest first
    pub async fn taken_quizzes(
        db: &DatabaseConnection,
        student_id: i32,
    ) -> Result<Vec<(taken_quiz::Model, Option<quiz::Model>)>, DbErr> {
        taken_quiz::Entity::find()
            .find_also_related(quiz::Entity)
            .filter(taken_quiz::Column::StudentId.eq(student_id))
            .order_by_desc(taken_quiz::Column::Date)
            .order_by_desc(taken_quiz::Column::Id)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_score_rounds_to_two_decimals() {
        assert_eq!(score(1, 3), 33.33);
        assert_eq!(score(2, 3), 66.67);
        assert_eq!(score(3, 3), 100.0);
    }

    #[test]
    fn test_score_without_questions_is_zero() {
        assert_eq!(score(0, 0), 0.0);
    }
}
