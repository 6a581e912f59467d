use super::{FieldSpec, Form, FormErrors, REQUIRED, Widget, clean_optional, clean_required};
use database::entities::{answer, question, quiz, tag};
use models::render::DEFAULT_TAG_COLOR;
use serde::Deserialize;
use utoipa::ToSchema;

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TagForm {
    pub name: String,
    /// `#rrggbb`, defaults to the primary badge color
    pub color: Option<String>,
}

impl Form for TagForm {
    type Cleaned = (String, Option<String>);

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<tag::Model>("name", Widget::TextInput).max_length(30),
            FieldSpec::new::<tag::Model>("color", Widget::ColorInput)
                .optional()
                .max_length(7)
                .attr("placeholder", DEFAULT_TAG_COLOR),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let name = clean_required(&mut errors, "name", &self.name, Some(30));
        let color = clean_optional(&mut errors, "color", self.color.as_deref(), None);

        if let Some(color) = &color
            && !is_hex_color(color)
        {
            errors.add("color", "Enter a valid color in #rrggbb form.");
        }

        errors.finish((name, color))
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct QuizForm {
    pub name: String,
    pub tag: Option<i32>,
}

impl Form for QuizForm {
    type Cleaned = (String, i32);

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<quiz::Model>("name", Widget::TextInput).max_length(255),
            FieldSpec::new::<quiz::Model>("tag", Widget::Select),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let name = clean_required(&mut errors, "name", &self.name, Some(255));
        if self.tag.is_none() {
            errors.add("tag", REQUIRED);
        }

        errors.finish((name, self.tag.unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct QuestionForm {
    pub text: String,
}

impl Form for QuestionForm {
    type Cleaned = String;

    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::new::<question::Model>("text", Widget::TextInput).max_length(255)]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let text = clean_required(&mut errors, "text", &self.text, Some(255));
        errors.finish(text)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AnswerForm {
    pub text: String,
    pub is_correct: bool,
}

impl Form for AnswerForm {
    type Cleaned = (String, bool);

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<answer::Model>("text", Widget::TextInput).max_length(255),
            FieldSpec::new::<answer::Model>("is_correct", Widget::Checkbox).optional(),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let text = clean_required(&mut errors, "text", &self.text, Some(255));
        errors.finish((text, self.is_correct))
    }
}

/// The answer a student picks for the current question
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TakeQuizForm {
    pub answer: Option<i32>,
}

impl TakeQuizForm {
    pub fn validate(self) -> Result<i32, FormErrors> {
        self.answer
            .ok_or_else(|| FormErrors::single("answer", REQUIRED))
    }
}
