//! Input validation for everything the API accepts
//!
//! Each form describes its editable fields (served to clients at
//! `GET /forms/{name}`) and turns raw input into cleaned values or a map of
//! per-field error messages.

pub mod account;
pub mod content;
pub mod course;
pub mod quiz;

use models::{content::ContentKind, filters::FieldLabels, filters::verbose_name};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::ValidateLength;

pub const REQUIRED: &str = "This field is required.";

/// How a field is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    Textarea,
    RichText,
    Select,
    DateInput,
    FileInput,
    UrlInput,
    ColorInput,
    Checkbox,
    Hidden,
}

/// Descriptor of one editable field
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub widget: Widget,
    pub required: bool,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Presentation attributes such as CSS classes or textarea size
    pub attrs: BTreeMap<String, String>,
}

impl FieldSpec {
    /// A required field labelled from `T`'s field labels
    pub fn new<T: FieldLabels>(name: &str, widget: Widget) -> Self {
        Self {
            name: name.to_owned(),
            label: verbose_name::<T>(name),
            widget,
            required: true,
            read_only: false,
            max_length: None,
            choices: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.required = false;
        self.read_only = true;
        self.attr("readonly", "readonly")
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.choices = choices.into_iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_owned(), value.into());
        self
    }
}

/// Field name to error messages; serialized as-is in 422 responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Moves every error of `other` under `{prefix}-{field}`
    pub fn absorb(&mut self, prefix: &str, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}-{field}"))
                .or_default()
                .extend(messages);
        }
    }

    /// `Ok(cleaned)` when no error was recorded
    pub fn finish<T>(self, cleaned: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(cleaned) } else { Err(self) }
    }
}

/// Something that validates raw input into `Cleaned`
pub trait Form {
    type Cleaned;

    fn fields(&self) -> Vec<FieldSpec>;

    fn validate(self) -> Result<Self::Cleaned, FormErrors>;
}

/// Trimmed value of a required text field
pub(crate) fn clean_required(
    errors: &mut FormErrors,
    field: &str,
    value: &str,
    max: Option<usize>,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_max_length(errors, field, value, max);
    }
    value.to_owned()
}

/// Trimmed value of an optional text field; blank becomes `None`
pub(crate) fn clean_optional(
    errors: &mut FormErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    check_max_length(errors, field, value, max);
    Some(value.to_owned())
}

fn check_max_length(errors: &mut FormErrors, field: &str, value: &str, max: Option<usize>) {
    let Some(max) = max else {
        return;
    };

    if !value.validate_length(None, Some(max as u64), None) {
        let len = value.chars().count();
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

/// A form as served to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormDescriptor {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    /// Blank rows offered by inline formsets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<usize>,
}

pub const FORM_NAMES: [&str; 17] = [
    "signup",
    "user",
    "profile",
    "subject",
    "course",
    "module",
    "module-formset",
    "review",
    "badge",
    "text",
    "file",
    "image",
    "video",
    "tag",
    "quiz",
    "question",
    "answer",
];

/// Descriptor of the form registered under `name`
pub fn describe(name: &str) -> Option<FormDescriptor> {
    let (fields, extra) = match name {
        "signup" => (account::SignUpForm::default().fields(), None),
        "user" => (account::UserEditForm::default().fields(), None),
        "profile" => (account::ProfileEditForm::default().fields(), None),
        "subject" => (course::SubjectForm::default().fields(), None),
        "course" => (course::CourseCreateForm::default().fields(), None),
        "module" => (course::ModuleForm::default().fields(), None),
        "module-formset" => (
            course::ModuleFormSet::default().fields(),
            Some(course::EXTRA_ROWS),
        ),
        "review" => (account::ReviewForm::default().fields(), None),
        "badge" => (account::BadgeForm::default().fields(), None),
        "tag" => (quiz::TagForm::default().fields(), None),
        "quiz" => (quiz::QuizForm::default().fields(), None),
        "question" => (quiz::QuestionForm::default().fields(), None),
        "answer" => (quiz::AnswerForm::default().fields(), None),
        other => {
            let kind = ContentKind::parse(other).ok()?;
            (content::ItemForm::for_create(kind).fields(), None)
        }
    };

    Some(FormDescriptor {
        name: name.to_owned(),
        fields,
        extra,
    })
}
