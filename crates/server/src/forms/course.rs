use super::{FieldSpec, Form, FormErrors, REQUIRED, Widget, clean_optional, clean_required};
use database::{
    entities::{course, module, subject},
    services::{
        course::CourseChanges,
        module::{ModuleChange, ModuleFields},
    },
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Blank module rows offered below the existing ones
pub const EXTRA_ROWS: usize = 2;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SubjectForm {
    pub title: String,
    /// Derived from the title when blank
    pub slug: Option<String>,
}

impl Form for SubjectForm {
    type Cleaned = (String, Option<String>);

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<subject::Model>("title", Widget::TextInput).max_length(200),
            FieldSpec::new::<subject::Model>("slug", Widget::TextInput)
                .optional()
                .max_length(200),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let title = clean_required(&mut errors, "title", &self.title, Some(200));
        let slug = clean_optional(&mut errors, "slug", self.slug.as_deref(), Some(200));

        if let Some(slug) = &slug
            && !slug
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        }

        errors.finish((title, slug))
    }
}

/// Course creation and edition; the slug is never edited directly
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CourseCreateForm {
    pub subject: Option<i32>,
    pub title: String,
    pub overview: String,
}

impl Form for CourseCreateForm {
    type Cleaned = CourseChanges;

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<course::Model>("subject", Widget::Select).attr("class", "form-control"),
            FieldSpec::new::<course::Model>("title", Widget::TextInput)
                .max_length(200)
                .attr("class", "form-control"),
            FieldSpec::new::<course::Model>("overview", Widget::Textarea)
                .attr("class", "form-control")
                .attr("cols", "40")
                .attr("rows", "15"),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let title = clean_required(&mut errors, "title", &self.title, Some(200));
        let overview = clean_required(&mut errors, "overview", &self.overview, None);
        if self.subject.is_none() {
            errors.add("subject", REQUIRED);
        }

        errors.finish(CourseChanges {
            subject_id: self.subject.unwrap_or_default(),
            title,
            overview,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ModuleForm {
    pub title: String,
    pub description: String,
    /// Rich-text body
    pub content: Option<String>,
}

impl Form for ModuleForm {
    type Cleaned = ModuleFields;

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<module::Model>("title", Widget::TextInput)
                .max_length(200)
                .attr("class", "form-control"),
            FieldSpec::new::<module::Model>("description", Widget::Textarea)
                .attr("class", "form-control")
                .attr("cols", "40")
                .attr("rows", "8"),
            FieldSpec::new::<module::Model>("content", Widget::RichText).optional(),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let title = clean_required(&mut errors, "title", &self.title, Some(200));
        let description = clean_required(&mut errors, "description", &self.description, None);
        let content = clean_optional(&mut errors, "content", self.content.as_deref(), None);

        errors.finish(ModuleFields {
            title,
            description,
            content,
        })
    }
}

/// One row of the inline module formset
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ModuleRow {
    /// Present for existing modules
    pub id: Option<i32>,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    /// Marks an existing module for removal
    pub delete: bool,
}

impl ModuleRow {
    fn from_module(module: &module::Model) -> Self {
        Self {
            id: Some(module.id),
            title: module.title.clone(),
            description: module.description.clone(),
            content: module.content.clone(),
            delete: false,
        }
    }

    /// An extra row nobody filled in
    fn is_blank(&self) -> bool {
        self.id.is_none()
            && self.title.trim().is_empty()
            && self.description.trim().is_empty()
            && self.content.as_deref().is_none_or(|c| c.trim().is_empty())
    }

    fn into_form(self) -> ModuleForm {
        ModuleForm {
            title: self.title,
            description: self.description,
            content: self.content,
        }
    }
}

/// All modules of a course edited at once
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ModuleFormSet {
    pub rows: Vec<ModuleRow>,
}

impl ModuleFormSet {
    /// The existing modules in order followed by the blank extra rows
    pub fn initial(modules: &[module::Model]) -> Self {
        let rows = modules
            .iter()
            .map(ModuleRow::from_module)
            .chain(std::iter::repeat_with(ModuleRow::default).take(EXTRA_ROWS))
            .collect();

        Self { rows }
    }
}

impl Form for ModuleFormSet {
    type Cleaned = Vec<ModuleChange>;

    fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![FieldSpec::new::<module::Model>("id", Widget::Hidden).optional()];
        fields.extend(ModuleForm::default().fields());
        fields.push(FieldSpec::new::<module::Model>("delete", Widget::Checkbox).optional());
        fields
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let mut changes = Vec::new();

        for (index, row) in self.rows.into_iter().enumerate() {
            match (row.id, row.delete) {
                (Some(id), true) => changes.push(ModuleChange::Delete(id)),
                (None, true) => {}
                _ if row.is_blank() => {}
                (id, false) => match row.into_form().validate() {
                    Ok(fields) => changes.push(match id {
                        Some(id) => ModuleChange::Update(id, fields),
                        None => ModuleChange::Create(fields),
                    }),
                    Err(row_errors) => errors.absorb(&format!("rows-{index}"), row_errors),
                },
            }
        }

        errors.finish(changes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(id: Option<i32>, title: &str, delete: bool) -> ModuleRow {
        ModuleRow {
            id,
            title: title.to_owned(),
            description: if title.is_empty() {
                String::new()
            } else {
                format!("{title} description")
            },
            content: None,
            delete,
        }
    }

    #[test]
    fn test_textareas_carry_their_size() {
        let overview = CourseCreateForm::default()
            .fields()
            .into_iter()
            .find(|f| f.name == "overview")
            .unwrap();
        assert_eq!(overview.attrs["rows"], "15");
        assert_eq!(overview.attrs["class"], "form-control");

        let description = ModuleForm::default()
            .fields()
            .into_iter()
            .find(|f| f.name == "description")
            .unwrap();
        assert_eq!(description.attrs["rows"], "8");
        assert_eq!(description.attrs["cols"], "40");
    }

    #[test]
    fn test_course_form_requires_subject_and_limits_title() {
        let errors = CourseCreateForm {
            subject: None,
            title: "x".repeat(201),
            overview: "Overview".to_owned(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.get("subject"), [REQUIRED]);
        assert_eq!(errors.get("title").len(), 1);
        assert!(errors.get("overview").is_empty());
    }

    #[test]
    fn test_module_form_trims_and_drops_blank_content() {
        let fields = ModuleForm {
            title: "  Basics ".to_owned(),
            description: "Start here".to_owned(),
            content: Some("   ".to_owned()),
        }
        .validate()
        .unwrap();

        assert_eq!(fields.title, "Basics");
        assert_eq!(fields.content, None);
    }

    #[test]
    fn test_initial_formset_has_extra_rows() {
        let modules = vec![module::Model {
            id: 4,
            course_id: 1,
            title: "Basics".to_owned(),
            description: "d".to_owned(),
            content: None,
            order: 0,
        }];
        let formset = ModuleFormSet::initial(&modules);

        assert_eq!(formset.rows.len(), 1 + EXTRA_ROWS);
        assert_eq!(formset.rows[0].id, Some(4));
        assert!(formset.rows[1..].iter().all(ModuleRow::is_blank));
    }

    #[test]
    fn test_formset_maps_rows_to_changes() {
        let changes = ModuleFormSet {
            rows: vec![
                row(Some(1), "Kept", false),
                row(Some(2), "Gone", true),
                row(None, "New", false),
                row(None, "", false),
                row(None, "Never saved", true),
            ],
        }
        .validate()
        .unwrap();

        assert_eq!(changes.len(), 3);
        assert!(matches!(&changes[0], ModuleChange::Update(1, f) if f.title == "Kept"));
        assert_eq!(changes[1], ModuleChange::Delete(2));
        assert!(matches!(&changes[2], ModuleChange::Create(f) if f.title == "New"));
    }

    #[test]
    fn test_formset_reports_errors_per_row() {
        let mut incomplete = row(None, "No description", false);
        incomplete.description.clear();

        let errors = ModuleFormSet {
            rows: vec![row(Some(1), "Fine", false), incomplete],
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.get("rows-1-description"), [REQUIRED]);
        assert!(errors.get("rows-0-title").is_empty());
    }
}
