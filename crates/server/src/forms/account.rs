use super::{FieldSpec, Form, FormErrors, REQUIRED, Widget, clean_optional, clean_required};
use chrono::NaiveDate;
use database::{
    entities::{badge_award, profile, review, user},
    services::account::{NewAccount, UserChanges},
};
use models::rating::Rating;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::ValidateEmail;

const NAME_MAX: usize = 150;

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_student: bool,
    pub is_teacher: bool,
}

impl Form for SignUpForm {
    type Cleaned = NewAccount;

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<user::Model>("username", Widget::TextInput).max_length(NAME_MAX),
            FieldSpec::new::<user::Model>("email", Widget::TextInput).max_length(254),
            FieldSpec::new::<user::Model>("first_name", Widget::TextInput)
                .optional()
                .max_length(NAME_MAX),
            FieldSpec::new::<user::Model>("last_name", Widget::TextInput)
                .optional()
                .max_length(NAME_MAX),
            FieldSpec::new::<user::Model>("is_student", Widget::Checkbox).optional(),
            FieldSpec::new::<user::Model>("is_teacher", Widget::Checkbox).optional(),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();

        let username = clean_required(&mut errors, "username", &self.username, Some(NAME_MAX));
        if !username.is_empty() && !valid_username(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        let email = clean_required(&mut errors, "email", &self.email, Some(254));
        if !email.is_empty() && !email.validate_email() {
            errors.add("email", "Enter a valid email address.");
        }

        let first_name =
            clean_optional(&mut errors, "first_name", Some(&self.first_name), Some(NAME_MAX));
        let last_name =
            clean_optional(&mut errors, "last_name", Some(&self.last_name), Some(NAME_MAX));

        errors.finish(NewAccount {
            username,
            email,
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            is_student: self.is_student,
            is_teacher: self.is_teacher,
        })
    }
}

/// Edits names only; the username is shown but never changed
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserEditForm {
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl Form for UserEditForm {
    type Cleaned = UserChanges;

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<user::Model>("username", Widget::TextInput).read_only(),
            FieldSpec::new::<user::Model>("first_name", Widget::TextInput)
                .optional()
                .max_length(NAME_MAX),
            FieldSpec::new::<user::Model>("last_name", Widget::TextInput)
                .optional()
                .max_length(NAME_MAX),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let first_name =
            clean_optional(&mut errors, "first_name", Some(&self.first_name), Some(NAME_MAX));
        let last_name =
            clean_optional(&mut errors, "last_name", Some(&self.last_name), Some(NAME_MAX));

        errors.finish(UserChanges {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProfileEditForm {
    pub location: String,
    /// `YYYY-MM-DD`
    pub birthdate: Option<String>,
}

impl Form for ProfileEditForm {
    type Cleaned = (String, Option<NaiveDate>);

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<profile::Model>("location", Widget::TextInput)
                .optional()
                .max_length(30),
            FieldSpec::new::<profile::Model>("birthdate", Widget::DateInput)
                .optional()
                .attr("type", "date"),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let location = clean_optional(&mut errors, "location", Some(&self.location), Some(30));

        let birthdate = match clean_optional(&mut errors, "birthdate", self.birthdate.as_deref(), None)
        {
            Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("birthdate", "Enter a valid date.");
                    None
                }
            },
            None => None,
        };

        errors.finish((location.unwrap_or_default(), birthdate))
    }
}

const REVIEW_COMMENT_CLASS: &str = "no-resize appearance-none block w-full bg-gray-200 text-gray-700 \
    border border-gray-200 rounded py-3 px-4 mb-3 leading-tight focus:outline-none focus:bg-white \
    focus:border-gray-500 h-48 resize-none";

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReviewForm {
    pub rating: Option<i32>,
    pub comment: String,
}

impl Form for ReviewForm {
    type Cleaned = (Rating, String);

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<review::Model>("rating", Widget::Select).choices(Rating::CHOICES),
            FieldSpec::new::<review::Model>("comment", Widget::Textarea)
                .max_length(200)
                .attr("cols", "40")
                .attr("rows", "15")
                .attr("class", REVIEW_COMMENT_CLASS),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let comment = clean_required(&mut errors, "comment", &self.comment, Some(200));

        let rating = match self.rating.map(Rating::new) {
            Some(Ok(rating)) => Some(rating),
            Some(Err(err)) => {
                errors.add("rating", err.to_string());
                None
            }
            None => {
                errors.add("rating", REQUIRED);
                None
            }
        };

        match rating {
            Some(rating) => errors.finish((rating, comment)),
            None => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct BadgeForm {
    pub user: Option<i32>,
    pub slug: String,
    pub level: Option<i32>,
}

impl Form for BadgeForm {
    type Cleaned = (i32, String, i32);

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new::<badge_award::Model>("user", Widget::Select),
            FieldSpec::new::<badge_award::Model>("slug", Widget::TextInput).max_length(255),
            FieldSpec::new::<badge_award::Model>("level", Widget::TextInput)
                .optional()
                .attr("type", "number"),
        ]
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let slug = clean_required(&mut errors, "slug", &self.slug, Some(255));
        let level = self.level.unwrap_or(1);
        if level < 1 {
            errors.add("level", "Ensure this value is greater than or equal to 1.");
        }
        if self.user.is_none() {
            errors.add("user", REQUIRED);
        }

        errors.finish((self.user.unwrap_or_default(), slug, level))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signup_checks_username_and_email() {
        let errors = SignUpForm {
            username: "ann smith".to_owned(),
            email: "not-an-email".to_owned(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.get("username").len(), 1);
        assert_eq!(errors.get("email"), ["Enter a valid email address."]);

        let account = SignUpForm {
            username: "ann".to_owned(),
            email: " ann@example.com ".to_owned(),
            is_student: true,
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(account.email, "ann@example.com");
        assert!(account.is_student && !account.is_teacher);
    }

    #[test]
    fn test_signup_rejects_malformed_emails() {
        for email in ["a@@example.com", "a@b@c.com", "a@b..com", "a b@example.com"] {
            let errors = SignUpForm {
                username: "ann".to_owned(),
                email: email.to_owned(),
                ..Default::default()
            }
            .validate()
            .unwrap_err();
            assert_eq!(errors.get("email"), ["Enter a valid email address."], "{email}");
        }
    }

    #[test]
    fn test_review_rating_must_be_in_range() {
        let errors = ReviewForm {
            rating: Some(6),
            comment: "Great".to_owned(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("rating").len(), 1);

        let missing = ReviewForm {
            rating: None,
            comment: "Great".to_owned(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(missing.get("rating"), [REQUIRED]);

        let (rating, comment) = ReviewForm {
            rating: Some(4),
            comment: "Great".to_owned(),
        }
        .validate()
        .unwrap();
        assert_eq!((rating.value(), comment.as_str()), (4, "Great"));
    }

    #[test]
    fn test_profile_form_parses_birthdate() {
        let (location, birthdate) = ProfileEditForm {
            location: "Lisbon".to_owned(),
            birthdate: Some("1990-05-17".to_owned()),
        }
        .validate()
        .unwrap();
        assert_eq!(location, "Lisbon");
        assert_eq!(birthdate, NaiveDate::from_ymd_opt(1990, 5, 17));

        let errors = ProfileEditForm {
            location: "x".repeat(31),
            birthdate: Some("17/05/1990".to_owned()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("location").len(), 1);
        assert_eq!(errors.get("birthdate"), ["Enter a valid date."]);
    }

    #[test]
    fn test_user_form_username_is_read_only() {
        let fields = UserEditForm::default().fields();
        let username = fields.iter().find(|f| f.name == "username").unwrap();

        assert!(username.read_only);
        assert_eq!(username.attrs.get("readonly").map(String::as_str), Some("readonly"));
    }
}
