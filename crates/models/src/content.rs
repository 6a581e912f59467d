use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

#[cfg(feature = "database")]
use sea_orm::Value;

/// The kinds of item a content slot may point at
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentKind {
    Text,
    File,
    Image,
    Video,
}

impl ContentKind {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Directory (relative to the media root) that uploads of this kind land in
    pub fn upload_dir(&self) -> Option<&'static str> {
        match self {
            Self::File => Some("files"),
            Self::Image => Some("images"),
            Self::Text | Self::Video => None,
        }
    }

    /// All kinds, in declaration order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// The payload of a single content item, one shape per [`ContentKind`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemPayload {
    /// Plain text body
    Text { content: String },
    /// Path of an uploaded file, relative to the media root
    File { file: String },
    /// Path of an uploaded image, relative to the media root
    Image { file: String },
    /// Address of an externally hosted video
    Video { url: String },
}

impl ItemPayload {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::File { .. } => ContentKind::File,
            Self::Image { .. } => ContentKind::Image,
            Self::Video { .. } => ContentKind::Video,
        }
    }
}

/// Error returned when a stored or submitted kind is not one of the four allowed ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownContentKind(pub String);

impl Display for UnknownContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Unknown content kind: {}", self.0)
    }
}

impl std::error::Error for UnknownContentKind {}

impl ContentKind {
    pub fn parse(kind: &str) -> Result<Self, UnknownContentKind> {
        Self::from_str(kind).map_err(|_| UnknownContentKind(kind.to_owned()))
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for ContentKind {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::String(Some(s)) => {
                ContentKind::from_str(&s).map_err(|_| sea_orm::sea_query::ValueTypeErr)
            }
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "ContentKind".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::String
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::String(sea_orm::sea_query::StringLen::N(16))
    }
}

#[cfg(feature = "database")]
impl From<ContentKind> for Value {
    fn from(kind: ContentKind) -> Self {
        Value::String(Some(Box::new(kind.as_str().to_owned())))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for ContentKind {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let val: String = res.try_get_by(index)?;

        ContentKind::from_str(&val).map_err(|_| {
            sea_orm::TryGetError::DbErr(sea_orm::DbErr::Type(format!(
                "Failed to decode ContentKind: {val}"
            )))
        })
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for ContentKind {
    fn null() -> Value {
        Value::String(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_its_string_form() {
        for kind in ContentKind::all() {
            assert_eq!(ContentKind::parse(kind.as_str()), Ok(kind));
        }
        assert_eq!(ContentKind::Image.to_string(), "image");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert_eq!(
            ContentKind::parse("audio"),
            Err(UnknownContentKind("audio".to_owned()))
        );
        // Kinds are stored lowercase; anything else is not a valid discriminator
        assert!(ContentKind::parse("Text").is_err());
    }

    #[test]
    fn test_upload_dirs() {
        assert_eq!(ContentKind::File.upload_dir(), Some("files"));
        assert_eq!(ContentKind::Image.upload_dir(), Some("images"));
        assert_eq!(ContentKind::Text.upload_dir(), None);
        assert_eq!(ContentKind::Video.upload_dir(), None);
    }

    #[test]
    fn test_payload_kind() {
        let payload = ItemPayload::Video {
            url: "https://vimeo.com/1".to_owned(),
        };
        assert_eq!(payload.kind(), ContentKind::Video);
    }
}
