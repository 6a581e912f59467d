use super::{FieldSpec, Form, FormErrors, REQUIRED, Widget, clean_optional, clean_required};
use database::entities::{file_item, image_item, text_item, video_item};
use models::{content::ContentKind, filters::FieldLabels};
use url::Url;

pub const TITLE_MAX: usize = 250;

/// A file received in a multipart request
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Validated payload of an item, before uploads are stored
#[derive(Debug, Clone, PartialEq)]
pub enum ItemInput {
    Text(String),
    Upload(Upload),
    Video(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedItem {
    pub title: String,
    /// `None` keeps the stored payload on edit
    pub payload: Option<ItemInput>,
}

/// Item form for one content kind, filled from multipart fields
#[derive(Debug, Clone)]
pub struct ItemForm {
    kind: ContentKind,
    require_payload: bool,
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
    pub file: Option<Upload>,
}

impl ItemForm {
    /// New items need their payload
    pub fn for_create(kind: ContentKind) -> Self {
        Self::new(kind, true)
    }

    /// Edits may leave the payload out
    pub fn for_update(kind: ContentKind) -> Self {
        Self::new(kind, false)
    }

    fn new(kind: ContentKind, require_payload: bool) -> Self {
        Self {
            kind,
            require_payload,
            title: String::new(),
            content: None,
            url: None,
            file: None,
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Name of the multipart field carrying this kind's payload
    pub fn payload_field(&self) -> &'static str {
        match self.kind {
            ContentKind::Text => "content",
            ContentKind::File | ContentKind::Image => "file",
            ContentKind::Video => "url",
        }
    }

    /// Records a text field of the multipart body; unknown names are ignored
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = value,
            "content" => self.content = Some(value),
            "url" => self.url = Some(value),
            _ => {}
        }
    }

    fn specs<T: FieldLabels>(&self) -> Vec<FieldSpec> {
        let payload = match self.kind {
            ContentKind::Text => FieldSpec::new::<T>("content", Widget::Textarea),
            ContentKind::File | ContentKind::Image => FieldSpec::new::<T>("file", Widget::FileInput),
            ContentKind::Video => FieldSpec::new::<T>("url", Widget::UrlInput).max_length(200),
        };
        let payload = if self.require_payload {
            payload
        } else {
            payload.optional()
        };

        vec![
            FieldSpec::new::<T>("title", Widget::TextInput).max_length(TITLE_MAX),
            payload,
        ]
    }
}

/// An absolute http(s) URL whose host has no empty labels
fn is_http_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };

    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| {
            host.trim_end_matches('.')
                .split('.')
                .all(|label| !label.is_empty())
        })
}

impl Form for ItemForm {
    type Cleaned = CleanedItem;

    fn fields(&self) -> Vec<FieldSpec> {
        match self.kind {
            ContentKind::Text => self.specs::<text_item::Model>(),
            ContentKind::File => self.specs::<file_item::Model>(),
            ContentKind::Image => self.specs::<image_item::Model>(),
            ContentKind::Video => self.specs::<video_item::Model>(),
        }
    }

    fn validate(self) -> Result<Self::Cleaned, FormErrors> {
        let mut errors = FormErrors::new();
        let title = clean_required(&mut errors, "title", &self.title, Some(TITLE_MAX));
        let field = self.payload_field();

        let payload = match self.kind {
            ContentKind::Text => {
                clean_optional(&mut errors, field, self.content.as_deref(), None).map(ItemInput::Text)
            }
            ContentKind::File | ContentKind::Image => self
                .file
                .filter(|upload| !upload.file_name.is_empty())
                .map(ItemInput::Upload),
            ContentKind::Video => {
                let url = clean_optional(&mut errors, field, self.url.as_deref(), Some(200));
                if let Some(url) = &url
                    && !is_http_url(url)
                {
                    errors.add(field, "Enter a valid URL.");
                }
                url.map(ItemInput::Video)
            }
        };

        if payload.is_none() && self.require_payload {
            errors.add(field, REQUIRED);
        }

        errors.finish(CleanedItem { title, payload })
    }
}
