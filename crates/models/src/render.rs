//! HTML fragments for content items and tags

use html_escape::{encode_double_quoted_attribute, encode_text};
use lazy_static::lazy_static;
use regex::Regex;

/// Width and height of embedded video players
const VIDEO_SIZE: (u32, u32) = (480, 360);

/// Default background color of a tag badge
pub const DEFAULT_TAG_COLOR: &str = "#007bff";

lazy_static! {
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n{2,}").unwrap();
    static ref YOUTUBE: Regex =
        Regex::new(r"^https?://(?:www\.|m\.)?(?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/)([\w-]{6,})")
            .unwrap();
    static ref VIMEO: Regex = Regex::new(r"^https?://(?:www\.)?vimeo\.com/(\d+)").unwrap();
}

/// Settings needed to turn stored items into markup
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Public prefix that uploaded files are served under, e.g. `/media/`
    pub media_url: String,
}

impl RenderContext {
    pub fn new(media_url: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
        }
    }

    /// Public address of a stored upload
    pub fn media(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.media_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new("/media/")
    }
}

/// Something that knows how to present itself as an HTML fragment
pub trait Render {
    fn render(&self, ctx: &RenderContext) -> String;
}

/// Paragraphs for blank-line separated blocks, `<br>` for single newlines
pub fn render_text(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

    PARAGRAPH_BREAK
        .split(normalized.trim())
        .filter(|block| !block.is_empty())
        .map(|block| format!("<p>{}</p>", encode_text(block).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_file(ctx: &RenderContext, path: &str) -> String {
    format!(
        r#"<p><a href="{}" class="button">Download file</a></p>"#,
        encode_double_quoted_attribute(&ctx.media(path))
    )
}

pub fn render_image(ctx: &RenderContext, path: &str, title: &str) -> String {
    format!(
        r#"<p><img src="{}" alt="{}"></p>"#,
        encode_double_quoted_attribute(&ctx.media(path)),
        encode_double_quoted_attribute(title)
    )
}

/// Embedded player for known providers, a plain link otherwise
pub fn render_video(url: &str) -> String {
    match embed_url(url) {
        Some(embed) => format!(
            r#"<iframe width="{}" height="{}" src="{}" frameborder="0" allowfullscreen></iframe>"#,
            VIDEO_SIZE.0,
            VIDEO_SIZE.1,
            encode_double_quoted_attribute(&embed)
        ),
        None => format!(
            r#"<p><a href="{0}">{1}</a></p>"#,
            encode_double_quoted_attribute(url),
            encode_text(url)
        ),
    }
}

/// Player address for YouTube and Vimeo links
pub fn embed_url(url: &str) -> Option<String> {
    if let Some(caps) = YOUTUBE.captures(url) {
        return Some(format!("https://www.youtube.com/embed/{}", &caps[1]));
    }
    VIMEO
        .captures(url)
        .map(|caps| format!("https://player.vimeo.com/video/{}", &caps[1]))
}

/// Colored label for a quiz tag
pub fn tag_badge(name: &str, color: &str) -> String {
    format!(
        r#"<span class="badge badge-primary" style="background-color: {}">{}</span>"#,
        encode_double_quoted_attribute(color),
        encode_text(name)
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_text_paragraphs() {
        let html = render_text("First line\nsecond line\n\nNext <para>");
        assert_eq!(
            html,
            "<p>First line<br>second line</p>\n\n<p>Next &lt;para&gt;</p>"
        );
        assert_eq!(render_text(""), "");
    }

    #[test]
    fn test_media_paths() {
        let ctx = RenderContext::new("/media/");
        assert_eq!(ctx.media("files/notes.pdf"), "/media/files/notes.pdf");
        assert_eq!(
            render_file(&ctx, "files/notes.pdf"),
            r#"<p><a href="/media/files/notes.pdf" class="button">Download file</a></p>"#
        );
        assert_eq!(
            render_image(&ctx, "images/a.png", "A \"diagram\""),
            r#"<p><img src="/media/images/a.png" alt="A &quot;diagram&quot;"></p>"#
        );
    }

    #[test]
    fn test_embed_urls() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );
        assert_eq!(
            embed_url("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );
        assert_eq!(
            embed_url("https://vimeo.com/76979871").as_deref(),
            Some("https://player.vimeo.com/video/76979871")
        );
        assert_eq!(embed_url("https://example.com/video.mp4"), None);
    }

    #[test]
    fn test_unknown_video_is_a_link() {
        assert_eq!(
            render_video("https://example.com/v.mp4"),
            r#"<p><a href="https://example.com/v.mp4">https://example.com/v.mp4</a></p>"#
        );
    }

    #[test]
    fn test_tag_badge_escapes() {
        assert_eq!(
            tag_badge("<b>Math</b>", DEFAULT_TAG_COLOR),
            r##"<span class="badge badge-primary" style="background-color: #007bff">&lt;b&gt;Math&lt;/b&gt;</span>"##
        );
    }
}
