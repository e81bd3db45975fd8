//! HTML fragment helpers shared by the renderers.

use pulldown_cmark::{Event as MdEvent, Options, Parser as MdParser};
use std::fmt::{self, Display, Formatter};
use url::form_urlencoded;

use crate::{error::CatalogError, model::EntityType};

/// Page the detail links point at.
pub const VIEWER_PAGE: &str = "viewer.html";

pub fn catalog_md_options() -> Options {
    let mut md_options = Options::empty();
    md_options.insert(Options::ENABLE_GFM);
    md_options.insert(Options::ENABLE_STRIKETHROUGH);
    md_options.insert(Options::ENABLE_TABLES);
    md_options.insert(Options::ENABLE_TASKLISTS);
    md_options
}

/// Escapes text for use in element content and double-quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders markdown to HTML. Raw HTML in the source is emitted as escaped text, so neither chat
/// replies nor generated descriptions can inject markup into the page.
pub fn markdown_to_html(content: &str, output: &mut String) -> Result<(), CatalogError> {
    let parser = MdParser::new_ext(content, catalog_md_options()).map(|event| match event {
        MdEvent::Html(raw) | MdEvent::InlineHtml(raw) => MdEvent::Text(raw),
        other => other,
    });
    pulldown_cmark::html::write_html_fmt(output, parser)?;
    Ok(())
}

/// Target of a detail-page link: `viewer.html?type=<Type>&id=<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewerLink {
    pub entity_type: EntityType,
    pub id: String,
}

impl ViewerLink {
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        ViewerLink {
            entity_type,
            id: id.into(),
        }
    }

    pub fn href(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("type", self.entity_type.as_str())
            .append_pair("id", &self.id)
            .finish();
        format!("{VIEWER_PAGE}?{query}")
    }

    /// `<a href=... target="_blank">label</a>` with the label escaped.
    pub fn anchor(&self, label: &str) -> String {
        format!(
            "<a href=\"{}\" target=\"_blank\">{}</a>",
            escape(&self.href()),
            escape(label)
        )
    }
}

impl Display for ViewerLink {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.href())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_markdown_neutralizes_raw_html() {
        let mut html = String::new();
        markdown_to_html("**bold** <script>alert(1)</script>", &mut html).unwrap();
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_viewer_link_encodes_id() {
        let link = ViewerLink::new(EntityType::Author, "a b&c");
        assert_eq!(link.href(), "viewer.html?type=Author&id=a+b%26c");
        assert_eq!(
            link.anchor("Jane"),
            "<a href=\"viewer.html?type=Author&amp;id=a+b%26c\" target=\"_blank\">Jane</a>"
        );
    }
}
