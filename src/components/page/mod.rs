pub mod identity;

pub use identity::{Identity, IdentityExtractor, FALLBACK_NAME};

use scraper::{Html, Selector};
use tracing::warn;

/// An element returned from a document query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    text: String,
}

impl Element {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Text content with surrounding whitespace removed
    pub fn text_content(&self) -> &str {
        self.text.trim()
    }
}

/// Read-only view of the Outlook page
pub trait Document {
    /// First element matching `selector`
    fn query_selector(&self, selector: &str) -> Option<Element>;

    /// Every element matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<Element>;

    /// Serialized markup of the page body
    fn inner_html(&self) -> String;
}

/// A saved Outlook page parsed with `scraper`
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    fn selector(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring invalid selector '{}': {:?}", selector, e);
                None
            }
        }
    }
}

impl Document for HtmlDocument {
    fn query_selector(&self, selector: &str) -> Option<Element> {
        let selector = Self::selector(selector)?;
        self.html
            .select(&selector)
            .next()
            .map(|el| Element::new(el.text().collect::<String>()))
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Some(selector) = Self::selector(selector) else {
            return Vec::new();
        };
        self.html
            .select(&selector)
            .map(|el| Element::new(el.text().collect::<String>()))
            .collect()
    }

    fn inner_html(&self) -> String {
        Self::selector("body")
            .and_then(|body| self.html.select(&body).next().map(|el| el.inner_html()))
            .unwrap_or_else(|| self.html.html())
    }
}
