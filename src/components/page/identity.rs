use super::Document;
use crate::error::{config_error, Error, OotoResult};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

/// Account manager slot holding the signed-in email
const EMAIL_SLOT: &str = "#mectrl_currentAccount_secondary";
/// Account manager slots holding the display name
const NAME_SLOT: &str = "#mectrl_currentAccount_primary, .mectrl_name";

/// Longest span text still considered a bare email address
const MAX_SPAN_EMAIL_LEN: usize = 50;

/// Name used when nothing on the page yields one
pub const FALLBACK_NAME: &str = "User";

lazy_static! {
    // "Surname, Given"
    static ref NAME_PATTERN: Regex = Regex::new(r"^[A-Z][a-z]+,\s[A-Z][a-z]+$").unwrap();
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+$").unwrap();
}

/// Who is setting the OOTO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub email: String,
}

/// Recovers the acting user's name and email from page content
#[derive(Debug, Clone)]
pub struct IdentityExtractor {
    span_email: Regex,
    page_email: Regex,
}

impl IdentityExtractor {
    /// Build an extractor for addresses in `org_domain`
    pub fn new(org_domain: &str) -> OotoResult<Self> {
        let domain = regex::escape(org_domain.trim());
        let span_email = Regex::new(&format!(r"^[A-Za-z0-9._%+-]+@{}$", domain))
            .map_err(|e| config_error(&format!("Invalid organization domain: {}", e)))?;
        let page_email = Regex::new(&format!(r"([A-Za-z0-9._-]+@{})", domain))
            .map_err(|e| config_error(&format!("Invalid organization domain: {}", e)))?;
        Ok(Self {
            span_email,
            page_email,
        })
    }

    /// Email address of the signed-in user
    pub fn extract_email(&self, doc: &dyn Document) -> OotoResult<String> {
        // Account manager slot
        if let Some(el) = doc.query_selector(EMAIL_SLOT) {
            let text = el.text_content();
            if EMAIL_SHAPE.is_match(text) {
                return Ok(text.to_string());
            }
        }

        // Short spans holding only an organization address
        for span in doc.query_all("span") {
            let text = span.text_content();
            if text.len() < MAX_SPAN_EMAIL_LEN && self.span_email.is_match(text) {
                info!("Found email in span: {}", text);
                return Ok(text.to_string());
            }
        }

        // Anywhere in the markup
        if let Some(captures) = self.page_email.captures(&doc.inner_html()) {
            let email = captures[1].to_string();
            info!("Found email in HTML: {}", email);
            return Ok(email);
        }

        Err(Error::EmailNotFound)
    }

    /// Display name of the signed-in user; never fails
    pub fn extract_name(&self, doc: &dyn Document) -> String {
        self.name_from_page(doc).unwrap_or_else(|| match self.extract_email(doc) {
            Ok(email) => name_from_email(&email),
            Err(_) => FALLBACK_NAME.to_string(),
        })
    }

    /// Name and email, reading the page once per field
    pub fn extract_identity(&self, doc: &dyn Document) -> OotoResult<Identity> {
        let email = self.extract_email(doc)?;
        let display_name = self
            .name_from_page(doc)
            .unwrap_or_else(|| name_from_email(&email));
        info!("Retrieved user info: {} <{}>", display_name, email);
        Ok(Identity {
            display_name,
            email,
        })
    }

    fn name_from_page(&self, doc: &dyn Document) -> Option<String> {
        if let Some(el) = doc.query_selector(NAME_SLOT) {
            let text = el.text_content();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }

        let found = doc
            .query_all("div")
            .into_iter()
            .map(|div| div.text_content().to_string())
            .find(|text| NAME_PATTERN.is_match(text));
        if let Some(name) = &found {
            info!("Found name in div: {}", name);
        }
        found
    }
}

/// `jane.doe@org.example` -> `Jane.doe`
fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => FALLBACK_NAME.to_string(),
    };
    debug!("Derived name from email: {}", name);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::page::HtmlDocument;

    fn extractor() -> IdentityExtractor {
        IdentityExtractor::new("org.example").unwrap()
    }

    #[test]
    fn test_email_slot_has_priority() {
        let doc = HtmlDocument::parse(
            r#"<body>
                <span>other.person@org.example</span>
                <div id="mectrl_currentAccount_secondary"> jane.doe@org.example </div>
                <p>someone.else@org.example</p>
            </body>"#,
        );
        assert_eq!(extractor().extract_email(&doc).unwrap(), "jane.doe@org.example");
    }

    #[test]
    fn test_email_from_short_span() {
        let doc = HtmlDocument::parse(
            r#"<body>
                <span>jane.doe@elsewhere.example</span>
                <span>Contact: a-very-long-prefix-that-pushes-it-over-the-limit@org.example</span>
                <span> jdoe@org.example </span>
            </body>"#,
        );
        assert_eq!(extractor().extract_email(&doc).unwrap(), "jdoe@org.example");
    }

    #[test]
    fn test_email_from_markup() {
        let doc = HtmlDocument::parse(
            r#"<body><a href="mailto:jdoe@org.example" title="profile">Profile</a></body>"#,
        );
        assert_eq!(extractor().extract_email(&doc).unwrap(), "jdoe@org.example");
    }

    #[test]
    fn test_email_not_found() {
        let doc = HtmlDocument::parse("<body><span>nobody@elsewhere.example</span></body>");
        assert!(matches!(
            extractor().extract_email(&doc),
            Err(Error::EmailNotFound)
        ));
    }

    #[test]
    fn test_slot_without_email_shape_is_ignored() {
        let doc = HtmlDocument::parse(
            r#"<body><div id="mectrl_currentAccount_secondary">Signed in</div>
               <span>jdoe@org.example</span></body>"#,
        );
        assert_eq!(extractor().extract_email(&doc).unwrap(), "jdoe@org.example");
    }

    #[test]
    fn test_name_strategies() {
        let slot = HtmlDocument::parse(
            r#"<body><div class="mectrl_name">Jane Doe</div><div>Doe, John</div></body>"#,
        );
        assert_eq!(extractor().extract_name(&slot), "Jane Doe");

        let pattern = HtmlDocument::parse(
            r#"<body><div><div>Inbox</div><div>Doe, Jane</div></div></body>"#,
        );
        assert_eq!(extractor().extract_name(&pattern), "Doe, Jane");

        let from_email = HtmlDocument::parse("<body><span>jane.doe@org.example</span></body>");
        assert_eq!(extractor().extract_name(&from_email), "Jane.doe");

        let nothing = HtmlDocument::parse("<body><p>Loading</p></body>");
        assert_eq!(extractor().extract_name(&nothing), FALLBACK_NAME);
    }

    #[test]
    fn test_extract_identity() {
        let doc = HtmlDocument::parse(
            r#"<body>
                <div id="mectrl_currentAccount_primary">Doe, Jane</div>
                <div id="mectrl_currentAccount_secondary">jane.doe@org.example</div>
            </body>"#,
        );
        let identity = extractor().extract_identity(&doc).unwrap();
        assert_eq!(identity.display_name, "Doe, Jane");
        assert_eq!(identity.email, "jane.doe@org.example");

        let empty = HtmlDocument::parse("<body></body>");
        assert!(matches!(
            extractor().extract_identity(&empty),
            Err(Error::EmailNotFound)
        ));
    }
}
