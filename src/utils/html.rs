use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Editable text for an HTML body: line breaks dropped, tags stripped, `&nbsp;` expanded
pub fn to_plain_text(html: &str) -> String {
    let without_breaks = html.replace("<br>", "");
    TAG.replace_all(&without_breaks, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// HTML body for edited text: every line trimmed, lines joined with `<br>`
pub fn from_plain_text(text: &str) -> String {
    text.split('\n')
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("<br>")
}
