//! Clean-up helpers for catalogue metadata: service URLs, keyword lists and
//! technical description pages.

pub mod html;

use url::Url;

pub use html::html_to_text;

/// Boilerplate keywords carried by nearly every dataset of the portal.
pub const KEYWORDS_TO_REMOVE: &[&str] = &[
    "berlin",
    "geodaten",
    "opendata",
    "open data",
    "karten",
    "umweltatlas",
    "infofeatureaccessservice",
    "infomapaccessservice",
    "features",
    "sachdaten",
];

/// Drops query string and fragment, keeping scheme, host and path.
pub fn strip_query(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        // 非絕對 URL 直接在第一個 ? 或 # 截斷
        Err(_) => raw.split(['?', '#']).next().unwrap_or(raw).to_string(),
    }
}

/// Lower-cases and trims keywords, dropping blanks, `None`s and boilerplate.
pub fn clean_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .flatten()
        .map(|keyword| keyword.as_ref().trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty() && !KEYWORDS_TO_REMOVE.contains(&keyword.as_str()))
        .collect()
}
