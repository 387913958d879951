//! String formats shared by UI rule evaluation and authoritative validation

use std::sync::OnceLock;

use regex::Regex;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile")
    })
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^https?://[^\s/?#@]+(?:[/?#]\S*)?$").expect("url regex must compile")
    })
}

pub fn is_email(s: &str) -> bool {
    email_re().is_match(s)
}

/// Absolute http(s) URL with a host.
pub fn is_url(s: &str) -> bool {
    url_re().is_match(s)
}

/// Unicode scalar count; what "characters" means in length bounds.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
