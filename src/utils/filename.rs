//! Download filename helpers for `Content-Disposition`

use lazy_static::lazy_static;
use regex::Regex;

use super::url::url_encode;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[\\/:*?"<>|]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref UNDERSCORES: Regex = Regex::new(r"_+").unwrap();
}

/// Name used when nothing of the site name survives sanitizing
pub const FALLBACK_FILENAME: &str = "subscription";

/// Makes a site name safe to use as a filename.
///
/// Strips `\/:*?"<>|` and collapses whitespace runs to a single `_`.
/// Non-ASCII characters, emoji included, are kept.
pub fn sanitize_filename(name: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(name.trim(), "");
    WHITESPACE.replace_all(stripped.trim(), "_").into_owned()
}

/// ASCII-only form of a sanitized filename, for the plain `filename=` parameter
pub fn ascii_filename(sanitized: &str) -> String {
    let ascii: String = sanitized.chars().filter(|c| c.is_ascii()).collect();
    let collapsed = UNDERSCORES.replace_all(&ascii, "_");
    let trimmed = collapsed.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Full `Content-Disposition` value for a download called `filename`.
///
/// `filename` must already be sanitized. Names containing non-ASCII characters
/// get an ASCII fallback plus an RFC 5987 `filename*` parameter.
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        format!("attachment; filename={}", filename)
    } else {
        let fallback = match filename.rsplit_once('.') {
            Some((stem, ext)) if ext.is_ascii() && !ext.is_empty() => {
                format!("{}.{}", ascii_filename(stem), ext)
            }
            _ => ascii_filename(filename),
        };
        format!(
            "attachment; filename={}; filename*=UTF-8''{}",
            fallback,
            url_encode(filename)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::url::url_decode;

    #[test]
    fn test_sanitize_strips_and_collapses() {
        assert_eq!(sanitize_filename(r#"My: Site / "VPN"?"#), "My_Site_VPN");
        assert_eq!(sanitize_filename("  a \t b  "), "a_b");
        assert_eq!(sanitize_filename("🚀 极速云"), "🚀_极速云");
    }

    #[test]
    fn test_ascii_fallback() {
        assert_eq!(ascii_filename("🚀_极速云"), FALLBACK_FILENAME);
        assert_eq!(ascii_filename("极速_Cloud"), "Cloud");
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("MySite.yaml"),
            "attachment; filename=MySite.yaml"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii_round_trip() {
        let name = format!("{}.yaml", sanitize_filename("🚀 极速云 Pro"));
        let header = content_disposition(&name);
        let (plain, extended) = header.split_once("; filename*=UTF-8''").unwrap();
        assert!(plain.is_ascii());
        assert_eq!(plain, "attachment; filename=Pro.yaml");
        assert_eq!(url_decode(extended), "🚀_极速云_Pro.yaml");
    }
}
