//! Data-URI handling for uploaded images
//!
//! The browser sends images as `data:image/<type>;base64,<payload>`. The
//! provider wants the bare payload plus a MIME type.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::llm::Part;

static DATA_URI_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/[a-z]+;base64,").expect("static data-URI pattern"));

/// MIME type used when the prefix names no recognised image type
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Infer the image MIME type from a data URI prefix
///
/// Recognises png, jpeg and webp; everything else is treated as jpeg.
pub fn mime_type(data_uri: &str) -> &'static str {
    let mime = if data_uri.starts_with("data:image/png") {
        "image/png"
    } else if data_uri.starts_with("data:image/jpeg") {
        "image/jpeg"
    } else if data_uri.starts_with("data:image/webp") {
        "image/webp"
    } else {
        DEFAULT_MIME_TYPE
    };
    debug!(%mime, "mime_type: inferred");
    mime
}

/// Remove a leading `data:image/<type>;base64,` prefix
///
/// Input without the prefix is returned unchanged.
pub fn strip_prefix(data_uri: &str) -> &str {
    match DATA_URI_PREFIX.find(data_uri) {
        Some(m) => &data_uri[m.end()..],
        None => data_uri,
    }
}

/// Build a provider inline-data part from a data URI
pub fn inline_part(data_uri: &str) -> Part {
    Part::inline(mime_type(data_uri), strip_prefix(data_uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_png_data_uri() {
        let uri = "data:image/png;base64,QQ==";
        assert_eq!(mime_type(uri), "image/png");
        assert_eq!(strip_prefix(uri), "QQ==");
    }

    #[test]
    fn test_jpeg_and_webp() {
        assert_eq!(mime_type("data:image/jpeg;base64,/9j/"), "image/jpeg");
        assert_eq!(mime_type("data:image/webp;base64,UklG"), "image/webp");
        assert_eq!(strip_prefix("data:image/webp;base64,UklG"), "UklG");
    }

    #[test]
    fn test_unknown_type_defaults_to_jpeg() {
        let uri = "data:image/gif;base64,R0lG";
        assert_eq!(mime_type(uri), "image/jpeg");
        assert_eq!(strip_prefix(uri), "R0lG");
    }

    #[test]
    fn test_bare_payload_unchanged() {
        assert_eq!(mime_type("QQ=="), "image/jpeg");
        assert_eq!(strip_prefix("QQ=="), "QQ==");
    }

    #[test]
    fn test_non_letter_subtype_not_stripped() {
        // svg+xml contains '+', which the prefix pattern does not accept
        let uri = "data:image/svg+xml;base64,PHN2";
        assert_eq!(strip_prefix(uri), uri);
    }

    #[test]
    fn test_inline_part() {
        let part = inline_part("data:image/png;base64,QQ==");
        assert_eq!(part, Part::inline("image/png", "QQ=="));
    }

    proptest! {
        #[test]
        fn prop_strip_recovers_payload(kind in "(png|jpeg|webp|gif|heic)", payload in "[A-Za-z0-9+/]{0,64}={0,2}") {
            let uri = format!("data:image/{};base64,{}", kind, payload);
            prop_assert_eq!(strip_prefix(&uri), payload.as_str());
        }

        #[test]
        fn prop_mime_is_always_an_image_type(input in ".{0,40}") {
            let mime = mime_type(&input);
            prop_assert!(["image/png", "image/jpeg", "image/webp"].contains(&mime));
        }
    }
}
