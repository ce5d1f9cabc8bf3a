//! File extension to media type table used for static resources.

use mime::Mime;

/// Media type for a file extension given with its leading dot, e.g. `".html"`.
///
/// The lookup ignores ASCII case. Unknown extensions, and extensions without the dot,
/// yield `None`.
pub fn lookup(extension: &str) -> Option<Mime> {
    let extension = extension.strip_prefix('.')?.to_ascii_lowercase();

    let mime = match extension.as_str() {
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS_UTF_8,
        "js" | "mjs" => mime::APPLICATION_JAVASCRIPT_UTF_8,
        "json" => mime::APPLICATION_JSON,
        "txt" | "log" => mime::TEXT_PLAIN_UTF_8,
        "csv" => mime::TEXT_CSV_UTF_8,
        "xml" => mime::TEXT_XML,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "pdf" => mime::APPLICATION_PDF,
        "woff" => mime::FONT_WOFF,
        "woff2" => mime::FONT_WOFF2,
        "bin" => mime::APPLICATION_OCTET_STREAM,
        other => return extra(other),
    };

    Some(mime)
}

/// Types the `mime` crate has no constant for.
fn extra(extension: &str) -> Option<Mime> {
    let essence = match extension {
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "wasm" => "application/wasm",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "ttf" => "font/ttf",
        _ => return None,
    };

    essence.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(lookup(".html"), Some(mime::TEXT_HTML_UTF_8));
        assert_eq!(lookup(".png").unwrap().essence_str(), "image/png");
        assert_eq!(lookup(".wasm").unwrap().essence_str(), "application/wasm");
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(lookup(".HTML"), lookup(".html"));
        assert_eq!(lookup(".JpEg").unwrap().essence_str(), "image/jpeg");
    }

    #[test]
    fn unknown_or_malformed() {
        assert_eq!(lookup(".exe"), None);
        assert_eq!(lookup("html"), None);
        assert_eq!(lookup("."), None);
        assert_eq!(lookup(""), None);
    }
}
