use tracing::debug;

use crate::ImportError;

const GITHUB_MARKER: &str = "github.com/";
const BLOB_SEGMENT: &str = "/blob/";

/// Normalizes a user-supplied IRMF reference into a fetchable raw-content
/// URL. Three shapes are accepted:
///
/// - `https://gmlewis.github.io/irmf-editor/?s=github.com/<owner>/<repo>/blob/<path>`
/// - `https://github.com/<owner>/<repo>/blob/<path>`
/// - `https://raw.githubusercontent.com/<owner>/<repo>/<path>`
///
/// The first two rewrite to the third; anything else is rejected.
pub fn resolve_raw_url(reference: &str) -> Result<String, ImportError> {
    let trimmed = reference.trim();
    if let Some(start) = trimmed.find(GITHUB_MARKER) {
        let suffix = &trimmed[start + GITHUB_MARKER.len()..];
        let mut url = format!("https://{}/{}", crate::RAW_HOST, suffix);
        if let Some(blob) = url.find(BLOB_SEGMENT) {
            url.replace_range(blob..blob + BLOB_SEGMENT.len(), "/");
        }
        debug!(reference = %trimmed, resolved = %url, "rewrote reference to raw-content url");
        return Ok(url);
    }
    if trimmed.contains(crate::RAW_HOST) {
        debug!(reference = %trimmed, "reference already names the raw-content host");
        return Ok(trimmed.to_string());
    }
    Err(ImportError::UnsupportedSource(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_blob_url() {
        let url = resolve_raw_url("https://github.com/gmlewis/irmf/blob/master/examples/001-sphere/sphere-1.irmf")
            .unwrap();
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/gmlewis/irmf/master/examples/001-sphere/sphere-1.irmf"
        );
    }

    #[test]
    fn rewrites_editor_deep_link() {
        let url = resolve_raw_url(
            "https://gmlewis.github.io/irmf-editor/?s=github.com/gmlewis/irmf/blob/master/examples/001-sphere/sphere-1.irmf",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/gmlewis/irmf/master/examples/001-sphere/sphere-1.irmf"
        );
    }

    #[test]
    fn passes_raw_url_through() {
        let raw = "https://raw.githubusercontent.com/gmlewis/irmf/master/examples/001-sphere/sphere-1.irmf";
        assert_eq!(resolve_raw_url(raw).unwrap(), raw);
    }

    #[test]
    fn rejects_unknown_hosts() {
        let err = resolve_raw_url("https://example.com/shader.irmf").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedSource(_)));
    }

    #[test]
    fn replaces_only_the_first_blob_segment() {
        let url = resolve_raw_url("https://github.com/owner/repo/blob/main/blob/model.irmf").unwrap();
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/owner/repo/main/blob/model.irmf"
        );
    }
}
