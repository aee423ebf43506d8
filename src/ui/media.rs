/// Image source helpers
use std::path::PathBuf;

/// Resolve a `file://` URL or a plain filesystem path to a local path.
/// Remote URLs return `None`; the shell has no HTTP client.
pub fn local_path(src: &str) -> Option<PathBuf> {
    if let Some(rest) = src.strip_prefix("file://") {
        // file:///C:/x on Windows keeps a leading slash we don't want
        let rest = match rest.as_bytes() {
            [b'/', _, b':', ..] => &rest[1..],
            _ => rest,
        };
        return Some(PathBuf::from(rest));
    }
    if src.contains("://") {
        return None;
    }
    Some(PathBuf::from(src))
}
