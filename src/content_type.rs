use std::path::Path;

/// Maps the text after the last `.` of `path` to a MIME type.
pub fn content_type(path: &Path) -> &'static str {
    let path = path.to_string_lossy();
    let extension = match path.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return "text/plain",
    };

    match extension.to_ascii_lowercase().as_str() {
        "css" => "text/css",
        "js" => "text/javascript",
        "html" => "text/html",
        _ => "text/plain",
    }
}
