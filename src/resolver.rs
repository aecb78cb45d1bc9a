//! Maps a request path onto the served directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::content_type::content_type;
use crate::error::{Result, ServeError};
use crate::listing::{self, Listing};
use crate::logging::LoggingExt;
use crate::request::RequestPath;

const INDEX_FILE: &str = "index.html";

/// How many times a directory may be swapped for its index file.
const MAX_INDEX_DEPTH: usize = 1;

#[derive(Debug)]
pub enum ResolvedTarget {
    File {
        content: Vec<u8>,
        content_type: &'static str,
    },
    Listing(Listing),
    NotFound,
}

impl ResolvedTarget {
    /// Final body and content type, rendering listings to HTML.
    pub fn into_body(self) -> Result<(Vec<u8>, &'static str)> {
        match self {
            ResolvedTarget::File {
                content,
                content_type,
            } => Ok((content, content_type)),
            ResolvedTarget::Listing(listing) => Ok((listing.render()?, "text/html")),
            ResolvedTarget::NotFound => Err(ServeError::NotFound("invalid path".to_string())),
        }
    }
}

/// Resolves `path` below `root`. `root` must already be canonical.
///
/// Containment is checked and content is read on the canonical path, while
/// the content type follows the path as requested so symlinks keep the
/// extension of their link name.
pub fn resolve(root: &Path, path: &RequestPath) -> Result<ResolvedTarget> {
    let mut requested = path.join_onto(root);
    let mut candidate = match contained(root, &requested) {
        Some(p) => p,
        None => return Ok(ResolvedTarget::NotFound),
    };

    for depth in 0..=MAX_INDEX_DEPTH {
        let metadata = match fs::metadata(&candidate) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot stat {}: {}", candidate.display(), e);
                return Ok(ResolvedTarget::NotFound);
            }
        };

        if metadata.is_file() {
            let content = candidate
                .as_path()
                .log_operation("read", || fs::read(&candidate))
                .map_err(|e| ServeError::NotFound(e.to_string()))?;
            return Ok(ResolvedTarget::File {
                content,
                content_type: content_type(&requested),
            });
        }

        if !metadata.is_dir() {
            log::warn!(
                "Path exists but is neither file nor directory: {}",
                candidate.display()
            );
            return Ok(ResolvedTarget::NotFound);
        }

        if depth < MAX_INDEX_DEPTH {
            if let Some(index) = index_file(root, &candidate) {
                log::debug!("Serving {} for /{}", index.display(), path.site_path());
                requested.push(INDEX_FILE);
                candidate = index;
                continue;
            }
        }

        let listing = listing::list_directory(&candidate, path)?;
        return Ok(ResolvedTarget::Listing(listing));
    }

    Ok(ResolvedTarget::NotFound)
}

/// `index.html` inside `directory`, when it is a regular file within `root`.
fn index_file(root: &Path, directory: &Path) -> Option<PathBuf> {
    let index = contained(root, &directory.join(INDEX_FILE))?;
    let is_file = fs::metadata(&index).map(|m| m.is_file()).unwrap_or(false);
    is_file.then_some(index)
}

/// Canonical form of `path`, or `None` when it leaves `root`. Paths that
/// cannot be canonicalized are returned as given so the caller reports them
/// as missing.
fn contained(root: &Path, path: &Path) -> Option<PathBuf> {
    match fs::canonicalize(path) {
        Ok(canonical) if canonical.starts_with(root) => Some(canonical),
        Ok(canonical) => {
            log::warn!("Path escapes root directory: {}", canonical.display());
            None
        }
        Err(e) => {
            log::debug!("Failed to canonicalize {}: {}", path.display(), e);
            path.starts_with(root).then(|| path.to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(tmp.path()).unwrap();
        fs::write(root.join("a.css"), "body{}").unwrap();
        fs::create_dir(root.join("site")).unwrap();
        fs::write(root.join("site/index.html"), "<p>home</p>").unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        (tmp, root)
    }

    fn resolve_str(root: &Path, target: &str) -> ResolvedTarget {
        resolve(root, &RequestPath::parse(target).unwrap()).unwrap()
    }

    #[test]
    fn regular_file() {
        let (_tmp, root) = setup();
        match resolve_str(&root, "/a.css") {
            ResolvedTarget::File {
                content,
                content_type,
            } => {
                assert_eq!(content, b"body{}");
                assert_eq!(content_type, "text/css");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn directory_with_index_serves_index() {
        let (_tmp, root) = setup();
        let (dir_body, dir_type) = resolve_str(&root, "/site/").into_body().unwrap();
        let (index_body, index_type) = resolve_str(&root, "/site/index.html").into_body().unwrap();
        assert_eq!(dir_body, index_body);
        assert_eq!(dir_type, "text/html");
        assert_eq!(dir_type, index_type);
    }

    #[test]
    fn directory_without_index_lists() {
        let (_tmp, root) = setup();
        match resolve_str(&root, "/") {
            ResolvedTarget::Listing(listing) => {
                assert_eq!(listing.site_path, "");
                let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
                assert_eq!(names, ["a.css", "empty", "site"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn index_directory_is_listed_not_followed() {
        let (_tmp, root) = setup();
        fs::create_dir_all(root.join("odd/index.html")).unwrap();
        match resolve_str(&root, "/odd") {
            ResolvedTarget::Listing(listing) => {
                assert_eq!(listing.entries.len(), 1);
                assert!(listing.entries[0].is_dir);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_directory_listing() {
        let (_tmp, root) = setup();
        let (body, content_type) = resolve_str(&root, "/empty/").into_body().unwrap();
        assert_eq!(content_type, "text/html");
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("<ul>\n</ul>"));
    }

    #[test]
    fn missing_path() {
        let (_tmp, root) = setup();
        assert!(matches!(
            resolve_str(&root, "/nope.txt"),
            ResolvedTarget::NotFound
        ));
        assert!(matches!(
            resolve_str(&root, "/a.css/child"),
            ResolvedTarget::NotFound
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_not_found() {
        let (_tmp, root) = setup();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.join("leak.txt"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("leakdir")).unwrap();

        assert!(matches!(
            resolve_str(&root, "/leak.txt"),
            ResolvedTarget::NotFound
        ));
        assert!(matches!(
            resolve_str(&root, "/leakdir/secret.txt"),
            ResolvedTarget::NotFound
        ));
    }

    #[cfg(unix)]
    #[test]
    fn index_symlink_out_of_root_falls_back_to_listing() {
        let (_tmp, root) = setup();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("index.html"), "secret").unwrap();
        fs::create_dir(root.join("trap")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("index.html"),
            root.join("trap/index.html"),
        )
        .unwrap();

        assert!(matches!(
            resolve_str(&root, "/trap"),
            ResolvedTarget::Listing(_)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_keep_requested_content_type() {
        let (_tmp, root) = setup();
        fs::create_dir(root.join("build")).unwrap();
        fs::write(root.join("build/style.8f3a"), "p{}").unwrap();
        fs::write(root.join("build/home"), "<p>built</p>").unwrap();
        std::os::unix::fs::symlink(root.join("build/style.8f3a"), root.join("style.css"))
            .unwrap();
        fs::create_dir(root.join("app")).unwrap();
        std::os::unix::fs::symlink(root.join("build/home"), root.join("app/index.html"))
            .unwrap();

        let (body, content_type) = resolve_str(&root, "/style.css").into_body().unwrap();
        assert_eq!(body, b"p{}");
        assert_eq!(content_type, "text/css");

        let (body, content_type) = resolve_str(&root, "/app/").into_body().unwrap();
        assert_eq!(body, b"<p>built</p>");
        assert_eq!(content_type, "text/html");

        let (_, content_type) = resolve_str(&root, "/build/style.8f3a").into_body().unwrap();
        assert_eq!(content_type, "text/plain");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_names_resolve() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_tmp, root) = setup();
        fs::write(root.join(OsStr::from_bytes(b"caf\xe9.css")), "a{}").unwrap();

        let (body, content_type) = resolve_str(&root, "/caf%E9.css").into_body().unwrap();
        assert_eq!(body, b"a{}");
        assert_eq!(content_type, "text/css");
    }

    #[test]
    fn not_found_target_becomes_error() {
        let err = ResolvedTarget::NotFound.into_body().unwrap_err();
        assert_eq!(err.to_string(), "invalid path");
    }
}
