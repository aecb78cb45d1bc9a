#[cfg(unix)]
use percent_encoding::percent_encode;
#[cfg(not(unix))]
use percent_encoding::utf8_percent_encode;
use percent_encoding::{percent_decode_str, AsciiSet, CONTROLS};
use std::ffi::{OsStr, OsString};
use std::io::{self, BufRead};
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, ServeError};

/// Request line and headers of an incoming HTTP/1.x request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Reads the request head. `Ok(None)` means the peer closed the
    /// connection before sending anything.
    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Option<Request>> {
        let mut first_line = String::new();
        if reader.read_line(&mut first_line)? == 0 {
            return Ok(None);
        }
        log::debug!("Request line: {}", first_line.trim());

        let mut parts = first_line.split_whitespace();
        let (method, target) = match (parts.next(), parts.next()) {
            (Some(method), Some(target)) => (method.to_string(), target.to_string()),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("malformed request line: {}", first_line.trim()),
                ))
            }
        };

        let mut headers = Vec::new();
        let mut line = String::new();
        while {
            line.clear();
            reader.read_line(&mut line)? > 0 && !line.trim().is_empty()
        } {
            log::trace!("Header line: {}", line.trim());
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Ok(Some(Request {
            method,
            target,
            headers,
        }))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Characters escaped when a file name is placed in a URL path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Decoded URL path as a list of plain segments. The root is the empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<OsString>,
}

impl RequestPath {
    /// Parses a request target such as `/docs/a%20b.html?x=1` or
    /// `http://host/docs/`.
    ///
    /// Query and fragment are dropped, the path is percent-decoded and split
    /// on `/`. Empty and `.` segments are skipped. A `..` segment, or one that
    /// does not name a single plain file name, is refused.
    pub fn parse(target: &str) -> Result<Self> {
        let target = strip_origin(target);
        let path = target.split(['?', '#']).next().unwrap_or(target);
        if !path.starts_with('/') {
            return Err(ServeError::BadRequest(format!(
                "request target must start with '/': {}",
                target
            )));
        }

        let decoded: Vec<u8> = percent_decode_str(path).collect();

        let mut segments = Vec::new();
        for segment in decoded.split(|b| *b == b'/').skip(1) {
            if segment.is_empty() || segment == b"." {
                continue;
            }
            let segment = os_segment(segment)?;
            if !is_plain_segment(&segment) {
                log::warn!("Refusing path segment {:?} in {}", segment, path);
                return Err(ServeError::NotFound("invalid path".to_string()));
            }
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[OsString] {
        &self.segments
    }

    /// Readable form of the path without the leading slash, e.g. `docs/api`.
    pub fn site_path(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Percent-encoded absolute URL path ending in `/`, e.g. `/docs/my%20api/`.
    pub fn dir_href(&self) -> String {
        let mut href = String::from("/");
        for segment in &self.segments {
            href.push_str(&encode_segment(segment));
            href.push('/');
        }
        href
    }

    pub fn join_onto(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(self.segments());
        path
    }
}

/// Drops `scheme://authority` from an absolute-form request target.
fn strip_origin(target: &str) -> &str {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return target;
    }
    let after_scheme = &target[target.find("://").map_or(0, |i| i + 3)..];
    match after_scheme.find(['/', '?', '#']) {
        Some(i) if after_scheme[i..].starts_with('/') => &after_scheme[i..],
        _ => "/",
    }
}

/// Percent-encodes one file name. Raw bytes are kept on unix so names that
/// are not UTF-8 still round-trip through [`RequestPath::parse`].
pub fn encode_segment(name: &OsStr) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        percent_encode(name.as_bytes(), PATH_SEGMENT).to_string()
    }
    #[cfg(not(unix))]
    {
        utf8_percent_encode(&name.to_string_lossy(), PATH_SEGMENT).to_string()
    }
}

#[cfg(unix)]
fn os_segment(bytes: &[u8]) -> Result<OsString> {
    use std::os::unix::ffi::OsStrExt;
    Ok(OsStr::from_bytes(bytes).to_os_string())
}

#[cfg(not(unix))]
fn os_segment(bytes: &[u8]) -> Result<OsString> {
    String::from_utf8(bytes.to_vec())
        .map(OsString::from)
        .map_err(|e| ServeError::BadRequest(format!("invalid path encoding: {}", e)))
}

fn is_plain_segment(segment: &OsStr) -> bool {
    if segment.to_string_lossy().contains(['\\', '\0']) {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
