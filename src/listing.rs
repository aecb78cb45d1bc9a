//! HTML index pages for directories without an `index.html`.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::error::{Result, ServeError};
use crate::logging::LoggingExt;
use crate::request::{encode_segment, RequestPath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name as displayed; lossy for names that are not UTF-8
    pub name: String,
    /// Percent-encoded URL of the entry: the listed directory's site path
    /// followed by the raw file name
    pub href: String,
    pub is_dir: bool,
}

/// Immediate entries of one directory, ready to be rendered.
#[derive(Debug)]
pub struct Listing {
    pub site_path: String,
    pub entries: Vec<DirEntry>,
}

impl Listing {
    pub fn render(&self) -> Result<Vec<u8>> {
        let title = encode_text(&self.site_path);
        let mut html = String::new();
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html>")?;
        writeln!(
            html,
            "<head><meta charset=\"utf-8\"><title>Index of /{}</title></head>",
            title
        )?;
        writeln!(html, "<body>")?;
        writeln!(html, "<h1>Index of /{}</h1>", title)?;
        writeln!(html, "<ul>")?;
        for entry in &self.entries {
            let suffix = if entry.is_dir { "/" } else { "" };
            writeln!(
                html,
                "<li><a href=\"{}\">{}{}</a></li>",
                encode_double_quoted_attribute(&entry.href),
                encode_text(&entry.name),
                suffix
            )?;
        }
        writeln!(html, "</ul>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;
        Ok(html.into_bytes())
    }
}

/// Reads the immediate children of `directory`, sorted by name. Links are
/// built below `site`, the request path the directory was reached through.
pub fn list_directory(directory: &Path, site: &RequestPath) -> Result<Listing> {
    let reader = directory
        .log_operation("read_dir", || fs::read_dir(directory))
        .map_err(|e| ServeError::NotFound(e.to_string()))?;

    let site_path = site.site_path();
    let parent_href = site.dir_href();
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| ServeError::NotFound(e.to_string()))?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let file_name = entry.file_name();

        let mut href = format!("{}{}", parent_href, encode_segment(&file_name));
        if is_dir {
            href.push('/');
        }
        entries.push(DirEntry {
            name: file_name.to_string_lossy().into_owned(),
            href,
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    log::debug!(
        "Listing {} entries of {}",
        entries.len(),
        directory.display()
    );
    Ok(Listing { site_path, entries })
}
