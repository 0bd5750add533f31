//! Attachment materializer: decode inline `data:` URIs to the shared
//! attachment store and produce a bounded preview block for prompting.

use crate::types::AttachmentRef;
use crate::workspace::validate_filename;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-attachment excerpt length for textual previews.
const PREVIEW_CHARS: usize = 1000;
/// First rows shown for tabular files.
const CSV_PREVIEW_ROWS: usize = 3;
/// Upper bound on the whole preview block so it cannot dominate a prompt.
const PREVIEW_TOTAL_CAP: usize = 4000;

/// A decoded attachment on local storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAttachment {
    pub name: String,
    pub path: PathBuf,
    pub mime: String,
    pub size: u64,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode every inline attachment into `dir`.
///
/// Entries whose source is not a `data:` URI are skipped with a warning, and
/// a failure on one entry never aborts the rest. Name collisions get a
/// `_N` suffix counter rather than overwriting.
pub fn materialize(attachments: &[AttachmentRef], dir: &Path) -> Vec<StoredAttachment> {
    if attachments.is_empty() {
        return Vec::new();
    }
    if let Err(err) = crate::io::ensure_dir(dir) {
        warn!(%err, dir = %dir.display(), "cannot create attachment store");
        return Vec::new();
    }

    let mut stored = Vec::new();
    for att in attachments {
        match materialize_one(att, dir) {
            Ok(item) => {
                debug!(name = %item.name, size = item.size, "decoded attachment");
                stored.push(item);
            }
            Err(reason) => warn!(name = %att.name, %reason, "skipping attachment"),
        }
    }
    stored
}

fn materialize_one(att: &AttachmentRef, dir: &Path) -> std::result::Result<StoredAttachment, String> {
    let (mime, data) = decode_data_url(&att.url).ok_or("not an inline data: URL")?;
    let name = if att.name.is_empty() { "attachment" } else { &att.name };
    validate_filename(name).map_err(|e| e.to_string())?;

    let path = disambiguate(dir, name);
    crate::io::atomic_write(&path, &data).map_err(|e| e.to_string())?;

    Ok(StoredAttachment {
        name: name.to_string(),
        path,
        mime,
        size: data.len() as u64,
    })
}

/// Split a `data:<mime>;base64,<payload>` URI into its MIME type and bytes.
fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.contains("base64") {
        return None;
    }
    let mime = header.split(';').next().unwrap_or("").to_string();
    let data = BASE64.decode(payload.trim()).ok()?;
    Some((mime, data))
}

/// Pick a destination that does not clobber an existing file: `name`, then
/// `stem_1.ext`, `stem_2.ext`, …
fn disambiguate(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) if !s.is_empty() => (s.to_string(), format!(".{e}")),
        _ => (name.to_string(), String::new()),
    };
    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

// ---------------------------------------------------------------------------
// Previews
// ---------------------------------------------------------------------------

/// Build the human-readable preview block for a set of stored attachments.
/// Textual files get a short excerpt, tabular files their first rows, and
/// binary files a size/MIME note. The whole block is capped.
pub fn summarize(stored: &[StoredAttachment]) -> String {
    let mut out = String::new();
    for (index, att) in stored.iter().enumerate() {
        let line = preview_line(att);
        if out.len() + line.len() > PREVIEW_TOTAL_CAP {
            out.push_str(&format!("- ({} more attachments omitted)\n", stored.len() - index));
            break;
        }
        out.push_str(&line);
    }
    out.trim_end().to_string()
}

fn preview_line(att: &StoredAttachment) -> String {
    if is_textual(att) {
        match std::fs::read_to_string(&att.path) {
            Ok(content) => {
                let preview = if att.name.ends_with(".csv") {
                    content
                        .lines()
                        .take(CSV_PREVIEW_ROWS)
                        .collect::<Vec<_>>()
                        .join("\\n")
                } else {
                    truncate_chars(&content, PREVIEW_CHARS).replace('\n', "\\n")
                };
                format!("- {} ({}): preview: {}\n", att.name, att.mime, preview)
            }
            Err(err) => {
                warn!(name = %att.name, %err, "could not read attachment preview");
                format!("- {} ({}): (could not read preview)\n", att.name, att.mime)
            }
        }
    } else {
        format!("- {} ({}): {} bytes\n", att.name, att.mime, att.size)
    }
}

fn is_textual(att: &StoredAttachment) -> bool {
    att.mime.starts_with("text")
        || [".md", ".txt", ".json", ".csv", ".html", ".css", ".js"]
            .iter()
            .any(|ext| att.name.ends_with(ext))
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
