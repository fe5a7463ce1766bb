//! Flat line log for history entries.
//!
//! One line per view, in log order, no header:
//!
//! ```text
//! entity_id,tag,is_tag_view,selected_index
//! ,TANK,1,-1
//! 3047,TANK,0,0
//! ```
//!
//! Absent fields are empty and the flag is `0`/`1`. There is no escaping, so
//! fields containing a comma or line break are refused at write time.

use std::io::{BufRead, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use super::{NavigationHistory, ViewState};

const FIELD_COUNT: usize = 4;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Field cannot be stored in the history log: {0:?}")]
    UnencodableField(String),

    #[error("Malformed history line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

fn check_field(field: &str) -> Result<&str, HistoryError> {
    if field.contains([',', '\n', '\r']) {
        return Err(HistoryError::UnencodableField(field.to_string()));
    }
    Ok(field)
}

/// Encode one view as a log line, without the trailing newline.
pub fn encode_line(view: &ViewState) -> Result<String, HistoryError> {
    Ok(format!(
        "{},{},{},{}",
        check_field(view.entity_id())?,
        check_field(view.tag_name())?,
        u8::from(view.is_tag_view),
        view.selected_index
    ))
}

/// Decode one log line. `line` is the 1-based line number used in errors.
pub fn decode_line(text: &str, line: usize) -> Result<ViewState, HistoryError> {
    let malformed = |reason: String| HistoryError::Malformed { line, reason };

    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        )));
    }

    let is_tag_view = match fields[2] {
        "0" => false,
        "1" => true,
        other => return Err(malformed(format!("invalid view flag '{}'", other))),
    };
    let selected_index: i32 = fields[3]
        .parse()
        .map_err(|_| malformed(format!("invalid selected index '{}'", fields[3])))?;

    Ok(ViewState::from_parts(fields[0], fields[1], is_tag_view, selected_index))
}

/// Write every entry, one per line. Nothing is written if any entry is
/// unencodable.
pub fn write_log<W: Write>(writer: &mut W, entries: &[ViewState]) -> Result<(), HistoryError> {
    let lines = entries
        .iter()
        .map(encode_line)
        .collect::<Result<Vec<_>, _>>()?;
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read entries back. Blank lines are skipped.
pub fn read_log<R: BufRead>(reader: R) -> Result<Vec<ViewState>, HistoryError> {
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() {
            continue;
        }
        entries.push(decode_line(text, index + 1)?);
    }
    Ok(entries)
}

impl NavigationHistory {
    /// Replace the file at `path` with this history's log.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let mut buffer = Vec::new();
        write_log(&mut buffer, self.entries())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, buffer)?;
        info!(path = %path.display(), entries = self.len(), "History saved");
        Ok(())
    }

    /// Load a history with the cursor at the tail. A missing or empty file
    /// gives a fresh history.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        if !path.exists() {
            debug!(path = %path.display(), "No history file");
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path)?;
        let entries = read_log(contents.as_bytes())?;
        info!(path = %path.display(), entries = entries.len(), "History loaded");
        Ok(Self::from_entries(entries))
    }
}
