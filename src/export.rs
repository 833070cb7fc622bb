use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::session::Session;
use crate::store::SessionStore;

/// Write sessions as CSV with a header row, oldest first.
/// Columns follow the stored field names.
pub fn write_sessions<W: Write>(writer: W, sessions: &[Session]) -> Result<usize, ExportError> {
    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.timestamp.cmp(&b.timestamp)));

    let mut csv = csv::Writer::from_writer(writer);
    for session in &ordered {
        csv.serialize(session)?;
    }
    csv.flush()?;
    Ok(ordered.len())
}

/// Dump every stored session to `path`, returning how many were written
pub fn export_sessions(store: &dyn SessionStore, path: &Path) -> Result<usize, ExportError> {
    let sessions = store.read_all_sessions()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let written = write_sessions(file, &sessions)?;
    tracing::info!(path = %path.display(), sessions = written, "exported sessions");
    Ok(written)
}
