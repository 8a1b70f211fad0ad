//! Flat CSV snapshot of the signal table.
//!
//! Writes go to a sibling temp file that is renamed over the target, so a
//! reader sees either the previous table or the new one, never a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::decision::SignalRow;
use crate::error::PipelineError;

/// Serialize rows as CSV (header + one line per row) into any writer.
pub fn write_csv<W: Write>(w: W, rows: &[SignalRow]) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_writer(w);
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_bytes(rows: &[SignalRow]) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, rows)?;
    Ok(buf)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "signals".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace the snapshot at `path` with `rows`.
pub fn write_snapshot(path: &Path, rows: &[SignalRow]) -> Result<(), PipelineError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = temp_path(path);
    let bytes = to_csv_bytes(rows)?;
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(&bytes)?;
        f.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    tracing::info!(target: "pipeline", path = %path.display(), rows = rows.len(), "snapshot written");
    Ok(())
}

/// Read the last written snapshot.
pub fn read_snapshot(path: &Path) -> Result<Vec<SignalRow>, PipelineError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let rows = rdr
        .deserialize::<SignalRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
