//! JSON form of a trained [`QTable`].
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "encoding": { "name": "time-bucket-aggregate/10", "version": 3 },
//!   "states": { "[0,2,4,3,5,1,1,2]": [-1.5, -0.25], "idle": [] }
//! }
//! ```
//!
//! Files are written to a sibling temp file and renamed into place, so a reader
//! sees either the previous table or the complete new one.

use crate::error::RlError;
use crate::qtable::QTable;
use crate::state::{EncodingId, StateEncoder, StateKey};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTable {
    format_version: u32,
    encoding: EncodingId,
    states: BTreeMap<String, Vec<f64>>,
}

pub fn to_json<E: StateEncoder + ?Sized>(table: &QTable, encoder: &E) -> Result<String, RlError> {
    Ok(serde_json::to_string_pretty(&document(table, encoder))?)
}

pub fn from_json<E: StateEncoder + ?Sized>(text: &str, encoder: &E) -> Result<QTable, RlError> {
    let doc: PersistedTable = serde_json::from_str(text)?;

    if doc.format_version != FORMAT_VERSION {
        return Err(RlError::UnsupportedFormat(doc.format_version));
    }
    let expected = encoder.id();
    if doc.encoding != expected {
        return Err(RlError::EncodingMismatch {
            expected: expected.to_string(),
            found: doc.encoding.to_string(),
        });
    }

    let mut table = QTable::new();
    for (text_key, values) in doc.states {
        let key: StateKey = text_key.parse()?;
        let actions = encoder
            .action_count(&key)
            .ok_or_else(|| RlError::BadStateKey(text_key.clone()))?;
        if values.len() != actions {
            return Err(RlError::ActionSpaceMismatch {
                state: text_key,
                expected: actions,
                found: values.len(),
            });
        }
        table.insert(key, values);
    }
    Ok(table)
}

pub fn save<E: StateEncoder + ?Sized>(
    table: &QTable,
    encoder: &E,
    path: &Path,
) -> Result<(), RlError> {
    let tmp = temp_path(path);

    let written = write_document(&tmp, &document(table, encoder));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written?;

    fs::rename(&tmp, path)?;
    info!("saved q-table with {} states to {}", table.len(), path.display());
    Ok(())
}

pub fn load<E: StateEncoder + ?Sized>(path: &Path, encoder: &E) -> Result<QTable, RlError> {
    let text = fs::read_to_string(path)?;
    let table = from_json(&text, encoder)?;
    info!("loaded q-table with {} states from {}", table.len(), path.display());
    Ok(table)
}

fn document<E: StateEncoder + ?Sized>(table: &QTable, encoder: &E) -> PersistedTable {
    PersistedTable {
        format_version: FORMAT_VERSION,
        encoding: encoder.id(),
        states: table
            .iter()
            .map(|(key, values)| (key.to_string(), values.to_vec()))
            .collect(),
    }
}

fn write_document(path: &Path, doc: &PersistedTable) -> Result<(), RlError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, doc)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Sibling temp file, unique per call so concurrent saves never share one.
fn temp_path(path: &Path) -> PathBuf {
    static NEXT_SAVE: AtomicU64 = AtomicU64::new(0);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "qtable".into());
    let seq = NEXT_SAVE.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
}
