//! Loading JSON input files

use camino::Utf8Path;
use devicefile_types::DeviceRecord;
use devicefile_types::PinTable;
use eyre::WrapErr;
use serde::de::DeserializeOwned;

fn load<T: DeserializeOwned>(path: &Utf8Path) -> eyre::Result<T> {
    let text =
        std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {path}"))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("Failed to parse {path}"))
}

/// Device records of one device group
pub(crate) fn load_records(path: &Utf8Path) -> eyre::Result<Vec<DeviceRecord>> {
    let records: Vec<DeviceRecord> = load(path)?;
    if records.is_empty() {
        eyre::bail!("{path} contains no devices");
    }
    tracing::debug!("Loaded {} device records from {path}", records.len());
    Ok(records)
}

/// The pin table, or an empty one if none was given
pub(crate) fn load_pins(path: Option<&Utf8Path>) -> eyre::Result<PinTable> {
    match path {
        Some(path) => load(path),
        None => {
            tracing::debug!("No pin table given");
            Ok(PinTable::default())
        }
    }
}
