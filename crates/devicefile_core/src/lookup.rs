//! Finding the device file for a device string

use camino::Utf8Path;
use camino::Utf8PathBuf;
use compact_str::CompactString;
use devicefile_types::DeviceIdentifier;
use devicefile_types::Platform;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LookupError {
    #[error("Could not find device file for {device} in {dir}")]
    DeviceFileNotFound {
        device: CompactString,
        dir: Utf8PathBuf,
    },
    #[error("Failed to list {dir}")]
    ReadDir {
        dir: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Find the device file describing `device` below `devices_dir`.
///
/// Device files are stored in one sub directory per platform. Device strings
/// that can't be parsed are looked up by ever shorter prefixes directly in
/// `devices_dir`.
pub fn find_device_file(devices_dir: &Utf8Path, device: &str) -> Result<Utf8PathBuf, LookupError> {
    let not_found = |dir: &Utf8Path| LookupError::DeviceFileNotFound {
        device: device.into(),
        dir: dir.to_owned(),
    };
    let id = match DeviceIdentifier::parse(device) {
        Ok(id) => id,
        Err(err) => {
            tracing::debug!("Not a structured device string, trying prefixes: {err}");
            return by_prefix(devices_dir, device).ok_or_else(|| not_found(devices_dir));
        }
    };
    let dir = match id.platform {
        Some(platform) => devices_dir.join(platform.to_string()),
        None => devices_dir.to_owned(),
    };
    tracing::debug!("Looking for device file for {id} in {dir}");

    let found = match id.platform {
        Some(Platform::Hosted) => {
            let family = id.family.as_deref().unwrap_or_default();
            let file = dir.join(format!("{family}.xml"));
            file.is_file().then_some(file)
        }
        Some(Platform::Avr) => list_files(&dir)?
            .into_iter()
            .find(|file| avr_file_matches(file, &id))
            .map(|file| dir.join(file)),
        Some(Platform::Stm32) => list_files(&dir)?
            .into_iter()
            .find(|file| stm32_file_matches(file, &id))
            .map(|file| dir.join(file)),
        None => by_prefix(&dir, device),
    };
    match found {
        Some(file) => {
            tracing::debug!("Found device file: {file}");
            Ok(file)
        }
        None => Err(not_found(&dir)),
    }
}

/// File names in `dir`, sorted
fn list_files(dir: &Utf8Path) -> Result<Vec<String>, LookupError> {
    let read_dir_err = |source| LookupError::ReadDir {
        dir: dir.to_owned(),
        source,
    };
    let mut files = vec![];
    for entry in dir.read_dir_utf8().map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        files.push(entry.file_name().to_owned());
    }
    files.sort();
    Ok(files)
}

/// `<family><names>-<types>[-<pin ids>].xml`
fn avr_file_matches(file: &str, id: &DeviceIdentifier) -> bool {
    let (Some(family), Some(name)) = (id.family.as_deref(), id.name.as_deref()) else {
        return false;
    };
    if !file.contains(family) {
        return false;
    }
    let stem = file.replace(family, "").replace(".xml", "");
    let mut parts = stem.split('-');
    let names = parts.next().unwrap_or_default();
    let types = parts.next().unwrap_or_default();
    let pin_ids = parts.next();
    if !names.split('_').any(|n| n == name) {
        return false;
    }
    let type_ = id.type_.as_deref().unwrap_or("none");
    if !types.split('_').any(|t| t == type_) {
        return false;
    }
    if family == "xmega" {
        let pin_id = id.pin_id.as_deref().unwrap_or("none");
        return pin_ids.is_some_and(|p| p.split('_').any(|p| p == pin_id));
    }
    true
}

/// `stm32<family letter><names>-<pin ids>-<size ids>.xml`
fn stm32_file_matches(file: &str, id: &DeviceIdentifier) -> bool {
    let Some(family) = id.family.as_deref() else {
        return false;
    };
    if !file.contains(&format!("stm32{family}")) {
        return false;
    }
    let letter = family.get(..1).unwrap_or_default();
    let stem = file.replace(&format!("stm32{letter}"), "").replace(".xml", "");
    let parts: Vec<&str> = stem.split('-').collect();
    let [names, pins, sizes, ..] = parts.as_slice() else {
        return false;
    };
    let contains = |list: &str, value: &Option<CompactString>| {
        value
            .as_deref()
            .is_some_and(|value| list.split('_').any(|v| v == value))
    };
    contains(*names, &id.name) && contains(*pins, &id.pin_id) && contains(*sizes, &id.size_id)
}

/// Try `<device>.xml` with ever shorter prefixes of the device string
fn by_prefix(dir: &Utf8Path, device: &str) -> Option<Utf8PathBuf> {
    (1..=device.len())
        .rev()
        .filter_map(|len| device.get(..len))
        .map(|prefix| dir.join(format!("{prefix}.xml")))
        .find(|file| file.is_file())
}
