//! Serialisation of driver trees to device files

use crate::element::Element;
use crate::tree::DeviceTree;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use devicefile_types::IdField;
use itertools::Itertools;
use std::io::Write;
use xml::writer::EmitterConfig;
use xml::writer::EventWriter;
use xml::writer::XmlEvent;

/// Version of the device file format
pub const FORMAT_VERSION: &str = "1.0";

const GENERATED_COMMENT: &str = " WARNING: This file is generated automatically, do not edit! ";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OutputError {
    #[error("Failed to write XML")]
    Xml(#[from] xml::writer::Error),
    #[error("Failed to create {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Generated XML is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write the `<rca>` document containing `device`
pub fn write_document(device: &Element, sink: impl Write) -> Result<(), OutputError> {
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("\t")
        .create_writer(sink);
    writer.write(XmlEvent::start_element("rca").attr("version", FORMAT_VERSION))?;
    writer.write(XmlEvent::comment(GENERATED_COMMENT))?;
    write_element(&mut writer, device)?;
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

/// Render a complete document to a string
pub fn to_string(device: &Element) -> Result<String, OutputError> {
    let mut buffer = vec![];
    write_document(device, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_element<W: Write>(writer: &mut EventWriter<W>, element: &Element) -> Result<(), OutputError> {
    let mut start = XmlEvent::start_element(element.tag());
    for (key, value) in element.attributes() {
        start = start.attr(key, value);
    }
    writer.write(start)?;
    if let Some(text) = element.text() {
        writer.write(XmlEvent::characters(text))?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

/// File name of the device file for a tree.
///
/// `<family><names>-<types>.xml` with names sorted numerically, xmega files
/// additionally list their pin ids: `<family><names>-<types>-<pin ids>.xml`.
pub fn file_name(tree: &DeviceTree) -> String {
    let family = tree.ids.common().family.unwrap_or_default();
    let names = tree
        .attribute_values(IdField::Name)
        .into_iter()
        // Numeric names first, in numeric order
        .sorted_by_cached_key(|name| name.parse::<u64>().map_err(|_| name.clone()))
        .join("_");
    let types = tree.attribute_values(IdField::Type).join("_");
    if family == "xmega" {
        let pin_ids = tree.attribute_values(IdField::PinId).join("_");
        format!("{family}{names}-{types}-{pin_ids}.xml")
    } else {
        format!("{family}{names}-{types}.xml")
    }
}

/// Write the device file for `tree` into `folder`, returning its path
pub fn write_to_folder(tree: &DeviceTree, folder: &Utf8Path) -> Result<Utf8PathBuf, OutputError> {
    let path = folder.join(file_name(tree));
    let io_err = |source| OutputError::Io {
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(folder).map_err(io_err)?;
    let mut file = std::io::BufWriter::new(std::fs::File::create(&path).map_err(io_err)?);
    write_document(&tree.to_element(), &mut file)?;
    file.flush().map_err(io_err)?;
    tracing::info!("Wrote {path}");
    Ok(path)
}
