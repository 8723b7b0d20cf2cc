//! Selecting the values that apply to one concrete device

use crate::element::Element;
use compact_str::CompactString;
use devicefile_types::DeviceIdentifier;
use devicefile_types::DiscriminatingId;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("Failed to parse device file")]
    Xml(#[from] roxmltree::Error),
    #[error("Device file has no <device> element")]
    MissingDevice,
    #[error("Invalid number in <{tag}>: {value:?}")]
    InvalidNumber { tag: CompactString, value: CompactString },
}

impl Element {
    /// Read a device file back into an element tree.
    ///
    /// Returns the `<device>` element, either the document root or the child
    /// of an `<rca>` wrapper.
    pub fn from_xml(text: &str) -> Result<Self, ResolveError> {
        let document = roxmltree::Document::parse(text)?;
        let root = document.root_element();
        let device = if root.has_tag_name("device") {
            Some(root)
        } else {
            root.children().find(|n| n.has_tag_name("device"))
        };
        device
            .map(|node| convert(&node))
            .ok_or(ResolveError::MissingDevice)
    }
}

fn convert(node: &roxmltree::Node<'_, '_>) -> Element {
    let mut element = Element::new(node.tag_name().name());
    element.set_attributes(node.attributes().map(|a| (a.name(), a.value())));
    if let Some(text) = node.text().map(str::trim).filter(|t| !t.is_empty()) {
        element.set_text(text);
    }
    for child in node.children().filter(roxmltree::Node::is_element) {
        element.add_child(convert(&child));
    }
    element
}

/// Keep only the parts of `element` that apply to the device `id`.
///
/// Children whose `device-*` attributes don't match are dropped. Where
/// several children describe the same thing (same tag, drivers with the same
/// type and name, parameters with the same name, pins with the same port and
/// index) only the most specific matches survive.
pub fn resolve(element: &Element, id: &DeviceIdentifier) -> Element {
    let mut resolved = element.clone();
    resolve_children(&mut resolved, id);
    resolved
}

fn resolve_children(element: &mut Element, id: &DeviceIdentifier) {
    element.retain_children(|child| scope(child).matches(id));

    let keep: Vec<bool> = {
        let mut best: BTreeMap<Vec<&str>, usize> = BTreeMap::new();
        for child in element.children() {
            if let Some(key) = group_key(child) {
                let entry = best.entry(key).or_default();
                *entry = (*entry).max(scope(child).specificity());
            }
        }
        element
            .children()
            .iter()
            .map(|child| match group_key(child) {
                Some(key) => best.get(&key) == Some(&scope(child).specificity()),
                None => true,
            })
            .collect()
    };
    let mut keep = keep.into_iter();
    element.retain_children(|_| keep.next().unwrap_or(true));

    for child in element.children_mut() {
        resolve_children(child, id);
    }
}

fn scope(element: &Element) -> DiscriminatingId {
    DiscriminatingId::from_attributes(element.attributes())
}

/// Children with equal keys are alternatives for each other
fn group_key(element: &Element) -> Option<Vec<&str>> {
    fn attr<'a>(element: &'a Element, key: &str) -> &'a str {
        element.attribute(key).unwrap_or_default()
    }
    match element.tag() {
        tag @ ("flash" | "ram" | "eeprom" | "core" | "mcu" | "pin-count") => Some(vec![tag]),
        tag @ "driver" => Some(vec![tag, attr(element, "type"), attr(element, "name")]),
        tag @ "parameter" => Some(vec![tag, attr(element, "name")]),
        tag @ "gpio" => Some(vec![
            tag,
            attr(element, "port"),
            attr(element, "id"),
            attr(element, "name"),
        ]),
        _ => None,
    }
}

/// A driver as seen by one concrete device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverProperties {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_: CompactString,
    pub name: CompactString,
    pub instances: Vec<CompactString>,
    pub parameters: BTreeMap<CompactString, CompactString>,
}

/// The properties of one concrete device, extracted from a resolved tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceProperties {
    pub flash: Option<u64>,
    pub ram: Option<u64>,
    pub eeprom: Option<u64>,
    pub core: Option<CompactString>,
    pub mcu: Option<CompactString>,
    pub pin_count: Option<u64>,
    pub headers: Vec<CompactString>,
    pub drivers: Vec<DriverProperties>,
}

impl DeviceProperties {
    /// Resolve `device` for `id` and extract its properties
    pub fn for_device(device: &Element, id: &DeviceIdentifier) -> Result<Self, ResolveError> {
        Self::from_element(&resolve(device, id))
    }

    /// Extract properties from an already resolved `<device>` element
    pub fn from_element(device: &Element) -> Result<Self, ResolveError> {
        let number = |tag: &str| -> Result<Option<u64>, ResolveError> {
            device
                .child_text(tag)
                .map(|value| {
                    value.parse().map_err(|_| ResolveError::InvalidNumber {
                        tag: tag.into(),
                        value: value.into(),
                    })
                })
                .transpose()
        };
        let text = |tag: &str| device.child_text(tag).map(CompactString::from);

        let drivers = device
            .children_by_tag("driver")
            .map(|driver| DriverProperties {
                type_: driver.attribute("type").unwrap_or_default().into(),
                name: driver.attribute("name").unwrap_or_default().into(),
                instances: driver
                    .attribute("instances")
                    .map(|i| i.split(',').map(CompactString::from).collect())
                    .unwrap_or_default(),
                parameters: driver
                    .children_by_tag("parameter")
                    .filter_map(|p| {
                        Some((
                            CompactString::from(p.attribute("name")?),
                            CompactString::from(p.text()?),
                        ))
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            flash: number("flash")?,
            ram: number("ram")?,
            eeprom: number("eeprom")?,
            core: text("core"),
            mcu: text("mcu"),
            pin_count: number("pin-count")?,
            headers: device
                .children_by_tag("header")
                .filter_map(Element::text)
                .map(CompactString::from)
                .collect(),
            drivers,
        })
    }

    pub fn driver(&self, type_: &str) -> Option<&DriverProperties> {
        self.drivers.iter().find(|d| d.type_ == type_)
    }
}
