//! Typed driver tree for one device group

use crate::element::Element;
use compact_str::CompactString;
use devicefile_types::AlternateFunction;
use devicefile_types::DiscriminatingId;
use devicefile_types::IdField;
use devicefile_types::IdSet;
use devicefile_types::pins::Signal;

/// Peripheral driver categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DriverKind {
    Core,
    Adc,
    Clock,
    Dac,
    I2c,
    Spi,
    Timer,
    Uart,
    Usi,
    Gpio,
}

/// Parameters the generator derives from raw sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ParameterName {
    RamLength,
    RamBlockLength,
    TxBuffer,
}

/// A value that only applies to the devices selected by `scope`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoped<T> {
    pub scope: DiscriminatingId,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: ParameterName,
    pub scope: DiscriminatingId,
    pub value: u64,
}

/// One pin of the GPIO driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioNode {
    pub scope: DiscriminatingId,
    pub port: CompactString,
    pub id: u8,
    pub pcint: Option<u8>,
    pub extint: Option<u8>,
    pub af: Vec<AlternateFunction>,
}

/// One peripheral driver, possibly only present on part of the group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverNode {
    pub kind: DriverKind,
    pub name: CompactString,
    pub scope: DiscriminatingId,
    /// Sorted, deduplicated instance suffixes
    pub instances: Vec<CompactString>,
    pub parameters: Vec<Parameter>,
    /// Pins from the reference table routed to this peripheral
    pub signals: Vec<Signal>,
    pub gpios: Vec<GpioNode>,
}

impl DriverNode {
    pub fn new(kind: DriverKind, name: impl Into<CompactString>) -> Self {
        Self {
            kind,
            name: name.into(),
            scope: DiscriminatingId::default(),
            instances: vec![],
            parameters: vec![],
            signals: vec![],
            gpios: vec![],
        }
    }

    pub fn with_scope(mut self, scope: DiscriminatingId) -> Self {
        self.scope = scope;
        self
    }
}

/// Everything generated for one device group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTree {
    pub ids: IdSet,
    pub flash: Vec<Scoped<u64>>,
    pub ram: Vec<Scoped<u64>>,
    pub eeprom: Vec<Scoped<u64>>,
    pub core: Vec<Scoped<CompactString>>,
    pub mcu: Vec<Scoped<CompactString>>,
    pub pin_count: u16,
    pub headers: Vec<CompactString>,
    pub drivers: Vec<DriverNode>,
}

impl DeviceTree {
    pub fn new(ids: IdSet) -> Self {
        Self {
            ids,
            flash: vec![],
            ram: vec![],
            eeprom: vec![],
            core: vec![],
            mcu: vec![],
            pin_count: 0,
            headers: vec![],
            drivers: vec![],
        }
    }

    /// All drivers of one kind, in emission order
    pub fn drivers_of(&self, kind: DriverKind) -> impl Iterator<Item = &DriverNode> {
        self.drivers.iter().filter(move |d| d.kind == kind)
    }

    /// Distinct values of an identifier field, missing ones rendered as `none`
    pub fn attribute_values(&self, field: IdField) -> Vec<CompactString> {
        self.ids
            .attribute(field)
            .into_iter()
            .map(|v| v.unwrap_or_else(|| "none".into()))
            .collect()
    }

    /// Convert to the generic element tree, rooted at `<device>`
    pub fn to_element(&self) -> Element {
        let mut root = Element::new("device");
        for (key, field) in [
            ("platform", IdField::Platform),
            ("family", IdField::Family),
            ("name", IdField::Name),
            ("type", IdField::Type),
            ("pin_id", IdField::PinId),
        ] {
            let values = self.ids.attribute(field);
            if values.iter().all(Option::is_none) {
                continue;
            }
            root.set_attribute(key, self.attribute_values(field).join("|"));
        }

        for (tag, values) in [
            ("flash", &self.flash),
            ("ram", &self.ram),
            ("eeprom", &self.eeprom),
        ] {
            for value in values {
                root.add_child(scoped(tag, &value.scope).with_text(value.value));
            }
        }
        for (tag, values) in [("core", &self.core), ("mcu", &self.mcu)] {
            for value in values {
                root.add_child(scoped(tag, &value.scope).with_text(&value.value));
            }
        }
        root.add_child(Element::new("pin-count").with_text(self.pin_count));
        for header in &self.headers {
            root.add_child(Element::new("header").with_text(header));
        }
        for driver in &self.drivers {
            root.add_child(driver.to_element());
        }
        root
    }
}

impl DriverNode {
    fn to_element(&self) -> Element {
        let mut driver = scoped("driver", &self.scope)
            .with_attribute("type", self.kind)
            .with_attribute("name", &self.name);
        if !self.instances.is_empty() {
            driver.set_attribute("instances", self.instances.join(","));
        }
        for parameter in &self.parameters {
            driver.add_child(
                scoped("parameter", &parameter.scope)
                    .with_attribute("name", parameter.name)
                    .with_text(parameter.value),
            );
        }
        for signal in &self.signals {
            let gpio = driver.add_child(Element::new("gpio"));
            gpio.set_attributes(signal);
        }
        for pin in &self.gpios {
            let gpio = driver.add_child(scoped("gpio", &pin.scope));
            gpio.set_attribute("port", &pin.port);
            gpio.set_attribute("id", pin.id);
            if let Some(pcint) = pin.pcint {
                gpio.set_attribute("pcint", pcint);
            }
            if let Some(extint) = pin.extint {
                gpio.set_attribute("extint", extint);
            }
            for af in &pin.af {
                let mut child = Element::new("af");
                child.set_attributes(af.attributes());
                gpio.add_child(child);
            }
        }
        driver
    }
}

/// An element tagged with the `device-*` attributes of `scope`
fn scoped(tag: &str, scope: &DiscriminatingId) -> Element {
    let mut element = Element::new(tag);
    element.set_attributes(scope.attributes());
    element
}
