//! Derives the driver tree from the property model of a device group

use crate::config::GeneratorConfig;
use crate::family::Extraction;
use crate::family::Family;
use crate::family::PeripheralRule;
use crate::policy;
use crate::tree::DeviceTree;
use crate::tree::DriverKind;
use crate::tree::DriverNode;
use crate::tree::GpioNode;
use crate::tree::Parameter;
use crate::tree::ParameterName;
use crate::tree::Scoped;
use compact_str::CompactString;
use compact_str::ToCompactString;
use compact_str::format_compact;
use devicefile_types::Device;
use devicefile_types::DiscriminatingId;
use devicefile_types::IdField;
use devicefile_types::IdSet;
use devicefile_types::PinTable;
use devicefile_types::PinTableEntry;
use devicefile_types::Property;
use devicefile_types::PropertyError;
use itertools::Itertools;

/// Errors that prevent building a driver tree
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("Device group is empty")]
    EmptyGroup,
    #[error("Devices {0} do not share a family")]
    MixedFamily(CompactString),
    #[error("Unsupported device family: {0}")]
    UnsupportedFamily(CompactString),
    #[error("Unknown xmega package in type {0:?}")]
    UnknownPackage(CompactString),
    #[error("Xmega device {0} has no package type")]
    MissingPackage(CompactString),
    #[error("Inconsistent device properties")]
    Property(#[from] PropertyError),
}

/// Build the driver tree for a device group.
///
/// `pins` is the pin/peripheral reference table, looked up by the
/// `pin-name` property of the group.
pub fn build_driver_tree(
    device: &Device,
    pins: &PinTable,
    config: &GeneratorConfig,
) -> Result<DeviceTree, BuildError> {
    if device.ids().is_empty() {
        return Err(BuildError::EmptyGroup);
    }
    device.validate_consistency()?;
    if let Err(err) = device.validate() {
        tracing::debug!("Skipping devices without a value: {err}");
    }
    let group = device.ids().to_compact_string();
    let family = match device.ids().common().family {
        Some(family) => family
            .parse::<Family>()
            .map_err(|_| BuildError::UnsupportedFamily(family))?,
        None => return Err(BuildError::MixedFamily(group)),
    };
    tracing::info!("Generating device file for '{group}'");

    let pin_name = device.pin_name.values().first().map(|v| v.value.as_str());
    let io = pin_name.and_then(|name| pins.lookup(name));
    if io.is_none() && !family.is_xmega() {
        tracing::warn!(
            "IO not found for device '{group}' with pin-name: '{}'",
            pin_name.unwrap_or_default()
        );
    }

    let builder = TreeBuilder {
        device,
        family,
        io,
        config,
    };
    builder.build()
}

struct TreeBuilder<'a> {
    device: &'a Device,
    family: Family,
    io: Option<&'a PinTableEntry>,
    config: &'a GeneratorConfig,
}

impl TreeBuilder<'_> {
    fn build(&self) -> Result<DeviceTree, BuildError> {
        let mut tree = DeviceTree::new(self.device.ids().clone());
        tree.flash = self.scoped(&self.device.flash);
        tree.ram = self.scoped(&self.device.ram);
        tree.eeprom = self.scoped(&self.device.eeprom);
        tree.core = self.scoped(&self.device.core);
        tree.mcu = self.scoped(&self.device.mcu);
        tree.pin_count = self.pin_count()?;
        tree.headers.clone_from(&self.config.headers);

        tree.drivers.push(self.core_driver());
        for kind in [
            DriverKind::Adc,
            DriverKind::Clock,
            DriverKind::Dac,
            DriverKind::I2c,
            DriverKind::Spi,
            DriverKind::Timer,
            DriverKind::Uart,
            DriverKind::Usi,
            DriverKind::Gpio,
        ] {
            match kind {
                DriverKind::Clock => tree.drivers.push(DriverNode::new(kind, "avr")),
                DriverKind::Uart => self.add_uart(&mut tree.drivers),
                DriverKind::Gpio => tree.drivers.push(self.gpio_driver()),
                DriverKind::Usi if !self.config.usi_driver => (),
                _ => {
                    if let Some(rule) = PeripheralRule::for_kind(kind) {
                        self.add_peripheral(rule, &mut tree.drivers);
                    }
                }
            }
        }
        Ok(tree)
    }

    /// Discriminating ids for a set of devices sharing a value
    fn scopes(&self, ids: &IdSet) -> Vec<DiscriminatingId> {
        ids.difference_from_ids(self.device.ids())
    }

    fn scoped<T: Clone + PartialEq>(&self, property: &Property<T>) -> Vec<Scoped<T>> {
        let mut result = vec![];
        for value in property.values() {
            for scope in self.scopes(&value.ids) {
                result.push(Scoped {
                    scope,
                    value: value.value.clone(),
                });
            }
        }
        result
    }

    fn pin_count(&self) -> Result<u16, BuildError> {
        if !self.family.is_xmega() {
            return Ok(0);
        }
        // The digit in the type is the package id
        let types = self.device.ids().attribute(IdField::Type);
        match types.first() {
            Some(Some(type_)) => policy::xmega_pin_count(type_),
            _ => Err(BuildError::MissingPackage(
                self.device.ids().to_compact_string(),
            )),
        }
    }

    fn core_driver(&self) -> DriverNode {
        let mut core = DriverNode::new(DriverKind::Core, "avr");
        for ram in self.device.ram.values() {
            for scope in self.scopes(&ram.ids) {
                core.parameters.push(Parameter {
                    name: ParameterName::RamLength,
                    scope: scope.clone(),
                    value: policy::ram_length(ram.value),
                });
                core.parameters.push(Parameter {
                    name: ParameterName::RamBlockLength,
                    scope,
                    value: policy::ram_block_length(ram.value),
                });
            }
        }
        core
    }

    fn add_peripheral(&self, rule: &PeripheralRule, drivers: &mut Vec<DriverNode>) {
        let name = self.family.name_for(rule);
        match self.family.extraction(rule) {
            Extraction::Presence(prefix) => {
                for modules in self.device.modules.values() {
                    if !modules.value.iter().any(|m| m.starts_with(prefix)) {
                        continue;
                    }
                    for scope in self.scopes(&modules.ids) {
                        drivers.push(DriverNode::new(rule.kind, name).with_scope(scope));
                    }
                }
            }
            Extraction::Instances(prefix) => {
                let category = rule.kind.to_string();
                let signals = self.io.map(|io| io.signals(&category)).unwrap_or_default();
                for modules in self.device.modules.values() {
                    let instances = instances(
                        modules
                            .value
                            .iter()
                            .filter_map(|m| m.strip_prefix(prefix))
                            .map(CompactString::from),
                    );
                    if instances.is_empty() {
                        continue;
                    }
                    for scope in self.scopes(&modules.ids) {
                        let mut driver = DriverNode::new(rule.kind, name).with_scope(scope);
                        driver.instances.clone_from(&instances);
                        driver.signals = signals.to_vec();
                        drivers.push(driver);
                    }
                }
            }
            Extraction::Absent => {
                tracing::debug!("No {} driver on {}", rule.kind, self.family);
            }
        }
    }

    fn add_uart(&self, drivers: &mut Vec<DriverNode>) {
        const PREFIX: &str = "USART";
        let name = self.family.driver_name();
        // Some classic AVRs can run their USART in SPI master mode
        let uart_spi = self.family.is_xmega()
            || self.io.is_some_and(|io| io.has(PinTableEntry::UART_SPI));

        for modules in self.device.modules.values() {
            let suffixes = modules
                .value
                .iter()
                .filter_map(|m| m.strip_prefix(PREFIX))
                .map(|suffix| match self.family {
                    // Port letter and index, e.g. `C0`
                    Family::Xmega => suffix.chars().take(2).collect(),
                    // A bare `USART` is instance 0
                    _ => suffix
                        .chars()
                        .next()
                        .map_or_else(|| CompactString::const_new("0"), |c| c.to_compact_string()),
                });
            let instances = instances(suffixes);
            if instances.is_empty() {
                continue;
            }
            for scope in self.scopes(&modules.ids) {
                let mut uart = DriverNode::new(DriverKind::Uart, name).with_scope(scope.clone());
                uart.instances.clone_from(&instances);
                uart.parameters = self.tx_buffer_parameters();
                drivers.push(uart);
                if uart_spi {
                    tracing::debug!("USART of {} can be used as SPI", self.family);
                    let mut spi = DriverNode::new(DriverKind::Spi, format_compact!("{name}_uart"))
                        .with_scope(scope);
                    spi.instances.clone_from(&instances);
                    drivers.push(spi);
                }
            }
        }
    }

    fn tx_buffer_parameters(&self) -> Vec<Parameter> {
        let mut parameters = vec![];
        for ram in self.device.ram.values() {
            let Some(size) = policy::tx_buffer(ram.value) else {
                continue;
            };
            for scope in self.scopes(&ram.ids) {
                parameters.push(Parameter {
                    name: ParameterName::TxBuffer,
                    scope,
                    value: size,
                });
            }
        }
        parameters
    }

    fn gpio_driver(&self) -> DriverNode {
        let mut driver = DriverNode::new(DriverKind::Gpio, self.family.driver_name());
        for gpios in self.device.gpios.values() {
            let pins = gpios.value.iter().sorted_by(|a, b| a.sort_key().cmp(&b.sort_key()));
            let pins = pins.collect_vec();
            for scope in self.scopes(&gpios.ids) {
                for pin in &pins {
                    driver.gpios.push(GpioNode {
                        scope: scope.clone(),
                        port: pin.port.clone(),
                        id: pin.id,
                        pcint: pin.pcint,
                        extint: pin.extint,
                        af: pin.af.clone(),
                    });
                }
            }
        }
        driver
    }
}

/// Sort and deduplicate instance suffixes
fn instances(suffixes: impl Iterator<Item = CompactString>) -> Vec<CompactString> {
    suffixes.sorted().dedup().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfigBuilder;
    use devicefile_types::DeviceRecord;
    use devicefile_types::GpioPin;
    use pretty_assertions::assert_eq;

    fn config() -> GeneratorConfig {
        GeneratorConfigBuilder::default()
            .output_dir("out")
            .build()
            .unwrap()
    }

    fn record(device: &str, ram: u64, modules: &[&str]) -> DeviceRecord {
        DeviceRecord {
            device: device.into(),
            ram: Some(ram),
            pin_name: Some("mega8".into()),
            modules: Some(modules.iter().map(|m| CompactString::from(*m)).collect()),
            ..Default::default()
        }
    }

    fn build(records: &[DeviceRecord]) -> DeviceTree {
        let device = Device::from_records(records).unwrap();
        build_driver_tree(&device, &PinTable::default(), &config()).unwrap()
    }

    #[test]
    fn test_partially_present_property() {
        let mut with_mcu = record("atmega48", 512, &[]);
        with_mcu.mcu = Some("m48".into());
        let tree = build(&[with_mcu, record("atmega88", 1024, &[])]);

        assert_eq!(tree.mcu.len(), 1);
        assert_eq!(tree.mcu[0].value, "m48");
        assert_eq!(tree.mcu[0].scope.name.as_deref(), Some("48"));

        let root = tree.to_element();
        let mcu = root.children_by_tag("mcu").collect_vec();
        assert_eq!(mcu.len(), 1);
        assert_eq!(mcu[0].attribute("device-name"), Some("48"));
        assert_eq!(mcu[0].text(), Some("m48"));
    }

    #[test]
    fn test_conflicting_values_rejected() {
        let mut device = Device::from_records(&[record("atmega48", 512, &[])]).unwrap();
        device.mcu = Property::from_values(
            "mcu",
            vec![devicefile_types::PropertyValue {
                value: CompactString::from("m328"),
                ids: [devicefile_types::DeviceIdentifier::parse("atmega328").unwrap()]
                    .into_iter()
                    .collect(),
            }],
        );
        assert!(matches!(
            build_driver_tree(&device, &PinTable::default(), &config()),
            Err(BuildError::Property(PropertyError::Foreign("mcu", _)))
        ));
    }

    #[test]
    fn test_instance_extraction() {
        let tree = build(&[record("atmega48", 512, &["USART1", "USART0", "TWI0"])]);
        let uart = tree.drivers_of(DriverKind::Uart).collect_vec();
        assert_eq!(uart.len(), 1);
        assert_eq!(uart[0].instances, vec!["0", "1"]);
        assert_eq!(uart[0].name, "at90_tiny_mega");

        let i2c = tree.drivers_of(DriverKind::I2c).collect_vec();
        assert_eq!(i2c.len(), 1);
        assert!(i2c[0].instances.is_empty());
    }

    #[test]
    fn test_bare_usart() {
        let tree = build(&[record("atmega8", 1024, &["USART"])]);
        let uart = tree.drivers_of(DriverKind::Uart).next().unwrap();
        assert_eq!(uart.instances, vec!["0"]);
        // No tx buffer for exactly 1 KiB
        assert!(uart.parameters.is_empty());
        // Not a uart-spi device without pin table entry
        assert_eq!(tree.drivers_of(DriverKind::Spi).count(), 0);
    }

    #[test]
    fn test_timer_instances() {
        let tree = build(&[record(
            "atmega48",
            512,
            &["TIMER_COUNTER_2", "TIMER_COUNTER_0", "TIMER_COUNTER_1"],
        )]);
        let timer = tree.drivers_of(DriverKind::Timer).next().unwrap();
        assert_eq!(timer.name, "atmega");
        assert_eq!(timer.instances, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_core_parameters() {
        let tree = build(&[
            record("atmega48", 512, &[]),
            record("atmega328", 2048, &[]),
        ]);
        let core = tree.drivers_of(DriverKind::Core).next().unwrap();
        let values = core
            .parameters
            .iter()
            .map(|p| (p.name, p.scope.name.as_deref(), p.value))
            .collect_vec();
        assert_eq!(
            values,
            vec![
                (ParameterName::RamLength, Some("48"), 256),
                (ParameterName::RamBlockLength, Some("48"), 8),
                (ParameterName::RamLength, Some("328"), 1024),
                (ParameterName::RamBlockLength, Some("328"), 32),
            ]
        );
    }

    #[test]
    fn test_gpio_sort() {
        let mut rec = record("atmega48", 512, &[]);
        rec.gpios = Some(vec![
            GpioPin::new("B", 3),
            GpioPin::new("A", 5),
            GpioPin::new("A", 1),
        ]);
        let tree = build(&[rec]);
        let gpio = tree.drivers_of(DriverKind::Gpio).next().unwrap();
        let pins = gpio
            .gpios
            .iter()
            .map(|p| format!("{}{}", p.port, p.id))
            .collect_vec();
        assert_eq!(pins, vec!["A1", "A5", "B3"]);
    }

    #[test]
    fn test_usi_only_when_enabled() {
        let records = [record("attiny85", 512, &["USI", "TIMER_COUNTER_0"])];
        assert_eq!(build(&records).drivers_of(DriverKind::Usi).count(), 0);

        let device = Device::from_records(&records).unwrap();
        let config = GeneratorConfigBuilder::default()
            .output_dir("out")
            .usi_driver(true)
            .build()
            .unwrap();
        let tree = build_driver_tree(&device, &PinTable::default(), &config).unwrap();
        let usi = tree.drivers_of(DriverKind::Usi).collect_vec();
        assert_eq!(usi.len(), 1);
        assert_eq!(usi[0].name, "at90_tiny_mega");
    }

    #[test]
    fn test_mixed_family() {
        let device = Device::from_records(&[
            record("atmega48", 512, &[]),
            record("attiny85", 512, &[]),
        ])
        .unwrap();
        assert!(matches!(
            build_driver_tree(&device, &PinTable::default(), &config()),
            Err(BuildError::MixedFamily(_))
        ));
    }

    #[test]
    fn test_unsupported_family() {
        let device = Device::from_records(&[record("stm32f407vg", 512, &[])]).unwrap();
        assert!(matches!(
            build_driver_tree(&device, &PinTable::default(), &config()),
            Err(BuildError::UnsupportedFamily(f)) if f == "f4"
        ));
    }
}
