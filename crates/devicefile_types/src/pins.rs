//! The pin/peripheral reference table
//!
//! Device descriptions only tell which modules exist. Which pins those
//! modules are routed to comes from a separately maintained table, keyed by
//! the `pin-name` property of a device.

use crate::attributes::Attributes;
use compact_str::CompactString;
use std::collections::BTreeMap;

/// Attributes of one peripheral signal (e.g. `port="D" id="1" name="txd"`)
pub type Signal = Attributes;

/// The complete reference table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PinTable {
    entries: Vec<PinTableEntry>,
}

impl PinTable {
    pub fn new(entries: Vec<PinTableEntry>) -> Self {
        Self { entries }
    }

    /// Find the entry describing devices with the given pin name
    pub fn lookup(&self, pin_name: &str) -> Option<&PinTableEntry> {
        self.entries
            .iter()
            .find(|entry| entry.devices.iter().any(|d| d == pin_name))
    }
}

/// Signals for one group of pin compatible devices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinTableEntry {
    /// Pin names this entry applies to
    pub devices: Vec<CompactString>,
    /// Signals per peripheral category (`uart`, `spi`, `timer`, ...)
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub signals: BTreeMap<CompactString, Vec<Signal>>,
}

impl PinTableEntry {
    /// Key present on devices that can run their USART in SPI master mode
    pub const UART_SPI: &'static str = "uartspi";

    pub fn signals(&self, category: &str) -> &[Signal] {
        self.signals.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, category: &str) -> bool {
        self.signals.contains_key(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = PinTable::new(vec![
            PinTableEntry {
                devices: vec!["mega8".into(), "mega48".into()],
                signals: BTreeMap::from([(
                    CompactString::from("timer"),
                    vec![[("port", "b"), ("id", "1")].into_iter().collect()],
                )]),
            },
            PinTableEntry {
                devices: vec!["tiny85".into()],
                signals: BTreeMap::from([(CompactString::from(PinTableEntry::UART_SPI), vec![])]),
            },
        ]);
        let entry = table.lookup("mega48").unwrap();
        assert_eq!(entry.signals("timer").len(), 1);
        assert_eq!(entry.signals("timer")[0].get("port"), Some("b"));
        assert!(entry.signals("uart").is_empty());
        assert!(!entry.has(PinTableEntry::UART_SPI));
        assert!(table.lookup("tiny85").unwrap().has(PinTableEntry::UART_SPI));
        assert!(table.lookup("mega328").is_none());
    }
}
