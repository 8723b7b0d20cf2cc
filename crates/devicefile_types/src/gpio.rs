//! Raw GPIO pin descriptions as found in the device descriptions

use crate::attributes::Attributes;
use compact_str::CompactString;

/// One GPIO pin of a device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpioPin {
    /// Port letter, e.g. `B`
    pub port: CompactString,
    /// Index within the port
    pub id: u8,
    /// Pin change interrupt number
    #[cfg_attr(feature = "serde", serde(default))]
    pub pcint: Option<u8>,
    /// External interrupt number
    #[cfg_attr(feature = "serde", serde(default))]
    pub extint: Option<u8>,
    /// Alternate functions, in the order the device description lists them
    #[cfg_attr(feature = "serde", serde(default))]
    pub af: Vec<AlternateFunction>,
}

impl GpioPin {
    pub fn new(port: impl Into<CompactString>, id: u8) -> Self {
        Self {
            port: port.into(),
            id,
            pcint: None,
            extint: None,
            af: vec![],
        }
    }

    /// Key that orders pins by port, then by index
    pub fn sort_key(&self) -> (&str, u8) {
        (self.port.as_str(), self.id)
    }
}

/// An alternate signal routing available on a pin (e.g. `peripheral="Uart0"
/// type="out" name="Txd"`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AlternateFunction {
    attributes: Attributes,
}

impl AlternateFunction {
    /// Attributes in the order the device description lists them
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }
}

impl<K, V> FromIterator<(K, V)> for AlternateFunction
where
    K: Into<CompactString>,
    V: Into<CompactString>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
