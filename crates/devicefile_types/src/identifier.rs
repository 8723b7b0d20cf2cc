//! Structured device names such as `atmega328p` or `stm32f407vg`

use compact_str::CompactString;
use std::fmt::Display;
use std::str::FromStr;

mod parser;

pub use parser::FormatError;

/// The hardware platform a device belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Avr,
    Stm32,
    Hosted,
}

/// Names the individual fields of a [`DeviceIdentifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IdField {
    Platform,
    Family,
    Name,
    Type,
    PinId,
    SizeId,
    Core,
}

/// A (possibly partial) device identifier.
///
/// Every field is optional. An unset field matches any value for that field,
/// which makes a partial identifier describe a set of concrete devices.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceIdentifier {
    pub platform: Option<Platform>,
    /// E.g. `atmega`, `xmega` or `f4`
    pub family: Option<CompactString>,
    /// E.g. `328` or `407`
    pub name: Option<CompactString>,
    /// E.g. `p`, `pa` or (for xmega) the package id `a1`
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_: Option<CompactString>,
    pub pin_id: Option<CompactString>,
    pub size_id: Option<CompactString>,
    pub core: Option<CompactString>,
}

impl DeviceIdentifier {
    /// Parse a device string like `atxmega128a1u`
    pub fn parse(s: &str) -> Result<Self, FormatError> {
        parser::parse_identifier(s)
    }

    /// Get a field by name, [`IdField::Platform`] is rendered as a string
    pub fn get(&self, field: IdField) -> Option<CompactString> {
        match field {
            IdField::Platform => self.platform.map(|p| CompactString::from(p.to_string())),
            IdField::Family => self.family.clone(),
            IdField::Name => self.name.clone(),
            IdField::Type => self.type_.clone(),
            IdField::PinId => self.pin_id.clone(),
            IdField::SizeId => self.size_id.clone(),
            IdField::Core => self.core.clone(),
        }
    }

    /// True if every field set in `self` is equal to the same field in
    /// `other`, or that field is unset in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        fn compatible<T: PartialEq>(ours: Option<&T>, theirs: Option<&T>) -> bool {
            match (ours, theirs) {
                (Some(ours), Some(theirs)) => ours == theirs,
                _ => true,
            }
        }
        compatible(self.platform.as_ref(), other.platform.as_ref())
            && compatible(self.family.as_ref(), other.family.as_ref())
            && compatible(self.name.as_ref(), other.name.as_ref())
            && compatible(self.type_.as_ref(), other.type_.as_ref())
            && compatible(self.pin_id.as_ref(), other.pin_id.as_ref())
            && compatible(self.size_id.as_ref(), other.size_id.as_ref())
            && compatible(self.core.as_ref(), other.core.as_ref())
    }

    /// Field-wise merge of two identifiers.
    ///
    /// Returns `None` if any field is set in both and the values differ.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        fn merge<T: PartialEq + Clone>(ours: Option<&T>, theirs: Option<&T>) -> Option<Option<T>> {
            match (ours, theirs) {
                (Some(ours), Some(theirs)) if ours != theirs => None,
                (Some(v), _) | (None, Some(v)) => Some(Some(v.clone())),
                (None, None) => Some(None),
            }
        }
        Some(Self {
            platform: merge(self.platform.as_ref(), other.platform.as_ref())?,
            family: merge(self.family.as_ref(), other.family.as_ref())?,
            name: merge(self.name.as_ref(), other.name.as_ref())?,
            type_: merge(self.type_.as_ref(), other.type_.as_ref())?,
            pin_id: merge(self.pin_id.as_ref(), other.pin_id.as_ref())?,
            size_id: merge(self.size_id.as_ref(), other.size_id.as_ref())?,
            core: merge(self.core.as_ref(), other.core.as_ref())?,
        })
    }
}

impl FromStr for DeviceIdentifier {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for DeviceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.platform, self.family.as_deref()) {
            (Some(Platform::Stm32), family) => {
                write!(f, "stm32")?;
                // The family digit is also the first digit of the name
                match (family, &self.name) {
                    (Some(family), Some(_)) => write!(f, "{}", family.get(..1).unwrap_or_default())?,
                    (Some(family), None) => write!(f, "{family}")?,
                    (None, _) => (),
                }
            }
            (Some(Platform::Avr), Some("xmega")) => write!(f, "atxmega")?,
            (_, Some(family)) => write!(f, "{family}")?,
            (_, None) => (),
        }
        for part in [&self.name, &self.type_, &self.pin_id, &self.size_id]
            .into_iter()
            .flatten()
        {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> DeviceIdentifier {
        DeviceIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_display_round_trip() {
        for s in [
            "atmega328p",
            "atmega8",
            "attiny85",
            "at90can128",
            "atxmega128a1u",
            "atxmega64d4",
            "stm32f407vg",
            "linux",
        ] {
            assert_eq!(id(s).to_string(), s);
        }
    }

    #[test]
    fn test_subset() {
        let family = DeviceIdentifier {
            family: Some("atmega".into()),
            ..Default::default()
        };
        assert!(id("atmega328p").is_subset_of(&family));
        assert!(family.is_subset_of(&id("atmega328p")));
        assert!(!id("attiny85").is_subset_of(&family));
        assert!(!id("atmega328p").is_subset_of(&id("atmega168p")));
        assert!(id("atmega328p").is_subset_of(&id("atmega328p")));
    }

    #[test]
    fn test_intersection() {
        let partial = DeviceIdentifier {
            family: Some("atmega".into()),
            core: Some("avr5".into()),
            ..Default::default()
        };
        let merged = id("atmega328p").intersection(&partial).unwrap();
        assert_eq!(merged.name.as_deref(), Some("328"));
        assert_eq!(merged.core.as_deref(), Some("avr5"));

        assert_eq!(id("atmega328p").intersection(&id("atmega168p")), None);
        assert_eq!(id("atmega328p").intersection(&id("attiny85")), None);
    }

    #[test]
    fn test_get_field() {
        let ident = id("atxmega128a1u");
        assert_eq!(ident.get(IdField::Platform).as_deref(), Some("avr"));
        assert_eq!(ident.get(IdField::Type).as_deref(), Some("a1"));
        assert_eq!(ident.get(IdField::PinId).as_deref(), Some("u"));
        assert_eq!(ident.get(IdField::SizeId), None);
    }
}
