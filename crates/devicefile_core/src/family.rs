//! Per family naming and instance extraction rules

use crate::tree::DriverKind;

/// The AVR families the generator knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum Family {
    #[strum(serialize = "at90")]
    At90,
    #[strum(serialize = "attiny")]
    AtTiny,
    #[strum(serialize = "atmega")]
    AtMega,
    #[strum(serialize = "xmega")]
    Xmega,
}

impl Family {
    /// Driver family shared by the classic AVRs
    pub const CLASSIC_DRIVER_NAME: &'static str = "at90_tiny_mega";

    pub fn is_xmega(self) -> bool {
        self == Self::Xmega
    }

    /// Name of the driver family, with the classic families collapsed into one
    pub fn driver_name(self) -> &'static str {
        match self {
            Self::At90 | Self::AtTiny | Self::AtMega => Self::CLASSIC_DRIVER_NAME,
            Self::Xmega => "xmega",
        }
    }

    /// How modules of a peripheral are turned into drivers on this family
    pub fn extraction(self, rule: &PeripheralRule) -> Extraction {
        match self {
            Self::Xmega => rule.xmega,
            _ => rule.classic,
        }
    }

    /// The `name` attribute for drivers following `rule`
    pub fn name_for(self, rule: &PeripheralRule) -> &'static str {
        match (rule.shared_name, self) {
            (true, _) => self.driver_name(),
            (false, Self::At90) => "at90",
            (false, Self::AtTiny) => "attiny",
            (false, Self::AtMega) => "atmega",
            (false, Self::Xmega) => "xmega",
        }
    }
}

/// How the module list of a device is mapped to a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// One driver if any module starts with the prefix
    Presence(&'static str),
    /// One driver listing every suffix after the prefix as an instance
    Instances(&'static str),
    /// Never emitted on this family
    Absent,
}

/// Rule for one peripheral category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralRule {
    pub kind: DriverKind,
    pub classic: Extraction,
    pub xmega: Extraction,
    /// Use [`Family::driver_name`] instead of the raw family name
    pub shared_name: bool,
}

pub const PERIPHERALS: &[PeripheralRule] = &[
    PeripheralRule {
        kind: DriverKind::Adc,
        classic: Extraction::Presence("AD_CONVERTER"),
        xmega: Extraction::Instances("ADC"),
        shared_name: true,
    },
    PeripheralRule {
        kind: DriverKind::Dac,
        classic: Extraction::Presence("DA_CONVERTER"),
        xmega: Extraction::Instances("DAC"),
        shared_name: false,
    },
    PeripheralRule {
        kind: DriverKind::I2c,
        classic: Extraction::Presence("TWI"),
        xmega: Extraction::Instances("TWI"),
        shared_name: true,
    },
    PeripheralRule {
        kind: DriverKind::Spi,
        classic: Extraction::Presence("SPI"),
        xmega: Extraction::Instances("SPI"),
        shared_name: true,
    },
    PeripheralRule {
        kind: DriverKind::Timer,
        classic: Extraction::Instances("TIMER_COUNTER_"),
        xmega: Extraction::Instances("TC"),
        shared_name: false,
    },
    PeripheralRule {
        kind: DriverKind::Usi,
        classic: Extraction::Presence("USI"),
        xmega: Extraction::Absent,
        shared_name: true,
    },
];

impl PeripheralRule {
    pub fn for_kind(kind: DriverKind) -> Option<&'static Self> {
        PERIPHERALS.iter().find(|rule| rule.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_family_normalization() {
        for family in ["at90", "attiny", "atmega"] {
            let family = Family::from_str(family).unwrap();
            assert_eq!(family.driver_name(), "at90_tiny_mega");
        }
        assert_eq!(Family::Xmega.driver_name(), "xmega");
        assert!(Family::from_str("f4").is_err());
        assert_eq!(Family::AtTiny.to_string(), "attiny");
    }

    #[test]
    fn test_rules() {
        let dac = PeripheralRule::for_kind(DriverKind::Dac).unwrap();
        assert_eq!(Family::AtMega.name_for(dac), "atmega");
        assert_eq!(
            Family::AtMega.extraction(dac),
            Extraction::Presence("DA_CONVERTER")
        );
        assert_eq!(Family::Xmega.extraction(dac), Extraction::Instances("DAC"));

        let usi = PeripheralRule::for_kind(DriverKind::Usi).unwrap();
        assert_eq!(Family::Xmega.extraction(usi), Extraction::Absent);
        assert_eq!(Family::AtTiny.name_for(usi), "at90_tiny_mega");

        assert!(PeripheralRule::for_kind(DriverKind::Uart).is_none());
    }
}
