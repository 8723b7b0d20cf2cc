//! The property model for one device group

use crate::gpio::GpioPin;
use crate::id_set::IdSet;
use crate::identifier::DeviceIdentifier;
use crate::property::Property;
use crate::property::PropertyError;
use compact_str::CompactString;

/// Raw description of one concrete chip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct DeviceRecord {
    /// Device string, e.g. `atmega328p`
    pub device: CompactString,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flash: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ram: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub eeprom: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub core: Option<CompactString>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mcu: Option<CompactString>,
    /// Key into the pin reference table
    #[cfg_attr(feature = "serde", serde(default))]
    pub pin_name: Option<CompactString>,
    /// Raw peripheral instance names, e.g. `USART0`, `TWI`
    #[cfg_attr(feature = "serde", serde(default))]
    pub modules: Option<Vec<CompactString>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub gpios: Option<Vec<GpioPin>>,
}

/// All properties of a device group, each value tagged with the devices
/// that have it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    ids: IdSet,
    pub flash: Property<u64>,
    pub ram: Property<u64>,
    pub eeprom: Property<u64>,
    pub core: Property<CompactString>,
    pub mcu: Property<CompactString>,
    pub pin_name: Property<CompactString>,
    pub modules: Property<Vec<CompactString>>,
    pub gpios: Property<Vec<GpioPin>>,
}

impl Device {
    /// An empty group with the given members
    pub fn new(ids: IdSet) -> Self {
        Self {
            ids,
            flash: Property::new("flash"),
            ram: Property::new("ram"),
            eeprom: Property::new("eeprom"),
            core: Property::new("core"),
            mcu: Property::new("mcu"),
            pin_name: Property::new("pin-name"),
            modules: Property::new("modules"),
            gpios: Property::new("gpios"),
        }
    }

    /// Merge per-chip records into one property model
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a DeviceRecord>,
    ) -> Result<Self, PropertyError> {
        let mut device = Self::new(IdSet::new());
        for record in records {
            let id = DeviceIdentifier::parse(&record.device)?;
            if !device.ids.insert(id.clone()) {
                return Err(PropertyError::Overlap("device", id));
            }
            insert(&mut device.flash, record.flash, &id)?;
            insert(&mut device.ram, record.ram, &id)?;
            insert(&mut device.eeprom, record.eeprom, &id)?;
            insert(&mut device.core, record.core.clone(), &id)?;
            insert(&mut device.mcu, record.mcu.clone(), &id)?;
            insert(&mut device.pin_name, record.pin_name.clone(), &id)?;
            insert(&mut device.modules, record.modules.clone(), &id)?;
            insert(&mut device.gpios, record.gpios.clone(), &id)?;
        }
        Ok(device)
    }

    /// Every device in the group
    pub fn ids(&self) -> &IdSet {
        &self.ids
    }

    /// The concrete device, if the group contains exactly one
    pub fn id(&self) -> Option<&DeviceIdentifier> {
        match self.ids.len() {
            1 => self.ids.iter().next(),
            _ => None,
        }
    }

    /// Check the partition invariant on every property that is present
    pub fn validate(&self) -> Result<(), PropertyError> {
        self.validate_consistency()?;
        let ids = &self.ids;
        for result in [
            skip_empty(&self.flash, ids),
            skip_empty(&self.ram, ids),
            skip_empty(&self.eeprom, ids),
            skip_empty(&self.core, ids),
            skip_empty(&self.mcu, ids),
            skip_empty(&self.pin_name, ids),
            skip_empty(&self.modules, ids),
            skip_empty(&self.gpios, ids),
        ] {
            result?;
        }
        Ok(())
    }

    /// Check that no device has two values for a property and that every
    /// value belongs to a member of the group. A property may still be
    /// missing for some devices.
    pub fn validate_consistency(&self) -> Result<(), PropertyError> {
        let ids = &self.ids;
        self.flash.validate_disjoint(ids)?;
        self.ram.validate_disjoint(ids)?;
        self.eeprom.validate_disjoint(ids)?;
        self.core.validate_disjoint(ids)?;
        self.mcu.validate_disjoint(ids)?;
        self.pin_name.validate_disjoint(ids)?;
        self.modules.validate_disjoint(ids)?;
        self.gpios.validate_disjoint(ids)
    }
}

fn insert<T: PartialEq>(
    property: &mut Property<T>,
    value: Option<T>,
    id: &DeviceIdentifier,
) -> Result<(), PropertyError> {
    match value {
        Some(value) => property.insert(value, id.clone()),
        None => Ok(()),
    }
}

fn skip_empty<T: PartialEq>(property: &Property<T>, ids: &IdSet) -> Result<(), PropertyError> {
    if property.is_empty() {
        return Ok(());
    }
    property.validate_coverage(ids)
}
