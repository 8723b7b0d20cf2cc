//! Values that differ between the devices of a group

use crate::id_set::IdSet;
use crate::identifier::DeviceIdentifier;

/// Violations of the property model invariants
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum PropertyError {
    #[error("Device {1} has more than one value for property {0}")]
    Overlap(&'static str, DeviceIdentifier),
    #[error("Device {1} has no value for property {0}")]
    Uncovered(&'static str, DeviceIdentifier),
    #[error("Property {0} has a value for {1}, which is not part of the device group")]
    Foreign(&'static str, DeviceIdentifier),
    #[error("Invalid device string: {0}")]
    Format(#[from] crate::identifier::FormatError),
}

/// One distinct value of a property, and the devices that have it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue<T> {
    pub value: T,
    pub ids: IdSet,
}

/// All distinct values of a named property across a device group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property<T> {
    name: &'static str,
    values: Vec<PropertyValue<T>>,
}

impl<T: PartialEq> Property<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            values: vec![],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn values(&self) -> &[PropertyValue<T>] {
        &self.values
    }

    /// A property with no values was not present in the input
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Record that `id` has `value`.
    ///
    /// Devices with equal values are merged into the same id subset. A device
    /// can only ever have one value per property.
    pub fn insert(&mut self, value: T, id: DeviceIdentifier) -> Result<(), PropertyError> {
        if self
            .values
            .iter()
            .any(|v| v.value != value && v.ids.contains(&id))
        {
            return Err(PropertyError::Overlap(self.name, id));
        }
        if let Some(existing) = self.values.iter_mut().find(|v| v.value == value) {
            existing.ids.insert(id);
            return Ok(());
        }
        self.values.push(PropertyValue {
            value,
            ids: IdSet::from_iter([id]),
        });
        Ok(())
    }

    /// The value a concrete device has
    pub fn value_for(&self, id: &DeviceIdentifier) -> Option<&T> {
        self.values
            .iter()
            .find(|v| v.ids.contains(id))
            .map(|v| &v.value)
    }

    /// Check that the id subsets partition `full` exactly.
    pub fn validate(&self, full: &IdSet) -> Result<(), PropertyError> {
        self.validate_disjoint(full)?;
        self.validate_coverage(full)
    }

    /// Check that the id subsets are disjoint and only name members of
    /// `full`. Devices without a value are allowed.
    pub fn validate_disjoint(&self, full: &IdSet) -> Result<(), PropertyError> {
        for (idx, value) in self.values.iter().enumerate() {
            for id in &value.ids {
                if !full.contains(id) {
                    return Err(PropertyError::Foreign(self.name, id.clone()));
                }
                if self.values[idx + 1..].iter().any(|v| v.ids.contains(id)) {
                    return Err(PropertyError::Overlap(self.name, id.clone()));
                }
            }
        }
        Ok(())
    }

    /// Check that every member of `full` has a value
    pub fn validate_coverage(&self, full: &IdSet) -> Result<(), PropertyError> {
        match full
            .iter()
            .find(|id| !self.values.iter().any(|v| v.ids.contains(id)))
        {
            Some(id) => Err(PropertyError::Uncovered(self.name, id.clone())),
            None => Ok(()),
        }
    }
}

impl<T> Property<T> {
    /// Build from already grouped values
    pub fn from_values(name: &'static str, values: Vec<PropertyValue<T>>) -> Self {
        Self { name, values }
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
    fn test_insert_merges_equal_values() {
        let mut ram = Property::new("ram");
        ram.insert(512u64, id("atmega48")).unwrap();
        ram.insert(1024, id("atmega88")).unwrap();
        ram.insert(1024, id("atmega168")).unwrap();

        assert_eq!(ram.values().len(), 2);
        assert_eq!(ram.values()[1].ids.len(), 2);
        assert_eq!(ram.value_for(&id("atmega168")), Some(&1024));
        assert_eq!(ram.value_for(&id("atmega328")), None);
    }

    #[test]
    fn test_insert_rejects_second_value() {
        let mut ram = Property::new("ram");
        ram.insert(512u64, id("atmega48")).unwrap();
        assert_eq!(
            ram.insert(1024, id("atmega48")),
            Err(PropertyError::Overlap("ram", id("atmega48")))
        );
    }

    #[test]
    fn test_insert_rejects_move_to_existing_value() {
        let mut ram = Property::new("ram");
        ram.insert(512u64, id("atmega48")).unwrap();
        ram.insert(1024, id("atmega88")).unwrap();
        assert_eq!(
            ram.insert(1024, id("atmega48")),
            Err(PropertyError::Overlap("ram", id("atmega48")))
        );
        assert_eq!(ram.values()[1].ids.len(), 1);
        assert_eq!(ram.value_for(&id("atmega48")), Some(&512));
        // Repeating the same value is fine
        assert_eq!(ram.insert(512, id("atmega48")), Ok(()));
    }

    #[test]
    fn test_validate() {
        let full: IdSet = [id("atmega48"), id("atmega88")].into_iter().collect();
        let mut ram = Property::new("ram");
        ram.insert(512u64, id("atmega48")).unwrap();
        assert_eq!(
            ram.validate(&full),
            Err(PropertyError::Uncovered("ram", id("atmega88")))
        );
        assert_eq!(ram.validate_disjoint(&full), Ok(()));
        ram.insert(1024, id("atmega88")).unwrap();
        assert_eq!(ram.validate(&full), Ok(()));

        let overlapping = Property::from_values(
            "ram",
            vec![
                PropertyValue {
                    value: 512u64,
                    ids: full.clone(),
                },
                PropertyValue {
                    value: 1024,
                    ids: [id("atmega88")].into_iter().collect(),
                },
            ],
        );
        assert_eq!(
            overlapping.validate(&full),
            Err(PropertyError::Overlap("ram", id("atmega88")))
        );

        ram.insert(2048, id("atmega328")).unwrap();
        assert_eq!(
            ram.validate_disjoint(&full),
            Err(PropertyError::Foreign("ram", id("atmega328")))
        );
        assert_eq!(
            ram.validate(&full),
            Err(PropertyError::Foreign("ram", id("atmega328")))
        );
    }
}
