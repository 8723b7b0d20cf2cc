//! Sets of device identifiers and the attributes that tell them apart

use crate::identifier::DeviceIdentifier;
use crate::identifier::IdField;
use compact_str::CompactString;

/// An ordered, deduplicated set of device identifiers.
///
/// Within a property this is the set of devices that share one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IdSet {
    ids: Vec<DeviceIdentifier>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier, returns false if it was already present
    pub fn insert(&mut self, id: DeviceIdentifier) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: &DeviceIdentifier) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceIdentifier> {
        self.ids.iter()
    }

    /// Same members, regardless of insertion order
    pub fn same_members(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        !self.iter().any(|id| other.contains(id))
    }

    /// All distinct values of one field, in order of first appearance.
    ///
    /// Unset fields are reported as `None`.
    pub fn attribute(&self, field: IdField) -> Vec<Option<CompactString>> {
        let mut values = vec![];
        for value in self.iter().map(|id| id.get(field)) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        values
    }

    /// The identifier shared by every member: fields that agree on all
    /// members are kept, everything else is unset.
    pub fn common(&self) -> DeviceIdentifier {
        fn shared<T: PartialEq + Clone>(
            ids: &[DeviceIdentifier],
            field: impl Fn(&DeviceIdentifier) -> &Option<T>,
        ) -> Option<T> {
            let (first, rest) = ids.split_first()?;
            let value = field(first).as_ref()?;
            rest.iter()
                .all(|id| field(id).as_ref() == Some(value))
                .then(|| value.clone())
        }
        DeviceIdentifier {
            platform: shared(&self.ids, |id| &id.platform),
            family: shared(&self.ids, |id| &id.family),
            name: shared(&self.ids, |id| &id.name),
            type_: shared(&self.ids, |id| &id.type_),
            pin_id: shared(&self.ids, |id| &id.pin_id),
            size_id: shared(&self.ids, |id| &id.size_id),
            core: shared(&self.ids, |id| &id.core),
        }
    }

    /// Compute the attributes needed to tag a value held by the devices in
    /// `self`, when the complete device group is `full`.
    ///
    /// If every device in the group has the value a single empty entry is
    /// returned. Otherwise there is one entry per distinct identifier in
    /// `self`, holding only the fields that are defined on it.
    pub fn difference_from_ids(&self, full: &Self) -> Vec<DiscriminatingId> {
        if self.same_members(full) {
            return vec![DiscriminatingId::default()];
        }
        let mut result: Vec<DiscriminatingId> = vec![];
        for id in self.iter().map(DiscriminatingId::from) {
            if !result.contains(&id) {
                result.push(id);
            }
        }
        result
    }
}

impl FromIterator<DeviceIdentifier> for IdSet {
    fn from_iter<T: IntoIterator<Item = DeviceIdentifier>>(iter: T) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a DeviceIdentifier;
    type IntoIter = std::slice::Iter<'a, DeviceIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for IdSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, id) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, "|")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// The minimal set of identifier fields needed to select a value for a
/// concrete device.
///
/// An empty discriminating id applies to every device in the group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DiscriminatingId {
    pub type_: Option<CompactString>,
    pub name: Option<CompactString>,
    pub pin_id: Option<CompactString>,
}

impl DiscriminatingId {
    /// Attribute key used for the device type
    pub const TYPE_KEY: &'static str = "device-type";
    /// Attribute key used for the device name
    pub const NAME_KEY: &'static str = "device-name";
    /// Attribute key used for the device pin id
    pub const PIN_ID_KEY: &'static str = "device-pin-id";

    pub fn is_empty(&self) -> bool {
        self.type_.is_none() && self.name.is_none() && self.pin_id.is_none()
    }

    /// Number of fields that are set
    pub fn specificity(&self) -> usize {
        [&self.type_, &self.name, &self.pin_id]
            .into_iter()
            .filter(|f| f.is_some())
            .count()
    }

    /// The reserved `device-*` attributes, in emission order
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (Self::TYPE_KEY, &self.type_),
            (Self::NAME_KEY, &self.name),
            (Self::PIN_ID_KEY, &self.pin_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    /// Rebuild from `device-*` attributes, other keys are ignored
    pub fn from_attributes<'k, 'v>(
        attributes: impl IntoIterator<Item = (&'k str, &'v str)>,
    ) -> Self {
        let mut id = Self::default();
        for (key, value) in attributes {
            match key {
                Self::TYPE_KEY => id.type_ = Some(value.into()),
                Self::NAME_KEY => id.name = Some(value.into()),
                Self::PIN_ID_KEY => id.pin_id = Some(value.into()),
                _ => (),
            }
        }
        id
    }

    /// True if a concrete device is selected by this id
    pub fn matches(&self, id: &DeviceIdentifier) -> bool {
        fn check(ours: Option<&CompactString>, theirs: Option<&CompactString>) -> bool {
            ours.is_none_or(|ours| theirs == Some(ours))
        }
        check(self.type_.as_ref(), id.type_.as_ref())
            && check(self.name.as_ref(), id.name.as_ref())
            && check(self.pin_id.as_ref(), id.pin_id.as_ref())
    }
}

impl From<&DeviceIdentifier> for DiscriminatingId {
    fn from(id: &DeviceIdentifier) -> Self {
        Self {
            type_: id.type_.clone(),
            name: id.name.clone(),
            pin_id: id.pin_id.clone(),
        }
    }
}
