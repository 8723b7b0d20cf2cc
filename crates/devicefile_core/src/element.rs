//! Generic element tree handed to the templating layer

use compact_str::CompactString;
use compact_str::ToCompactString;

/// A named node with ordered attributes, optional text and ordered children.
///
/// Attribute order is insertion order. Setting an attribute that already
/// exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: CompactString,
    attributes: Vec<(CompactString, CompactString)>,
    text: Option<CompactString>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_attribute(&mut self, key: &str, value: impl ToCompactString) {
        let value = value.to_compact_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.into(), value)),
        }
    }

    pub fn set_attributes<K, V>(&mut self, attributes: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: ToCompactString,
    {
        for (key, value) in attributes {
            self.set_attribute(key.as_ref(), value);
        }
    }

    /// Builder style variant of [`Self::set_attribute`]
    pub fn with_attribute(mut self, key: &str, value: impl ToCompactString) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_text(&mut self, text: impl ToCompactString) {
        self.text = Some(text.to_compact_string());
    }

    pub fn with_text(mut self, text: impl ToCompactString) -> Self {
        self.set_text(text);
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Append a child and return a reference to it
    pub fn add_child(&mut self, child: Self) -> &mut Self {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn children_by_tag<'a, 't>(&'a self, tag: &'t str) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Text of the first child with the given tag
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.children_by_tag(tag).next().and_then(Self::text)
    }

    pub(crate) fn retain_children(&mut self, keep: impl FnMut(&Self) -> bool) {
        self.children.retain(keep);
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }
}
