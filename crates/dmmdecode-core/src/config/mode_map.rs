use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A mode label and the icons that define it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeLabel {
    pub label: String,
    pub icons: Vec<String>,
}

/// Mode labels in profile order.
///
/// Order decides ties during mode selection, so the map keeps the order the
/// profile lists its entries in. A repeated label keeps its first position
/// and takes the later icon list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeLabelMap {
    entries: Vec<ModeLabel>,
}

impl ModeLabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, icons: Vec<String>) {
        let label = label.into();
        match self.entries.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => entry.icons = icons,
            None => self.entries.push(ModeLabel { label, icons }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModeLabel> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L, I, S> FromIterator<(L, I)> for ModeLabelMap
where
    L: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (L, I)>>(iter: T) -> Self {
        let mut map = ModeLabelMap::new();
        for (label, icons) in iter {
            map.insert(label, icons.into_iter().map(Into::into).collect());
        }
        map
    }
}

impl Serialize for ModeLabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.label, &entry.icons)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ModeLabelMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ModeLabelMapVisitor)
    }
}

struct ModeLabelMapVisitor;

impl<'de> Visitor<'de> for ModeLabelMapVisitor {
    type Value = ModeLabelMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from mode label to a list of icon names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = ModeLabelMap::new();
        while let Some((label, icons)) = access.next_entry::<String, Vec<String>>()? {
            map.insert(label, icons);
        }
        Ok(map)
    }
}
