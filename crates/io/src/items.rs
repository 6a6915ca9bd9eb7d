//! Item descriptors, catalog and selection.

use crate::error::IoError;

/// How the values of an item relate to the time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    /// Sampled at the time-step instant.
    #[default]
    Instantaneous,
    /// Accumulated over the step interval.
    Accumulated,
}

impl ValueType {
    /// On-disk tag byte.
    pub(crate) fn to_tag(self) -> u8 {
        match self {
            Self::Instantaneous => 0,
            Self::Accumulated => 1,
        }
    }

    /// Decode an on-disk tag byte.
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Instantaneous),
            1 => Some(Self::Accumulated),
            _ => None,
        }
    }
}

/// Descriptor of one data item: name, physical unit, value type.
///
/// Names are conventionally unique within a catalog but uniqueness is not
/// enforced; name resolution returns the first exact match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    name: String,
    unit: String,
    value_type: ValueType,
}

impl ItemInfo {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, unit: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            value_type,
        }
    }

    /// Shorthand for an instantaneous item.
    pub fn instantaneous(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self::new(name, unit, ValueType::Instantaneous)
    }

    /// Item name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical unit.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Value type tag.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// One entry of an explicit item selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelector {
    /// Item by position in the catalog.
    Index(usize),
    /// Item by exact name match.
    Name(String),
}

/// Which items of a catalog to read.
///
/// Resolved once into a concrete ordered index list before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemSelection {
    /// Every item, in catalog order.
    #[default]
    All,
    /// An explicit list of items; the given order is preserved.
    Select(Vec<ItemSelector>),
}

impl ItemSelection {
    /// Selection by catalog positions.
    pub fn by_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::Select(indices.into_iter().map(ItemSelector::Index).collect())
    }

    /// Selection by exact item names.
    pub fn by_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::Select(
            names
                .into_iter()
                .map(|n| ItemSelector::Name(n.into()))
                .collect(),
        )
    }
}

/// Ordered list of item descriptors shared by reader and writer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemCatalog {
    items: Vec<ItemInfo>,
}

impl ItemCatalog {
    /// Wrap an ordered descriptor list.
    pub fn new(items: Vec<ItemInfo>) -> Self {
        Self { items }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Descriptor at `index`.
    pub fn get(&self, index: usize) -> Option<&ItemInfo> {
        self.items.get(index)
    }

    /// All descriptors in catalog order.
    pub fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    /// Position of the first item whose name matches exactly.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name == name)
    }

    /// Resolve a selection into concrete catalog positions, preserving the
    /// caller-given order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::IndexOutOfRange`] for an index past the catalog
    /// and [`IoError::UnknownItem`] for a name with no exact match.
    pub fn resolve(&self, selection: &ItemSelection) -> Result<Vec<usize>, IoError> {
        match selection {
            ItemSelection::All => Ok((0..self.items.len()).collect()),
            ItemSelection::Select(selectors) => selectors
                .iter()
                .map(|selector| match selector {
                    ItemSelector::Index(index) => {
                        if *index >= self.items.len() {
                            Err(IoError::IndexOutOfRange {
                                index: *index,
                                len: self.items.len(),
                            })
                        } else {
                            Ok(*index)
                        }
                    }
                    ItemSelector::Name(name) => {
                        self.index_of(name).ok_or_else(|| IoError::UnknownItem {
                            name: name.clone(),
                        })
                    }
                })
                .collect(),
        }
    }
}
