use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

pub const LAYER_COUNT: usize = 6;
pub const MAX_CHARACTER_LEN: usize = 20;

/// Shown for a key that has no assignment on the current layer.
pub const UNASSIGNED: &str = "-";

/// One of the six key-assignment namespaces, 0 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Layer(u8);

impl Layer {
    pub const BASE: Layer = Layer(0);

    pub fn new(index: i64) -> Result<Self> {
        if (0..LAYER_COUNT as i64).contains(&index) {
            Ok(Layer(index as u8))
        } else {
            Err(Error::LayerOutOfRange(index))
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Layer> {
        (0..LAYER_COUNT as u8).map(Layer)
    }

    /// Parses a wire key, which may be written as a string ("2") or a number.
    pub fn parse(key: &str) -> Result<Self> {
        let index = key
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidLayerKey(key.to_string()))?;
        Self::new(index)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a physical key slot, independent of what it produces.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPosition(String);

impl KeyPosition {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyPosition {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for KeyPosition {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAssignment {
    pub layer: Layer,
    pub position: KeyPosition,
    pub character: String,
}

/// Trims and checks a character before it may be assigned to a key.
pub fn validate_character(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyCharacter);
    }
    let len = trimmed.chars().count();
    if len > MAX_CHARACTER_LEN {
        return Err(Error::CharacterTooLong { len });
    }
    Ok(trimmed.to_string())
}

/// Wire shape of a snapshot: layer key → position → character.
pub type WireKeymaps = BTreeMap<String, BTreeMap<String, String>>;

/// All six layers of one user's assignments. Always complete: a layer with no
/// assignments is present and empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keymaps {
    layers: [BTreeMap<KeyPosition, String>; LAYER_COUNT],
}

impl Keymaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, layer: Layer, position: &str) -> Option<&str> {
        self.layers[layer.index()].get(position).map(String::as_str)
    }

    /// Label for display: the assignment or [`UNASSIGNED`].
    pub fn label(&self, layer: Layer, position: &str) -> &str {
        self.get(layer, position).unwrap_or(UNASSIGNED)
    }

    /// Sets an assignment, returning what it replaced.
    pub fn assign(
        &mut self,
        layer: Layer,
        position: KeyPosition,
        character: impl Into<String>,
    ) -> Option<String> {
        self.layers[layer.index()].insert(position, character.into())
    }

    pub fn layer(&self, layer: Layer) -> &BTreeMap<KeyPosition, String> {
        &self.layers[layer.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(BTreeMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(BTreeMap::len).sum()
    }

    pub fn assignments(&self) -> impl Iterator<Item = KeyAssignment> + '_ {
        Layer::all().flat_map(move |layer| {
            self.layer(layer)
                .iter()
                .map(move |(position, character)| KeyAssignment {
                    layer,
                    position: position.clone(),
                    character: character.clone(),
                })
        })
    }

    pub fn from_assignments(assignments: impl IntoIterator<Item = KeyAssignment>) -> Self {
        let mut keymaps = Self::new();
        for a in assignments {
            keymaps.assign(a.layer, a.position, a.character);
        }
        keymaps
    }

    /// Every layer is emitted, empty ones included.
    pub fn to_wire(&self) -> WireKeymaps {
        Layer::all()
            .map(|layer| {
                let entries = self
                    .layer(layer)
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.clone()))
                    .collect();
                (layer.to_string(), entries)
            })
            .collect()
    }

    /// Missing layers stay empty; out-of-range layer keys are rejected.
    pub fn from_wire(wire: WireKeymaps) -> Result<Self> {
        let mut keymaps = Self::new();
        for (key, entries) in wire {
            let layer = Layer::parse(&key)?;
            for (position, character) in entries {
                keymaps.assign(layer, KeyPosition::new(position), character);
            }
        }
        Ok(keymaps)
    }
}

impl Serialize for Keymaps {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Keymaps {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = WireKeymaps::deserialize(deserializer)?;
        Keymaps::from_wire(wire).map_err(serde::de::Error::custom)
    }
}
