//! Troncons: cable sections linking two nodes

use super::NodeId;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// Index of a troncon in its [`Troncons`] arena
pub type TronconId = usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Troncon {
    pub name: String,
    /// Number of fibers
    pub capa: usize,
    pub cable_type: String,
    pub love_length: i64,
    pub underground_length: i64,
    pub aerial_length: i64,
    pub facade_length: i64,

    pub node_source: Option<NodeId>,
    pub node_dest: Option<NodeId>,
}

impl Troncon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Capacity as written in reports ("144FO")
    pub fn capa_string(&self) -> String {
        format!("{}FO", self.capa)
    }
}

/// Arena of troncons, indexed by name
#[derive(Debug, Clone, Default)]
pub struct Troncons {
    items: Vec<Troncon>,
    index: BTreeMap<String, TronconId>,
}

impl Troncons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the troncon having given name, created on first use
    pub fn get_or_create(&mut self, name: &str) -> TronconId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = self.push_detached(Troncon::new(name));
        self.index.insert(name.to_string(), id);
        id
    }

    /// Add a troncon which is not reachable by name (SRO adduction, inferred PM input)
    pub fn push_detached(&mut self, troncon: Troncon) -> TronconId {
        self.items.push(troncon);
        self.items.len() - 1
    }

    pub fn find(&self, name: &str) -> Option<TronconId> {
        self.index.get(name).copied()
    }

    /// Named troncons, sorted by name
    pub fn named(&self) -> impl Iterator<Item = &Troncon> {
        self.index.values().map(|id| &self.items[*id])
    }

    /// Number of named troncons
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Index<TronconId> for Troncons {
    type Output = Troncon;

    fn index(&self, id: TronconId) -> &Troncon {
        &self.items[id]
    }
}

impl IndexMut<TronconId> for Troncons {
    fn index_mut(&mut self, id: TronconId) -> &mut Troncon {
        &mut self.items[id]
    }
}
