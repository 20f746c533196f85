//! Nodes of the fiber distribution tree (SRO, PM, BPE, PBO) and their operations

use crate::error::LayoutError;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

pub mod bpe;
pub mod cable;
pub mod troncon;

pub use bpe::{BpeRecord, parse_bpe_sheet, read_bpe_file};
pub use cable::{Cable, Lengths};
pub use troncon::{Troncon, TronconId, Troncons};

/// Index of a node in its [`Nodes`] arena
pub type NodeId = usize;

pub const LOCATION_SRO: &str = "SRO";
pub const LOCATION_PM: &str = "PM";
pub const LOCATION_BPE: &str = "BPE";
pub const LOCATION_PBO: &str = "PBO";

const SPLICE_PREFIX: &str = "Epissure->";
const PASSAGE_PREFIX: &str = "Passage->";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Reference of the site (e.g. 3001)
    pub name: String,
    /// Point name (e.g. PT 182002)
    pub pt_name: String,
    /// Box model (e.g. TENIO T1)
    pub bpe_type: String,
    /// SRO, PM, BPE or PBO
    pub location_type: String,
    pub address: String,
    pub dist_from_pm: i64,

    pub troncon_in: Option<TronconId>,
    /// Outgoing troncons by name
    pub troncons_out: BTreeMap<String, TronconId>,
    /// Operation counters by key ("Epissure->TR-xxx", "Attente", ...)
    pub operations: BTreeMap<String, usize>,

    pub start_drawer: String,
    pub end_drawer: String,
    /// Point names where the fibers to be measured are spliced
    pub splice_pts: Vec<String>,

    pub children: Vec<NodeId>,
    pub is_child: bool,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inferred PM node (splitting point) heading a subtree
    pub fn new_pm() -> Self {
        Self {
            name: "PM".to_string(),
            pt_name: "PT PM".to_string(),
            bpe_type: "PM".to_string(),
            location_type: LOCATION_PM.to_string(),
            ..Default::default()
        }
    }

    /// Count an operation done on a fiber; `Love` and empty operations are ignored
    pub fn add_operation(&mut self, troncon_in: &str, ope: &str, fiber_out: &str, troncon_out: &str) {
        if let Some(key) = operation_key(troncon_in, ope, fiber_out, troncon_out) {
            *self.operations.entry(key).or_default() += 1;
        }
    }

    /// Location type after a splice plan parse: BPE when fibers are spliced, PBO otherwise
    pub fn set_location_type(&mut self) {
        let (nb_splice, _) = self.numbers();
        self.location_type = if nb_splice > 0 {
            LOCATION_BPE.to_string()
        } else {
            LOCATION_PBO.to_string()
        };
    }

    /// Number of fibers to be measured on this node
    ///
    /// - PM node: number of `Epissure` operations
    /// - BPE/PBO node: number of `Attente` operations
    pub fn to_be_measured_fibers(&self) -> usize {
        if self.dist_from_pm == 0 {
            return 0;
        }
        let key = if self.location_type == LOCATION_PM {
            "Epissure"
        } else {
            "Attente"
        };
        self.operations.get(key).copied().unwrap_or(0)
    }

    /// Numbers of splices and other operations on this node
    pub fn numbers(&self) -> (usize, usize) {
        self.operations
            .keys()
            .map(|ope| self.operation_numbers(ope))
            .fold((0, 0), |(epi, other), (e, o)| (epi + e, other + o))
    }

    /// Numbers of splices and other operations for one operation key
    pub fn operation_numbers(&self, ope: &str) -> (usize, usize) {
        let nb = self.operations.get(ope).copied().unwrap_or(0);
        if ope.to_lowercase().starts_with("epissure") {
            (nb, 0)
        } else {
            (0, nb)
        }
    }

    /// Keep the lowest and highest drawer positions
    pub fn add_drawer_info(&mut self, drawer: &str) {
        if self.start_drawer.is_empty() {
            self.start_drawer = drawer.to_string();
            self.end_drawer = drawer.to_string();
            return;
        }
        if self.start_drawer.as_str() > drawer {
            self.start_drawer = drawer.to_string();
        }
        if self.end_drawer.as_str() < drawer {
            self.end_drawer = drawer.to_string();
        }
    }

    /// Outgoing troncons receiving spliced fibers
    pub fn splice_troncons(&self) -> Vec<TronconId> {
        self.linked_troncons(SPLICE_PREFIX).collect()
    }

    /// First outgoing troncon receiving passing fibers
    pub fn troncon_passage(&self) -> Option<TronconId> {
        self.linked_troncons(PASSAGE_PREFIX).next()
    }

    /// Names of the troncons targeted by splice operations
    pub fn spliced_troncon_names(&self) -> Vec<&str> {
        self.operations
            .keys()
            .filter_map(|ope| ope.strip_prefix(SPLICE_PREFIX))
            .filter(|name| !name.is_empty())
            .collect()
    }

    fn linked_troncons<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = TronconId> + 'a {
        self.operations
            .keys()
            .filter_map(move |ope| ope.strip_prefix(prefix))
            .filter_map(|name| self.troncons_out.get(name).copied())
    }

    /// Capacity of the troncon an operation leads to ("" for unlinked operations)
    pub fn operation_capa(&self, ope: &str, troncons: &Troncons) -> String {
        operation_troncon(ope)
            .and_then(|name| self.troncons_out.get(name))
            .map(|id| troncons[*id].capa_string())
            .unwrap_or_default()
    }
}

/// Operation key: title-cased operation, linked to the outgoing troncon when a fiber goes out
pub fn operation_key(troncon_in: &str, ope: &str, fiber_out: &str, troncon_out: &str) -> Option<String> {
    if ope == "Love" || ope.is_empty() {
        return None;
    }
    let mut key = title_case(ope);
    if !fiber_out.is_empty() {
        key.push_str(if troncon_in.is_empty() { "<-" } else { "->" });
        key.push_str(troncon_out);
    }
    Some(key)
}

/// Troncon name an operation key is linked to
pub fn operation_troncon(ope: &str) -> Option<&str> {
    ope.split_once("->").map(|(_, name)| name)
}

/// Lowercase the text, then uppercase the first letter of each word
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut start_of_word = true;
    for c in text.to_lowercase().chars() {
        if start_of_word {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        start_of_word = !(c.is_alphanumeric() || c == '_');
    }
    result
}

/// Arena of nodes, indexed by point name
#[derive(Debug, Clone, Default)]
pub struct Nodes {
    items: Vec<Node>,
    index: BTreeMap<String, NodeId>,
}

impl Nodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node reachable by its point name
    pub fn add(&mut self, node: Node) -> Result<NodeId, LayoutError> {
        if self.index.contains_key(&node.pt_name) {
            return Err(LayoutError::DuplicateNode(node.pt_name));
        }
        let id = self.push_detached(node);
        self.index.insert(self.items[id].pt_name.clone(), id);
        Ok(id)
    }

    /// Make an existing node reachable by its point name
    pub fn register(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let pt_name = self.items[id].pt_name.clone();
        match self.index.get(&pt_name) {
            Some(existing) if *existing != id => Err(LayoutError::DuplicateNode(pt_name)),
            _ => {
                self.index.insert(pt_name, id);
                Ok(())
            }
        }
    }

    /// Add a node which is not reachable by name (inferred PM nodes)
    pub fn push_detached(&mut self, node: Node) -> NodeId {
        self.items.push(node);
        self.items.len() - 1
    }

    pub fn find(&self, pt_name: &str) -> Option<NodeId> {
        self.index.get(pt_name).copied()
    }

    /// Ids of named nodes, sorted by point name
    pub fn named_ids(&self) -> Vec<NodeId> {
        self.index.values().copied().collect()
    }

    /// Children of a node, sorted by point name
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.items[id].children.clone();
        children.sort_by(|a, b| self.items[*a].pt_name.cmp(&self.items[*b].pt_name));
        children
    }

    /// Depth-first walk from the given tops, children sorted by point name
    pub fn walk(&self, tops: &[NodeId]) -> Vec<NodeId> {
        let mut visited = vec![false; self.items.len()];
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = tops.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if visited[id] {
                continue;
            }
            visited[id] = true;
            order.push(id);
            stack.extend(self.sorted_children(id).into_iter().rev());
        }
        order
    }

    /// Number of named nodes
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Index<NodeId> for Nodes {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.items[id]
    }
}

impl IndexMut<NodeId> for Nodes {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.items[id]
    }
}
