//! Zone: all nodes and troncons of a PM area, rebuilt into a distribution tree

use crate::config::ChantierConfig;
use crate::error::LayoutError;
use crate::node::{BpeRecord, Cable, Node, NodeId, Nodes, Troncon, Troncons, read_bpe_file};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

pub mod json;
pub mod quantite;
pub mod report;
pub mod rop;
pub mod tree;

pub const DEFAULT_LOVE_LENGTH: i64 = 20;

#[derive(Debug, Clone)]
pub struct Zone {
    pub nodes: Nodes,
    pub troncons: Troncons,
    pub cables: Vec<Cable>,
    /// Root of the tree when a ROP file is provided
    pub sro: NodeId,
    /// Tree roots inferred from the splice plans alone
    pub roots: Vec<NodeId>,
    /// Love length used when none is provided by cable quantities
    pub love_length: i64,
}

impl Default for Zone {
    fn default() -> Self {
        Self::new()
    }
}

impl Zone {
    pub fn new() -> Self {
        let mut nodes = Nodes::new();
        let mut troncons = Troncons::new();
        let adduction = troncons.push_detached(Troncon::new("Aduction"));
        let sro = nodes.push_detached(Node {
            name: "SRO".to_string(),
            pt_name: "SRO".to_string(),
            bpe_type: "SRO".to_string(),
            troncon_in: Some(adduction),
            ..Default::default()
        });
        troncons[adduction].node_dest = Some(sro);
        Self {
            nodes,
            troncons,
            cables: Vec::new(),
            sro,
            roots: Vec::new(),
            love_length: DEFAULT_LOVE_LENGTH,
        }
    }

    pub fn with_config(config: &ChantierConfig) -> Self {
        Self {
            love_length: config.global.love_length,
            ..Self::new()
        }
    }

    /// Parse every splice plan of a directory (files whose name contains `marker`)
    pub fn parse_bpe_dir<P: AsRef<Path>>(&mut self, dir: P, marker: &str) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            anyhow::bail!("'{}' is not a directory", dir.display());
        }
        let files = bpe_files(dir, marker);

        let records = files
            .par_iter()
            .map(|file| {
                read_bpe_file(file)
                    .with_context(|| format!("parsing '{}' returned error", file_name(file)))
            })
            .collect::<Result<Vec<_>>>()?;

        for (file, record) in files.iter().zip(records) {
            let id = self
                .add_bpe_record(record)
                .with_context(|| format!("adding '{}'", file_name(file)))?;
            info!("'{}' parsed", self.nodes[id].pt_name);
        }
        Ok(())
    }

    /// Register a parsed splice plan and link its troncons
    pub fn add_bpe_record(&mut self, record: BpeRecord) -> Result<NodeId, LayoutError> {
        let BpeRecord {
            node,
            troncon_in,
            troncons_out,
            capacities,
        } = record;
        let id = self.nodes.add(node)?;

        if let Some(name) = &troncon_in {
            let tin = self.troncons.get_or_create(name);
            self.troncons[tin].node_dest = Some(id);
            self.nodes[id].troncon_in = Some(tin);
        }
        for name in troncons_out {
            let tout = self.troncons.get_or_create(&name);
            self.troncons[tout].node_source = Some(id);
            self.nodes[id].troncons_out.insert(name, tout);
        }
        for (name, capa) in capacities {
            let tr = self.troncons.get_or_create(&name);
            self.troncons[tr].capa = capa;
            if troncon_in.as_deref() == Some(name.as_str()) {
                continue;
            }
            if self.troncons[tr].node_source.is_none() {
                self.troncons[tr].node_source = Some(id);
            }
            self.nodes[id].troncons_out.insert(name, tr);
        }
        Ok(id)
    }

    /// Nodes the reports start from: the SRO when populated from a ROP file, the roots otherwise
    pub fn tops(&self) -> Vec<NodeId> {
        if self.nodes[self.sro].children.is_empty() {
            self.roots.clone()
        } else {
            vec![self.sro]
        }
    }

    /// Name of a node incoming troncon ("" when none)
    pub fn troncon_in_name(&self, id: NodeId) -> &str {
        self.nodes[id]
            .troncon_in
            .map(|tin| self.troncons[tin].name.as_str())
            .unwrap_or("")
    }
}

/// Splice plan files of a directory, sorted by name
fn bpe_files(dir: &Path, marker: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.contains(marker) && name.ends_with(".xlsx") && !name.starts_with('~')
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pt_name: &str, tin: Option<&str>, outs: &[&str], capacities: &[(&str, usize)]) -> BpeRecord {
        BpeRecord {
            node: Node {
                pt_name: pt_name.to_string(),
                ..Default::default()
            },
            troncon_in: tin.map(str::to_string),
            troncons_out: outs.iter().map(|s| s.to_string()).collect(),
            capacities: capacities
                .iter()
                .map(|(name, capa)| (name.to_string(), *capa))
                .collect(),
        }
    }

    #[test]
    fn test_new_zone_has_sro() {
        let zone = Zone::new();
        assert_eq!(zone.nodes[zone.sro].pt_name, "SRO");
        assert_eq!(zone.troncon_in_name(zone.sro), "Aduction");
        assert!(zone.nodes.is_empty());
        assert!(zone.tops().is_empty());
    }

    #[test]
    fn test_add_bpe_record_links_troncons() {
        let mut zone = Zone::new();
        let a = zone
            .add_bpe_record(record("PT 1", Some("TR-1"), &["TR-2"], &[("TR-1", 48), ("TR-2", 24), ("TR-3", 12)]))
            .unwrap();

        let tr1 = zone.troncons.find("TR-1").unwrap();
        let tr2 = zone.troncons.find("TR-2").unwrap();
        let tr3 = zone.troncons.find("TR-3").unwrap();
        assert_eq!(zone.troncons[tr1].node_dest, Some(a));
        assert_eq!(zone.troncons[tr1].capa, 48);
        assert_eq!(zone.troncons[tr2].node_source, Some(a));
        assert_eq!(zone.troncons[tr3].node_source, Some(a));
        assert_eq!(zone.nodes[a].troncons_out.len(), 2);
        assert!(!zone.nodes[a].troncons_out.contains_key("TR-1"));
    }

    #[test]
    fn test_duplicate_node_is_an_error() {
        let mut zone = Zone::new();
        zone.add_bpe_record(record("PT 1", None, &[], &[])).unwrap();
        let err = zone.add_bpe_record(record("PT 1", None, &[], &[])).unwrap_err();
        assert_eq!(err.to_string(), "node PT 1 was already defined");
    }

    #[test]
    fn test_parse_missing_dir() {
        let mut zone = Zone::new();
        assert!(zone.parse_bpe_dir("/nonexistent/bpe/dir", "PT").is_err());
    }

    #[test]
    fn test_love_length_from_config() {
        let mut config = ChantierConfig::default();
        config.global.love_length = 12;
        assert_eq!(Zone::with_config(&config).love_length, 12);
    }
}
