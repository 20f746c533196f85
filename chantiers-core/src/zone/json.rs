//! JSON export of a zone as a tracking site

use super::Zone;
use crate::node::NodeId;
use crate::ripsite;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

impl Zone {
    /// Write `<name>.json` in the given directory
    pub fn write_json<P: AsRef<Path>>(&self, dir: P, name: &str) -> Result<PathBuf> {
        if self.nodes.is_empty() {
            anyhow::bail!("zone is empty, nothing to write to Json");
        }
        let file = dir.as_ref().join(format!("{name}.json"));
        let site = self.to_site(name);

        let writer = BufWriter::new(
            File::create(&file).with_context(|| format!("could not create file {}", file.display()))?,
        );
        serde_json::to_writer(writer, &site)?;
        info!("{} written", file.display());
        Ok(file)
    }

    /// Site model of the zone
    pub fn to_site(&self, name: &str) -> ripsite::Site {
        let mut site = ripsite::Site::new(name);
        self.add_site_nodes(&mut site);
        self.add_site_troncons(&mut site);
        self.add_site_pullings(&mut site);
        self.add_site_junctions(&mut site);
        self.add_site_measurements(&mut site);
        site
    }

    fn add_site_nodes(&self, site: &mut ripsite::Site) {
        for id in self.nodes.named_ids() {
            let node = &self.nodes[id];
            site.nodes.insert(
                node.pt_name.clone(),
                ripsite::Node {
                    name: node.pt_name.clone(),
                    address: node.address.clone(),
                    node_type: node.location_type.clone(),
                    box_type: node.bpe_type.clone(),
                    reference: node.name.clone(),
                    troncon_in_name: self.troncon_in_name(id).to_string(),
                    dist_from_pm: node.dist_from_pm,
                },
            );
        }
    }

    fn add_site_troncons(&self, site: &mut ripsite::Site) {
        for troncon in self.troncons.named() {
            site.troncons.insert(
                troncon.name.clone(),
                ripsite::Troncon {
                    name: troncon.name.clone(),
                    size: troncon.capa,
                },
            );
        }
    }

    fn add_site_pullings(&self, site: &mut ripsite::Site) {
        for cable in &self.cables {
            let Some(first) = cable.first_troncon() else {
                continue;
            };
            if self.troncons[first].cable_type.is_empty() {
                continue;
            }
            let mut pulling = ripsite::Pulling {
                cable_name: self.troncons[first].cable_type.clone(),
                chuncks: Vec::new(),
                state: ripsite::State::to_do(),
            };
            for tr in &cable.troncons {
                let troncon = &self.troncons[*tr];
                let node_name = |node: Option<NodeId>| {
                    node.map(|id| self.nodes[id].pt_name.clone())
                        .unwrap_or_default()
                };
                let mut chunk = ripsite::PullingChunk {
                    troncon_name: troncon.name.clone(),
                    starting_node_name: node_name(troncon.node_source),
                    ending_node_name: node_name(troncon.node_dest),
                    love_dist: troncon.love_length,
                    underground_dist: troncon.underground_length,
                    aerial_dist: troncon.aerial_length,
                    building_dist: troncon.facade_length,
                    state: ripsite::State::to_do(),
                };
                if chunk.total_dist() == 0 {
                    chunk.love_dist = self.love_length;
                    chunk.underground_dist = self.troncon_distance(*tr);
                }
                pulling.chuncks.push(chunk);
            }
            site.pullings.push(pulling);
        }
    }

    fn add_site_junctions(&self, site: &mut ripsite::Site) {
        for id in self.nodes.walk(&self.tops()) {
            let node = &self.nodes[id];
            let operations = node
                .operations
                .keys()
                .map(|ope| {
                    let (operation_type, troncon_name) = junction_operation(ope);
                    let (epi, other) = node.operation_numbers(ope);
                    ripsite::Operation {
                        operation_type: operation_type.to_string(),
                        troncon_name: troncon_name.to_string(),
                        nb_fiber: epi + other,
                        nb_splice: epi,
                        state: ripsite::State::to_do(),
                    }
                })
                .collect();
            site.junctions.push(ripsite::Junction {
                node_name: node.pt_name.clone(),
                operations,
                state: ripsite::State::to_do(),
            });
        }
    }

    /// Measured nodes below the SRO
    fn add_site_measurements(&self, site: &mut ripsite::Site) {
        for id in self.nodes.walk(&[self.sro]) {
            let node = &self.nodes[id];
            let nb_fiber = node.to_be_measured_fibers();
            if nb_fiber == 0 {
                continue;
            }
            site.measurements.push(ripsite::Measurement {
                dest_node_name: node.pt_name.clone(),
                nb_fiber,
                dist: node.dist_from_pm,
                node_names: node.splice_pts.clone(),
                state: ripsite::State::to_do(),
            });
        }
    }
}

/// Operation type and linked troncon name of an operation key
fn junction_operation(ope: &str) -> (&'static str, &str) {
    let lower = ope.to_lowercase();
    let troncon = || ope.split_once("->").map(|(_, name)| name).unwrap_or("");
    if lower.starts_with("att") {
        ("Attente", "")
    } else if lower.starts_with("epi") {
        ("Epissure", troncon())
    } else if lower.starts_with("pas") {
        ("Passage", troncon())
    } else {
        ("", "")
    }
}
