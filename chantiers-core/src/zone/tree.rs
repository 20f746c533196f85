//! Tree reconstruction: parent/child links, inferred PM nodes, splice points and cables

use super::Zone;
use crate::config::ChantierConfig;
use crate::node::{Cable, Node, NodeId, Troncon, TronconId};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, Copy)]
struct Link {
    source: Option<NodeId>,
    dest: Option<NodeId>,
}

impl Zone {
    /// Attach a child node, its incoming troncon becoming an outgoing troncon of the parent
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let child_pt = &self.nodes[child].pt_name;
        if self.nodes[parent]
            .children
            .iter()
            .any(|c| &self.nodes[*c].pt_name == child_pt)
        {
            return;
        }
        self.nodes[parent].children.push(child);
        if let Some(tin) = self.nodes[child].troncon_in {
            self.troncons[tin].node_source = Some(parent);
            let name = self.troncons[tin].name.clone();
            self.nodes[parent].troncons_out.entry(name).or_insert(tin);
        }
    }

    /// Set the splices of a PM or SRO node from its children input capacities
    pub fn set_operation_from_children(&mut self, id: NodeId) {
        for child in self.nodes[id].children.clone() {
            let Some(child_tin) = self.nodes[child].troncon_in else {
                continue;
            };
            let capa = self.troncons[child_tin].capa;
            if let Some(tin) = self.nodes[id].troncon_in {
                self.troncons[tin].capa += capa;
            }
            let key = format!("Epissure->{}", self.troncons[child_tin].name);
            self.nodes[id].operations.insert(key, capa);
        }
    }

    /// Build the tree from cable names when no ROP file is available
    ///
    /// Outgoing troncons reaching no known node end in an inferred PM node, and
    /// root nodes fed by a troncon get an inferred parent PM.
    pub fn create_bpe_tree(&mut self) {
        let mut links: BTreeMap<String, Link> = BTreeMap::new();
        for id in self.nodes.named_ids() {
            let tin_name = self.troncon_in_name(id).to_string();
            if !tin_name.is_empty() {
                links.entry(tin_name.clone()).or_default().dest = Some(id);
            }
            for name in self.nodes[id].troncons_out.keys() {
                if *name == tin_name {
                    continue;
                }
                links.entry(name.clone()).or_default().source = Some(id);
            }
        }

        for (name, link) in links {
            match (link.source, link.dest) {
                (Some(source), Some(dest)) => {
                    self.nodes[source].children.push(dest);
                    self.nodes[dest].is_child = true;
                }
                (Some(source), None) => {
                    if let Some(cable) = self.nodes[source].troncons_out.get(&name).copied() {
                        self.add_pm_child(source, cable);
                    }
                }
                _ => {}
            }
        }

        for id in self.nodes.named_ids() {
            if self.nodes[id].is_child {
                continue;
            }
            let root = if self.troncon_in_name(id).is_empty() {
                id
            } else {
                self.new_pm_node(Some(id))
            };
            self.roots.push(root);
        }
        debug!(roots = self.roots.len(), "tree created");
    }

    /// Create an inferred PM node, splicing the input troncon of the given child
    pub fn new_pm_node(&mut self, child: Option<NodeId>) -> NodeId {
        let pm = self.nodes.push_detached(Node::new_pm());
        let Some(child) = child else {
            return pm;
        };
        let Some(child_tin) = self.nodes[child].troncon_in else {
            return pm;
        };
        let name = self.troncons[child_tin].name.clone();
        if name.is_empty() {
            return pm;
        }

        self.nodes[pm].children = vec![child];
        self.nodes[child].is_child = true;

        let tin = self.troncons.push_detached(Troncon::new(""));
        self.troncons[tin].node_dest = Some(pm);
        self.troncons[child_tin].node_source = Some(pm);

        let capa = self.troncons[child_tin].capa;
        let pm_node = &mut self.nodes[pm];
        pm_node.troncon_in = Some(tin);
        pm_node.operations.insert(format!("Epissure->{name}"), capa);
        pm_node.troncons_out.insert(name, child_tin);
        pm
    }

    /// Attach an inferred PM node at the end of an outgoing troncon
    pub fn add_pm_child(&mut self, parent: NodeId, cable: TronconId) {
        let pm = self.new_pm_node(None);
        self.nodes[pm].troncon_in = Some(cable);
        self.nodes[pm].is_child = true;
        self.troncons[cable].node_dest = Some(pm);
        self.nodes[parent].children.push(pm);
    }

    /// Propagate, from the tops down, the points where the fibers to be measured are spliced
    pub fn set_splice_points(&mut self) {
        let mut visited = HashSet::new();
        for top in self.tops() {
            self.set_node_splice_points(top, Vec::new(), &mut visited);
        }
    }

    fn set_node_splice_points(&mut self, id: NodeId, splice_pts: Vec<String>, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        let spliced_children = self.spliced_children(id);
        let pt_name = self.nodes[id].pt_name.clone();
        for child in self.nodes[id].children.clone() {
            let mut child_pts = splice_pts.clone();
            if spliced_children.contains(&self.nodes[child].pt_name) {
                child_pts.push(pt_name.clone());
            }
            self.set_node_splice_points(child, child_pts, visited);
        }
        if self.nodes[id].to_be_measured_fibers() > 0 {
            self.nodes[id].splice_pts = splice_pts;
        }
    }

    /// Point names of the nodes receiving fibers spliced on the given node
    fn spliced_children(&self, id: NodeId) -> BTreeSet<String> {
        let node = &self.nodes[id];
        let mut res = BTreeSet::new();
        for name in node.spliced_troncon_names() {
            let Some(tr) = node.troncons_out.get(name) else {
                warn!("{}: unable to find spliced troncon {}", node.pt_name, name);
                continue;
            };
            match self.troncons[*tr].node_dest {
                Some(dest) => {
                    res.insert(self.nodes[dest].pt_name.clone());
                }
                None => warn!("{}: troncon {} has no destination", node.pt_name, name),
            }
        }
        res
    }

    /// Build cables from spliced troncons, following passing fibers downstream
    pub fn detect_cables(&mut self) {
        let mut visited = HashSet::new();
        for top in self.tops() {
            self.detect_node_cables(top, &mut visited);
        }
        self.cables.retain(|cable| !cable.troncons.is_empty());
        debug!(cables = self.cables.len(), "cables detected");
    }

    fn detect_node_cables(&mut self, id: NodeId, visited: &mut HashSet<TronconId>) {
        for tr in self.nodes[id].splice_troncons() {
            self.add_new_cable(tr, visited);
        }
    }

    fn add_new_cable(&mut self, first: TronconId, visited: &mut HashSet<TronconId>) {
        let index = self.cables.len();
        self.cables.push(Cable::new(self.troncons[first].capa));

        let mut current = Some(first);
        while let Some(tr) = current {
            if !visited.insert(tr) {
                warn!("troncon {} already belongs to a cable", self.troncons[tr].name);
                break;
            }
            let (Some(source), Some(dest)) = (self.troncons[tr].node_source, self.troncons[tr].node_dest) else {
                warn!("troncon {} is not linked to both its nodes", self.troncons[tr].name);
                break;
            };
            let distance = self.nodes[dest].dist_from_pm - self.nodes[source].dist_from_pm;
            self.cables[index].add_troncon(tr, distance, self.love_length);

            self.detect_node_cables(dest, visited);
            current = self.nodes[dest].troncon_passage();
        }
    }

    /// Set the cable type of cables ending in a box type having a configured template
    pub fn enable_cables(&mut self, config: &ChantierConfig) {
        for cable in &self.cables {
            let (Some(first), Some(last)) = (cable.first_troncon(), cable.last_troncon()) else {
                continue;
            };
            let Some(dest) = self.troncons[last].node_dest else {
                continue;
            };
            let capa = self.troncons[first].capa;
            if let Some(cable_type) = config.cable_type(&self.nodes[dest].bpe_type, capa) {
                self.troncons[first].cable_type = cable_type;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::DEFAULT_LOVE_LENGTH;
    use crate::node::BpeRecord;

    fn add_node(zone: &mut Zone, pt_name: &str, tin: Option<(&str, usize)>, ops: &[(&str, usize)], outs: &[&str]) -> NodeId {
        let mut node = Node {
            pt_name: pt_name.to_string(),
            bpe_type: "TENIO T1".to_string(),
            ..Default::default()
        };
        for (ope, nb) in ops {
            node.operations.insert(ope.to_string(), *nb);
        }
        node.set_location_type();
        let mut capacities: Vec<(String, usize)> = Vec::new();
        if let Some((name, capa)) = tin {
            capacities.push((name.to_string(), capa));
        }
        zone.add_bpe_record(BpeRecord {
            node,
            troncon_in: tin.map(|(name, _)| name.to_string()),
            troncons_out: outs.iter().map(|s| s.to_string()).collect(),
            capacities,
        })
        .unwrap()
    }

    /// PT 1 splices TR-2 toward PT 2, which lets TR-3 pass toward PT 3;
    /// TR-4 leaves PT 1 toward an unknown box
    fn sample_zone() -> (Zone, [NodeId; 3]) {
        let mut zone = Zone::new();
        let a = add_node(
            &mut zone,
            "PT 1",
            Some(("TR-1", 48)),
            &[("Epissure->TR-2", 12), ("Epissure->TR-4", 6)],
            &["TR-2", "TR-4"],
        );
        let b = add_node(
            &mut zone,
            "PT 2",
            Some(("TR-2", 12)),
            &[("Passage->TR-3", 6), ("Attente", 6)],
            &["TR-3"],
        );
        let c = add_node(&mut zone, "PT 3", Some(("TR-3", 12)), &[("Attente", 6)], &[]);
        (zone, [a, b, c])
    }

    #[test]
    fn test_create_bpe_tree() {
        let (mut zone, [a, b, c]) = sample_zone();
        zone.create_bpe_tree();

        assert_eq!(zone.roots.len(), 1);
        let pm = zone.roots[0];
        assert_eq!(zone.nodes[pm].location_type, "PM");
        assert_eq!(zone.nodes[pm].children, vec![a]);
        assert_eq!(zone.nodes[pm].operations.get("Epissure->TR-1"), Some(&48));
        assert!(zone.nodes[a].is_child);

        let children: Vec<&str> = zone
            .nodes
            .sorted_children(a)
            .into_iter()
            .map(|id| zone.nodes[id].pt_name.as_str())
            .collect();
        assert_eq!(children, vec!["PT 2", "PT PM"]);
        assert_eq!(zone.nodes[b].children, vec![c]);
        assert_eq!(zone.tops(), vec![pm]);
    }

    #[test]
    fn test_detect_cables_follows_passages() {
        let (mut zone, _) = sample_zone();
        zone.create_bpe_tree();
        zone.detect_cables();

        let names: Vec<Vec<&str>> = zone
            .cables
            .iter()
            .map(|cable| {
                cable
                    .troncons
                    .iter()
                    .map(|tr| zone.troncons[*tr].name.as_str())
                    .collect()
            })
            .collect();
        assert_eq!(names, vec![vec!["TR-1"], vec!["TR-2", "TR-3"], vec!["TR-4"]]);
        assert_eq!(zone.cables[1].capa, 12);
        assert_eq!(zone.cables[1].length, 2 * DEFAULT_LOVE_LENGTH);
    }

    #[test]
    fn test_splice_points() {
        let (mut zone, [a, b, c]) = sample_zone();
        zone.nodes[a].dist_from_pm = 100;
        zone.nodes[b].dist_from_pm = 250;
        zone.nodes[c].dist_from_pm = 400;
        zone.create_bpe_tree();
        zone.set_splice_points();

        assert_eq!(zone.nodes[b].splice_pts, vec!["PT PM", "PT 1"]);
        assert_eq!(zone.nodes[c].splice_pts, vec!["PT PM", "PT 1"]);
        assert!(zone.nodes[a].splice_pts.is_empty());
    }

    #[test]
    fn test_enable_cables() {
        let (mut zone, _) = sample_zone();
        zone.create_bpe_tree();
        zone.detect_cables();
        let mut config = ChantierConfig::default();
        config
            .cable_types
            .insert("TENIO T1".to_string(), "CABLE_{capa}FO".to_string());
        zone.enable_cables(&config);

        let tr2 = zone.troncons.find("TR-2").unwrap();
        let tr3 = zone.troncons.find("TR-3").unwrap();
        let tr4 = zone.troncons.find("TR-4").unwrap();
        assert_eq!(zone.troncons[tr2].cable_type, "CABLE_12FO");
        assert_eq!(zone.troncons[tr3].cable_type, "");
        // TR-4 ends in an inferred PM
        assert_eq!(zone.troncons[tr4].cable_type, "");
    }

    #[test]
    fn test_add_child_and_operations_from_children() {
        let (mut zone, [a, _, _]) = sample_zone();
        let sro = zone.sro;
        zone.add_child(sro, a);
        zone.add_child(sro, a);
        zone.set_operation_from_children(sro);

        assert_eq!(zone.nodes[sro].children, vec![a]);
        assert_eq!(zone.nodes[sro].operations.get("Epissure->TR-1"), Some(&48));
        assert_eq!(zone.troncons[zone.nodes[sro].troncon_in.unwrap()].capa, 48);
        let tr1 = zone.troncons.find("TR-1").unwrap();
        assert_eq!(zone.troncons[tr1].node_source, Some(sro));
        assert_eq!(zone.tops(), vec![sro]);
    }
}
