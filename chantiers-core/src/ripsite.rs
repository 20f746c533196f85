//! Site model exchanged as JSON with the worksite tracking application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SITE_STATUS_IN_PROGRESS: &str = "InProgress";
pub const STATE_TO_DO: &str = "ToDo";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Site {
    pub id: i64,
    pub client: String,
    #[serde(rename = "Ref")]
    pub reference: String,
    pub manager: String,
    pub order_date: String,
    pub status: String,
    pub comment: String,
    pub nodes: BTreeMap<String, Node>,
    pub troncons: BTreeMap<String, Troncon>,
    pub pullings: Vec<Pulling>,
    pub junctions: Vec<Junction>,
    pub measurements: Vec<Measurement>,
}

impl Site {
    /// New site with placeholder client data, to be completed in the tracking application
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            id: 0,
            client: "UNDEFINED".to_string(),
            reference: reference.into(),
            manager: "UNDEFINED".to_string(),
            order_date: "YYYY-MM-DD".to_string(),
            status: SITE_STATUS_IN_PROGRESS.to_string(),
            comment: "TO BE DEFINED".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    pub name: String,
    pub address: String,
    #[serde(rename = "Type")]
    pub node_type: String,
    pub box_type: String,
    #[serde(rename = "Ref")]
    pub reference: String,
    pub troncon_in_name: String,
    pub dist_from_pm: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Troncon {
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct State {
    pub status: String,
    pub team: String,
    pub date_start: String,
    pub date_end: String,
    pub comment: String,
}

impl State {
    pub fn to_do() -> Self {
        Self {
            status: STATE_TO_DO.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pulling {
    pub cable_name: String,
    pub chuncks: Vec<PullingChunk>,
    pub state: State,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PullingChunk {
    pub troncon_name: String,
    pub starting_node_name: String,
    pub ending_node_name: String,
    pub love_dist: i64,
    pub underground_dist: i64,
    pub aerial_dist: i64,
    pub building_dist: i64,
    pub state: State,
}

impl PullingChunk {
    pub fn total_dist(&self) -> i64 {
        self.love_dist + self.underground_dist + self.aerial_dist + self.building_dist
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Junction {
    pub node_name: String,
    pub operations: Vec<Operation>,
    pub state: State,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Operation {
    #[serde(rename = "Type")]
    pub operation_type: String,
    pub troncon_name: String,
    pub nb_fiber: usize,
    pub nb_splice: usize,
    pub state: State,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measurement {
    pub dest_node_name: String,
    pub nb_fiber: usize,
    pub dist: i64,
    pub node_names: Vec<String>,
    pub state: State,
}
