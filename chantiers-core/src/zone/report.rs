//! Progress tracking workbook of a zone: Tirage, Racco and Mesures sheets

use super::Zone;
use crate::node::{Cable, LOCATION_PBO, LOCATION_PM, NodeId, TronconId};
use crate::writer::{CellData, Column, RowStyle, SheetWriter, colors, save_workbook};
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::info;

const NB_COL_TIRAGE: u16 = 11;
const NB_COL_RACCO: u16 = 10;
const NB_COL_MEASURE: u16 = 6;

const TIRAGE_COLUMNS: &[Column] = &[
    Column::new("Type Cable", 36.0),
    Column::new("Tronçon", 12.0),
    Column::new("PT Départ", 15.0),
    Column::new("Adr. Départ", 40.0),
    Column::new("PT Arrivée", 15.0),
    Column::new("Adr. Arrivée", 40.0),
    Column::new("Distance Tot", 15.0),
    Column::new("Love", 10.0),
    Column::new("Souterrain", 10.0),
    Column::new("Aérien", 10.0),
    Column::new("Façade", 10.0),
    Column::new("Statut", 15.0),
    Column::new("Acteur(s)", 15.0),
    Column::new("N° Déplacement", 15.0),
    Column::new("Début", 15.0),
    Column::new("Fin", 15.0),
];

const RACCO_COLUMNS: &[Column] = &[
    Column::new("Nom Site", 12.0),
    Column::new("Adresse", 40.0),
    Column::new("Type Boitier", 15.0),
    Column::new("Type Site", 17.0),
    Column::new("Ref Site", 10.0),
    Column::new("Troncon entrant", 15.0),
    Column::new("Taille", 8.0),
    Column::new("Opérations", 20.0),
    Column::new("Nb Fibre Sortant", 15.0),
    Column::new("Nb Epissure", 15.0),
    Column::new("Statut", 15.0),
    Column::new("Acteur(s)", 15.0),
    Column::new("N° Déplacement", 15.0),
    Column::new("Début", 15.0),
    Column::new("Fin", 15.0),
];

const MEASURE_COLUMNS: &[Column] = &[
    Column::new("PT cible", 12.0),
    Column::new("Nb Fibres", 15.0),
    Column::new("Nb Episs.", 15.0),
    Column::new("Distance", 15.0),
    Column::new("Conn. Deb.", 20.0),
    Column::new("Conn. Fin.", 40.0),
    Column::new("Statut", 15.0),
    Column::new("Acteur(s)", 15.0),
    Column::new("N° Déplacement", 15.0),
    Column::new("Début", 15.0),
    Column::new("Fin", 15.0),
];

impl Zone {
    /// Write `<name>_suivi.xlsx` in the given directory
    pub fn write_xlsx<P: AsRef<Path>>(&self, dir: P, name: &str) -> Result<PathBuf> {
        if self.nodes.is_empty() {
            anyhow::bail!("zone is empty, nothing to write to XLSx");
        }
        let file = dir.as_ref().join(format!("{name}_suivi.xlsx"));
        let mut workbook = Workbook::new();

        if self.has_cable_types() {
            self.add_tirage_sheet(&mut workbook).context("Tirage")?;
        }
        self.add_racco_sheet(&mut workbook).context("Racco")?;
        self.add_mesures_sheet(&mut workbook).context("Mesures")?;

        save_workbook(&mut workbook, &file)?;
        info!("{} written", file.display());
        Ok(file)
    }

    /// Cable types are known once provided by cable quantities or enabled by configuration
    fn has_cable_types(&self) -> bool {
        self.cables
            .first()
            .and_then(Cable::first_troncon)
            .is_some_and(|tr| !self.troncons[tr].cable_type.is_empty())
    }

    fn add_tirage_sheet(&self, workbook: &mut Workbook) -> Result<()> {
        let mut sheet = SheetWriter::new(workbook, "Tirage")?;
        sheet.add_header(TIRAGE_COLUMNS)?;

        for cable in &self.cables {
            let (Some(first), Some(last)) = (cable.first_troncon(), cable.last_troncon()) else {
                continue;
            };
            let (begin_pt, begin_address) = self.end_info(self.troncons[first].node_source);
            let (end_pt, end_address) = self.end_info(self.troncons[last].node_dest);
            let lengths = cable.lengths(&self.troncons);
            let color = if lengths.aerial + lengths.facade > 0 {
                colors::AERIAL
            } else {
                colors::UNDERGROUND
            };
            sheet.add_row(
                &[
                    (&self.troncons[first].cable_type).into(),
                    (&self.troncons[first].name).into(),
                    begin_pt.into(),
                    begin_address.into(),
                    end_pt.into(),
                    end_address.into(),
                    lengths.total().into(),
                    lengths.love.into(),
                    lengths.underground.into(),
                    lengths.aerial.into(),
                    lengths.facade.into(),
                ],
                RowStyle::Fill(color),
                0..NB_COL_TIRAGE,
            )?;

            for tr in &cable.troncons {
                self.add_tirage_detail(&mut sheet, *tr)?;
            }
        }
        Ok(())
    }

    fn add_tirage_detail(&self, sheet: &mut SheetWriter, tr: TronconId) -> Result<()> {
        let troncon = &self.troncons[tr];
        let (source_pt, source_address) = self.end_info(troncon.node_source);
        let (dest_pt, dest_address) = self.end_info(troncon.node_dest);
        sheet.add_row(
            &[
                CellData::Blank,
                (&troncon.name).into(),
                source_pt.into(),
                source_address.into(),
                dest_pt.into(),
                dest_address.into(),
                self.troncon_distance(tr).into(),
                troncon.love_length.into(),
                troncon.underground_length.into(),
                troncon.aerial_length.into(),
                troncon.facade_length.into(),
            ],
            RowStyle::Detail,
            0..NB_COL_TIRAGE,
        )
    }

    fn end_info(&self, node: Option<NodeId>) -> (&str, &str) {
        node.map(|id| (self.nodes[id].pt_name.as_str(), self.nodes[id].address.as_str()))
            .unwrap_or(("", ""))
    }

    /// Distance covered by a troncon, from its nodes distance to the PM
    pub fn troncon_distance(&self, tr: TronconId) -> i64 {
        match (self.troncons[tr].node_source, self.troncons[tr].node_dest) {
            (Some(source), Some(dest)) => self.nodes[dest].dist_from_pm - self.nodes[source].dist_from_pm,
            _ => 0,
        }
    }

    fn add_racco_sheet(&self, workbook: &mut Workbook) -> Result<()> {
        let mut sheet = SheetWriter::new(workbook, "Racco")?;
        sheet.add_header(RACCO_COLUMNS)?;

        for id in self.nodes.walk(&self.tops()) {
            let node = &self.nodes[id];
            let (epi, other) = node.numbers();
            let color = match node.location_type.as_str() {
                LOCATION_PM => colors::PM,
                LOCATION_PBO => colors::PBO,
                _ => colors::BPE,
            };
            let capa = node
                .troncon_in
                .map(|tin| self.troncons[tin].capa_string())
                .unwrap_or_default();
            sheet.add_row(
                &[
                    (&node.pt_name).into(),
                    (&node.address).into(),
                    (&node.bpe_type).into(),
                    (&node.location_type).into(),
                    (&node.name).into(),
                    self.troncon_in_name(id).into(),
                    capa.into(),
                    "TOTAL".into(),
                    (epi + other).into(),
                    epi.into(),
                ],
                RowStyle::Fill(color),
                0..NB_COL_RACCO,
            )?;

            for ope in node.operations.keys() {
                let (epi, other) = node.operation_numbers(ope);
                let mut cells = vec![CellData::Blank; 6];
                cells.extend([
                    node.operation_capa(ope, &self.troncons).into(),
                    ope.into(),
                    (epi + other).into(),
                    epi.into(),
                ]);
                sheet.add_row(&cells, RowStyle::Detail, 0..NB_COL_RACCO)?;
            }
        }
        Ok(())
    }

    /// Measurements are listed from the SRO down, the roots of an inferred tree have no distance
    fn add_mesures_sheet(&self, workbook: &mut Workbook) -> Result<()> {
        let mut sheet = SheetWriter::new(workbook, "Mesures")?;
        sheet.add_header(MEASURE_COLUMNS)?;

        for id in self.nodes.walk(&[self.sro]) {
            let node = &self.nodes[id];
            let fibers = node.to_be_measured_fibers();
            if fibers == 0 {
                continue;
            }
            sheet.add_row(
                &[
                    (&node.pt_name).into(),
                    fibers.into(),
                    node.splice_pts.len().into(),
                    node.dist_from_pm.into(),
                    (&node.start_drawer).into(),
                    (&node.end_drawer).into(),
                ],
                RowStyle::Fill(colors::PM),
                0..NB_COL_MEASURE,
            )?;

            for (i, pt_name) in node.splice_pts.iter().enumerate() {
                let (dist, address) = match self.nodes.find(pt_name) {
                    Some(pt) => (self.nodes[pt].dist_from_pm, self.nodes[pt].address.as_str()),
                    None => (0, ""),
                };
                sheet.add_row(
                    &[
                        CellData::Blank,
                        CellData::Blank,
                        (i + 1).into(),
                        dist.into(),
                        pt_name.into(),
                        address.into(),
                    ],
                    RowStyle::Detail,
                    0..NB_COL_MEASURE,
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BpeRecord, Node};
    use crate::reader::read_workbook;

    fn zone_with_node() -> Zone {
        let mut zone = Zone::new();
        let mut node = Node {
            pt_name: "PT 1".to_string(),
            address: "1 rue de la Gare".to_string(),
            bpe_type: "TENIO T1".to_string(),
            dist_from_pm: 120,
            ..Default::default()
        };
        node.operations.insert("Attente".to_string(), 3);
        node.set_location_type();
        zone.add_bpe_record(BpeRecord {
            node,
            troncon_in: Some("TR-1".to_string()),
            troncons_out: Vec::new(),
            capacities: vec![("TR-1".to_string(), 12)],
        })
        .unwrap();
        zone.create_bpe_tree();
        zone.detect_cables();
        zone
    }

    #[test]
    fn test_empty_zone_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Zone::new().write_xlsx(dir.path(), "PM1").is_err());
    }

    #[test]
    fn test_write_without_cable_types() {
        let dir = tempfile::tempdir().unwrap();
        let zone = zone_with_node();
        let file = zone.write_xlsx(dir.path(), "PM1").unwrap();
        assert!(file.ends_with("PM1_suivi.xlsx"));

        let workbook = read_workbook(&file).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Racco", "Mesures"]);
        let racco = workbook.get_sheet("Racco").unwrap();
        assert_eq!(racco.value(0, 0), "Nom Site");
        assert_eq!(racco.value(1, 0), "PT PM");
        assert_eq!(racco.value(1, 7), "TOTAL");
        assert_eq!(racco.value(3, 0), "PT 1");
        assert_eq!(racco.value(3, 6), "12FO");
        assert_eq!(racco.value(4, 7), "Attente");
        assert_eq!(racco.value(4, 8), "3");

        // no ROP: nothing hangs below the SRO, so no measurement
        let mesures = workbook.get_sheet("Mesures").unwrap();
        assert_eq!(mesures.value(0, 0), "PT cible");
        assert_eq!(mesures.value(1, 0), "");
    }

    #[test]
    fn test_measurements_start_from_sro() {
        let dir = tempfile::tempdir().unwrap();
        let mut zone = zone_with_node();
        let pt = zone.nodes.find("PT 1").unwrap();
        let sro = zone.sro;
        zone.add_child(sro, pt);

        let file = zone.write_xlsx(dir.path(), "PM1").unwrap();
        let workbook = read_workbook(&file).unwrap();
        let mesures = workbook.get_sheet("Mesures").unwrap();
        assert_eq!(mesures.value(1, 0), "PT 1");
        assert_eq!(mesures.value(1, 1), "3");
        assert_eq!(mesures.value(1, 3), "120");
        assert_eq!(mesures.value(2, 0), "");
    }

    #[test]
    fn test_write_with_cable_types() {
        let dir = tempfile::tempdir().unwrap();
        let mut zone = zone_with_node();
        let tr = zone.troncons.find("TR-1").unwrap();
        zone.troncons[tr].cable_type = "CABLE_12FO".to_string();
        zone.troncons[tr].underground_length = 100;
        zone.troncons[tr].love_length = 20;

        let file = zone.write_xlsx(dir.path(), "PM1").unwrap();
        let workbook = read_workbook(&file).unwrap();
        let tirage = workbook.get_sheet("Tirage").unwrap();
        assert_eq!(tirage.value(1, 0), "CABLE_12FO");
        assert_eq!(tirage.value(1, 2), "PT PM");
        assert_eq!(tirage.value(1, 4), "PT 1");
        assert_eq!(tirage.value(1, 6), "120");
        assert_eq!(tirage.value(2, 1), "TR-1");
        assert_eq!(tirage.value(2, 6), "120");
        assert_eq!(tirage.fill_color(1, 0), "FFDFEDDA");
    }
}
