//! One ZACABLE site sheet: box information and outgoing links

use crate::reader::Sheet;
use crate::writer::{CellData, Column, RowStyle, SheetWriter, colors};
use anyhow::Result;
use std::collections::BTreeMap;

pub const LOVAGE: &str = "<Lovage>";
pub const PASSAGE: &str = "<Passage>";
const NO_OPERATION: &str = "<none>";

const ROW_FIRST_LINK: u32 = 4;
const COL_CABLE: u32 = 1;
const COL_OPERATION: u32 = 4;
const COL_CABLE_OUT: u32 = 7;
const COL_CAPA_OUT: u32 = 8;
const COL_DEST: u32 = 9;

const NB_COL_SITE: u16 = 10;
const FIRST_LINK_COL: u16 = 6;

pub const COLUMNS: &[Column] = &[
    Column::new("Nom Site", 22.0),
    Column::new("Nom Syno", 12.0),
    Column::new("Type Boitier", 15.0),
    Column::new("Type Site", 17.0),
    Column::new("Ref Site", 10.0),
    Column::new("Cable entrant", 23.0),
    Column::new("Taille", 10.0),
    Column::new("Cable sortant", 20.0),
    Column::new("Nb Fibre Sortant", 15.0),
    Column::new("Nb Epissure", 15.0),
];

/// Destination of a link: outgoing cable and its capacity
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dest {
    pub cable: String,
    pub capa: String,
}

/// Operation counters of a link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub operations: BTreeMap<String, usize>,
}

impl Link {
    /// Numbers of splices (EPI) and other operations
    pub fn numbers(&self) -> (usize, usize) {
        self.operations
            .iter()
            .fold((0, 0), |(epi, others), (ope, nb)| match ope.as_str() {
                "EPI" => (epi + nb, others),
                _ => (epi, others + nb),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Site {
    /// PBO-68-048-DXA-1010
    pub full_name: String,
    /// 1010
    pub name: String,
    pub bpe_type: String,
    pub location_type: String,
    pub location_ref: String,
    pub capa_in: String,
    pub cable_in: String,
    pub links: BTreeMap<Dest, Link>,
}

/// Short site name: dash separated parts from the fifth one
pub fn short_site_name(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split('-').collect();
    parts.get(4..).map(|p| p.join("-")).unwrap_or_default()
}

/// Zone name: fourth dash separated part of a site name
pub fn short_zone_name(full_name: &str) -> String {
    full_name.split('-').nth(3).unwrap_or_default().to_string()
}

impl Site {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            name: short_site_name(&full_name),
            full_name,
            ..Default::default()
        }
    }

    /// Parse a site sheet, the sheet name being the site full name
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut site = Site::new(sheet.name.clone());
        site.parse_sheet(sheet);
        site
    }

    pub fn numbers(&self) -> (usize, usize) {
        self.links
            .values()
            .map(Link::numbers)
            .fold((0, 0), |(epi, others), (e, o)| (epi + e, others + o))
    }

    /// Count an operation toward a destination
    ///
    /// Lovage and passage operations are grouped whatever their cable; other
    /// operations without outgoing cable are ignored.
    pub fn add_link(&mut self, ope: &str, mut dest: Dest) {
        let ope = if ope.is_empty() { NO_OPERATION } else { ope };
        match ope {
            "LOV" => {
                dest = Dest {
                    cable: LOVAGE.to_string(),
                    capa: String::new(),
                }
            }
            "PAS" => {
                dest = Dest {
                    cable: PASSAGE.to_string(),
                    capa: String::new(),
                }
            }
            _ if dest.cable.is_empty() => return,
            _ => {}
        }
        *self
            .links
            .entry(dest)
            .or_default()
            .operations
            .entry(ope.to_string())
            .or_default() += 1;
    }

    fn parse_sheet(&mut self, sheet: &Sheet) {
        self.bpe_type = sheet.value(0, 1);
        self.location_type = sheet.value(1, 0);
        self.location_ref = sheet.value(1, 1);
        self.capa_in = sheet.value(4, 0);
        self.cable_in = sheet.value(4, 1);

        let mut dest = Dest::default();
        let mut ope = String::new();
        for row in ROW_FIRST_LINK..sheet.max_row() {
            if sheet.value(row, COL_CABLE).is_empty() {
                break;
            }
            let new_ope = sheet.value(row, COL_OPERATION);
            if new_ope.is_empty() {
                dest = Dest::default();
                ope = new_ope;
                continue;
            }
            if new_ope != ope {
                dest = Dest::default();
                ope = new_ope;
            }
            let cable_out = sheet.value(row, COL_CABLE_OUT);
            if !cable_out.is_empty() && cable_out != dest.cable {
                dest = Dest {
                    cable: cable_out,
                    capa: sheet.value(row, COL_CAPA_OUT),
                };
            }
            if dest.cable.is_empty() && ope != "LOV" && sheet.value(row, COL_DEST) == self.full_name {
                ope = "LOV".to_string();
            }
            self.add_link(&ope, dest.clone());
        }
    }

    /// Write the site total row followed by one row per link
    pub fn write_rows(&self, sheet: &mut SheetWriter) -> Result<()> {
        let (epi, others) = self.numbers();
        sheet.add_row(
            &[
                (&self.full_name).into(),
                (&self.name).into(),
                (&self.bpe_type).into(),
                (&self.location_type).into(),
                (&self.location_ref).into(),
                (&self.cable_in).into(),
                (&self.capa_in).into(),
                "TOTAL".into(),
                (epi + others).into(),
                epi.into(),
            ],
            RowStyle::Fill(colors::UNDERGROUND),
            0..NB_COL_SITE,
        )?;

        for (dest, link) in &self.links {
            let (epi, others) = link.numbers();
            let mut cells = vec![CellData::Blank; FIRST_LINK_COL as usize];
            cells.extend([
                (&dest.capa).into(),
                (&dest.cable).into(),
                (epi + others).into(),
                epi.into(),
            ]);
            sheet.add_row(&cells, RowStyle::Detail, FIRST_LINK_COL..NB_COL_SITE)?;
        }
        Ok(())
    }
}
