//! Sites of a synoptic drawing

use crate::writer::{Column, RowStyle, SheetWriter};
use anyhow::Result;

/// Index of a site in its [`super::Syno`]
pub type SiteId = usize;

const FIRST_FILLED_COL: u16 = 4;
const LAST_FILLED_COL: u16 = 11;

pub const COLUMNS: &[Column] = &[
    Column::new("Type", 8.0),
    Column::new("Id Parent", 18.0),
    Column::new("Longueur", 10.0),
    Column::new("Nb Fibre In", 14.0),
    Column::new("Id Site", 10.0),
    Column::new("Type Boitier", 15.0),
    Column::new("Ref", 10.0),
    Column::new("Ref2", 10.0),
    Column::new("Nb Fibre Sortant", 14.0),
    Column::new("Operation", 12.0),
    Column::new("Nb Cable Sortant", 18.0),
    Column::new("Status", 12.0),
    Column::new("Date", 12.0),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Site {
    pub site_type: String,
    pub id: String,
    pub bpe_type: String,
    pub operation: String,
    pub reference: String,
    pub reference2: String,
    pub fiber_out: String,
    pub fiber_in: String,
    pub length: String,
    /// ARGB fill colour of the operation cell
    pub color: String,

    pub parent: Option<SiteId>,
    pub children: Vec<SiteId>,
}

impl Site {
    /// Write the site row; `parent` is the parent site id (the SRO name for top sites)
    ///
    /// Status and Date are left for the field teams to fill in.
    pub fn write_row(&self, sheet: &mut SheetWriter, parent: &str) -> Result<()> {
        sheet.add_row(
            &[
                (&self.site_type).into(),
                parent.into(),
                (&self.length).into(),
                (&self.fiber_in).into(),
                (&self.id).into(),
                (&self.bpe_type).into(),
                (&self.reference).into(),
                (&self.reference2).into(),
                (&self.fiber_out).into(),
                (&self.operation).into(),
                self.children.len().into(),
            ],
            RowStyle::fill_argb(&self.color),
            FIRST_FILLED_COL..LAST_FILLED_COL,
        )
    }
}
