//! ROP (route optimization plan) parsing: node hierarchy, distances and drawers

use super::Zone;
use crate::error::LayoutError;
use crate::node::{LOCATION_PM, NodeId};
use crate::reader::{Sheet, read_workbook};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

const SHEET_PREFIX: &str = "TAB";
const ROW_START: u32 = 1;
const COL_START: u32 = 6;

// Absolute columns
const ACOL_PM_NAME: u32 = 0;
const ACOL_DRAWER: u32 = 3;
const ACOL_DRAWER_LINE: u32 = 4;
const ACOL_DRAWER_COL: u32 = 5;

// Columns relative to the block start
const COL_TUBING: u32 = 0;
const COL_CABLE_IN: u32 = 2;
const COL_NAME: u32 = 4;
const COL_PT_NAME: u32 = 5;
const COL_DIST_FROM_PM: u32 = 6;
const COL_OPE: u32 = 7;
const COL_NEXT_BLOCK: u32 = 8;

/// Walks the nested node blocks of a ROP sheet
struct RopParser<'a> {
    sheet: &'a Sheet,
    row: u32,
    col: u32,
}

impl<'a> RopParser<'a> {
    fn value(&self, offset: u32) -> String {
        self.sheet.value(self.row, self.col + offset)
    }

    /// Value of the column preceding the block
    fn leading_value(&self) -> String {
        self.sheet.value(self.row, self.col - 1)
    }

    fn at_end(&self) -> bool {
        self.row >= self.sheet.max_row()
    }

    /// True when a child block starts on the current row
    fn child_exists(&self) -> bool {
        self.sheet.value(0, self.col + COL_NEXT_BLOCK) == "T" && !self.value(COL_NEXT_BLOCK).is_empty()
    }

    fn child(&self) -> Self {
        Self {
            sheet: self.sheet,
            row: self.row,
            col: self.col + COL_NEXT_BLOCK,
        }
    }

    fn error(&self, offset: u32, message: impl Into<String>) -> LayoutError {
        LayoutError::invalid_cell(
            &self.sheet.name,
            self.row,
            self.col + offset,
            self.value(offset),
            message,
        )
    }

    /// Parse the block at the current position with all its children,
    /// leaving the position on the first row of the next block
    fn parse_block(&mut self, zone: &mut Zone) -> Result<NodeId, LayoutError> {
        let pt_name = self.value(COL_PT_NAME);
        let id = zone
            .nodes
            .find(&pt_name)
            .ok_or_else(|| self.error(COL_PT_NAME, "could not get node from ptname"))?;
        let dist = self
            .value(COL_DIST_FROM_PM)
            .trim()
            .parse::<i64>()
            .map_err(|_| self.error(COL_DIST_FROM_PM, "could not get distance"))?;
        zone.nodes[id].dist_from_pm = dist;
        zone.nodes[id].name = self.value(COL_NAME);

        let expected = zone.troncon_in_name(id);
        if self.value(COL_CABLE_IN) != expected {
            let message = format!("not matching cable In name ('{expected}' expected) for node '{pt_name}'");
            return Err(self.error(COL_CABLE_IN, message));
        }
        debug!(node = %pt_name, row = self.row + 1, "ROP block");

        let drawer_prefix = format!("{}_", zone.nodes[zone.sro].pt_name);
        loop {
            if self.child_exists() {
                let mut child_parser = self.child();
                let child = child_parser.parse_block(zone)?;
                zone.add_child(id, child);
                self.row = child_parser.row;
            } else {
                if self.value(COL_OPE) == "ATTENTE" {
                    let drawer = self.sheet.value(self.row, ACOL_DRAWER);
                    let drawer = format!(
                        "{}/{}/{:02}",
                        drawer.strip_prefix(&drawer_prefix).unwrap_or(&drawer),
                        self.sheet.value(self.row, ACOL_DRAWER_LINE),
                        self.sheet.int(self.row, ACOL_DRAWER_COL).unwrap_or(0),
                    );
                    zone.nodes[id].add_drawer_info(&drawer);
                }
                self.row += 1;
            }
            if self.value(COL_PT_NAME) != pt_name || self.at_end() {
                break;
            }
        }
        Ok(id)
    }
}

impl Zone {
    /// Parse a ROP workbook, building the tree below the SRO
    pub fn parse_rop<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let workbook = read_workbook(path)?;
        let sheet = workbook
            .find_sheet_with_prefix(SHEET_PREFIX)
            .ok_or_else(|| LayoutError::SheetNotFound(format!("{SHEET_PREFIX}*")))?;
        self.parse_rop_sheet(sheet)
            .with_context(|| format!("parsing ROP file {}", path.display()))?;
        Ok(())
    }

    /// Parse the node blocks of a ROP sheet
    pub fn parse_rop_sheet(&mut self, sheet: &Sheet) -> Result<(), LayoutError> {
        let mut parser = RopParser {
            sheet,
            row: ROW_START,
            col: COL_START,
        };
        let sro = self.sro;
        self.nodes[sro].pt_name = sheet.value(ROW_START, ACOL_PM_NAME);
        self.nodes[sro].location_type = LOCATION_PM.to_string();
        self.nodes.register(sro)?;

        while !parser.at_end() {
            if !parser.value(COL_TUBING).is_empty() {
                let top = parser.parse_block(self)?;
                self.add_child(sro, top);
                continue;
            }
            if parser.leading_value().is_empty() {
                break;
            }
            parser.row += 1;
        }
        self.set_operation_from_children(sro);
        Ok(())
    }
}
