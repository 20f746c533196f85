//! Synoptic drawing parsing
//!
//! The drawing links site blocks with cell borders: a site hangs on a
//! horizontal line (bottom border), siblings share a vertical line (left
//! border) and each site block is a column of filled cells.

use crate::error::LayoutError;
use crate::reader::{Border, Sheet, read_workbook};
use crate::writer::{SheetWriter, save_workbook};
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::{debug, info};

pub mod site;

pub use site::{Site, SiteId};

pub const SYNO_SHEET_NAME: &str = "Syno";
const SRO_PREFIX: &str = "SRO-";
const SRO_MAX_COL_NUM: u32 = 4;
const MAX_DEPTH: usize = 64;
const WHITE: &str = "FFFFFFFF";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Position {
    row: u32,
    col: u32,
}

impl Position {
    fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    fn is_valid(&self) -> bool {
        self.row > 0 && self.col > 0
    }
}

/// Site hierarchy of a synoptic drawing
#[derive(Debug, Clone, Default)]
pub struct Syno {
    pub sro_name: String,
    pub sites: Vec<Site>,
    /// Sites directly attached to the SRO
    pub roots: Vec<SiteId>,
}

impl Syno {
    /// Parse the `Syno` sheet of a workbook
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let workbook = read_workbook(path)?;
        let sheet = workbook
            .get_sheet(SYNO_SHEET_NAME)
            .ok_or_else(|| LayoutError::SheetNotFound(SYNO_SHEET_NAME.to_string()))
            .with_context(|| format!("parsing {}", path.display()))?;
        let syno = Self::parse_sheet(sheet)?;
        Ok(syno)
    }

    pub fn parse_sheet(sheet: &Sheet) -> Result<Self, LayoutError> {
        let mut parser = SynoParser {
            sheet,
            nb_rows: sheet.max_row(),
            nb_cols: sheet.max_col(),
            sites: Vec::new(),
        };
        let (sro_pos, sro_name) = parser
            .sro_info()
            .ok_or_else(|| LayoutError::Inconsistent("could not find SRO info".to_string()))?;
        info!("SRO {} found at {}", sro_name, crate::issue::rc_to_axis(sro_pos.row, sro_pos.col));

        let mut next = parser.find_first_child(Position::new(sro_pos.row, sro_pos.col + 2));
        if !next.is_valid() {
            return Err(LayoutError::Inconsistent(
                "could not find first Site Position's".to_string(),
            ));
        }
        let mut roots = Vec::new();
        loop {
            let (next_sibling, site) = parser.get_site(next, None, 0)?;
            roots.push(site);
            next = parser.sibling_site_pos(next_sibling);
            if !next.is_valid() {
                break;
            }
        }

        let syno = Self {
            sro_name,
            sites: parser.sites,
            roots,
        };
        for id in syno.walk() {
            let site = &syno.sites[id];
            debug!(
                "site {:<12} #sites:{:3} type:{:6} ({})\t{}",
                site.id,
                syno.nb_sites(id),
                site.site_type,
                site.color,
                syno.hierarchy(id)
            );
        }
        Ok(syno)
    }

    /// Number of sites below and including the given one
    pub fn nb_sites(&self, id: SiteId) -> usize {
        1 + self.sites[id]
            .children
            .iter()
            .map(|c| self.nb_sites(*c))
            .sum::<usize>()
    }

    /// Ids from the SRO down to the given site ("SRO-xxx > 1010 > 1020")
    pub fn hierarchy(&self, id: SiteId) -> String {
        let mut ids = vec![self.sites[id].id.as_str()];
        let mut current = self.sites[id].parent;
        while let Some(parent) = current {
            ids.push(self.sites[parent].id.as_str());
            current = self.sites[parent].parent;
        }
        ids.push(self.sro_name.as_str());
        ids.reverse();
        ids.join(" > ")
    }

    /// Sites in depth-first order
    pub fn walk(&self) -> Vec<SiteId> {
        let mut order = Vec::with_capacity(self.sites.len());
        let mut stack: Vec<SiteId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.sites[id].children.iter().rev());
        }
        order
    }

    /// Write one row per site in a sheet named after the SRO
    pub fn write_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        {
            let mut sheet = SheetWriter::new(&mut workbook, &self.sro_name)?;
            sheet.add_header(site::COLUMNS)?;
            for id in self.walk() {
                let site = &self.sites[id];
                let parent = site
                    .parent
                    .map(|p| self.sites[p].id.as_str())
                    .unwrap_or(self.sro_name.as_str());
                site.write_row(&mut sheet, parent)?;
            }
        }
        save_workbook(&mut workbook, path)?;
        Ok(())
    }
}

struct SynoParser<'a> {
    sheet: &'a Sheet,
    nb_rows: u32,
    nb_cols: u32,
    sites: Vec<Site>,
}

impl SynoParser<'_> {
    fn value(&self, pos: Position) -> String {
        self.sheet.value(pos.row, pos.col)
    }

    fn border(&self, row: u32, col: u32) -> Border {
        self.sheet
            .style(row, col)
            .map(|s| s.border.clone())
            .unwrap_or_default()
    }

    /// First `SRO-` cell of a row wider than the SRO columns
    fn sro_info(&self) -> Option<(Position, String)> {
        (0..self.nb_rows)
            .filter(|row| self.sheet.row_width(*row) > SRO_MAX_COL_NUM)
            .find_map(|row| {
                (0..self.sheet.row_width(row)).find_map(|col| {
                    let value = self.sheet.value(row, col);
                    value
                        .starts_with(SRO_PREFIX)
                        .then(|| (Position::new(row, col), value))
                })
            })
    }

    /// Left and bottom lines of a cell, drawn either on the cell or on its neighbour
    fn has_border(&self, pos: Position) -> (bool, bool) {
        let border = self.border(pos.row, pos.col);
        let left = border.has_left() || (pos.col > 0 && self.border(pos.row, pos.col - 1).has_right());
        let bottom = border.has_bottom() || self.border(pos.row + 1, pos.col).has_top();
        (left, bottom)
    }

    /// Position of the next sibling site, following the vertical line down
    fn sibling_site_pos(&self, mut pos: Position) -> Position {
        loop {
            let (left, bottom) = self.has_border(pos);
            if !left {
                return Position::default();
            }
            if bottom {
                return pos;
            }
            pos.row += 1;
            if pos.row >= self.nb_rows {
                return Position::default();
            }
        }
    }

    /// Parse the site hanging at `start` with all its children
    ///
    /// Returns the position to look for the next sibling from, and the site id.
    fn get_site(&mut self, start: Position, parent: Option<SiteId>, depth: usize) -> Result<(Position, SiteId), LayoutError> {
        if depth > MAX_DEPTH {
            return Err(LayoutError::Inconsistent(format!(
                "site nesting too deep at {}",
                crate::issue::rc_to_axis(start.row, start.col)
            )));
        }
        let mut pos = start;
        while self.value(pos).is_empty() && pos.col < self.nb_cols {
            pos.col += 1;
        }
        let id = self.sites.len();
        self.sites.push(Site {
            fiber_in: self.sheet.value(pos.row + 1, pos.col),
            length: self.sheet.value(pos.row + 2, pos.col),
            parent,
            ..Default::default()
        });

        let mut block = Position::new(pos.row, pos.col + 1);
        while self.value(block).is_empty() && block.col < self.nb_cols {
            block.col += 1;
        }
        let mut child_pos = self.read_site_block(block, id);
        if child_pos.is_valid() {
            loop {
                let (next_sibling, child) = self.get_site(child_pos, Some(id), depth + 1)?;
                self.sites[id].children.push(child);
                child_pos = self.sibling_site_pos(next_sibling);
                if !child_pos.is_valid() {
                    break;
                }
            }
        }
        debug!(
            "found site {} at {} ({} children)",
            self.sites[id].id,
            crate::issue::rc_to_axis(pos.row, pos.col),
            self.sites[id].children.len()
        );
        Ok((Position::new(start.row + 2, start.col), id))
    }

    /// Read the site block containing `pos`, returns the first child position
    fn read_site_block(&mut self, mut pos: Position, id: SiteId) -> Position {
        while pos.row > 0 {
            let color = self.sheet.fill_color(pos.row - 1, pos.col);
            if color.is_empty() || color == WHITE {
                break;
            }
            pos.row -= 1;
        }
        let (row, col) = (pos.row, pos.col);
        let sheet = self.sheet;
        let site = &mut self.sites[id];
        site.site_type = sheet.value(row, col);
        site.id = sheet.value(row + 1, col);
        site.bpe_type = sheet.value(row + 2, col);
        site.operation = sheet.value(row + 3, col);
        site.reference = sheet.value(row + 4, col);
        site.reference2 = sheet.value(row + 5, col);
        site.fiber_out = sheet.value(row + 6, col);
        site.color = sheet.fill_color(row + 3, col).to_string();

        self.find_first_child(Position::new(row, col + 1))
    }

    /// Highest child position, looking upwards then downwards (invalid if none)
    fn find_first_child(&self, pos: Position) -> Position {
        if pos.row > 0 {
            let mut up = pos;
            loop {
                match self.has_border(up) {
                    (false, true) => return up,
                    (false, false) => break,
                    _ => {}
                }
                if up.row == 0 {
                    break;
                }
                up.row -= 1;
            }
        }

        let mut down = pos;
        loop {
            let (left, bottom) = self.has_border(down);
            if bottom {
                return down;
            }
            if !left || down.row > pos.row + 6 {
                break;
            }
            down.row += 1;
        }
        Position::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::CellStyle;

    const BLOCK_FILL: &str = "FFDFEDDA";
    const OPERATION_FILL: &str = "FFB7DEE8";

    fn line(sheet: &mut Sheet, row: u32, col: u32, left: bool, bottom: bool) {
        let side = |drawn: bool| drawn.then(|| "thin".to_string());
        sheet.set_style(
            row,
            col,
            CellStyle::bordered(Border {
                left: side(left),
                bottom: side(bottom),
                ..Default::default()
            }),
        );
    }

    fn block(sheet: &mut Sheet, top: u32, col: u32, values: [&str; 7]) {
        for (i, value) in values.iter().enumerate() {
            let row = top + i as u32;
            sheet.set_value(row, col, *value);
            let fill = if i == 3 { OPERATION_FILL } else { BLOCK_FILL };
            sheet.set_style(row, col, CellStyle::filled(fill));
        }
    }

    /// SRO -> A (child B) and C
    fn syno_sheet() -> Sheet {
        let mut sheet = Sheet::new(SYNO_SHEET_NAME);
        sheet.set_value(2, 1, "SRO-68-048-DXA");

        line(&mut sheet, 2, 3, false, true);
        sheet.set_value(2, 4, "A-ref");
        sheet.set_value(3, 4, "12");
        sheet.set_value(4, 4, "150");
        block(&mut sheet, 1, 5, ["PBO", "1010", "TENIO T1", "EPI", "R1", "R2", "6"]);

        line(&mut sheet, 1, 6, false, true);
        sheet.set_value(1, 7, "B-ref");
        sheet.set_value(2, 7, "6");
        sheet.set_value(3, 7, "80");
        block(&mut sheet, 1, 8, ["PBO", "1020", "TENIO T0", "ATT", "", "", "2"]);

        for row in 4..9 {
            line(&mut sheet, row, 3, true, false);
        }
        line(&mut sheet, 9, 3, true, true);
        sheet.set_value(9, 4, "C-ref");
        block(&mut sheet, 9, 5, ["BPE", "1030", "TENIO T2", "PAS", "", "", "24"]);
        sheet
    }

    #[test]
    fn test_parse_sheet() {
        let syno = Syno::parse_sheet(&syno_sheet()).unwrap();
        assert_eq!(syno.sro_name, "SRO-68-048-DXA");
        assert_eq!(syno.roots.len(), 2);

        let a = &syno.sites[syno.roots[0]];
        assert_eq!(a.id, "1010");
        assert_eq!(a.site_type, "PBO");
        assert_eq!(a.bpe_type, "TENIO T1");
        assert_eq!(a.operation, "EPI");
        assert_eq!(a.fiber_out, "6");
        assert_eq!(a.fiber_in, "12");
        assert_eq!(a.length, "150");
        assert_eq!(a.color, OPERATION_FILL);
        assert_eq!(a.children.len(), 1);

        let b = &syno.sites[a.children[0]];
        assert_eq!(b.id, "1020");
        assert_eq!(b.fiber_in, "6");
        assert_eq!(b.parent, Some(syno.roots[0]));

        let c = &syno.sites[syno.roots[1]];
        assert_eq!(c.id, "1030");
        assert!(c.children.is_empty());

        assert_eq!(syno.nb_sites(syno.roots[0]), 2);
        assert_eq!(syno.hierarchy(a.children[0]), "SRO-68-048-DXA > 1010 > 1020");
        let order: Vec<&str> = syno.walk().into_iter().map(|id| syno.sites[id].id.as_str()).collect();
        assert_eq!(order, vec!["1010", "1020", "1030"]);
    }

    #[test]
    fn test_missing_sro() {
        let mut sheet = Sheet::new(SYNO_SHEET_NAME);
        sheet.set_value(1, 1, "SRO-68-048-DXA");
        assert!(Syno::parse_sheet(&sheet).is_err());
    }

    #[test]
    fn test_border_on_neighbour_cells() {
        let mut sheet = Sheet::new(SYNO_SHEET_NAME);
        sheet.set_style(
            3,
            1,
            CellStyle::bordered(Border {
                right: Some("thin".to_string()),
                ..Default::default()
            }),
        );
        sheet.set_style(
            4,
            2,
            CellStyle::bordered(Border {
                top: Some("medium".to_string()),
                ..Default::default()
            }),
        );
        let parser = SynoParser {
            sheet: &sheet,
            nb_rows: sheet.max_row(),
            nb_cols: sheet.max_col(),
            sites: Vec::new(),
        };
        assert_eq!(parser.has_border(Position::new(3, 2)), (true, true));
        assert_eq!(parser.has_border(Position::new(2, 2)), (false, false));
    }
}
