//! Tirage tab: one block per pulled cable

use super::status::{cell_issue, done_date, line_issue, parse_status};
use super::{Block, BlockParser, SHEET_TIRAGE};
use crate::bpu::{Catalog, Item};
use crate::issue::Issue;
use crate::reader::Sheet;

const COL_CABLE_TYPE: u32 = 0;
const COL_TRONCON_NAME: u32 = 1;
const COL_LOVE_LENGTH: u32 = 7;
const COL_UNDERGROUND_LENGTH: u32 = 8;
const COL_AERIAL_LENGTH: u32 = 9;
const COL_FACADE_LENGTH: u32 = 10;
const COL_STATUS: u32 = 11;
const COL_DATE: u32 = 15;

const CAT_PULL_UNDERGROUND: &str = "Tirage Souterain";
const CAT_PULL_AERIAL: &str = "Tirage Aérien";
const CAT_PULL_FACADE: &str = "Tirage Façade";

pub struct PullingParser;

impl BlockParser for PullingParser {
    fn activity(&self) -> &'static str {
        SHEET_TIRAGE
    }

    fn parse_block(&self, sheet: &Sheet, catalog: &Catalog, row: u32) -> Block {
        let mut block = Block::default();
        let cable_type = sheet.value(row, COL_CABLE_TYPE);
        let troncon_name = sheet.value(row, COL_TRONCON_NAME);
        if cable_type.is_empty() && troncon_name.is_empty() {
            return block;
        }
        if cable_type.is_empty() || troncon_name.is_empty() {
            block
                .issues
                .push(line_issue(sheet, row, "invalid cable pulling definition"));
            return block;
        }

        match self.items(sheet, catalog, row, &cable_type, &troncon_name) {
            Ok(items) => block.items = items,
            Err(issue) => block.issues.push(issue),
        }

        // detail rows only carry a troncon name
        let mut next = row + 1;
        while sheet.value(next, COL_CABLE_TYPE).is_empty() && !sheet.value(next, COL_TRONCON_NAME).is_empty() {
            next += 1;
        }
        block.next_row = Some(next);
        block
    }
}

impl PullingParser {
    fn items(
        &self,
        sheet: &Sheet,
        catalog: &Catalog,
        row: u32,
        cable_type: &str,
        troncon_name: &str,
    ) -> Result<Vec<Item>, Issue> {
        let cable_size = cable_size(cable_type)
            .map_err(|message| cell_issue(sheet, row, COL_CABLE_TYPE, message))?;
        let length = |col: u32, label: &str| {
            sheet.int(row, col).ok_or_else(|| {
                cell_issue(
                    sheet,
                    row,
                    col,
                    format!("could not parse {label} Length from '{}'", sheet.value(row, col)),
                )
            })
        };
        let love = length(COL_LOVE_LENGTH, "Love")?;
        let underground = length(COL_UNDERGROUND_LENGTH, "Underground")?;
        let aerial = length(COL_AERIAL_LENGTH, "Aerial")?;
        let facade = length(COL_FACADE_LENGTH, "Facade")?;

        let status = parse_status(sheet, row, COL_STATUS)?;
        let date = done_date(sheet, row, COL_DATE, status)?;

        let Some(chapters) = catalog.category_chapters(SHEET_TIRAGE) else {
            return Ok(Vec::new());
        };
        let mut items = Vec::new();
        for (category, quantity) in [
            (CAT_PULL_UNDERGROUND, love + underground),
            (CAT_PULL_AERIAL, aerial + facade),
            (CAT_PULL_FACADE, facade),
        ] {
            if quantity <= 0 {
                continue;
            }
            let article = chapters.chapter_for_size(category, cable_size).map_err(|e| {
                line_issue(sheet, row, &format!("could not define bpu chapter: '{e}'"))
            })?;
            items.push(Item::new(
                SHEET_TIRAGE,
                troncon_name,
                format!("Tirage {cable_type} ({quantity}ml)"),
                date,
                article,
                quantity,
                status.todo,
                status.done,
            ));
        }
        Ok(items)
    }
}

/// Number of fibers of a cable type such as `CABLE_72FO_AER`
pub fn cable_size(cable_type: &str) -> Result<i64, String> {
    let Some(chunk) = cable_type.split('_').nth(1) else {
        return Err(format!(
            "misformatted cable type '{cable_type}': can not detect _nnFO_ chunk"
        ));
    };
    chunk.trim_end_matches("FO").parse().map_err(|_| {
        format!("misformatted cable type: can not get number of fiber in '{chunk}'")
    })
}
