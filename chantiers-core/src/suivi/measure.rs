//! Mesures tab: one block per measured PT

use super::status::{cell_issue, done_date, line_issue, parse_status};
use super::{Block, BlockParser, SHEET_MEASURE};
use crate::bpu::{Catalog, Item};
use crate::issue::Issue;
use crate::reader::Sheet;

const COL_NAME: u32 = 0;
const COL_NB_FIBER: u32 = 1;
const COL_NB_SPLICE: u32 = 2;
const COL_STATUS: u32 = 6;
const COL_DATE: u32 = 10;

const CAT_MEASUREMENT: &str = "Mesure";

pub struct MeasurementParser;

impl BlockParser for MeasurementParser {
    fn activity(&self) -> &'static str {
        SHEET_MEASURE
    }

    fn parse_block(&self, sheet: &Sheet, catalog: &Catalog, row: u32) -> Block {
        let mut block = Block::default();
        let name = sheet.value(row, COL_NAME);
        let nb_fiber = sheet.value(row, COL_NB_FIBER);
        let nb_splice = sheet.value(row, COL_NB_SPLICE);
        if nb_splice.is_empty() && name.is_empty() {
            return block;
        }
        if name.is_empty() || nb_fiber.is_empty() || nb_splice.is_empty() {
            block
                .issues
                .push(line_issue(sheet, row, "invalid Measurement definition"));
            return block;
        }

        match self.item(sheet, catalog, row, &name, &nb_fiber, &nb_splice) {
            Ok(item) => block.items.push(item),
            Err(issue) => block.issues.push(issue),
        }

        // detail rows only carry a splice count
        let mut next = row + 1;
        while sheet.value(next, COL_NAME).is_empty()
            && sheet.value(next, COL_NB_FIBER).is_empty()
            && !sheet.value(next, COL_NB_SPLICE).is_empty()
        {
            next += 1;
        }
        block.next_row = Some(next);
        block
    }
}

impl MeasurementParser {
    fn item(
        &self,
        sheet: &Sheet,
        catalog: &Catalog,
        row: u32,
        name: &str,
        nb_fiber: &str,
        nb_splice: &str,
    ) -> Result<Item, Issue> {
        if sheet.int(row, COL_NB_FIBER).is_none() {
            return Err(cell_issue(
                sheet,
                row,
                COL_NB_FIBER,
                format!("could not parse NbFiber from '{nb_fiber}'"),
            ));
        }
        let status = parse_status(sheet, row, COL_STATUS)?;
        let date = done_date(sheet, row, COL_DATE, status)?;

        let article = catalog
            .category_chapters(SHEET_MEASURE)
            .ok_or_else(|| line_issue(sheet, row, "no Mesures activity in BPU catalog"))?
            .chapter_for_size(CAT_MEASUREMENT, 1)
            .map_err(|e| line_issue(sheet, row, &format!("could not define bpu chapter: '{e}'")))?;
        Ok(Item::new(
            SHEET_MEASURE,
            name,
            format!("Mesure {nb_fiber} fibres - {nb_splice} epissures"),
            date,
            article,
            1,
            status.todo,
            status.done,
        ))
    }
}
