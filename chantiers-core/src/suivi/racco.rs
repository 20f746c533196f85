//! Racco tab: a `TOTAL` box row followed by its splicing operation rows

use super::status::{cell_issue, done_date, line_issue, parse_status};
use super::{Block, BlockParser, SHEET_RACCO};
use crate::bpu::{Article, Catalog, CategoryChapters, Item};
use crate::issue::{Issue, Issues};
use crate::reader::Sheet;

const COL_NAME: u32 = 0;
const COL_BOX_NAME: u32 = 2;
const COL_BOX_TYPE: u32 = 3;
const COL_SIZE: u32 = 6;
const COL_OPE: u32 = 7;
const COL_FIBER: u32 = 8;
const COL_SPLICE: u32 = 9;
const COL_STATUS: u32 = 10;
const COL_DATE: u32 = 14;

const TOTAL: &str = "TOTAL";

/// Fiber and splice totals declared on a box row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxCount {
    nb_fiber: i64,
    nb_splice: i64,
}

pub struct RaccoParser;

impl BlockParser for RaccoParser {
    fn activity(&self) -> &'static str {
        SHEET_RACCO
    }

    fn parse_block(&self, sheet: &Sheet, catalog: &Catalog, row: u32) -> Block {
        let mut block = Block::default();
        let box_name = sheet.value(row, COL_NAME);
        let box_ope = sheet.value(row, COL_OPE);
        if box_ope.is_empty() && box_name.is_empty() {
            return block;
        }
        if box_ope != TOTAL {
            block.issues.push(line_issue(sheet, row, "invalid Box definition"));
            return block;
        }

        let declared = match self.items(sheet, catalog, row) {
            Ok((items, count)) => {
                block.items = items;
                Some(count)
            }
            Err(issue) => {
                block.issues.push(issue);
                None
            }
        };

        let mut total = BoxCount { nb_fiber: 0, nb_splice: 0 };
        let mut next = row + 1;
        loop {
            let ope = sheet.value(next, COL_OPE);
            if ope.is_empty() || ope == TOTAL {
                break;
            }
            let (nb_fiber, nb_splice) = operation_count(sheet, next, &mut block.issues);
            total.nb_fiber += nb_fiber;
            total.nb_splice += nb_splice;
            next += 1;
        }
        block.next_row = Some(next);

        if let Some(declared) = declared {
            if declared.nb_fiber != total.nb_fiber {
                block
                    .issues
                    .push(cell_issue(sheet, row, COL_FIBER, "wrong Nb Fiber for box"));
            }
            if declared.nb_splice != total.nb_splice {
                block
                    .issues
                    .push(cell_issue(sheet, row, COL_SPLICE, "wrong Nb Splice for box"));
            }
        }
        block
    }
}

impl RaccoParser {
    fn items(&self, sheet: &Sheet, catalog: &Catalog, row: u32) -> Result<(Vec<Item>, BoxCount), Issue> {
        let name = sheet.value(row, COL_NAME);
        let box_type = sheet.value(row, COL_BOX_NAME);
        let category = sheet.value(row, COL_BOX_TYPE);
        if !catalog.is_box_defined(&category, &box_type) {
            return Err(line_issue(
                sheet,
                row,
                &format!("unknown Box Type '{box_type}' for Category '{category}'"),
            ));
        }

        let size = sheet.value(row, COL_SIZE);
        let Some(digits) = size.strip_suffix("FO") else {
            return Err(cell_issue(
                sheet,
                row,
                COL_SIZE,
                format!("unexpected Box Size format '{size}'"),
            ));
        };
        let box_size: i64 = digits.parse().map_err(|_| {
            cell_issue(sheet, row, COL_SIZE, format!("could not parse '{digits}' Box Size"))
        })?;
        let info = format!("Install. {category}: {box_type} ({box_size}FO)");

        let count = |col: u32, label: &str| {
            sheet.int(row, col).ok_or_else(|| {
                cell_issue(
                    sheet,
                    row,
                    col,
                    format!("could not parse Bpe Nb {label} from '{}'", sheet.value(row, col)),
                )
            })
        };
        let declared = BoxCount {
            nb_fiber: count(COL_FIBER, "Fiber")?,
            nb_splice: count(COL_SPLICE, "Splice")?,
        };

        let status = parse_status(sheet, row, COL_STATUS)?;
        let date = done_date(sheet, row, COL_DATE, status)?;

        let Some(chapters) = catalog.category_chapters(SHEET_RACCO) else {
            return Ok((Vec::new(), declared));
        };
        let chapter_error = |message: String| line_issue(sheet, row, &message);
        let quantities: Vec<(&Article, i64)> = match category.to_uppercase().as_str() {
            "PM" => pm_quantities(chapters, declared.nb_splice).map_err(chapter_error)?,
            "BPE" | "PBO" => {
                box_quantities(catalog, chapters, &category, &box_type, declared.nb_splice)
                    .map_err(chapter_error)?
            }
            _ => return Err(chapter_error(format!("illegal box category '{category}'"))),
        };

        let items = quantities
            .into_iter()
            .map(|(article, quantity)| {
                Item::new(
                    SHEET_RACCO,
                    &name,
                    info.clone(),
                    date,
                    article,
                    quantity,
                    status.todo,
                    status.done,
                )
            })
            .collect();
        Ok((items, declared))
    }
}

/// Splice modules needed at the PM, completed by missing-splice modules
fn pm_quantities(chapters: &CategoryChapters, nb_splice: i64) -> Result<Vec<(&Article, i64)>, String> {
    let [module, missing, ..] = chapters.get("PM") else {
        return Err("PM category needs a module and a missing module article".to_string());
    };
    if module.size <= 0 {
        return Err(format!("invalid module size {} for '{}'", module.size, module.name));
    }
    let mut nb_module = nb_splice / module.size;
    let mut nb_missing = 0;
    if nb_module * module.size < nb_splice {
        nb_module += 1;
        if missing.size > 0 {
            nb_missing = (nb_module * module.size - nb_splice) / missing.size;
        }
    }
    Ok(vec![(module, nb_module), (missing, nb_missing)])
}

/// BPE: the box and its splices; PBO: the box chosen by usage
fn box_quantities<'a>(
    catalog: &Catalog,
    chapters: &'a CategoryChapters,
    category: &str,
    box_type: &str,
    nb_splice: i64,
) -> Result<Vec<(&'a Article, i64)>, String> {
    let Some(box_model) = catalog.get_box(category, box_type) else {
        return Err(format!("unknown box type '{box_type}' for category '{category}'"));
    };
    let chapter = |cat: &str| {
        chapters
            .chapter_for_size(cat, box_model.size)
            .map_err(|e| format!("could not define bpu chapter: '{e}'"))
    };
    if category.eq_ignore_ascii_case("BPE") {
        Ok(vec![
            (chapter(category)?, 1),
            (chapter(&format!("{category} Splice"))?, nb_splice),
        ])
    } else {
        Ok(vec![(chapter(&format!("{category} {}", box_model.usage))?, 1)])
    }
}

fn operation_count(sheet: &Sheet, row: u32, issues: &mut Issues) -> (i64, i64) {
    let mut count = |col: u32, label: &str| {
        sheet.int(row, col).unwrap_or_else(|| {
            issues.push(cell_issue(sheet, row, col, format!("could not parse Nb {label}")));
            0
        })
    };
    let nb_fiber = count(COL_FIBER, "Fiber");
    let nb_splice = count(COL_SPLICE, "Splice");
    (nb_fiber, nb_splice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpu::tests::catalog;

    fn box_row(sheet: &mut Sheet, row: u32, name: &str, box_type: &str, category: &str, size: &str, fiber: i64, splice: i64) {
        sheet.set_value(row, COL_NAME, name);
        sheet.set_value(row, COL_BOX_NAME, box_type);
        sheet.set_value(row, COL_BOX_TYPE, category);
        sheet.set_value(row, COL_SIZE, size);
        sheet.set_value(row, COL_OPE, TOTAL);
        sheet.set_value(row, COL_FIBER, fiber);
        sheet.set_value(row, COL_SPLICE, splice);
    }

    fn ope_row(sheet: &mut Sheet, row: u32, ope: &str, fiber: i64, splice: i64) {
        sheet.set_value(row, COL_OPE, ope);
        sheet.set_value(row, COL_FIBER, fiber);
        sheet.set_value(row, COL_SPLICE, splice);
    }

    fn quantities(block: &Block) -> Vec<(&str, i64)> {
        block
            .items
            .iter()
            .map(|i| (i.article.name.as_str(), i.quantity))
            .collect()
    }

    #[test]
    fn test_bpe_block() {
        let mut sheet = Sheet::new(SHEET_RACCO);
        box_row(&mut sheet, 1, "PT 182064", "T1", "BPE", "72FO", 24, 12);
        ope_row(&mut sheet, 2, "Epissure", 12, 12);
        ope_row(&mut sheet, 3, "Passage", 12, 0);
        box_row(&mut sheet, 4, "PT 182065", "PB12", "PBO", "12FO", 12, 0);
        ope_row(&mut sheet, 5, "Attente", 12, 0);

        let catalog = catalog();
        let block = RaccoParser.parse_block(&sheet, &catalog, 1);
        assert!(block.issues.is_empty(), "{:?}", block.issues);
        assert_eq!(block.next_row, Some(4));
        assert_eq!(quantities(&block), vec![("BPE-S", 1), ("Splice", 12)]);
        assert_eq!(block.items[0].info, "Install. BPE: T1 (72FO)");
        assert!(block.items[0].todo);
        assert!(!block.items[0].done);

        let block = RaccoParser.parse_block(&sheet, &catalog, 4);
        assert!(block.issues.is_empty());
        assert_eq!(quantities(&block), vec![("PBO-Imm", 1)]);
        assert_eq!(block.next_row, Some(6));
        assert_eq!(RaccoParser.parse_block(&sheet, &catalog, 6).next_row, None);
    }

    #[test]
    fn test_pm_modules() {
        let mut sheet = Sheet::new(SHEET_RACCO);
        box_row(&mut sheet, 1, "PM", "PM", "PM", "720FO", 30, 30);
        ope_row(&mut sheet, 2, "Epissure", 30, 30);

        let block = RaccoParser.parse_block(&sheet, &catalog(), 1);
        assert!(block.issues.is_empty());
        // 30 splices: 3 modules of 12, 6 spare splices
        assert_eq!(quantities(&block), vec![("PM-Module", 3), ("PM-Missing", 1)]);
    }

    #[test]
    fn test_inconsistent_totals() {
        let mut sheet = Sheet::new(SHEET_RACCO);
        box_row(&mut sheet, 1, "PT 182064", "T1", "BPE", "72FO", 24, 12);
        ope_row(&mut sheet, 2, "Epissure", 12, 10);
        sheet.set_value(3, COL_OPE, "Passage");
        sheet.set_value(3, COL_FIBER, "douze");

        let block = RaccoParser.parse_block(&sheet, &catalog(), 1);
        let messages: Vec<String> = block.issues.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Racco!I4: could not parse Nb Fiber",
                "Racco!J4: could not parse Nb Splice",
                "Racco!I2: wrong Nb Fiber for box",
                "Racco!J2: wrong Nb Splice for box",
            ]
        );
    }

    #[test]
    fn test_unknown_box() {
        let mut sheet = Sheet::new(SHEET_RACCO);
        box_row(&mut sheet, 1, "PT 182064", "T9", "BPE", "72FO", 0, 0);
        sheet.set_value(2, COL_NAME, "PT 182065");
        sheet.set_value(2, COL_OPE, "Epissure");

        let block = RaccoParser.parse_block(&sheet, &catalog(), 1);
        assert!(block.items.is_empty());
        assert_eq!(
            block.issues.iter().next().unwrap().to_string(),
            "Racco: unknown Box Type 'T9' for Category 'BPE' in line 2"
        );
        assert_eq!(block.next_row, Some(3));

        // a row that is not a TOTAL row stops the tab
        let block = RaccoParser.parse_block(&sheet, &catalog(), 2);
        assert!(block.issues.has_error());
        assert_eq!(block.next_row, None);
    }
}
