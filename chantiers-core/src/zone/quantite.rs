//! Cable quantity workbook: cable types and pulling lengths per troncon

use super::Zone;
use crate::error::LayoutError;
use crate::reader::{Sheet, read_workbook};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

const ROW_START: u32 = 5;
const COL_TRONCON: u32 = 1;
const COL_CABLE_TYPE: u32 = 2;
const COL_LOVE_LENGTH: u32 = 4;
const COL_LENGTH: u32 = 10;
const COL_PULLING_TYPE: u32 = 12;

const LABEL: &str = "etiquette";

impl Zone {
    /// Read cable types and lengths from the first sheet of a cable quantity workbook
    pub fn parse_quantite_cable<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let workbook = read_workbook(path)?;
        let sheet = workbook
            .sheets
            .first()
            .with_context(|| format!("{} has no sheet", path.display()))?;
        self.parse_quantite_sheet(sheet)
            .with_context(|| format!("parsing cable quantities {}", path.display()))?;
        Ok(())
    }

    pub fn parse_quantite_sheet(&mut self, sheet: &Sheet) -> Result<(), LayoutError> {
        if sheet.value(ROW_START - 2, COL_TRONCON) != LABEL {
            return Err(LayoutError::invalid_cell(
                &sheet.name,
                ROW_START - 2,
                COL_TRONCON,
                sheet.value(ROW_START - 2, COL_TRONCON),
                format!("could not find '{LABEL}' label"),
            ));
        }

        for row in ROW_START..sheet.max_row() {
            let name = sheet.value(row, COL_TRONCON);
            if name.is_empty() {
                continue;
            }
            let tr = self
                .troncons
                .find(&name)
                .ok_or_else(|| LayoutError::UnknownTroncon { name, line: row + 1 })?;

            self.troncons[tr].cable_type = sheet.value(row, COL_CABLE_TYPE);
            self.troncons[tr].love_length = match sheet.int(row, COL_LOVE_LENGTH) {
                Some(love) => love,
                None => {
                    warn!(
                        "{}: could not read Love length '{}' on line {}, col {} (use default {}m instead)",
                        sheet.name,
                        sheet.value(row, COL_LOVE_LENGTH),
                        row + 1,
                        COL_LOVE_LENGTH + 1,
                        self.love_length
                    );
                    self.love_length
                }
            };

            let pulling_type = sheet.value(row, COL_PULLING_TYPE).to_uppercase();
            if pulling_type.is_empty() {
                continue;
            }
            let length = sheet.int(row, COL_LENGTH).ok_or_else(|| {
                LayoutError::invalid_cell(
                    &sheet.name,
                    row,
                    COL_LENGTH,
                    sheet.value(row, COL_LENGTH),
                    "could not read tirage length",
                )
            })?;
            let troncon = &mut self.troncons[tr];
            if pulling_type.contains("AERIEN") {
                troncon.aerial_length += length;
            } else if pulling_type.contains("FACADE") {
                troncon.facade_length += length;
            } else if pulling_type.contains("INFRA") {
                troncon.underground_length += length;
            } else {
                warn!(
                    "{}: Unknown tirage type '{}' on line {}, col {}",
                    sheet.name,
                    pulling_type,
                    row + 1,
                    COL_PULLING_TYPE + 1
                );
            }
        }
        Ok(())
    }
}
