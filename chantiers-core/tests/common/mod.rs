// Helpers writing xlsx fixtures for integration tests

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

/// Build a workbook and save it
pub fn save(path: &Path, build: impl FnOnce(&mut Workbook)) {
    let mut workbook = Workbook::new();
    build(&mut workbook);
    workbook.save(path).unwrap();
}

pub fn add_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> &'a mut Worksheet {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name).unwrap();
    sheet
}

pub fn text(sheet: &mut Worksheet, row: u32, col: u16, value: &str) {
    sheet.write_string(row, col, value).unwrap();
}

pub fn number(sheet: &mut Worksheet, row: u32, col: u16, value: f64) {
    sheet.write_number(row, col, value).unwrap();
}

/// Splice plan with its fiber rows (cable in, fiber in, operation, fiber out, cable out)
/// and cable dictionary entries ("48 FO-TR-1")
pub fn write_splice_plan(path: &Path, pt_name: &str, fibers: &[[&str; 5]], dictionary: &[&str]) {
    save(path, |workbook| {
        let sheet = add_sheet(workbook, &format!("Plan {pt_name}"));
        text(sheet, 1, 8, pt_name);
        text(sheet, 2, 8, "3 rue des Vosges");
        text(sheet, 4, 1, "TENIO T1");
        let mut row = 9;
        for fiber in fibers {
            for (col, value) in [3u16, 11, 13, 19, 24].into_iter().zip(fiber.iter()) {
                if !value.is_empty() {
                    text(sheet, row, col, value);
                }
            }
            row += 1;
        }
        row += 1;
        text(sheet, row, 17, "Affectation des tubulures");
        row += 3;
        for entry in dictionary {
            text(sheet, row, 18, entry);
            row += 1;
        }
    });
}
