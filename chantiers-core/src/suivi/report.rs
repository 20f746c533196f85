//! Progress workbook: weekly quantities per article and the item list

use super::{SHEET_MEASURE, SHEET_RACCO, SHEET_TIRAGE, Suivi};
use crate::writer::{CellData, Column, SheetWriter, save_workbook};
use anyhow::Result;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::info;

pub const SUIVI_SHEET_NAME: &str = "Suivi";
pub const PROGRESS_SHEET_NAME: &str = "Avancement";

/// Articles whose name starts with this prefix are activity lump sums, not counted
const ACTIVITY_PREFIX: &str = "Activité ";

const PROGRESS_COLUMNS: &[Column] = &[
    Column::new("Item", 20.0),
    Column::new("Info", 40.0),
    Column::new("Code BPU", 20.0),
    Column::new("Quantité", 10.0),
    Column::new("Installé", 10.0),
    Column::new("Semaine", 12.0),
];

impl Suivi {
    pub fn write_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = Workbook::new();
        self.write_suivi_sheet(&mut workbook)?;
        self.write_progress_sheet(&mut workbook)?;
        save_workbook(&mut workbook, path)?;
        info!("progress report written to '{}'", path.display());
        Ok(())
    }

    /// Article names of the three tabs, in catalog order per activity
    pub fn article_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for activity in [SHEET_TIRAGE, SHEET_RACCO, SHEET_MEASURE] {
            for name in self.catalog.article_names(activity) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn write_suivi_sheet(&self, workbook: &mut Workbook) -> Result<()> {
        let mut sheet = SheetWriter::new(workbook, SUIVI_SHEET_NAME)?;
        sheet.set_column_width(0, 30.0)?;
        sheet.set_column_width(1, 10.0)?;
        sheet.write_at(0, 1, &"Semaines".into())?;

        let by_article = self.todo_items_by_article();
        let counted: Vec<(&str, i64, &Vec<&crate::bpu::Item>)> = self
            .article_names()
            .iter()
            .filter(|name| !name.starts_with(ACTIVITY_PREFIX))
            .filter_map(|name| {
                let (name, items) = by_article.get_key_value(name.as_str())?;
                let total: i64 = items.iter().map(|i| i.quantity).sum();
                (total != 0).then_some((*name, total, items))
            })
            .collect();

        let mut row = 1;
        for (name, _, _) in &counted {
            sheet.write_at(row, 0, &(*name).into())?;
            sheet.write_at(row, 1, &"Nb Total".into())?;
            sheet.write_at(row + 1, 1, &"Nb".into())?;
            sheet.write_at(row + 2, 1, &"%".into())?;
            row += 3;
        }

        for (col, week) in self.dates().into_iter().enumerate() {
            let col = col as u16 + 2;
            sheet.write_at(0, col, &week.into())?;
            let mut row = 1;
            for (_, total, items) in &counted {
                let done: i64 = items
                    .iter()
                    .filter(|i| i.done_by(week))
                    .map(|i| i.quantity)
                    .sum();
                sheet.write_at(row, col, &(*total).into())?;
                sheet.write_at(row + 1, col, &done.into())?;
                sheet.write_at(row + 2, col, &(done as f64 / *total as f64).into())?;
                row += 3;
            }
        }
        Ok(())
    }

    fn write_progress_sheet(&self, workbook: &mut Workbook) -> Result<()> {
        let mut sheet = SheetWriter::new(workbook, PROGRESS_SHEET_NAME)?;
        sheet.add_header(PROGRESS_COLUMNS)?;
        for item in self.items.iter().filter(|i| i.todo && i.quantity > 0) {
            let (installed, week) = match (item.done, item.date) {
                (true, Some(date)) => (CellData::from("Oui"), CellData::from(date)),
                _ => (CellData::Blank, CellData::Blank),
            };
            sheet.add_plain_row(&[
                (&item.name).into(),
                (&item.info).into(),
                (&item.article.name).into(),
                item.quantity.into(),
                installed,
                week,
            ])?;
        }
        Ok(())
    }
}
