//! BPU catalog: articles per activity and category, box models per category

use crate::error::LayoutError;
use crate::reader::{Sheet, read_workbook};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub mod item;

pub use item::Item;

pub const PRICES_SHEET_NAME: &str = "Prices";
pub const BOXES_SHEET_NAME: &str = "Boxes";

const COL_PRICES_ACTIVITY: u32 = 0;
const COL_PRICES_CATEGORY: u32 = 1;
const COL_PRICES_NAME: u32 = 2;
const COL_PRICES_SIZE: u32 = 3;

const COL_BOXES_CATEGORY: u32 = 0;
const COL_BOXES_NAME: u32 = 1;
const COL_BOXES_SIZE: u32 = 2;
const COL_BOXES_USAGE: u32 = 3;

/// A catalog article (BPU chapter) applying up to a given size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub name: String,
    pub size: i64,
}

/// Box model declared for a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxType {
    pub name: String,
    pub size: i64,
    pub usage: String,
}

/// Articles of one activity, by uppercased category, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChapters(BTreeMap<String, Vec<Article>>);

impl CategoryChapters {
    pub fn get(&self, category: &str) -> &[Article] {
        self.0
            .get(&category.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First article whose size covers `size`, the last one of the category otherwise
    pub fn chapter_for_size(&self, category: &str, size: i64) -> Result<&Article, LayoutError> {
        let chapters = self.get(category);
        let Some(last) = chapters.last() else {
            return Err(LayoutError::UnknownCategory(category.to_string()));
        };
        Ok(chapters.iter().find(|a| size <= a.size).unwrap_or(last))
    }

    fn push(&mut self, category: &str, article: Article) {
        self.0.entry(category.to_uppercase()).or_default().push(article);
    }

    fn article_names(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(|a| a.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Chapters by uppercased activity
    chapters: BTreeMap<String, CategoryChapters>,
    /// Box models by uppercased category and name
    boxes: BTreeMap<String, BTreeMap<String, BoxType>>,
}

impl Catalog {
    /// Read a BPU workbook holding a `Prices` and a `Boxes` sheet
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let workbook = read_workbook(path)?;
        let sheet = |name: &str| {
            workbook
                .get_sheet(name)
                .ok_or_else(|| LayoutError::SheetNotFound(name.to_string()))
                .with_context(|| format!("reading BPU '{}'", path.display()))
        };
        let catalog = Self::from_sheets(sheet(PRICES_SHEET_NAME)?, sheet(BOXES_SHEET_NAME)?)
            .with_context(|| format!("reading BPU '{}'", path.display()))?;
        info!("BPU '{}' parsed", path.display());
        Ok(catalog)
    }

    pub fn from_sheets(prices: &Sheet, boxes: &Sheet) -> Result<Self, LayoutError> {
        let mut catalog = Self::default();
        catalog.parse_chapters(prices)?;
        catalog.parse_boxes(boxes)?;
        Ok(catalog)
    }

    fn parse_chapters(&mut self, sheet: &Sheet) -> Result<(), LayoutError> {
        let mut row = 1;
        loop {
            let activity = sheet.value(row, COL_PRICES_ACTIVITY);
            if activity.is_empty() {
                break;
            }
            let size = sheet.int(row, COL_PRICES_SIZE).ok_or_else(|| {
                LayoutError::invalid_cell(
                    &sheet.name,
                    row,
                    COL_PRICES_SIZE,
                    sheet.value(row, COL_PRICES_SIZE),
                    "could not get size info",
                )
            })?;
            let article = Article {
                name: sheet.value(row, COL_PRICES_NAME),
                size,
            };
            self.chapters
                .entry(activity.to_uppercase())
                .or_default()
                .push(&sheet.value(row, COL_PRICES_CATEGORY), article);
            row += 1;
        }
        Ok(())
    }

    fn parse_boxes(&mut self, sheet: &Sheet) -> Result<(), LayoutError> {
        let mut row = 1;
        loop {
            let name = sheet.value(row, COL_BOXES_NAME).to_uppercase();
            if name.is_empty() {
                break;
            }
            let size = sheet.int(row, COL_BOXES_SIZE).ok_or_else(|| {
                LayoutError::invalid_cell(
                    &sheet.name,
                    row,
                    COL_BOXES_SIZE,
                    sheet.value(row, COL_BOXES_SIZE),
                    "could not get size info",
                )
            })?;
            let box_type = BoxType {
                name: name.clone(),
                size,
                usage: sheet.value(row, COL_BOXES_USAGE),
            };
            self.boxes
                .entry(sheet.value(row, COL_BOXES_CATEGORY).to_uppercase())
                .or_default()
                .insert(name, box_type);
            row += 1;
        }
        Ok(())
    }

    pub fn category_chapters(&self, activity: &str) -> Option<&CategoryChapters> {
        self.chapters.get(&activity.to_uppercase())
    }

    pub fn is_box_defined(&self, category: &str, name: &str) -> bool {
        self.get_box(category, name).is_some()
    }

    pub fn get_box(&self, category: &str, name: &str) -> Option<&BoxType> {
        self.boxes
            .get(&category.to_uppercase())?
            .get(&name.to_uppercase())
    }

    /// Sorted, deduplicated article names of an activity
    pub fn article_names(&self, activity: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .category_chapters(activity)
            .map(|cc| cc.article_names().map(str::to_string).collect())
            .unwrap_or_default();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn prices_sheet() -> Sheet {
        let mut sheet = Sheet::new(PRICES_SHEET_NAME);
        let rows: &[(&str, &str, &str, i64)] = &[
            ("Tirage", "Tirage Souterain", "TS-72", 72),
            ("Tirage", "Tirage Souterain", "TS-720", 720),
            ("Tirage", "Tirage Aérien", "TA-72", 72),
            ("Tirage", "Tirage Façade", "TF", 720),
            ("Racco", "PM", "PM-Module", 12),
            ("Racco", "PM", "PM-Missing", 6),
            ("Racco", "BPE", "BPE-S", 48),
            ("Racco", "BPE", "BPE-L", 144),
            ("Racco", "BPE Splice", "Splice", 1000),
            ("Racco", "PBO Immeuble", "PBO-Imm", 12),
            ("Mesures", "Mesure", "Mes", 1),
        ];
        for (row, (activity, category, name, size)) in rows.iter().enumerate() {
            let row = row as u32 + 1;
            sheet.set_value(row, COL_PRICES_ACTIVITY, *activity);
            sheet.set_value(row, COL_PRICES_CATEGORY, *category);
            sheet.set_value(row, COL_PRICES_NAME, *name);
            sheet.set_value(row, COL_PRICES_SIZE, *size);
        }
        sheet
    }

    pub(crate) fn boxes_sheet() -> Sheet {
        let mut sheet = Sheet::new(BOXES_SHEET_NAME);
        let rows: &[(&str, &str, i64, &str)] = &[
            ("BPE", "T2", 96, ""),
            ("BPE", "T1", 24, ""),
            ("PBO", "PB12", 12, "Immeuble"),
            ("PM", "PM", 720, ""),
        ];
        for (row, (category, name, size, usage)) in rows.iter().enumerate() {
            let row = row as u32 + 1;
            sheet.set_value(row, COL_BOXES_CATEGORY, *category);
            sheet.set_value(row, COL_BOXES_NAME, *name);
            sheet.set_value(row, COL_BOXES_SIZE, *size);
            sheet.set_value(row, COL_BOXES_USAGE, *usage);
        }
        sheet
    }

    pub(crate) fn catalog() -> Catalog {
        Catalog::from_sheets(&prices_sheet(), &boxes_sheet()).unwrap()
    }

    #[test]
    fn test_chapter_for_size() {
        let catalog = catalog();
        let racco = catalog.category_chapters("racco").unwrap();
        assert_eq!(racco.chapter_for_size("bpe", 24).unwrap().name, "BPE-S");
        assert_eq!(racco.chapter_for_size("BPE", 96).unwrap().name, "BPE-L");
        assert_eq!(racco.chapter_for_size("BPE", 288).unwrap().name, "BPE-L");
        assert!(matches!(
            racco.chapter_for_size("Chambre", 1),
            Err(LayoutError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_boxes_lookup() {
        let catalog = catalog();
        assert!(catalog.is_box_defined("bpe", "t1"));
        assert!(!catalog.is_box_defined("PBO", "T1"));
        let pbo = catalog.get_box("PBO", "pb12").unwrap();
        assert_eq!(pbo.size, 12);
        assert_eq!(pbo.usage, "Immeuble");
    }

    #[test]
    fn test_article_names() {
        let catalog = catalog();
        assert_eq!(catalog.article_names("Tirage"), vec!["TA-72", "TF", "TS-72", "TS-720"]);
        assert!(catalog.article_names("Genie Civil").is_empty());
    }

    #[test]
    fn test_bad_size() {
        let mut prices = prices_sheet();
        prices.set_value(2, COL_PRICES_SIZE, "grand");
        let err = Catalog::from_sheets(&prices, &boxes_sheet()).unwrap_err();
        assert!(err.to_string().contains("Prices!D3"));
    }
}
