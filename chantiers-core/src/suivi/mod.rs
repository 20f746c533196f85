//! Progress tracking: work items read from the team tracking workbook,
//! counted per BPU article and per week

use crate::bpu::{Catalog, Item};
use crate::issue::{IssueScope, Issues};
use crate::reader::{Sheet, Workbook, read_workbook};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub mod measure;
pub mod pulling;
pub mod racco;
pub mod report;
pub mod status;

pub use measure::MeasurementParser;
pub use pulling::{PullingParser, cable_size};
pub use racco::RaccoParser;
pub use status::{Status, done_date, monday, parse_status};

pub const SHEET_TIRAGE: &str = "Tirage";
pub const SHEET_RACCO: &str = "Racco";
pub const SHEET_MEASURE: &str = "Mesures";

/// Outcome of a block parse
#[derive(Debug, Default)]
pub struct Block {
    pub items: Vec<Item>,
    pub issues: Issues,
    /// First row of the next block, `None` at the end of data
    pub next_row: Option<u32>,
}

/// Parses the blocks of one progress tab
pub trait BlockParser {
    /// Activity of the catalog the tab refers to (also the tab name)
    fn activity(&self) -> &'static str;

    fn parse_block(&self, sheet: &Sheet, catalog: &Catalog, row: u32) -> Block;
}

/// Parse every block of a tab, from its second row until the end of data
pub fn parse_tab(sheet: &Sheet, parser: &dyn BlockParser, suivi: &mut Suivi) -> Issues {
    let mut issues = Issues::new();
    if suivi.catalog.category_chapters(parser.activity()).is_none() {
        issues.add(
            IssueScope::Sheet(sheet.name.clone()),
            format!(
                "no {} activity declared in BPU catalog, skipping related items",
                parser.activity()
            ),
            true,
        );
        return issues;
    }

    let mut row = 1;
    loop {
        let block = parser.parse_block(sheet, &suivi.catalog, row);
        issues.append(block.issues);
        suivi.add(block.items);
        match block.next_row {
            Some(next) => row = next,
            None => break,
        }
    }
    debug!("tab '{}' parsed up to row {}", sheet.name, row);
    issues
}

#[derive(Debug, Clone)]
pub struct Suivi {
    pub items: Vec<Item>,
    /// Earliest week with done items
    pub begin_date: NaiveDate,
    /// Latest week with done items, the reference week at least
    pub last_date: NaiveDate,
    pub catalog: Catalog,
}

impl Suivi {
    /// Empty progress whose week range starts at the week of `today`
    pub fn new(catalog: Catalog, today: NaiveDate) -> Self {
        let week = monday(today);
        Self {
            items: Vec::new(),
            begin_date: week,
            last_date: week,
            catalog,
        }
    }

    pub fn add(&mut self, items: Vec<Item>) {
        for date in items.iter().filter(|i| i.done).filter_map(|i| i.date) {
            self.begin_date = self.begin_date.min(date);
            self.last_date = self.last_date.max(date);
        }
        self.items.extend(items);
    }

    pub fn from_file<P: AsRef<Path>>(path: P, catalog: Catalog, today: NaiveDate) -> Result<(Self, Issues)> {
        let path = path.as_ref();
        let workbook = read_workbook(path)?;
        let result = Self::from_workbook(&workbook, catalog, today);
        info!("'{}' parsed: {} items", path.display(), result.0.items.len());
        Ok(result)
    }

    /// Parse the Tirage, Racco and Mesures tabs; missing tabs are warnings
    pub fn from_workbook(workbook: &Workbook, catalog: Catalog, today: NaiveDate) -> (Self, Issues) {
        let mut suivi = Self::new(catalog, today);
        let mut issues = Issues::new();
        let parsers: [&dyn BlockParser; 3] = [&PullingParser, &RaccoParser, &MeasurementParser];

        let mut tab_found = false;
        for parser in parsers {
            let name = parser.activity();
            match workbook.get_sheet(name) {
                Some(sheet) => {
                    tab_found = true;
                    issues.append(parse_tab(sheet, parser, &mut suivi));
                }
                None => issues.add(
                    IssueScope::Sheet(name.to_string()),
                    format!("onglet '{name}' non traité"),
                    false,
                ),
            }
        }
        if !tab_found {
            issues.add(IssueScope::Book, "aucun onglet traité", true);
        }
        (suivi, issues)
    }

    /// Mondays from the first to the last week, both included
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut week = self.begin_date;
        while week <= self.last_date {
            dates.push(week);
            week += Duration::days(7);
        }
        dates
    }

    /// Items still to do, by article name
    pub fn todo_items_by_article(&self) -> BTreeMap<&str, Vec<&Item>> {
        let mut by_article: BTreeMap<&str, Vec<&Item>> = BTreeMap::new();
        for item in self.items.iter().filter(|i| i.todo) {
            by_article.entry(item.article.name.as_str()).or_default().push(item);
        }
        by_article
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpu::tests::catalog;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dates_range() {
        let catalog = catalog();
        let article = catalog
            .category_chapters("Mesures")
            .unwrap()
            .chapter_for_size("Mesure", 1)
            .unwrap()
            .clone();
        let mut suivi = Suivi::new(catalog, date(2018, 2, 14));
        suivi.add(vec![
            Item::new("Mesures", "PT 1", "", Some(date(2018, 1, 29)), &article, 1, true, true),
            Item::new("Mesures", "PT 2", "", None, &article, 1, true, false),
        ]);
        assert_eq!(suivi.begin_date, date(2018, 1, 29));
        assert_eq!(suivi.last_date, date(2018, 2, 12));
        assert_eq!(
            suivi.dates(),
            vec![date(2018, 1, 29), date(2018, 2, 5), date(2018, 2, 12)]
        );
        assert_eq!(suivi.todo_items_by_article()["Mes"].len(), 2);
    }

    #[test]
    fn test_dates_single_week() {
        let suivi = Suivi::new(catalog(), date(2018, 2, 14));
        assert_eq!(suivi.begin_date, suivi.last_date);
        assert_eq!(suivi.dates(), vec![date(2018, 2, 12)]);
    }

    #[test]
    fn test_missing_tabs() {
        let workbook = Workbook {
            path: "suivi.xlsx".into(),
            sheets: vec![Sheet::new("Notes")],
        };
        let (suivi, issues) = Suivi::from_workbook(&workbook, catalog(), date(2018, 2, 14));
        assert!(suivi.items.is_empty());
        assert_eq!(issues.len(), 4);
        assert!(issues.has_error());

        let workbook = Workbook {
            path: "suivi.xlsx".into(),
            sheets: vec![Sheet::new(SHEET_MEASURE)],
        };
        let (_, issues) = Suivi::from_workbook(&workbook, catalog(), date(2018, 2, 14));
        assert_eq!(issues.len(), 2);
        assert!(!issues.has_error());
    }

    #[test]
    fn test_unknown_activity() {
        let mut suivi = Suivi::new(Catalog::default(), date(2018, 2, 14));
        let issues = parse_tab(&Sheet::new(SHEET_RACCO), &RaccoParser, &mut suivi);
        assert!(issues.has_error());
    }
}
