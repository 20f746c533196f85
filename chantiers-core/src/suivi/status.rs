//! Status and date cells shared by the progress tabs

use crate::issue::{CellReference, Issue, IssueScope};
use crate::reader::Sheet;
use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub todo: bool,
    pub done: bool,
}

/// Read a status cell: `ok` is done, `na`/`annule`/`supprime` is not to do,
/// empty or in-progress states are still to do
pub fn parse_status(sheet: &Sheet, row: u32, col: u32) -> Result<Status, Issue> {
    let value = sheet.value(row, col);
    match value.to_lowercase().as_str() {
        "ok" => Ok(Status { todo: true, done: true }),
        "na" | "annule" | "supprime" | "suprime" => Ok(Status { todo: false, done: false }),
        "" | "nok" | "ko" | "blocage" | "en cours" => Ok(Status { todo: true, done: false }),
        _ => Err(cell_issue(sheet, row, col, format!("unknown Status '{value}'"))),
    }
}

/// Monday of the week the item was done; `None` when not done
pub fn done_date(sheet: &Sheet, row: u32, col: u32, status: Status) -> Result<Option<NaiveDate>, Issue> {
    if !status.done {
        return Ok(None);
    }
    match sheet.date(row, col) {
        Some(date) => Ok(Some(monday(date))),
        None => Err(cell_issue(
            sheet,
            row,
            col,
            format!("could not parse date from '{}'", sheet.value(row, col)),
        )),
    }
}

pub fn monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub(crate) fn cell_issue(sheet: &Sheet, row: u32, col: u32, message: impl Into<String>) -> Issue {
    Issue::error(
        IssueScope::Cell(sheet.name.clone(), CellReference::new(row, col)),
        message,
    )
}

pub(crate) fn line_issue(sheet: &Sheet, row: u32, message: &str) -> Issue {
    Issue::error(
        IssueScope::Sheet(sheet.name.clone()),
        format!("{message} in line {}", row + 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monday() {
        assert_eq!(monday(date(2018, 2, 8)), date(2018, 2, 5));
        assert_eq!(monday(date(2018, 2, 5)), date(2018, 2, 5));
        assert_eq!(monday(date(2018, 2, 11)), date(2018, 2, 5));
    }

    #[test]
    fn test_parse_status() {
        let mut sheet = Sheet::new("Racco");
        for (row, value) in ["OK", "Annule", "", "en cours", "peut-être"].iter().enumerate() {
            sheet.set_value(row as u32, 10, *value);
        }
        assert_eq!(parse_status(&sheet, 0, 10).unwrap(), Status { todo: true, done: true });
        assert_eq!(parse_status(&sheet, 1, 10).unwrap(), Status::default());
        assert_eq!(parse_status(&sheet, 2, 10).unwrap(), Status { todo: true, done: false });
        assert_eq!(parse_status(&sheet, 3, 10).unwrap(), Status { todo: true, done: false });
        // missing cell is an empty status
        assert!(parse_status(&sheet, 10, 10).unwrap().todo);

        let issue = parse_status(&sheet, 4, 10).unwrap_err();
        assert_eq!(issue.to_string(), "Racco!K5: unknown Status 'peut-être'");
    }

    #[test]
    fn test_done_date() {
        let mut sheet = Sheet::new("Tirage");
        sheet.set_value(1, 15, "08/02/2018");
        let done = Status { todo: true, done: true };
        assert_eq!(done_date(&sheet, 1, 15, done).unwrap(), Some(date(2018, 2, 5)));
        assert_eq!(done_date(&sheet, 2, 15, Status::default()).unwrap(), None);
        assert!(done_date(&sheet, 2, 15, done).is_err());
    }
}
