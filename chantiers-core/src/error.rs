//! Layout errors raised while reading worksite workbooks

use crate::issue::rc_to_axis;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("could not find sheet '{0}'")]
    SheetNotFound(String),

    #[error("unexpected sheet name: '{0}'")]
    UnexpectedSheet(String),

    #[error("unexpected value '{value}' in cell {sheet}!{cell}: {message}")]
    InvalidCell {
        sheet: String,
        cell: String,
        value: String,
        message: String,
    },

    #[error("node {0} was already defined")]
    DuplicateNode(String),

    #[error("unknown Troncon '{name}' found on line {line}")]
    UnknownTroncon { name: String, line: u32 },

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("{0}")]
    Inconsistent(String),
}

impl LayoutError {
    /// Build an invalid cell error from 0-based coordinates
    pub fn invalid_cell(
        sheet: &str,
        row: u32,
        col: u32,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LayoutError::InvalidCell {
            sheet: sheet.to_string(),
            cell: rc_to_axis(row, col),
            value: value.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cell_message() {
        let err = LayoutError::invalid_cell("Plan PT 1", 9, 18, "xx", "could not parse Troncon Info");
        assert_eq!(
            err.to_string(),
            "unexpected value 'xx' in cell Plan PT 1!S10: could not parse Troncon Info"
        );
    }
}
