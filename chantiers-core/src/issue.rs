//! Parsing issues reported with their location in the workbook

use serde::{Deserialize, Serialize};

/// Severity level of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// Scope of an issue (book, sheet, or cell level)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueScope {
    /// Book-level issue
    Book,
    /// Sheet-level issue
    Sheet(String),
    /// Cell-level issue
    Cell(String, CellReference),
}

/// Cell reference (e.g., A1, B2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        rc_to_axis(self.row, self.col)
    }
}

impl std::fmt::Display for CellReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

/// Convert 0-based (row, col) to an Excel reference ("A1")
pub fn rc_to_axis(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Convert column number to letter (0 -> A, 1 -> B, etc.)
fn col_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// A parsing issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Scope of the issue
    pub scope: IssueScope,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
}

impl Issue {
    pub fn new(scope: IssueScope, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            scope,
            message: message.into(),
            severity,
        }
    }

    pub fn error(scope: IssueScope, message: impl Into<String>) -> Self {
        Self::new(scope, message, Severity::Error)
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope {
            IssueScope::Book => write!(f, "{}", self.message),
            IssueScope::Sheet(sheet) => write!(f, "{}: {}", sheet, self.message),
            IssueScope::Cell(sheet, cell) => write!(f, "{}!{}: {}", sheet, cell, self.message),
        }
    }
}

/// Issues accumulated while parsing; blocking ones are errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issues {
    pub items: Vec<Issue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.items.push(issue);
    }

    /// Add a message as an error when blocking, as a warning otherwise
    pub fn add(&mut self, scope: IssueScope, message: impl Into<String>, blocking: bool) {
        let severity = if blocking {
            Severity::Error
        } else {
            Severity::Warning
        };
        self.push(Issue::new(scope, message, severity));
    }

    pub fn append(&mut self, other: Issues) {
        self.items.extend(other.items);
    }

    /// True when a blocking issue was found
    pub fn has_error(&self) -> bool {
        self.items.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.items.iter()
    }
}
