//! Output formatters for parsing issues

use anyhow::Result;
use chantiers_core::{Issue, IssueScope, Issues, Severity};
use colored::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Print issues grouped by book, sheet and cell
pub fn print_human(file_path: &Path, issues: &Issues) {
    println!("{}", format!("Parsing: {}", file_path.display()).bold());
    println!();

    if issues.is_empty() {
        println!("{}", "✓ No issue found!".green().bold());
        return;
    }

    let mut book_issues = Vec::new();
    let mut sheet_issues: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    let mut cell_issues: BTreeMap<&str, BTreeMap<String, Vec<&Issue>>> = BTreeMap::new();
    for issue in issues.iter() {
        match &issue.scope {
            IssueScope::Book => book_issues.push(issue),
            IssueScope::Sheet(sheet) => sheet_issues.entry(sheet.as_str()).or_default().push(issue),
            IssueScope::Cell(sheet, cell) => cell_issues
                .entry(sheet.as_str())
                .or_default()
                .entry(cell.to_string())
                .or_default()
                .push(issue),
        }
    }

    if !book_issues.is_empty() {
        println!("{}", "Book-level issues:".bold().underline());
        for issue in book_issues {
            print_issue(issue, 1);
        }
        println!();
    }

    for (sheet_name, issues) in &sheet_issues {
        println!("{} {}", "Sheet:".bold(), sheet_name.cyan().bold());
        for issue in issues {
            print_issue(issue, 1);
        }
        println!();
    }

    for (sheet_name, cells) in &cell_issues {
        println!("{} {}", "Sheet:".bold(), sheet_name.cyan().bold());
        for (cell_ref, issues) in cells {
            println!("  {} {}", "Cell:".bold(), cell_ref.yellow());
            for issue in issues {
                print_issue(issue, 2);
            }
        }
        println!();
    }

    let (errors, warnings) = counts(issues);
    println!("{}", "Summary:".bold().underline());
    if errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), errors);
    }
    if warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), warnings);
    }
}

fn print_issue(issue: &Issue, indent: usize) {
    let severity = match issue.severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warning => "WARN".yellow().bold(),
    };
    println!("{}{} {}", "  ".repeat(indent), severity, issue.message);
}

fn counts(issues: &Issues) -> (usize, usize) {
    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    (errors, issues.len() - errors)
}

/// Print issues in JSON format
pub fn print_json(file_path: &Path, issues: &Issues) -> Result<()> {
    let (errors, warnings) = counts(issues);
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "issues": issues.items,
        "summary": {
            "total": issues.len(),
            "errors": errors,
            "warnings": warnings,
        }
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
