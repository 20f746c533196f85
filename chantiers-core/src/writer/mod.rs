//! Writer module producing xlsx reports with rust_xlsxwriter

use crate::reader::workbook::serial_from_date;
use anyhow::Result;
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::ops::Range;
use std::path::Path;

/// Report colours (RGB)
pub mod colors {
    pub const AERIAL: u32 = 0xFDE9D9;
    pub const PM: u32 = 0xFDE9D9;
    pub const UNDERGROUND: u32 = 0xDFEDDA;
    pub const PBO: u32 = 0xDFEDDA;
    pub const BPE: u32 = 0xB7DEE8;
    pub const DETAIL_FONT: u32 = 0x6F6F6F;
}

const DATE_FORMAT: &str = "dd/mm/yyyy";

/// Header column: title and width
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub width: f64,
}

impl Column {
    pub const fn new(title: &'static str, width: f64) -> Self {
        Self { title, width }
    }
}

/// Content of a written cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    Blank,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl From<&str> for CellData {
    fn from(value: &str) -> Self {
        CellData::Text(value.to_string())
    }
}

impl From<String> for CellData {
    fn from(value: String) -> Self {
        CellData::Text(value)
    }
}

impl From<&String> for CellData {
    fn from(value: &String) -> Self {
        CellData::Text(value.clone())
    }
}

impl From<i64> for CellData {
    fn from(value: i64) -> Self {
        CellData::Number(value as f64)
    }
}

impl From<usize> for CellData {
    fn from(value: usize) -> Self {
        CellData::Number(value as f64)
    }
}

impl From<f64> for CellData {
    fn from(value: f64) -> Self {
        CellData::Number(value)
    }
}

impl From<NaiveDate> for CellData {
    fn from(value: NaiveDate) -> Self {
        CellData::Date(value)
    }
}

/// Style applied on a range of cells of a row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowStyle {
    Plain,
    /// Solid fill with the given RGB colour
    Fill(u32),
    /// Small grey font used on detail rows
    Detail,
}

impl RowStyle {
    /// Fill style from an ARGB string as read in workbooks ("FFFDE9D9"); plain when unreadable
    pub fn fill_argb(argb: &str) -> Self {
        let rgb = argb.get(argb.len().saturating_sub(6)..).unwrap_or("");
        match u32::from_str_radix(rgb, 16) {
            Ok(color) if rgb.len() == 6 => RowStyle::Fill(color),
            _ => RowStyle::Plain,
        }
    }

    fn format(&self) -> Format {
        match self {
            RowStyle::Plain => Format::new(),
            RowStyle::Fill(color) => Format::new().set_background_color(Color::RGB(*color)),
            RowStyle::Detail => Format::new()
                .set_font_size(10)
                .set_font_color(Color::RGB(colors::DETAIL_FONT)),
        }
    }
}

/// Appends rows one after the other on a worksheet
pub struct SheetWriter<'a> {
    worksheet: &'a mut Worksheet,
    row: u32,
}

impl<'a> SheetWriter<'a> {
    /// Add a named worksheet to the workbook
    pub fn new(workbook: &'a mut Workbook, name: &str) -> Result<Self> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        Ok(Self { worksheet, row: 0 })
    }

    /// Write the header row and set column widths
    pub fn add_header(&mut self, columns: &[Column]) -> Result<()> {
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            self.worksheet.write_string(self.row, col, column.title)?;
            self.worksheet.set_column_width(col, column.width)?;
        }
        self.row += 1;
        Ok(())
    }

    /// Write an unstyled row
    pub fn add_plain_row(&mut self, cells: &[CellData]) -> Result<()> {
        self.add_row(cells, RowStyle::Plain, 0..0)
    }

    /// Write a row, applying the style on the `styled` columns (blank cells included)
    pub fn add_row(&mut self, cells: &[CellData], style: RowStyle, styled: Range<u16>) -> Result<()> {
        let styled_format = style.format();
        let plain_format = Format::new();
        let last_col = (cells.len() as u16).max(styled.end);
        for col in 0..last_col {
            let format = if styled.contains(&col) {
                &styled_format
            } else {
                &plain_format
            };
            let data = cells.get(col as usize).unwrap_or(&CellData::Blank);
            self.write_cell(col, data, format)?;
        }
        self.row += 1;
        Ok(())
    }

    /// Write a cell at the given position of the sheet, outside the row flow
    pub fn write_at(&mut self, row: u32, col: u16, data: &CellData) -> Result<()> {
        let saved = self.row;
        self.row = row;
        let result = self.write_cell(col, data, &Format::new());
        self.row = saved;
        result
    }

    /// Set the width of a column
    pub fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        self.worksheet.set_column_width(col, width)?;
        Ok(())
    }

    fn write_cell(&mut self, col: u16, data: &CellData, format: &Format) -> Result<()> {
        let row = self.row;
        match data {
            CellData::Blank => {
                self.worksheet.write_blank(row, col, format)?;
            }
            CellData::Text(text) => {
                self.worksheet.write_string_with_format(row, col, text, format)?;
            }
            CellData::Number(n) => {
                self.worksheet.write_number_with_format(row, col, *n, format)?;
            }
            CellData::Date(date) => {
                let date_format = format.clone().set_num_format(DATE_FORMAT);
                self.worksheet
                    .write_number_with_format(row, col, serial_from_date(*date), &date_format)?;
            }
        }
        Ok(())
    }
}

/// Save a workbook, xlsx being the only supported output format
pub fn save_workbook<P: AsRef<Path>>(workbook: &mut Workbook, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("xlsx") => {
            workbook.save(path)?;
            Ok(())
        }
        _ => anyhow::bail!("Unsupported output format: {}", path.display()),
    }
}
