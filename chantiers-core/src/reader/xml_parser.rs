//! XML parsing utilities for extracting cell styles from XLSX files

use super::workbook::{Border, CellStyle};
use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::BufReader;
use zip::ZipArchive;

/// Parse `xl/styles.xml` into the list of cell formats (indexed like `cellXfs`)
pub fn parse_styles(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<Vec<CellStyle>> {
    let styles_xml = match archive.by_name("xl/styles.xml") {
        Ok(file) => file,
        Err(_) => return Ok(Vec::new()),
    };

    let mut reader = Reader::from_reader(BufReader::new(styles_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut fills: Vec<Option<String>> = Vec::new();
    let mut borders: Vec<Border> = Vec::new();
    let mut xfs: Vec<(usize, usize)> = Vec::new();

    let mut in_fills = false;
    let mut in_borders = false;
    let mut in_cell_xfs = false;
    let mut solid = false;
    let mut current_fill: Option<String> = None;
    let mut current_border = Border::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"fills" => in_fills = true,
                b"borders" => in_borders = true,
                b"cellXfs" => in_cell_xfs = true,
                b"fill" if in_fills => {
                    solid = false;
                    current_fill = None;
                }
                b"patternFill" if in_fills => {
                    solid = attribute(&e, b"patternType").as_deref() == Some("solid");
                }
                b"border" if in_borders => current_border = Border::default(),
                b"left" | b"right" | b"top" | b"bottom" if in_borders => {
                    set_border_side(&mut current_border, &e);
                }
                b"xf" if in_cell_xfs => xfs.push(xf_ids(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"fgColor" if in_fills && solid => current_fill = attribute(&e, b"rgb"),
                b"patternFill" if in_fills => {}
                b"fill" if in_fills => fills.push(None),
                b"border" if in_borders => borders.push(Border::default()),
                b"left" | b"right" | b"top" | b"bottom" if in_borders => {
                    set_border_side(&mut current_border, &e);
                }
                b"xf" if in_cell_xfs => xfs.push(xf_ids(&e)),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fills" => in_fills = false,
                b"borders" => in_borders = false,
                b"cellXfs" => in_cell_xfs = false,
                b"fill" if in_fills => fills.push(current_fill.take()),
                b"border" if in_borders => borders.push(std::mem::take(&mut current_border)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(xfs
        .into_iter()
        .map(|(fill_id, border_id)| CellStyle {
            fill: fills.get(fill_id).cloned().flatten(),
            border: borders.get(border_id).cloned().unwrap_or_default(),
        })
        .collect())
}

fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn xf_ids(e: &BytesStart) -> (usize, usize) {
    let id = |key: &[u8]| {
        attribute(e, key)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0)
    };
    (id(b"fillId"), id(b"borderId"))
}

fn set_border_side(border: &mut Border, e: &BytesStart) {
    let style = attribute(e, b"style");
    match e.name().as_ref() {
        b"left" => border.left = style,
        b"right" => border.right = style,
        b"top" => border.top = style,
        b"bottom" => border.bottom = style,
        _ => {}
    }
}

/// Resolve worksheet part paths by sheet name, through workbook.xml and its relationships
pub fn extract_sheet_paths(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<HashMap<String, String>> {
    let mut rel_targets = HashMap::new();
    if let Ok(rels_xml) = archive.by_name("xl/_rels/workbook.xml.rels") {
        let mut reader = Reader::from_reader(BufReader::new(rels_xml));
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"Relationship" {
                        if let (Some(id), Some(target)) =
                            (attribute(&e, b"Id"), attribute(&e, b"Target"))
                        {
                            rel_targets.insert(id, target);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
                _ => {}
            }
            buf.clear();
        }
    }

    let mut sheet_paths = HashMap::new();
    let workbook_xml = match archive.by_name("xl/workbook.xml") {
        Ok(file) => file,
        Err(_) => return Ok(sheet_paths),
    };
    let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"sheet" {
                    let name = attribute(&e, b"name");
                    let rel_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"r:id")
                        .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                    if let (Some(name), Some(rel_id)) = (name, rel_id) {
                        if let Some(target) = rel_targets.get(&rel_id) {
                            sheet_paths.insert(name, resolve_target(target));
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet_paths)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Extract style indices of the cells of a worksheet part: (row, col) -> cellXfs index
pub fn extract_cell_style_indices(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    sheet_path: &str,
) -> Result<HashMap<(u32, u32), usize>> {
    let mut styles = HashMap::new();

    let sheet_xml = match archive.by_name(sheet_path) {
        Ok(file) => file,
        Err(_) => return Ok(styles),
    };

    let mut reader = Reader::from_reader(BufReader::new(sheet_xml));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"c" {
                    let pos = attribute(&e, b"r").and_then(|r| parse_cell_ref(&r));
                    let style = attribute(&e, b"s").and_then(|s| s.parse::<usize>().ok());
                    if let (Some(pos), Some(style)) = (pos, style) {
                        styles.insert(pos, style);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

/// Parse an A1 style cell reference into 0-based (row, col)
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let split = cell_ref.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell_ref.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0u32;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    let row = digits.parse::<u32>().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
