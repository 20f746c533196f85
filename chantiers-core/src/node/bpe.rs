//! Splice plan ("Plan PT xxx") workbook parsing

use super::Node;
use crate::error::LayoutError;
use crate::reader::{Sheet, read_workbook};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

const ROW_PT_NAME: u32 = 1;
const COL_PT_NAME: u32 = 8;
const ROW_BPE_TYPE: u32 = 4;
const COL_BPE_TYPE: u32 = 1;
const ROW_ADDRESS: u32 = 2;
const COL_ADDRESS: u32 = 8;

const ROW_FIRST_FIBER: u32 = 9;
const COL_FIBER_IN: u32 = 11;
const COL_FIBER_OUT: u32 = 19;
const COL_CABLE_IN: u32 = 3;
const COL_CABLE_OUT: u32 = 24;
const COL_OPERATION: u32 = 13;
const COL_TUBING: u32 = 17;
const COL_CABLE_DICT: u32 = 18;

const SHEET_PREFIX: &str = "Plan ";
const CABLE_DICT_MARKER: &str = "Affectation des";

/// Content of one splice plan, troncons being referenced by name
///
/// Records are built independently of each other, then wired into a zone.
#[derive(Debug, Clone, Default)]
pub struct BpeRecord {
    /// Node with name, address, box type, operations and location type set
    pub node: Node,
    pub troncon_in: Option<String>,
    /// Outgoing troncons found on fiber rows, in order of appearance
    pub troncons_out: Vec<String>,
    /// Capacities declared in the cable dictionary
    pub capacities: Vec<(String, usize)>,
}

/// Read the splice plan held by the first sheet of a workbook
pub fn read_bpe_file<P: AsRef<Path>>(path: P) -> Result<BpeRecord> {
    let path = path.as_ref();
    let workbook = read_workbook(path)?;
    let sheet = workbook
        .sheets
        .first()
        .with_context(|| format!("{} has no sheet", path.display()))?;
    let record = parse_bpe_sheet(sheet)?;
    Ok(record)
}

/// Parse a splice plan sheet
pub fn parse_bpe_sheet(sheet: &Sheet) -> Result<BpeRecord, LayoutError> {
    if !sheet.name.starts_with(SHEET_PREFIX) {
        return Err(LayoutError::UnexpectedSheet(sheet.name.clone()));
    }

    let mut record = BpeRecord::default();
    record.node.pt_name = sheet.value(ROW_PT_NAME, COL_PT_NAME);
    record.node.bpe_type = sheet.value(ROW_BPE_TYPE, COL_BPE_TYPE);
    record.node.address = sheet.value(ROW_ADDRESS, COL_ADDRESS);
    debug!("parsing splice plan of {}", record.node.pt_name);

    let mut troncon_in = String::new();
    let mut troncon_out = String::new();
    let mut in_cable_dict = false;
    let mut row = ROW_FIRST_FIBER;
    while row < sheet.max_row() {
        if in_cable_dict {
            parse_cable_dict_row(sheet, row, &mut record)?;
            row += 1;
            continue;
        }

        let fiber_in = sheet.value(row, COL_FIBER_IN);
        let fiber_out = sheet.value(row, COL_FIBER_OUT);
        let ope = sheet.value(row, COL_OPERATION);

        let new_in = sheet.value(row, COL_CABLE_IN);
        if !new_in.is_empty()
            && new_in != troncon_in
            && !(ope == "Love" && !fiber_in.is_empty() && !fiber_out.is_empty())
        {
            if record.troncon_in.is_some() {
                return Err(LayoutError::invalid_cell(
                    &sheet.name,
                    row,
                    COL_CABLE_IN,
                    new_in,
                    "multiple Troncon In found",
                ));
            }
            troncon_in = new_in;
            record.troncon_in = Some(troncon_in.clone());
        }

        let new_out = sheet.value(row, COL_CABLE_OUT);
        if !new_out.is_empty() && new_out != troncon_out {
            troncon_out = new_out;
            if !record.troncons_out.contains(&troncon_out) {
                record.troncons_out.push(troncon_out.clone());
            }
        }

        if !fiber_in.is_empty() || !fiber_out.is_empty() {
            record
                .node
                .add_operation(&troncon_in, &ope, &fiber_out, &troncon_out);
        }

        if sheet.value(row, COL_TUBING).starts_with(CABLE_DICT_MARKER) {
            in_cable_dict = true;
            row += 2;
        }
        row += 1;
    }

    record.node.set_location_type();
    Ok(record)
}

/// Cable dictionary line: "<capa> FO-<troncon name>"
fn parse_cable_dict_row(sheet: &Sheet, row: u32, record: &mut BpeRecord) -> Result<(), LayoutError> {
    let info = sheet.value(row, COL_CABLE_DICT);
    if info.is_empty() {
        return Ok(());
    }
    let invalid = |message: &str| LayoutError::invalid_cell(&sheet.name, row, COL_CABLE_DICT, info.clone(), message);

    let (capa_info, name) = info
        .split_once('-')
        .ok_or_else(|| invalid("could not parse Troncon Info"))?;
    let capa = capa_info
        .split(' ')
        .next()
        .and_then(|capa| capa.parse::<usize>().ok())
        .ok_or_else(|| invalid("could not parse Troncon Capa Info"))?;
    if record.troncon_in.is_none() {
        return Err(LayoutError::Inconsistent(format!(
            "node {} has no Troncon In",
            record.node.pt_name
        )));
    }
    record.capacities.push((name.to_string(), capa));
    Ok(())
}
