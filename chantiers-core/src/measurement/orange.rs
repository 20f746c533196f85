//! Orange measurement macro workbooks

use super::{Campaign, Measurement};
use crate::error::LayoutError;
use crate::reader::{Sheet, read_workbook};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SHEET_NAME: &str = "Données";

const CAMPAIGN_ROW: u32 = 3;
const CAMPAIGN_COL: u32 = 3;
const PT_NAME_ROW: u32 = 6;
const PT_NAME_COL: u32 = 3;

const MEAS_NAME_COL: u32 = 2;
const MEAS_START_ROW: u32 = 32;
const MEAS_TITLE_ROW: u32 = 28;
const MEAS_WAVELENGTH_COL: u32 = 3;
const EVENT_COL_OFFSET: u32 = 5;
const EVENT_BEGIN_COL: u32 = 4;
const EVENT_LOSS_COL: u32 = 6;
const REPORT_LOSS_COL: u32 = 6;
const REPORT_LENGTH_COL: u32 = 7;

pub fn parse_campaign_file<P: AsRef<Path>>(path: P) -> Result<Campaign> {
    let path = path.as_ref();
    let workbook = read_workbook(path)?;
    let sheet = workbook
        .get_sheet(SHEET_NAME)
        .ok_or_else(|| LayoutError::SheetNotFound(SHEET_NAME.to_string()))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(parse_campaign_sheet(sheet))
}

pub fn parse_campaign_sheet(sheet: &Sheet) -> Campaign {
    let nb_events = (0..)
        .take_while(|n| !sheet.value(MEAS_TITLE_ROW, EVENT_COL_OFFSET * (n + 1) + EVENT_BEGIN_COL).is_empty())
        .count() as u32;
    let report_col = EVENT_COL_OFFSET * (nb_events + 1);
    let float = |row: u32, col: u32| sheet.float(row, col).unwrap_or(0.0);

    let mut measurements = Vec::new();
    let mut row = MEAS_START_ROW;
    loop {
        let name = sheet.value(row, MEAS_NAME_COL);
        if name.is_empty() {
            break;
        }
        let (evt, max_splice) = (1..=nb_events)
            .map(|event| (event, float(row, EVENT_COL_OFFSET * event + EVENT_LOSS_COL)))
            .fold((1, 0.0), |(best, max), (event, loss)| {
                if loss > max { (event, loss) } else { (best, max) }
            });
        measurements.push(Measurement {
            name,
            wavelength: sheet.value(row, MEAS_WAVELENGTH_COL),
            tot_loss: float(row, report_col + REPORT_LOSS_COL),
            distance: float(row, report_col + REPORT_LENGTH_COL),
            evt: evt as usize,
            max_splice,
            max_connector: float(row, EVENT_LOSS_COL),
            ..Default::default()
        });
        row += 1;
    }

    Campaign {
        name: sheet.value(CAMPAIGN_ROW, CAMPAIGN_COL),
        pt_name: sheet.value(PT_NAME_ROW, PT_NAME_COL),
        measurements,
    }
}

/// Write the OTDR report of a measurement workbook next to it, with a `.txt` extension
pub fn xls_to_txt<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let campaign = parse_campaign_file(path)?;
    let txt_file = path.with_extension("txt");
    let mut writer = BufWriter::new(
        File::create(&txt_file).with_context(|| format!("could not create {}", txt_file.display()))?,
    );
    campaign.write(&mut writer)?;
    writer.flush()?;
    Ok(txt_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_campaign_sheet() {
        let mut sheet = Sheet::new(SHEET_NAME);
        sheet.set_value(CAMPAIGN_ROW, CAMPAIGN_COL, "CCPE_DES_PM03");
        sheet.set_value(PT_NAME_ROW, PT_NAME_COL, "PT 182064");
        // two events, report after the second one
        sheet.set_value(MEAS_TITLE_ROW, 9, "Evt 1");
        sheet.set_value(MEAS_TITLE_ROW, 14, "Evt 2");

        sheet.set_value(32, MEAS_NAME_COL, "F1");
        sheet.set_value(32, MEAS_WAVELENGTH_COL, "1550");
        sheet.set_value(32, EVENT_LOSS_COL, 0.31);
        sheet.set_value(32, 11, 0.05);
        sheet.set_value(32, 16, 0.12);
        sheet.set_value(32, 21, 1.45);
        sheet.set_value(32, 22, 2350.2);

        sheet.set_value(33, MEAS_NAME_COL, "F2");
        sheet.set_value(33, 11, "n/a");

        let campaign = parse_campaign_sheet(&sheet);
        assert_eq!(campaign.name, "CCPE_DES_PM03");
        assert_eq!(campaign.pt_name, "PT 182064");
        assert_eq!(campaign.measurements.len(), 2);

        let f1 = &campaign.measurements[0];
        assert_eq!(f1.wavelength, "1550");
        assert_eq!(f1.evt, 2);
        assert_eq!(f1.max_splice, 0.12);
        assert_eq!(f1.tot_loss, 1.45);
        assert_eq!(f1.distance, 2350.2);
        assert_eq!(f1.max_connector, 0.31);

        let f2 = &campaign.measurements[1];
        assert_eq!(f2.evt, 1);
        assert_eq!(f2.max_splice, 0.0);
    }
}
