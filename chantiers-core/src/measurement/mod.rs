//! OTDR measurement campaigns and their text report

use std::io::{self, Write};

pub mod orange;

pub use orange::{parse_campaign_file, parse_campaign_sheet, xls_to_txt};

/// One fiber measurement at a given wavelength
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    pub name: String,
    pub wavelength: String,
    pub tot_loss: f64,
    pub distance: f64,
    /// Index of the event having the largest splice loss
    pub evt: usize,
    pub max_splice: f64,
    pub tot_orl: f64,
    pub max_connector: f64,
    pub len_max_splice: f64,
}

/// Measurements done from one point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Campaign {
    pub name: String,
    pub pt_name: String,
    pub measurements: Vec<Measurement>,
}

impl Campaign {
    /// Write the OTDR results report (tab separated, CRLF line endings)
    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "Nb File\t{}\r\n\r\n", self.measurements.len())?;
        write!(w, "[Results]\r\n")?;
        write!(
            w,
            "Alarms \tFib #\tDir.\tLaser \tTot loss\t Distance\tEvt\tMax Splice\tTot ORL\tMax Connector \tLen. Max Splice\t\r\n"
        )?;
        for (i, m) in self.measurements.iter().enumerate() {
            write!(
                w,
                "       \t{:<5}\tO->E\t{:<6}\t{:<8.3}\t{:<9.1}\t{:<3}\t{:<10}\t{:<7}\t{:<14.3}\t{:<15}\t\r\n",
                i + 1,
                m.wavelength,
                m.tot_loss,
                m.distance,
                m.evt,
                format_value(m.max_splice, 2),
                format_value(m.tot_orl, 2),
                m.max_connector,
                format_value(m.len_max_splice, 1),
            )?;
        }
        Ok(())
    }
}

/// Zero values are reported as "-"
fn format_value(value: f64, precision: usize) -> String {
    if value == 0.0 {
        "-".to_string()
    } else {
        format!("{value:.precision$}")
    }
}
