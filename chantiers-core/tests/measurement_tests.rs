mod common;

use chantiers_core::ChantierConfig;
use chantiers_core::dirbrowser::{find_files, process};
use chantiers_core::measurement::{parse_campaign_file, xls_to_txt};
use common::{add_sheet, number, save, text};
use std::fs;
use std::path::Path;

/// Orange macro workbook with one event column and two measured fibers
fn write_measures(path: &Path) {
    save(path, |workbook| {
        let sheet = add_sheet(workbook, "Données");
        text(sheet, 3, 3, "CCPE_DES_PM03");
        text(sheet, 6, 3, "PT 182064");
        text(sheet, 28, 9, "Evt 1");

        text(sheet, 32, 2, "F1");
        text(sheet, 32, 3, "1550");
        number(sheet, 32, 6, 0.31);
        number(sheet, 32, 11, 0.12);
        number(sheet, 32, 16, 1.45);
        number(sheet, 32, 17, 2350.2);

        text(sheet, 33, 2, "F2");
        text(sheet, 33, 3, "1310");
        number(sheet, 33, 16, 0.8);
        number(sheet, 33, 17, 2349.9);
    });
}

#[test]
fn test_convert_measurement_tree() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("PM03").join("PT 182064");
    fs::create_dir_all(&sub).unwrap();
    write_measures(&sub.join("mesures.xlsx"));
    fs::write(sub.join("notes.txt"), "not a workbook").unwrap();

    let config = ChantierConfig::default();
    let files = find_files(dir.path(), &config.global.measure_extension);
    assert_eq!(files, vec![sub.join("mesures.xlsx")]);

    let txt = xls_to_txt(&files[0]).unwrap();
    assert_eq!(txt, sub.join("mesures.txt"));
    let report = fs::read_to_string(&txt).unwrap();
    let lines: Vec<&str> = report.split("\r\n").collect();
    assert_eq!(lines[0], "Nb File\t2");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "[Results]");
    assert!(lines[3].starts_with("Alarms \tFib #"));
    assert!(lines[4].starts_with("       \t1    \tO->E\t1550  \t1.450   \t2350.2   \t1  \t0.12      \t-      \t0.310"));
    assert!(lines[5].starts_with("       \t2    \tO->E\t1310  \t0.800   \t2349.9   \t1  \t-         \t"));
}

#[test]
fn test_campaign_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesures.xlsx");
    write_measures(&path);

    let campaign = parse_campaign_file(&path).unwrap();
    assert_eq!(campaign.name, "CCPE_DES_PM03");
    assert_eq!(campaign.pt_name, "PT 182064");
    assert_eq!(campaign.measurements.len(), 2);
}

#[test]
fn test_process_stops_on_invalid_workbook() {
    let dir = tempfile::tempdir().unwrap();
    save(&dir.path().join("a.xlsx"), |workbook| {
        add_sheet(workbook, "Feuil1");
    });

    let err = process(dir.path(), ".xlsx", |file| xls_to_txt(file).map(|_| ())).unwrap_err();
    assert!(format!("{err:#}").contains("could not find sheet 'Données'"));
}
