mod common;

use chantiers_core::reader::{Sheet, read_workbook};
use chantiers_core::{ChantierConfig, Zone};
use common::{add_sheet, number, save, text, write_splice_plan};
use std::fs;
use std::path::Path;

fn has_text(sheet: &Sheet, value: &str) -> bool {
    sheet.cells.values().any(|c| c.value.to_string() == value)
}

/// PT 1 splices TR-2 toward PT 2; PT 1 input cable comes from an unknown PM
fn write_bpe_dir(dir: &Path) {
    write_splice_plan(
        &dir.join("BPE PT 1.xlsx"),
        "PT 1",
        &[
            ["TR-1", "1", "EPISSURE", "1", "TR-2"],
            ["", "2", "EPISSURE", "2", ""],
            ["", "3", "ATTENTE", "", ""],
        ],
        &["48 FO-TR-1", "12 FO-TR-2"],
    );
    write_splice_plan(
        &dir.join("BPE PT 2.xlsx"),
        "PT 2",
        &[
            ["TR-2", "1", "ATTENTE", "", ""],
            ["", "2", "ATTENTE", "", ""],
        ],
        &["12 FO-TR-2"],
    );
    // Excel lock file left by an open workbook
    fs::write(dir.join("~$BPE PT 1.xlsx"), "locked").unwrap();
}

fn write_quantities(path: &Path) {
    save(path, |workbook| {
        let sheet = add_sheet(workbook, "Quantités");
        text(sheet, 3, 1, "etiquette");
        for (row, (troncon, cable_type, length, pulling)) in [
            ("TR-1", "CABLE_48FO_SOUT", 350.0, "INFRA"),
            ("TR-2", "CABLE_12FO_AER", 120.0, "AERIEN"),
        ]
        .into_iter()
        .enumerate()
        {
            let row = row as u32 + 5;
            text(sheet, row, 1, troncon);
            text(sheet, row, 2, cable_type);
            number(sheet, row, 4, 15.0);
            number(sheet, row, 10, length);
            text(sheet, row, 12, pulling);
        }
    });
}

#[test]
fn test_bpe_dir_to_reports() {
    let dir = tempfile::tempdir().unwrap();
    write_bpe_dir(dir.path());

    let config = ChantierConfig::default();
    let mut zone = Zone::with_config(&config);
    zone.parse_bpe_dir(dir.path(), &config.global.bpe_file_marker)
        .unwrap();
    zone.create_bpe_tree();
    zone.set_splice_points();
    zone.detect_cables();

    assert_eq!(zone.roots.len(), 1);
    let pm = zone.roots[0];
    assert_eq!(zone.nodes[pm].location_type, "PM");
    let pt1 = zone.nodes.find("PT 1").unwrap();
    let pt2 = zone.nodes.find("PT 2").unwrap();
    assert_eq!(zone.nodes[pm].children, vec![pt1]);
    assert_eq!(zone.nodes[pt1].children, vec![pt2]);
    assert!(!zone.cables.is_empty());

    let report = zone.write_xlsx(dir.path(), "PM3").unwrap();
    assert_eq!(report, dir.path().join("PM3_suivi.xlsx"));
    let workbook = read_workbook(&report).unwrap();
    assert!(workbook.get_sheet("Tirage").is_none());
    let racco = workbook.get_sheet("Racco").unwrap();
    assert!(has_text(racco, "PT 1"));
    assert!(has_text(racco, "PT 2"));
    assert!(workbook.get_sheet("Mesures").is_some());

    let json = zone.write_json(dir.path(), "PM3").unwrap();
    let site: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(site["Ref"], "PM3");
    assert!(site["Nodes"].get("PT 1").is_some());
    assert!(site["Nodes"].get("PT 2").is_some());
}

#[test]
fn test_cable_quantities_enable_pulling_sheet() {
    let dir = tempfile::tempdir().unwrap();
    write_bpe_dir(dir.path());
    let quantities = dir.path().join("quantites.xlsx");
    write_quantities(&quantities);

    let config = ChantierConfig::default();
    let mut zone = Zone::with_config(&config);
    zone.parse_bpe_dir(dir.path(), &config.global.bpe_file_marker)
        .unwrap();
    zone.create_bpe_tree();
    zone.set_splice_points();
    zone.detect_cables();
    zone.parse_quantite_cable(&quantities).unwrap();

    let tr2 = zone.troncons.find("TR-2").unwrap();
    assert_eq!(zone.troncons[tr2].cable_type, "CABLE_12FO_AER");
    assert_eq!(zone.troncons[tr2].aerial_length, 120);
    assert_eq!(zone.troncons[tr2].love_length, 15);

    let report = zone.write_xlsx(dir.path(), "PM3").unwrap();
    let workbook = read_workbook(&report).unwrap();
    let tirage = workbook.get_sheet("Tirage").unwrap();
    assert!(has_text(tirage, "CABLE_12FO_AER"));
}

#[test]
fn test_duplicate_pt_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_bpe_dir(dir.path());
    write_splice_plan(
        &dir.path().join("BPE PT 1 bis.xlsx"),
        "PT 1",
        &[["TR-9", "1", "ATTENTE", "", ""]],
        &[],
    );

    let mut zone = Zone::new();
    let err = zone.parse_bpe_dir(dir.path(), "PT").unwrap_err();
    assert!(format!("{err:#}").contains("PT 1 was already defined"));
}
