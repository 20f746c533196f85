//! ZACABLE workbooks: one sheet per site, summarized per zone

use crate::reader::read_workbook;
use crate::writer::{SheetWriter, save_workbook};
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub mod site;

pub use site::{Dest, Link, Site, short_site_name, short_zone_name};

#[derive(Debug, Clone, Default)]
pub struct Zone {
    /// DXA
    pub name: String,
    sites: BTreeMap<String, Site>,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sites: BTreeMap::new(),
        }
    }

    /// Add a site, replacing any site with the same full name
    pub fn add(&mut self, site: Site) {
        self.sites.insert(site.full_name.clone(), site);
    }

    pub fn site(&self, full_name: &str) -> Option<&Site> {
        self.sites.get(full_name)
    }

    /// Sites sorted by full name
    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Parse every sheet of a ZACABLE workbook
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Processing file '{}'", path.display());
        let workbook = read_workbook(path)?;
        for sheet in &workbook.sheets {
            debug!("parsing sheet {}", sheet.name);
            self.add(Site::from_sheet(sheet));
        }
        Ok(())
    }

    /// Parse the ZACABLE workbooks of a directory (files starting with `prefix`)
    pub fn parse_dir<P: AsRef<Path>>(&mut self, dir: P, prefix: &str) -> Result<usize> {
        let files = zacable_files(dir.as_ref(), prefix);
        for file in &files {
            self.parse_file(file)
                .with_context(|| format!("could not process xlsx file {}", file.display()))?;
        }
        Ok(files.len())
    }

    /// Write the zone recap: one sheet named after the zone
    pub fn write_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.sites.is_empty() {
            anyhow::bail!("zone {} has no site, nothing to write", self.name);
        }
        let mut workbook = Workbook::new();
        {
            let mut sheet = SheetWriter::new(&mut workbook, &self.name)?;
            sheet.add_header(site::COLUMNS)?;
            for site in self.sites() {
                site.write_rows(&mut sheet)?;
            }
        }
        save_workbook(&mut workbook, path)?;
        Ok(())
    }
}

/// ZACABLE workbooks of a directory, sorted by name
pub fn zacable_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.starts_with(prefix) && name.ends_with(".xlsx")
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_site() {
        let mut zone = Zone::new("DXA");
        let mut first = Site::new("PBO-68-048-DXA-1010");
        first.bpe_type = "TENIO T1".to_string();
        zone.add(first);
        zone.add(Site::new("PBO-68-048-DXA-1002"));
        let mut second = Site::new("PBO-68-048-DXA-1010");
        second.bpe_type = "TENIO T2".to_string();
        zone.add(second);

        assert_eq!(zone.len(), 2);
        assert_eq!(zone.site("PBO-68-048-DXA-1010").unwrap().bpe_type, "TENIO T2");
        let names: Vec<&str> = zone.sites().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["1002", "1010"]);
    }

    #[test]
    fn test_empty_zone_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Zone::new("DXA").write_xlsx(dir.path().join("DXA_suivi.xlsx")).is_err());
    }
}
