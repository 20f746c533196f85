//! chantiers-core: fiber-optic worksite workbooks
//!
//! Reads the spreadsheets produced along an FTTH deployment (splice plans, routing
//! tables, cable quantities, synoptics, OTDR macros, team progress tracking) and
//! derives the reports used to follow the worksite.

pub mod bpu;
pub mod config;
pub mod dirbrowser;
pub mod error;
pub mod issue;
pub mod measurement;
pub mod node;
pub mod reader;
pub mod ripsite;
pub mod suivi;
pub mod syno;
pub mod writer;
pub mod zacable;
pub mod zone;

pub use bpu::Catalog;
pub use config::ChantierConfig;
pub use error::LayoutError;
pub use issue::{Issue, IssueScope, Issues, Severity};
pub use suivi::Suivi;
pub use syno::Syno;
pub use zone::Zone;
