//! GEDCOM import and export.
//!
//! Supports the lineage-linked subset needed for family-tree interchange:
//! `HEAD`, `INDI` (`NAME`, `SEX`, `BIRT`, `DEAT`, `DATE`, `PLAC`, `NOTE`,
//! `CONT`, `CONC`), `FAM` (`HUSB`, `WIFE`, `CHIL`, `MARR`, `DIV`) and `TRLR`.
//! Anything else is skipped.

mod parse;
mod serialize;

use crate::model::{Person, Relationship};

pub use parse::parse_gedcom;
pub use serialize::serialize_gedcom;

/// Persons and relationships read from a GEDCOM document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GedcomData {
    pub persons: Vec<Person>,
    pub relationships: Vec<Relationship>,
}
