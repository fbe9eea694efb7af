#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod date;
pub mod gedcom;
pub mod id;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod project;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, load_config};
pub use date::{Locale, PartialDate, format_date, format_date_range};
pub use gedcom::{GedcomData, parse_gedcom, serialize_gedcom};
pub use layout::{LayoutResult, Position, compute_layout, compute_layout_with_config};
pub use model::{Gender, Orientation, Person, ProjectType, RelationSubtype, RelationType, Relationship};
pub use project::{
    FamilyTreeProject, ProjectError, export_project, export_project_json, import_project,
    project_from_gedcom,
};
