//! The editor's project file.
//!
//! A project bundles persons, relationships and the persisted canvas state.
//! Files are plain JSON with camelCase keys; [`import_project`] validates
//! them and [`FamilyTreeProject::export`] stamps them for saving.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::date::Locale;
use crate::gedcom::parse_gedcom;
use crate::layout::{Position, compute_layout_with_config};
use crate::model::{Orientation, Person, ProjectType, Relationship};

pub const PROJECT_VERSION: &str = "1.0.0";
pub const DEFAULT_PROJECT_NAME: &str = "Nuovo Progetto";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("invalid project file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate person id `{0}`")]
    DuplicatePerson(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    pub author: String,
    #[serde(default)]
    pub project_type: ProjectType,
}

impl ProjectMeta {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_rfc3339();
        Self {
            name: name.into(),
            description: String::new(),
            created_at: now.clone(),
            updated_at: now,
            author: String::new(),
            project_type: ProjectType::FamilyTree,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Where an edge attaches to a person box; `offset` is a percentage along
/// the side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandlePosition {
    pub side: HandleSide,
    pub offset: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub orientation: Orientation,
    pub root_person_id: Option<String>,
    pub node_positions: BTreeMap<String, Position>,
    /// person id -> relationship id -> handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_positions: Option<BTreeMap<String, BTreeMap<String, HandlePosition>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyTreeProject {
    pub version: String,
    pub meta: ProjectMeta,
    pub persons: Vec<Person>,
    pub relationships: Vec<Relationship>,
    pub layout: LayoutState,
    pub settings: Settings,
}

impl Default for FamilyTreeProject {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }
}

impl FamilyTreeProject {
    /// An empty family-tree project created now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            meta: ProjectMeta::new(name),
            persons: Vec::new(),
            relationships: Vec::new(),
            layout: LayoutState::default(),
            settings: Settings::default(),
        }
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    /// Copy ready for saving: current format version and a fresh `updatedAt`.
    pub fn export(&self) -> Self {
        let mut out = self.clone();
        out.version = PROJECT_VERSION.to_string();
        out.meta.updated_at = now_rfc3339();
        out
    }

    /// Removes a person together with every relationship touching them and
    /// their stored position. A removed root passes to the first remaining
    /// person. Returns `false` when no person has that id.
    pub fn remove_person(&mut self, id: &str) -> bool {
        let before = self.persons.len();
        self.persons.retain(|p| p.id != id);
        if self.persons.len() == before {
            return false;
        }

        let rels_before = self.relationships.len();
        self.relationships.retain(|r| !r.involves(id));
        self.layout.node_positions.remove(id);
        if let Some(handles) = self.layout.handle_positions.as_mut() {
            handles.remove(id);
        }
        if self.layout.root_person_id.as_deref() == Some(id) {
            self.layout.root_person_id = self.persons.first().map(|p| p.id.clone());
        }
        self.meta.updated_at = now_rfc3339();

        debug!(
            person = id,
            relationships = rels_before - self.relationships.len(),
            "removed person"
        );
        true
    }

    /// Replaces every stored position with a fresh automatic layout.
    pub fn relayout(&mut self, config: &LayoutConfig) {
        let result = compute_layout_with_config(
            &self.persons,
            &self.relationships,
            self.layout.orientation,
            self.meta.project_type,
            config,
        );
        self.layout.node_positions = result.node_positions;
    }
}

/// Parses and validates a project file.
///
/// Relationships pointing at unknown persons are accepted; layout and
/// export skip them. Subtypes that do not belong to their relationship
/// type are kept but logged.
pub fn import_project(json: &str) -> Result<FamilyTreeProject, ProjectError> {
    let project: FamilyTreeProject = serde_json::from_str(json)?;

    let mut seen = HashSet::with_capacity(project.persons.len());
    for person in &project.persons {
        if !seen.insert(person.id.as_str()) {
            return Err(ProjectError::DuplicatePerson(person.id.clone()));
        }
    }

    for rel in &project.relationships {
        let Some(subtype) = rel.subtype else {
            continue;
        };
        if !subtype.applies_to(rel.kind) {
            warn!(
                relationship = %rel.id,
                ?subtype,
                kind = ?rel.kind,
                "subtype does not match relationship type"
            );
        }
    }

    debug!(
        persons = project.persons.len(),
        relationships = project.relationships.len(),
        "imported project"
    );
    Ok(project)
}

pub fn export_project(project: &FamilyTreeProject) -> FamilyTreeProject {
    project.export()
}

/// Exported project as pretty-printed JSON.
pub fn export_project_json(project: &FamilyTreeProject) -> Result<String, ProjectError> {
    Ok(serde_json::to_string_pretty(&project.export())?)
}

/// Builds a project from a GEDCOM document, laid out as a vertical family
/// tree rooted at the first person. A trailing `.ged` is dropped from `name`.
pub fn project_from_gedcom(name: &str, text: &str) -> FamilyTreeProject {
    project_from_gedcom_with_config(name, text, &LayoutConfig::default())
}

pub fn project_from_gedcom_with_config(
    name: &str,
    text: &str,
    config: &LayoutConfig,
) -> FamilyTreeProject {
    let data = parse_gedcom(text);
    let name = name.strip_suffix(".ged").unwrap_or(name);

    let mut project = FamilyTreeProject::new(name);
    project.layout.root_person_id = data.persons.first().map(|p| p.id.clone());
    project.persons = data.persons;
    project.relationships = data.relationships;
    project.relayout(config);
    project
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
