use crate::config::LayoutConfig;
use crate::layout::LayoutResult;
use crate::model::{Orientation, Person, ProjectType, RelationType, Relationship};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub kind: ProjectType,
    pub orientation: Orientation,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Straight segment between the centres of two placed persons.
#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub kind: RelationType,
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    /// Persons are listed in input order; relationships with an unplaced
    /// endpoint are left out.
    pub fn from_layout(
        result: &LayoutResult,
        persons: &[Person],
        relationships: &[Relationship],
        orientation: Orientation,
        project_type: ProjectType,
        config: &LayoutConfig,
    ) -> Self {
        let mut seen: HashSet<&str> = HashSet::with_capacity(persons.len());
        let mut nodes = Vec::with_capacity(result.node_positions.len());
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for person in persons {
            let Some(pos) = result.node_positions.get(&person.id) else {
                continue;
            };
            if !seen.insert(person.id.as_str()) {
                continue;
            }
            width = width.max(pos.x + config.node_width);
            height = height.max(pos.y + config.node_height);
            nodes.push(NodeDump {
                id: person.id.clone(),
                label: person.display_name(),
                x: pos.x,
                y: pos.y,
                width: config.node_width,
                height: config.node_height,
            });
        }
        if !nodes.is_empty() {
            width += config.margin;
            height += config.margin;
        }

        let centre = |id: &str| {
            result.node_positions.get(id).map(|pos| {
                [
                    pos.x + config.node_width / 2.0,
                    pos.y + config.node_height / 2.0,
                ]
            })
        };
        let edges = relationships
            .iter()
            .filter_map(|rel| {
                let start = centre(rel.from.as_str())?;
                let end = centre(rel.to.as_str())?;
                Some(EdgeDump {
                    id: rel.id.clone(),
                    kind: rel.kind,
                    from: rel.from.clone(),
                    to: rel.to.clone(),
                    points: vec![start, end],
                })
            })
            .collect();

        LayoutDump {
            kind: project_type,
            orientation,
            width,
            height,
            nodes,
            edges,
        }
    }

    pub fn write_to(&self, writer: impl Write) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    dump.write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}
