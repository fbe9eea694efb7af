//! Automatic placement of persons on the canvas.
//!
//! A dagre-style layered layout (longest-path ranks, median ordering, then
//! coordinates) lives in `ranking`; this module decides which
//! relationships drive the hierarchy and then applies the
//! relationship-specific post-passes (partner co-location).

mod ranking;

use crate::config::LayoutConfig;
use crate::model::{Orientation, Person, ProjectType, RelationType, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Top-left corner of a person box. `y` grows towards descendants.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub node_positions: BTreeMap<String, Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RankDir {
    TopBottom,
    LeftRight,
}

impl RankDir {
    /// Friend clusters have no hierarchy, so they always flow left to right.
    fn for_project(orientation: Orientation, project_type: ProjectType) -> Self {
        match (project_type, orientation) {
            (ProjectType::FriendCluster, _) => Self::LeftRight,
            (ProjectType::FamilyTree, Orientation::Vertical) => Self::TopBottom,
            (ProjectType::FamilyTree, Orientation::Horizontal) => Self::LeftRight,
        }
    }

    fn is_horizontal(self) -> bool {
        self == Self::LeftRight
    }
}

fn rankdir_label(rank_dir: RankDir) -> &'static str {
    match rank_dir {
        RankDir::TopBottom => "tb",
        RankDir::LeftRight => "lr",
    }
}

/// Lays out `persons` with the default person box geometry.
pub fn compute_layout(
    persons: &[Person],
    relationships: &[Relationship],
    orientation: Orientation,
    project_type: ProjectType,
) -> LayoutResult {
    compute_layout_with_config(
        persons,
        relationships,
        orientation,
        project_type,
        &LayoutConfig::default(),
    )
}

/// Lays out `persons`, returning a top-left position for every distinct id.
///
/// Never fails: relationships with an endpoint outside `persons` are
/// ignored, isolated persons are still placed, and an empty input yields an
/// empty map.
pub fn compute_layout_with_config(
    persons: &[Person],
    relationships: &[Relationship],
    orientation: Orientation,
    project_type: ProjectType,
    config: &LayoutConfig,
) -> LayoutResult {
    if persons.is_empty() {
        return LayoutResult::default();
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(persons.len());
    let mut node_ids: Vec<String> = Vec::with_capacity(persons.len());
    for person in persons {
        if seen.insert(person.id.as_str()) {
            node_ids.push(person.id.clone());
        }
    }

    let edges = select_layout_edges(&seen, relationships, project_type);
    let rank_dir = RankDir::for_project(orientation, project_type);
    debug!(
        persons = node_ids.len(),
        edges = edges.len(),
        relationships = relationships.len(),
        rank_dir = rankdir_label(rank_dir),
        "computing layout"
    );

    let centres = ranking::assign_centres(&node_ids, &edges, rank_dir, config);

    let mut node_positions = BTreeMap::new();
    for node_id in &node_ids {
        let Some(&(cx, cy)) = centres.get(node_id) else {
            continue;
        };
        node_positions.insert(
            node_id.clone(),
            Position {
                x: cx - config.node_width / 2.0,
                y: cy - config.node_height / 2.0,
            },
        );
    }

    if project_type == ProjectType::FamilyTree {
        align_partners(&mut node_positions, relationships, orientation, config);
    }

    LayoutResult { node_positions }
}

/// Edges that drive ranking. Family trees rank on parent-child links only;
/// friend clusters use every relationship. Dangling, self-referencing and
/// repeated pairs are dropped.
fn select_layout_edges(
    person_ids: &HashSet<&str>,
    relationships: &[Relationship],
    project_type: ProjectType,
) -> Vec<(String, String)> {
    let mut edge_set: HashSet<(&str, &str)> = HashSet::new();
    let mut edges = Vec::new();
    let mut skipped = 0usize;
    for rel in relationships {
        if project_type == ProjectType::FamilyTree && rel.kind != RelationType::ParentChild {
            continue;
        }
        if !person_ids.contains(rel.from.as_str()) || !person_ids.contains(rel.to.as_str()) {
            skipped += 1;
            continue;
        }
        if rel.from == rel.to {
            continue;
        }
        if !edge_set.insert((rel.from.as_str(), rel.to.as_str())) {
            continue;
        }
        edges.push((rel.from.clone(), rel.to.clone()));
    }
    if skipped > 0 {
        debug!(skipped, "ignored relationships with missing endpoints");
    }
    edges
}

/// Puts each partner pair on one rank (the earlier of the two) and, when
/// their boxes crowd each other along the cross axis, spreads them evenly
/// around their midpoint.
///
/// Pairs are handled one at a time in relationship order, so a person with
/// several partners ends up wherever the last pair put them.
fn align_partners(
    positions: &mut BTreeMap<String, Position>,
    relationships: &[Relationship],
    orientation: Orientation,
    config: &LayoutConfig,
) {
    let horizontal = orientation == Orientation::Horizontal;
    // (rank axis, cross axis)
    let split = |pos: Position| if horizontal { (pos.x, pos.y) } else { (pos.y, pos.x) };
    let join = |rank: f32, cross: f32| {
        if horizontal {
            Position { x: rank, y: cross }
        } else {
            Position { x: cross, y: rank }
        }
    };

    let min_separation = config.node_width + config.partner_min_gap;
    let half_offset = config.node_width / 2.0 + config.partner_half_gap;

    for rel in relationships {
        if rel.kind != RelationType::Partner {
            continue;
        }
        let (Some(&a), Some(&b)) = (positions.get(&rel.from), positions.get(&rel.to)) else {
            continue;
        };
        let (a_rank, mut a_cross) = split(a);
        let (b_rank, mut b_cross) = split(b);
        let shared_rank = a_rank.min(b_rank);

        if (a_cross - b_cross).abs() < min_separation {
            let mid = (a_cross + b_cross) / 2.0;
            a_cross = mid - half_offset;
            b_cross = mid + half_offset;
        }

        positions.insert(rel.from.clone(), join(shared_rank, a_cross));
        positions.insert(rel.to.clone(), join(shared_rank, b_cross));
    }
}
