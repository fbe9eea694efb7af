use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::LayoutConfig;

use super::RankDir;

/// Ordering sweeps (down then up) run over the rank buckets.
const ORDER_PASSES: usize = 4;
/// Coordinate sweeps pulling each rank towards its neighbours.
const PLACE_PASSES: usize = 2;

/// Longest-path ranks over the edge set. Nodes caught in a cycle are appended
/// in input order and edges pointing backwards in that order are ignored.
pub(super) fn compute_ranks(
    node_ids: &[String],
    edges: &[(String, String)],
) -> HashMap<String, usize> {
    let set: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
    let mut indeg: HashMap<&str, usize> = node_ids.iter().map(|id| (id.as_str(), 0)).collect();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();

    for (from, to) in edges {
        if set.contains(from.as_str()) && set.contains(to.as_str()) {
            adj.entry(from.as_str()).or_default().push(to.as_str());
            *indeg.entry(to.as_str()).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&str> = node_ids
        .iter()
        .map(String::as_str)
        .filter(|id| indeg.get(id).copied() == Some(0))
        .collect();

    let mut order: Vec<&str> = Vec::with_capacity(node_ids.len());
    let mut visited: HashSet<&str> = HashSet::new();
    while let Some(node) = queue.pop_front() {
        if !visited.insert(node) {
            continue;
        }
        order.push(node);
        if let Some(nexts) = adj.get(node) {
            for next in nexts {
                if let Some(deg) = indeg.get_mut(next) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        queue.push_back(*next);
                    }
                }
            }
        }
    }

    if order.len() < set.len() {
        for id in node_ids {
            if visited.insert(id.as_str()) {
                order.push(id.as_str());
            }
        }
    }

    let order_index: HashMap<&str, usize> =
        order.iter().enumerate().map(|(idx, id)| (*id, idx)).collect();

    let mut ranks: HashMap<String, usize> = HashMap::new();
    for node in &order {
        let rank = *ranks.entry(node.to_string()).or_insert(0);
        if let Some(nexts) = adj.get(node) {
            let from_idx = order_index.get(node).copied().unwrap_or(0);
            for next in nexts {
                let to_idx = order_index.get(next).copied().unwrap_or(from_idx);
                if to_idx <= from_idx {
                    continue;
                }
                let entry = ranks.entry(next.to_string()).or_insert(0);
                *entry = (*entry).max(rank + 1);
            }
        }
    }

    ranks
}

/// Neighbour lists restricted to edges that point to a later rank.
struct Adjacency {
    incoming: HashMap<String, Vec<String>>,
    outgoing: HashMap<String, Vec<String>>,
}

impl Adjacency {
    fn new(edges: &[(String, String)], ranks: &HashMap<String, usize>) -> Self {
        let mut incoming: HashMap<String, Vec<String>> = HashMap::new();
        let mut outgoing: HashMap<String, Vec<String>> = HashMap::new();
        for (from, to) in edges {
            let (Some(from_rank), Some(to_rank)) = (ranks.get(from), ranks.get(to)) else {
                continue;
            };
            if to_rank <= from_rank {
                continue;
            }
            outgoing.entry(from.clone()).or_default().push(to.clone());
            incoming.entry(to.clone()).or_default().push(from.clone());
        }
        Self { incoming, outgoing }
    }
}

fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) * 0.5)
    }
}

/// Median-heuristic crossing reduction: alternate downward sweeps (sorting
/// each rank by its parents' slots) and upward sweeps (by children's slots).
/// Ties keep the current slot, so input order breaks them.
fn order_rank_nodes(rank_nodes: &mut [Vec<String>], adjacency: &Adjacency) {
    if rank_nodes.len() <= 1 {
        return;
    }

    let mut slots: HashMap<String, usize> = HashMap::new();
    let refresh = |rank_nodes: &[Vec<String>], slots: &mut HashMap<String, usize>| {
        slots.clear();
        for bucket in rank_nodes {
            for (idx, node_id) in bucket.iter().enumerate() {
                slots.insert(node_id.clone(), idx);
            }
        }
    };
    refresh(rank_nodes, &mut slots);

    let sort_bucket = |bucket: &mut Vec<String>,
                       neighbors: &HashMap<String, Vec<String>>,
                       slots: &HashMap<String, usize>| {
        let mut keyed: Vec<(f32, usize, String)> = bucket
            .drain(..)
            .enumerate()
            .map(|(idx, node_id)| {
                let mut values: Vec<f32> = neighbors
                    .get(&node_id)
                    .into_iter()
                    .flatten()
                    .filter_map(|n| slots.get(n).map(|slot| *slot as f32))
                    .collect();
                let score = median(&mut values).unwrap_or(idx as f32);
                (score, idx, node_id)
            })
            .collect();
        keyed.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        bucket.extend(keyed.into_iter().map(|(_, _, node_id)| node_id));
    };

    for _ in 0..ORDER_PASSES {
        for rank in 1..rank_nodes.len() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &adjacency.incoming, &slots);
            refresh(rank_nodes, &mut slots);
        }
        for rank in (0..rank_nodes.len() - 1).rev() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &adjacency.outgoing, &slots);
            refresh(rank_nodes, &mut slots);
        }
    }
}

/// Places one rank: each node wants the median cross position of its
/// neighbours, then the rank is packed left to right so boxes keep
/// `min_step` apart and shifted back so its mean matches the wanted mean.
fn place_rank(
    bucket: &[String],
    neighbors: &HashMap<String, Vec<String>>,
    cross: &mut HashMap<String, f32>,
    min_step: f32,
) {
    if bucket.is_empty() {
        return;
    }
    let desired: Vec<f32> = bucket
        .iter()
        .map(|node_id| {
            let current = cross.get(node_id).copied().unwrap_or(0.0);
            let mut values: Vec<f32> = neighbors
                .get(node_id)
                .into_iter()
                .flatten()
                .filter_map(|n| cross.get(n).copied())
                .collect();
            median(&mut values).unwrap_or(current)
        })
        .collect();

    let mut packed = Vec::with_capacity(desired.len());
    let mut prev: Option<f32> = None;
    for want in &desired {
        let centre = match prev {
            Some(prev) => want.max(prev + min_step),
            None => *want,
        };
        packed.push(centre);
        prev = Some(centre);
    }

    let count = desired.len() as f32;
    let shift = (desired.iter().sum::<f32>() - packed.iter().sum::<f32>()) / count;
    for (node_id, centre) in bucket.iter().zip(packed) {
        cross.insert(node_id.clone(), centre + shift);
    }
}

/// Layered placement. Ranks advance along the main axis; within a rank the
/// order comes from [`order_rank_nodes`] and cross positions are pulled
/// towards parents, then children, without overlapping. Returns box centres.
pub(super) fn assign_centres(
    node_ids: &[String],
    edges: &[(String, String)],
    rank_dir: RankDir,
    config: &LayoutConfig,
) -> HashMap<String, (f32, f32)> {
    let ranks = compute_ranks(node_ids, edges);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    let mut rank_nodes: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for node_id in node_ids {
        let rank = ranks.get(node_id).copied().unwrap_or(0);
        if let Some(bucket) = rank_nodes.get_mut(rank) {
            bucket.push(node_id.clone());
        }
    }

    let adjacency = Adjacency::new(edges, &ranks);
    order_rank_nodes(&mut rank_nodes, &adjacency);

    let horizontal = rank_dir.is_horizontal();
    let (main_extent, cross_extent) = if horizontal {
        (config.node_width, config.node_height)
    } else {
        (config.node_height, config.node_width)
    };
    let min_step = cross_extent + config.node_spacing;

    let mut cross: HashMap<String, f32> = HashMap::with_capacity(node_ids.len());
    for bucket in &rank_nodes {
        for (slot, node_id) in bucket.iter().enumerate() {
            cross.insert(node_id.clone(), slot as f32 * min_step);
        }
    }
    for _ in 0..PLACE_PASSES {
        for bucket in rank_nodes.iter().skip(1) {
            place_rank(bucket, &adjacency.incoming, &mut cross, min_step);
        }
        for bucket in rank_nodes.iter().rev().skip(1) {
            place_rank(bucket, &adjacency.outgoing, &mut cross, min_step);
        }
    }

    let min_cross = cross.values().copied().fold(f32::INFINITY, f32::min);
    let offset = if min_cross.is_finite() {
        config.margin + cross_extent / 2.0 - min_cross
    } else {
        0.0
    };

    let mut centres = HashMap::with_capacity(node_ids.len());
    for (rank_idx, bucket) in rank_nodes.iter().enumerate() {
        let main = config.margin
            + rank_idx as f32 * (main_extent + config.rank_spacing)
            + main_extent / 2.0;
        for node_id in bucket {
            let c = cross.get(node_id).copied().unwrap_or(0.0) + offset;
            let centre = if horizontal { (main, c) } else { (c, main) };
            centres.insert(node_id.clone(), centre);
        }
    }
    centres
}
