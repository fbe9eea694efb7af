use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry used by the layout engine, in layout units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Footprint of one person box.
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between neighbours sharing a rank.
    pub node_spacing: f32,
    /// Gap between consecutive ranks.
    pub rank_spacing: f32,
    pub margin: f32,
    /// Partners closer than `node_width + partner_min_gap` get pushed apart.
    pub partner_min_gap: f32,
    /// Each partner then sits `node_width / 2 + partner_half_gap` from the midpoint.
    pub partner_half_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 100.0,
            node_spacing: 100.0,
            rank_spacing: 140.0,
            margin: 50.0,
            partner_min_gap: 40.0,
            partner_half_gap: 30.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    margin: Option<f32>,
    partner_min_gap: Option<f32>,
    partner_half_gap: Option<f32>,
}

impl ConfigFile {
    fn parse(contents: &str) -> anyhow::Result<Self> {
        match serde_json::from_str(contents) {
            Ok(parsed) => Ok(parsed),
            // Hand-written configs may carry comments or trailing commas.
            Err(json_err) => json5::from_str(contents)
                .map_err(|_| anyhow::Error::new(json_err).context("invalid layout config")),
        }
    }

    fn apply(self, config: &mut LayoutConfig) {
        if let Some(v) = self.node_width {
            config.node_width = v.max(1.0);
        }
        if let Some(v) = self.node_height {
            config.node_height = v.max(1.0);
        }
        if let Some(v) = self.node_spacing {
            config.node_spacing = v.max(0.0);
        }
        if let Some(v) = self.rank_spacing {
            config.rank_spacing = v.max(0.0);
        }
        if let Some(v) = self.margin {
            config.margin = v.max(0.0);
        }
        if let Some(v) = self.partner_min_gap {
            config.partner_min_gap = v;
        }
        if let Some(v) = self.partner_half_gap {
            config.partner_half_gap = v;
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let mut config = LayoutConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ConfigFile::parse(&contents)?.apply(&mut config);
    Ok(config)
}
