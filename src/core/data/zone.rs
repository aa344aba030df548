//! Zone authoring schema and loader.
//!
//! Scope
//! - Minimal manifest describing a named zone with terrain and grass defaults.
//! - JSON lives under `data/zones/<slug>/manifest.json`.
//! - The renderer uses it to set up terrain generation and grass streaming.
//!
//! Extending
//! - Add spawn tables, biome layers, weather, and snapshot references.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Terrain generation parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TerrainSpec {
    /// Grid dimension N (vertices per side). Use odd numbers like 129 (128 quads).
    pub size: u32,
    /// Half-extent in world meters (terrain spans [-extent, +extent] on X and Z).
    pub extent: f32,
    /// Seed for deterministic generation.
    pub seed: u32,
}

impl Default for TerrainSpec {
    fn default() -> Self {
        Self {
            size: 129,
            extent: 120.0,
            seed: 20260830,
        }
    }
}

/// Grass streaming/LOD parameters exposed to authoring; anything absent stays
/// at the engine default.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrassSpec {
    pub patch_size: f32,
    pub view_radius: f32,
    pub lod_radius: f32,
    pub blades_high: u32,
    pub blades_low: u32,
    pub seed: u32,
}

impl Default for GrassSpec {
    fn default() -> Self {
        let p = crate::gfx::grass::GrassParams::default();
        Self {
            patch_size: p.patch_size,
            view_radius: p.view_radius,
            lod_radius: p.lod_radius,
            blades_high: p.blades_high,
            blades_low: p.blades_low,
            seed: p.seed,
        }
    }
}

impl GrassSpec {
    pub fn to_params(self) -> crate::gfx::grass::GrassParams {
        crate::gfx::grass::GrassParams {
            patch_size: self.patch_size,
            view_radius: self.view_radius,
            lod_radius: self.lod_radius,
            blades_high: self.blades_high,
            blades_low: self.blades_low,
            seed: self.seed,
            ..Default::default()
        }
    }
}

/// Authoring manifest for a zone.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ZoneManifest {
    pub slug: String,
    pub display_name: String,
    pub terrain: TerrainSpec,
    #[serde(default)]
    pub grass: GrassSpec,
    /// Number of raiders scattered around the spawn.
    #[serde(default = "default_raiders")]
    pub raider_count: u32,
}

fn default_raiders() -> u32 {
    6
}

impl Default for ZoneManifest {
    fn default() -> Self {
        Self {
            slug: "meadow".into(),
            display_name: "The Meadow".into(),
            terrain: TerrainSpec::default(),
            grass: GrassSpec::default(),
            raider_count: default_raiders(),
        }
    }
}

impl ZoneManifest {
    /// Load `data/zones/<slug>/manifest.json` relative to the crate root.
    pub fn load(slug: &str) -> Result<Self> {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("data/zones")
            .join(slug)
            .join("manifest.json");
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read zone manifest {}", path.display()))?;
        let m: ZoneManifest =
            serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        Ok(m)
    }

    /// Load the manifest, or fall back to compiled defaults with a warning.
    pub fn load_or_default(slug: &str) -> Self {
        match Self::load(slug) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("zone '{}': {:#}; using built-in defaults", slug, e);
                Self {
                    slug: slug.into(),
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips() {
        let m = ZoneManifest::default();
        let text = serde_json::to_string_pretty(&m).unwrap();
        let back: ZoneManifest = serde_json::from_str(&text).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn missing_manifest_falls_back() {
        let m = ZoneManifest::load_or_default("no-such-zone");
        assert_eq!(m.slug, "no-such-zone");
        assert_eq!(m.terrain, TerrainSpec::default());
    }

    #[test]
    fn partial_manifest_fills_grass_defaults() {
        let text = r#"{
            "slug": "bare",
            "display_name": "Bare",
            "terrain": { "size": 65, "extent": 60.0, "seed": 1 }
        }"#;
        let m: ZoneManifest = serde_json::from_str(text).unwrap();
        assert_eq!(m.grass, GrassSpec::default());
        assert_eq!(m.raider_count, 6);
    }
}
