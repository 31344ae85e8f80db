// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use prism_agents::AssetManagerConfig;
use prism_core::asset::AssetDescriptor;
use prism_infra::LoggingConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Represents the structure of a `Preload.toml` manifest file.
///
/// ```toml
/// [pipeline]
/// concurrency = 4
///
/// [logging]
/// level = "debug"
///
/// [[assets]]
/// url = "textures/albedo.jpg"
/// type = "texture"
/// options = { encoding = "srgb", flipY = false }
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct PreloadManifest {
    /// Tuning for the asset manager.
    pub pipeline: AssetManagerConfig,
    /// Logger configuration, possibly overridden on the command line.
    pub logging: LoggingConfig,
    /// The assets to load, in queue order.
    pub assets: Vec<AssetDescriptor>,
}

impl PreloadManifest {
    /// Parses a manifest from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file at '{}'", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))
    }
}
