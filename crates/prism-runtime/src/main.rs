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

//! `prism-preload`: loads every asset listed in a preload manifest and
//! reports what could not be loaded.
//!
//! Usage:
//!   prism-preload --manifest assets/Preload.toml
//!   prism-preload --root ./public --log-level debug --max-texture-size 4096

mod manifest;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use manifest::PreloadManifest;
use prism_agents::{AssetManager, BatchReport};
use prism_core::LoadContext;
use prism_infra::{init_logging, FileSystemFetcher, HeadlessDevice};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "prism-preload", version)]
#[command(about = "Loads the assets of a preload manifest and reports failures")]
struct Cli {
    /// Path to the preload manifest
    #[arg(long, default_value = "Preload.toml")]
    manifest: PathBuf,

    /// Directory asset URLs are resolved against (defaults to the manifest's directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Overrides the manifest's log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Largest texture width or height the headless device accepts
    #[arg(long)]
    max_texture_size: Option<u32>,
}

impl Cli {
    fn asset_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => self
                .manifest
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn print_summary(report: &BatchReport) {
    println!(
        "{} asset(s): {} loaded, {} already cached, {} failed in {:?}",
        report.total,
        report.loaded,
        report.cached,
        report.failures.len(),
        report.elapsed
    );
    for failure in &report.failures {
        println!("  ✗ {} [{}]: {}", failure.key, failure.asset_type, failure.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut manifest = PreloadManifest::load(&cli.manifest)?;

    if let Some(level) = cli.log_level {
        manifest.logging.level = level;
        manifest.logging.respect_env = false;
    }
    init_logging(&manifest.logging)?;

    let device = match cli.max_texture_size {
        Some(limit) => HeadlessDevice::with_max_texture_dimension(limit),
        None => HeadlessDevice::new(),
    };
    let root = cli.asset_root();
    log::info!("Resolving assets against '{}'", root.display());
    let context = LoadContext::new(Arc::new(device), Arc::new(FileSystemFetcher::new(&root)));

    let mut assets = AssetManager::new(manifest.pipeline).with_default_lanes();
    for descriptor in manifest.assets {
        let url = descriptor.url.clone();
        let key = assets
            .enqueue(descriptor)
            .with_context(|| format!("Invalid manifest entry '{url}'"))?;
        log::debug!("Queued {url} as '{key}'");
    }

    assets.add_progress_listener(|progress| {
        log::info!("Progress: {:>3.0}%", progress * 100.0);
    });

    let report = assets.load(&context).await?;
    print_summary(&report);

    if !report.is_complete() {
        bail!("{} asset(s) could not be loaded", report.failures.len());
    }
    Ok(())
}
