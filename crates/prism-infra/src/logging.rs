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

//! Process-wide logger setup.

use env_logger::{Builder, Env};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// How the logger should be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// The maximum level to emit.
    pub level: LevelFilter,
    /// When set, `RUST_LOG` overrides `level`.
    pub respect_env: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            respect_env: true,
        }
    }
}

impl LoggingConfig {
    /// Builds an `env_logger` builder from this configuration.
    pub fn builder(&self) -> Builder {
        let mut builder = if self.respect_env {
            Builder::from_env(Env::default().default_filter_or(self.level.as_str()))
        } else {
            let mut builder = Builder::new();
            builder.filter_level(self.level);
            builder
        };
        // Image codecs are noisy at debug level.
        builder.filter_module("image", LevelFilter::Warn);
        builder
    }
}

/// Installs the global logger.
///
/// Fails if a logger was already installed, which usually means this was called twice.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    config.builder().try_init()?;
    log::debug!("Logging initialised at level {}", config.level);
    Ok(())
}
