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

use serde::{Deserialize, Serialize};

/// The number of loads a batch keeps in flight by default.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Tuning for an [`AssetManager`](super::AssetManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManagerConfig {
    /// Maximum number of simultaneous item loads per batch. Zero behaves as one.
    pub concurrency: usize,
    /// Whether each successful load logs its duration at debug level.
    pub log_timings: bool,
}

impl Default for AssetManagerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            log_timings: true,
        }
    }
}

impl AssetManagerConfig {
    /// The concurrency ceiling actually applied.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_ten_slots() {
        let config = AssetManagerConfig::default();
        assert_eq!(config.effective_concurrency(), 10);
        assert!(config.log_timings);
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let config = AssetManagerConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_concurrency(), 1);
    }
}
