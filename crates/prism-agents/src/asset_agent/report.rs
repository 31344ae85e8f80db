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

use prism_core::asset::AssetType;
use std::time::Duration;

/// One item of a batch whose lane failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// The key the asset would have been cached under.
    pub key: String,
    /// The URL that was being loaded.
    pub url: String,
    /// The resolved asset type.
    pub asset_type: AssetType,
    /// The lane's error, rendered with its causes.
    pub message: String,
}

/// The outcome of one [`AssetManager::load`](super::AssetManager::load) batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items in the batch.
    pub total: usize,
    /// Items loaded by their lane during this batch.
    pub loaded: usize,
    /// Items skipped because their key was already cached.
    pub cached: usize,
    /// Items whose lane failed.
    pub failures: Vec<LoadFailure>,
    /// Wall-clock duration of the batch.
    pub elapsed: Duration,
}

impl BatchReport {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Whether every item of the batch ended up in the cache.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Items that finished, successfully or not.
    pub fn completed(&self) -> usize {
        self.loaded + self.cached + self.failures.len()
    }

    /// The keys that are missing from the cache after this batch.
    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.key.as_str())
    }
}
