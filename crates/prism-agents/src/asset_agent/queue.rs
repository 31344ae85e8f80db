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

//! The pending queue and its deduplication rules.

use prism_core::{
    asset::{AssetOptions, AssetType},
    ConfigurationError,
};
use std::time::Instant;

/// A descriptor whose type and key have been resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueuedAsset {
    pub key: String,
    pub url: String,
    pub asset_type: AssetType,
    pub options: AssetOptions,
}

impl QueuedAsset {
    fn same_request(&self, url: &str, asset_type: AssetType, options: &AssetOptions) -> bool {
        self.url == url && self.asset_type == asset_type && self.options == *options
    }
}

/// Descriptors waiting for the next batch, at most one per key.
#[derive(Debug)]
pub(crate) struct AssetQueue {
    entries: Vec<QueuedAsset>,
    epoch: Instant,
    last_token: u128,
}

impl Default for AssetQueue {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            epoch: Instant::now(),
            last_token: 0,
        }
    }
}

impl AssetQueue {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    fn find(&self, key: &str) -> Option<&QueuedAsset> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// A token strictly greater than every previous one, based on elapsed nanoseconds.
    fn next_token(&mut self) -> u128 {
        let now = self.epoch.elapsed().as_nanos();
        self.last_token = now.max(self.last_token + 1);
        self.last_token
    }

    fn unique_key(&mut self, url: &str) -> String {
        loop {
            let key = format!("{url}.{}", self.next_token());
            if self.find(&key).is_none() {
                return key;
            }
        }
    }

    /// Queues a request and returns the key it will be cached under.
    pub fn push(
        &mut self,
        url: String,
        asset_type: AssetType,
        options: AssetOptions,
        explicit_key: Option<String>,
    ) -> Result<String, ConfigurationError> {
        if let Some(key) = explicit_key {
            return match self.find(&key) {
                Some(existing) if existing.same_request(&url, asset_type, &options) => Ok(key),
                Some(_) => Err(ConfigurationError::ConflictingKey { key }),
                None => {
                    self.entries.push(QueuedAsset {
                        key: key.clone(),
                        url,
                        asset_type,
                        options,
                    });
                    Ok(key)
                }
            };
        }

        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.same_request(&url, asset_type, &options))
        {
            return Ok(existing.key.clone());
        }

        let key = if self.find(&url).is_none() {
            url.clone()
        } else {
            self.unique_key(&url)
        };
        self.entries.push(QueuedAsset {
            key: key.clone(),
            url,
            asset_type,
            options,
        });
        Ok(key)
    }

    /// Empties the queue, returning its entries in insertion order.
    pub fn drain(&mut self) -> Vec<QueuedAsset> {
        std::mem::take(&mut self.entries)
    }
}
