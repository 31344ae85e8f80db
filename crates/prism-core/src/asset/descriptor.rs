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

use super::{AssetOptions, AssetType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request to load one resource.
///
/// The `url` doubles as the default cache key. `asset_type` may be omitted,
/// in which case it is inferred from the URL's extension when the descriptor
/// is queued. `key` overrides the cache key explicitly.
///
/// # Examples
///
/// ```
/// use prism_core::asset::{AssetDescriptor, AssetType};
///
/// let albedo = AssetDescriptor::new("textures/albedo.jpg")
///     .with_type(AssetType::Texture)
///     .with_option("encoding", "srgb");
///
/// assert_eq!(albedo.url, "textures/albedo.jpg");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// The location of the resource, resolved by the host's fetcher.
    pub url: String,

    /// The loading strategy. Inferred from `url` when `None`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,

    /// Lane-specific options, forwarded verbatim.
    #[serde(default, skip_serializing_if = "AssetOptions::is_empty")]
    pub options: AssetOptions,

    /// An explicit cache key, used instead of `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl AssetDescriptor {
    /// Creates a descriptor for `url` with an inferred type and no options.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the loading strategy explicitly.
    pub fn with_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = Some(asset_type);
        self
    }

    /// Sets a single option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key, value);
        self
    }

    /// Replaces the whole options bag.
    pub fn with_options(mut self, options: AssetOptions) -> Self {
        self.options = options;
        self
    }

    /// Overrides the cache key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl From<&str> for AssetDescriptor {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}
