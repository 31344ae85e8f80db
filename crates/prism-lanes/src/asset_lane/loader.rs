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

use async_trait::async_trait;
use prism_core::{
    asset::{Asset, AssetOptions},
    LoadContext,
};
use std::error::Error;

/// A trait for types that can load a specific kind of asset from a URL.
///
/// Implementors own the whole strategy for one asset type: fetching the bytes
/// through the context's fetcher, decoding them, and uploading them to the
/// context's device when the asset lives on the GPU.
///
/// Each lane is specialized for a single asset type `A`.
#[async_trait]
pub trait AssetLoaderLane<A: Asset>: Send + Sync {
    /// Loads the resource behind `url`.
    ///
    /// # Parameters
    /// - `url`: The location of the resource, passed to the context's fetcher.
    /// - `options`: The descriptor's options bag, verbatim.
    /// - `context`: The hosting environment.
    ///
    /// # Returns
    /// A `Result` containing the loaded asset on success, or a boxed dynamic
    /// error on failure. The error must be thread-safe.
    async fn load(
        &self,
        url: &str,
        options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<A, Box<dyn Error + Send + Sync>>;

    /// A short, human-readable name for log lines.
    fn strategy_name(&self) -> &'static str;
}
