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

//! The error taxonomy of the asset pipeline.
//!
//! Only [`ConfigurationError`] ever escapes `enqueue`, `load` or `load_single`.
//! Per-item load failures are absorbed by the pipeline and reported as data.

use crate::asset::AssetType;
use thiserror::Error;

/// A programming error in how the pipeline is driven. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A descriptor was queued without a URL.
    #[error("Must specify a URL to queue an asset")]
    MissingUrl,
    /// No type was given and the URL's extension is not recognized.
    #[error("Could not load {url}, unknown file extension")]
    UnknownAssetType {
        /// The offending URL.
        url: String,
    },
    /// A type tag string did not name any known asset type.
    #[error("Unknown asset type tag '{0}'")]
    UnknownTypeTag(String),
    /// The pipeline has no lane for the requested type.
    #[error("No loader lane registered for asset type '{0}'")]
    NoLoaderRegistered(AssetType),
    /// An explicit key is already queued for a different request.
    #[error("Key '{key}' is already queued for a different request")]
    ConflictingKey {
        /// The contested key.
        key: String,
    },
    /// The load context lacks a collaborator the lanes require.
    #[error("You must provide a {0} in the load context")]
    MissingContext(&'static str),
}

/// An error raised when retrieving a cached asset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The key was never loaded, or its load failed.
    #[error("Could not find an asset with key '{0}'")]
    NotFound(String),
    /// The cached asset has a different type than requested.
    #[error("Asset '{key}' is a {found}, not a {expected}")]
    TypeMismatch {
        /// The key that was looked up.
        key: String,
        /// The requested type.
        expected: &'static str,
        /// The type actually stored.
        found: &'static str,
    },
}
