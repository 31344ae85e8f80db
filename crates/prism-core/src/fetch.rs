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

//! Defines the abstraction over the host's resource-loading facilities.

use async_trait::async_trait;
use std::{fmt::Debug, io};
use thiserror::Error;

/// An error raised while fetching the bytes behind a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Nothing exists at the URL.
    #[error("Resource '{url}' was not found")]
    NotFound {
        /// The requested URL.
        url: String,
    },
    /// Reading the resource failed.
    #[error("Failed to read '{url}': {source}")]
    Io {
        /// The requested URL.
        url: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A `data:` URI could not be decoded.
    #[error("Invalid data URI: {reason}")]
    InvalidDataUri {
        /// What was wrong with it.
        reason: String,
    },
    /// The fetcher does not know how to reach this URL.
    #[error("Unsupported URL scheme in '{url}'")]
    UnsupportedScheme {
        /// The requested URL.
        url: String,
    },
    /// The URL points outside the directory the fetcher serves.
    #[error("Resource '{url}' lies outside the fetcher root")]
    OutsideRoot {
        /// The requested URL.
        url: String,
    },
}

/// Resolves URLs to raw bytes.
///
/// Fetching is the only I/O boundary of most lanes, so it is asynchronous.
/// URLs are opaque to the pipeline; how they map to files, network requests
/// or embedded blobs is entirely up to the implementation.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + Debug {
    /// Fetches the full contents behind `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Resolves `reference` relative to the document at `base`.
///
/// `data:` URIs, absolute URLs and root-relative paths are returned unchanged.
///
/// # Examples
///
/// ```
/// use prism_core::fetch::resolve_relative;
///
/// assert_eq!(resolve_relative("models/bust.gltf", "bust.bin"), "models/bust.bin");
/// assert_eq!(resolve_relative("bust.gltf", "bust.bin"), "bust.bin");
/// ```
pub fn resolve_relative(base: &str, reference: &str) -> String {
    if reference.starts_with("data:") || reference.starts_with('/') || reference.contains("://") {
        return reference.to_owned();
    }
    match base.rfind('/') {
        Some(slash) => format!("{}{}", &base[..=slash], reference),
        None => reference.to_owned(),
    }
}
