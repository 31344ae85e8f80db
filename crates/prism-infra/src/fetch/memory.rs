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

//! An in-memory fetcher, handy for embedded assets and tests.

use super::data_uri::decode_data_uri;
use async_trait::async_trait;
use prism_core::fetch::{FetchError, ResourceFetcher};
use std::collections::HashMap;

/// A fetcher serving a fixed set of files from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bytes` under `url`, replacing any previous contents.
    pub fn with_file(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(url.into(), bytes.into());
        self
    }

    /// Removes `url`, so fetching it fails with [`FetchError::NotFound`].
    pub fn without_file(mut self, url: &str) -> Self {
        self.files.remove(url);
        self
    }

    /// Adds or replaces a file in place.
    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(url.into(), bytes.into());
    }

    /// The number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(bytes) = self.files.get(url) {
            return Ok(bytes.clone());
        }
        if let Some(decoded) = decode_data_uri(url) {
            return decoded;
        }
        Err(FetchError::NotFound {
            url: url.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_registered_files() {
        let fetcher = MemoryFetcher::new()
            .with_file("a.json", "{}")
            .with_file("b.json", "[]")
            .without_file("b.json");

        assert_eq!(fetcher.len(), 1);
        assert_eq!(fetcher.fetch("a.json").await.unwrap(), b"{}");
        assert!(matches!(
            fetcher.fetch("b.json").await,
            Err(FetchError::NotFound { .. })
        ));
        assert_eq!(fetcher.fetch("data:;base64,AQ==").await.unwrap(), vec![1]);
    }
}
