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

//! Fetching from the local file system.

use super::data_uri::decode_data_uri;
use async_trait::async_trait;
use prism_core::fetch::{FetchError, ResourceFetcher};
use std::io;
use std::path::{Component, Path, PathBuf};

/// A fetcher resolving URLs as paths relative to a root directory.
///
/// Query strings and fragments are stripped before the lookup, and `data:`
/// URIs are decoded in place. Any other scheme is rejected, and so is any
/// path that would climb out of the root with `..`.
#[derive(Debug, Clone)]
pub struct FileSystemFetcher {
    root: PathBuf,
}

impl FileSystemFetcher {
    /// Creates a new `FileSystemFetcher` serving files under `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The directory URLs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> Result<PathBuf, FetchError> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let relative = Path::new(path.trim_start_matches(['/', '\\']));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(FetchError::OutsideRoot {
                url: url.to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResourceFetcher for FileSystemFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(decoded) = decode_data_uri(url) {
            return decoded;
        }
        if url.contains("://") {
            return Err(FetchError::UnsupportedScheme {
                url: url.to_owned(),
            });
        }

        let path = self.path_for(url)?;
        log::trace!("Reading {url} from {}", path.display());
        tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound {
                url: url.to_owned(),
            },
            _ => FetchError::Io {
                url: url.to_owned(),
                source,
            },
        })
    }
}
