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

//! The hosting environment handed to every load.

use crate::error::ConfigurationError;
use crate::fetch::ResourceFetcher;
use crate::renderer::GraphicsDevice;
use std::sync::Arc;

/// Carries what loading lanes need from the hosting environment.
///
/// Both collaborators are required: [`LoadContext::validate`] is checked by
/// the asset manager before any load starts, so lanes may treat a missing
/// collaborator as an ordinary load failure.
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    device: Option<Arc<dyn GraphicsDevice>>,
    fetcher: Option<Arc<dyn ResourceFetcher>>,
}

impl LoadContext {
    /// Creates a complete context.
    pub fn new(device: Arc<dyn GraphicsDevice>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            device: Some(device),
            fetcher: Some(fetcher),
        }
    }

    /// Sets the graphics device.
    pub fn with_device(mut self, device: Arc<dyn GraphicsDevice>) -> Self {
        self.device = Some(device);
        self
    }

    /// Sets the resource fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// The graphics device, if one was provided.
    pub fn device(&self) -> Option<&Arc<dyn GraphicsDevice>> {
        self.device.as_ref()
    }

    /// The resource fetcher, if one was provided.
    pub fn fetcher(&self) -> Option<&Arc<dyn ResourceFetcher>> {
        self.fetcher.as_ref()
    }

    /// Fails fast when a required collaborator is missing.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.device.is_none() {
            return Err(ConfigurationError::MissingContext("graphics device"));
        }
        if self.fetcher.is_none() {
            return Err(ConfigurationError::MissingContext("resource fetcher"));
        }
        Ok(())
    }
}
