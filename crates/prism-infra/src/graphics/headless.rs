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

//! A device that keeps textures in host memory.
//!
//! Used by the preload tool to validate an asset set without a GPU, and by
//! tests that need to observe what the lanes uploaded.

use prism_core::renderer::{
    Extent3D, GraphicsDevice, ResourceError, TextureDescriptor, TextureDimension, TextureFormat,
    TextureId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The default 2D size limit, matching common desktop GPUs.
pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 8192;

/// What the headless device remembers about a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessTexture {
    /// The debug label given at creation.
    pub label: Option<String>,
    /// Texture extent.
    pub size: Extent3D,
    /// Mip levels requested.
    pub mip_level_count: u32,
    /// 2D or cube.
    pub dimension: TextureDimension,
    /// Texel format.
    pub format: TextureFormat,
    /// Size of the uploaded level 0 data.
    pub byte_len: usize,
}

/// A [`GraphicsDevice`] storing texture metadata instead of talking to a GPU.
#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: AtomicU64,
    max_texture_dimension: u32,
    textures: Mutex<HashMap<TextureId, HeadlessTexture>>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Creates a device with [`DEFAULT_MAX_TEXTURE_DIMENSION`].
    pub fn new() -> Self {
        Self::with_max_texture_dimension(DEFAULT_MAX_TEXTURE_DIMENSION)
    }

    /// Creates a device rejecting 2D textures larger than `limit` on either axis.
    pub fn with_max_texture_dimension(limit: u32) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            max_texture_dimension: limit,
            textures: Mutex::new(HashMap::new()),
        }
    }

    fn textures(&self) -> MutexGuard<'_, HashMap<TextureId, HeadlessTexture>> {
        // The map stays consistent even if a holder panicked.
        self.textures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures().len()
    }

    /// Whether `id` refers to a live texture.
    pub fn contains(&self, id: TextureId) -> bool {
        self.textures().contains_key(&id)
    }

    /// Returns a snapshot of the texture behind `id`.
    pub fn texture(&self, id: TextureId) -> Option<HeadlessTexture> {
        self.textures().get(&id).cloned()
    }

    /// Total level 0 bytes held by live textures.
    pub fn allocated_bytes(&self) -> usize {
        self.textures().values().map(|t| t.byte_len).sum()
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureId, ResourceError> {
        let Extent3D { width, height, .. } = descriptor.size;
        if width > self.max_texture_dimension || height > self.max_texture_dimension {
            return Err(ResourceError::TooLarge {
                requested: (width, height),
                limit: self.max_texture_dimension,
            });
        }
        if descriptor.dimension == TextureDimension::Cube
            && descriptor.size.depth_or_array_layers != 6
        {
            return Err(ResourceError::BackendError(format!(
                "Cube textures need 6 layers, got {}",
                descriptor.size.depth_or_array_layers
            )));
        }

        let expected = descriptor.level0_size_in_bytes();
        if data.len() != expected {
            return Err(ResourceError::DataSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let id = TextureId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let texture = HeadlessTexture {
            label: descriptor.label.as_deref().map(str::to_owned),
            size: descriptor.size,
            mip_level_count: descriptor.mip_level_count,
            dimension: descriptor.dimension,
            format: descriptor.format,
            byte_len: data.len(),
        };
        log::trace!("Created headless texture {id:?}: {texture:?}");
        self.textures().insert(id, texture);
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.textures()
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle(id))
    }

    fn max_texture_dimension_2d(&self) -> u32 {
        self.max_texture_dimension
    }
}
