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

use super::{ResourceError, TextureDescriptor, TextureId};
use std::fmt::Debug;

/// The graphics device handle the texture and environment-map lanes upload through.
///
/// This is the renderer collaborator of the asset pipeline: a concrete
/// implementation wraps whatever GPU API the host application uses.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a texture and uploads its first mip level.
    /// ## Arguments
    /// * `descriptor` - The texture's size, format, dimensionality and mip count.
    /// * `data` - Level 0 texels, tightly packed. Cube faces follow each other in
    ///   `+X, -X, +Y, -Y, +Z, -Z` order.
    /// ## Returns
    /// A `Result` containing the ID of the created texture or an error if the creation fails.
    /// ## Errors
    /// * `ResourceError` - If the descriptor is invalid or the upload fails.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureId, ResourceError>;

    /// Destroys the texture associated with the given ID.
    /// ## Errors
    /// * `ResourceError` - If the ID does not refer to a live texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// The largest width or height a 2D texture may have on this device.
    fn max_texture_dimension_2d(&self) -> u32;
}
