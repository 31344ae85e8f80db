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

//! Resource types produced by the built-in loading lanes.

use super::Asset;
use crate::renderer::{
    ColorSpace, Extent3D, SamplerDescriptor, TextureFormat, TextureId, TextureMapping,
};

/// A decoded image, as produced by the image lane.
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    /// A raster image decoded to tightly packed RGBA8 texels.
    Raster {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// RGBA8 texels, row-major, top row first.
        pixels: Vec<u8>,
    },
    /// An SVG document, kept as markup for the host to rasterize.
    Svg {
        /// The raw SVG source.
        markup: String,
    },
}

impl Image {
    /// The pixel dimensions of a raster image, `None` for vector images.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Image::Raster { width, height, .. } => Some((*width, *height)),
            Image::Svg { .. } => None,
        }
    }
}

impl Asset for Image {}

/// A texture that has been uploaded to the graphics device.
///
/// The CPU-side pixels are dropped after upload; only the device handle and
/// the parameters it was created with are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// The device handle.
    pub id: TextureId,
    /// The URL the texture was loaded from.
    pub label: String,
    /// The size of mip level 0.
    pub size: Extent3D,
    /// The texel format on the device.
    pub format: TextureFormat,
    /// How texel values are to be interpreted.
    pub color_space: ColorSpace,
    /// Number of mip levels allocated.
    pub mip_level_count: u32,
    /// Sampling parameters.
    pub sampler: SamplerDescriptor,
    /// UV repeat factors.
    pub repeat: [f32; 2],
    /// How the texture is mapped onto geometry.
    pub mapping: TextureMapping,
    /// Whether the source was flipped vertically before upload.
    pub flip_y: bool,
    /// `false` when the alpha channel carries no information (e.g. JPEG sources).
    pub has_alpha: bool,
}

impl Asset for Texture {}

/// How an environment map's texels are laid out on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentLayout {
    /// A single 2D texture in equirectangular projection.
    Equirectangular,
    /// Six square faces in `+X, -X, +Y, -Y, +Z, -Z` order.
    CubeFaces,
}

/// A prefiltering pass the renderer should run before using the map for lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefilter {
    /// Use the map as-is.
    None,
    /// Build a full prefiltered mipmapped radiance environment map.
    Pmrem,
    /// Use a single, fixed roughness level of the prefiltered chain.
    Level(u32),
}

/// An environment map uploaded to the graphics device.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    /// The device handle.
    pub id: TextureId,
    /// The URL (or face directory) the map was loaded from.
    pub label: String,
    /// Face size for cube maps, full image size for equirectangular maps.
    pub size: Extent3D,
    /// The texel format on the device.
    pub format: TextureFormat,
    /// How the texels are to be decoded.
    pub color_space: ColorSpace,
    /// Equirectangular or cube faces.
    pub layout: EnvironmentLayout,
    /// Requested prefiltering.
    pub prefilter: Prefilter,
    /// How the map is sampled.
    pub mapping: TextureMapping,
}

impl Asset for EnvironmentMap {}

/// A single drawable primitive extracted from a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPrimitive {
    /// Vertex positions. Empty when the primitive is still compressed.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, if present.
    pub normals: Option<Vec<[f32; 3]>>,
    /// First UV set, if present.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Triangle indices, if the primitive is indexed.
    pub indices: Option<Vec<u32>>,
    /// Index of the material in the owning model, if any.
    pub material: Option<usize>,
    /// The compression extension the geometry is still encoded with, if any.
    pub compression: Option<String>,
}

/// A named group of primitives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMesh {
    /// The mesh name from the source document.
    pub name: Option<String>,
    /// The mesh primitives.
    pub primitives: Vec<ModelPrimitive>,
}

/// A parsed glTF / GLB model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// The URL the model was loaded from.
    pub label: String,
    /// Every mesh in the document.
    pub meshes: Vec<ModelMesh>,
    /// Material names, indexed like [`ModelPrimitive::material`].
    pub materials: Vec<Option<String>>,
    /// Animation names.
    pub animations: Vec<Option<String>>,
    /// Number of nodes in the document.
    pub node_count: usize,
    /// Number of scenes in the document.
    pub scene_count: usize,
    /// External image URIs the document references, relative to the model.
    pub image_uris: Vec<String>,
}

impl Asset for Model {}

/// Raw audio bytes, kept undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    /// The encoded file contents.
    pub bytes: Vec<u8>,
}

impl Asset for AudioBuffer {}

/// Raw video bytes, kept undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoBlob {
    /// A MIME type guessed from the URL extension.
    pub mime_type: &'static str,
    /// The encoded file contents.
    pub bytes: Vec<u8>,
}

impl Asset for VideoBlob {}
