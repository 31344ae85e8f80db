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

//! Defines data structures related to GPU texture and sampler resources.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// An opaque handle to a texture living on a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// A three-dimensional extent, used for texture sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3D {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth for 3D textures, or the number of layers for arrays and cubes.
    pub depth_or_array_layers: u32,
}

impl Extent3D {
    /// A single-layer 2D extent.
    pub fn d2(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth_or_array_layers: 1,
        }
    }

    /// The number of mip levels of a full chain down to 1x1.
    pub fn max_mips(&self) -> u32 {
        let largest = self.width.max(self.height).max(1);
        u32::BITS - largest.leading_zeros()
    }
}

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// A two-dimensional texture.
    D2,
    /// Six two-dimensional layers addressed as a cube.
    Cube,
}

/// The texel formats the loading lanes produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextureFormat {
    /// Four 8-bit unsigned normalized channels, linear.
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized channels, sRGB encoded.
    Rgba8UnormSrgb,
    /// Four 32-bit float channels, for HDR content.
    Rgba32Float,
}

impl TextureFormat {
    /// Size of one texel in bytes.
    pub fn bytes_per_texel(self) -> usize {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => 4,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

/// How texel values are to be interpreted when shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSpace {
    /// Values are linear.
    #[default]
    Linear,
    /// Values are sRGB encoded.
    Srgb,
    /// RGB with a shared multiplier in alpha (RGBM, range 16).
    Rgbm16,
}

/// How a texture is projected onto geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextureMapping {
    /// Regular UV mapping.
    #[default]
    Uv,
    /// Reflection lookup into a cube map.
    CubeReflection,
    /// Refraction lookup into a cube map.
    CubeRefraction,
    /// Reflection lookup into an equirectangular map.
    EquirectangularReflection,
    /// Refraction lookup into an equirectangular map.
    EquirectangularRefraction,
}

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressMode {
    /// Coordinates wrap around. `1.1` becomes `0.1`.
    Repeat,
    /// Coordinates are clamped to the edge. `1.1` becomes `1.0`.
    #[default]
    ClampToEdge,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation. Returns a weighted average of the four nearest texels.
    Linear,
}

/// Defines the filtering mode between mipmap levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MipmapFilterMode {
    /// Use the nearest mipmap level.
    Nearest,
    /// Linearly interpolate between the two nearest mipmap levels.
    Linear,
}

/// Sampling parameters attached to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDescriptor {
    /// Addressing along U.
    pub address_mode_u: AddressMode,
    /// Addressing along V.
    pub address_mode_v: AddressMode,
    /// Filter used when the texture is magnified.
    pub mag_filter: FilterMode,
    /// Filter used when the texture is minified.
    pub min_filter: FilterMode,
    /// Filter used between mip levels, `None` when the texture has no mips.
    pub mipmap_filter: Option<MipmapFilterMode>,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: Some(MipmapFilterMode::Linear),
        }
    }
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The dimensions (width, height, layers) of the texture.
    pub size: Extent3D,
    /// The number of mipmap levels for the texture. Only level 0 is uploaded;
    /// the device generates the rest.
    pub mip_level_count: u32,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// The format of the texels in the texture.
    pub format: TextureFormat,
}

impl TextureDescriptor<'_> {
    /// The number of bytes level 0 of this texture occupies.
    pub fn level0_size_in_bytes(&self) -> usize {
        self.size.width as usize
            * self.size.height as usize
            * self.size.depth_or_array_layers as usize
            * self.format.bytes_per_texel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mip_chain_length() {
        assert_eq!(Extent3D::d2(1, 1).max_mips(), 1);
        assert_eq!(Extent3D::d2(2, 2).max_mips(), 2);
        assert_eq!(Extent3D::d2(256, 64).max_mips(), 9);
        assert_eq!(Extent3D::d2(300, 10).max_mips(), 9);
    }

    #[test]
    fn level0_size_accounts_for_layers_and_format() {
        let descriptor = TextureDescriptor {
            label: None,
            size: Extent3D {
                width: 4,
                height: 4,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            dimension: TextureDimension::Cube,
            format: TextureFormat::Rgba32Float,
        };
        assert_eq!(descriptor.level0_size_in_bytes(), 4 * 4 * 6 * 16);
    }
}
