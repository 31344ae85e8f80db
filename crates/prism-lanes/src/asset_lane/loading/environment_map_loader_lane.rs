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

//! Environment map loading: equirectangular panoramas and six-face cube maps.

use super::{decode_off_runtime, fetch_bytes, require_device};
use crate::asset_lane::AssetLoaderLane;
use anyhow::{anyhow, ensure, Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use prism_core::{
    asset::{AssetOptions, EnvironmentLayout, EnvironmentMap, Prefilter},
    renderer::{
        ColorSpace, Extent3D, TextureDescriptor, TextureDimension, TextureFormat, TextureMapping,
    },
    LoadContext,
};
use serde::Deserialize;
use std::{borrow::Cow, error::Error};

/// Face file stems, in device layer order.
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// Options understood by [`EnvironmentMapLoaderLane`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentMapOptions {
    /// The URL is a single equirectangular image instead of a face directory.
    pub equirectangular: bool,
    /// Cube faces are `.hdr` files instead of RGBM-encoded `.png` files.
    pub hdr: bool,
    /// Request a full PMREM prefilter for physically based lighting.
    pub pbr: bool,
    /// Request a single prefiltered level instead of the full chain.
    pub level: Option<f32>,
    /// How the map is sampled.
    pub mapping: Option<TextureMapping>,
}

/// Builds the six face URLs of a cube map stored as `<dir>/px.png`, `<dir>/nx.png`...
pub fn cube_face_urls(base: &str, hdr: bool) -> [String; 6] {
    let extension = if hdr { "hdr" } else { "png" };
    let prefix = base.trim_end_matches('/');
    CUBE_FACES.map(|face| format!("{prefix}/{face}.{extension}"))
}

struct DecodedFace {
    size: Extent3D,
    format: TextureFormat,
    color_space: ColorSpace,
    pixels: Vec<u8>,
}

fn decode_face(url: &str, bytes: &[u8], hdr: bool, ldr_color_space: ColorSpace) -> Result<DecodedFace> {
    let img = image::load_from_memory(bytes)
        .with_context(|| format!("Could not decode environment map {url}"))?;
    let size = Extent3D::d2(img.width(), img.height());

    let is_float = matches!(
        img,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    );
    if hdr || is_float {
        Ok(DecodedFace {
            size,
            format: TextureFormat::Rgba32Float,
            color_space: ColorSpace::Linear,
            pixels: bytemuck::cast_slice(&img.to_rgba32f().into_raw()).to_vec(),
        })
    } else {
        let format = match ldr_color_space {
            ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear | ColorSpace::Rgbm16 => TextureFormat::Rgba8Unorm,
        };
        Ok(DecodedFace {
            size,
            format,
            color_space: ldr_color_space,
            pixels: img.to_rgba8().into_raw(),
        })
    }
}

/// Panoramas are always prefiltered: they are only sampled through the PMREM
/// chain. Cube faces are used as-is unless a prefilter is requested.
fn prefilter_for(
    options: &EnvironmentMapOptions,
    layout: EnvironmentLayout,
    size: Extent3D,
) -> Prefilter {
    if options.pbr {
        return Prefilter::Pmrem;
    }
    match (options.level, layout) {
        (Some(level), _) => {
            let max_level = size.max_mips() - 1;
            Prefilter::Level((level.floor().max(0.0) as u32).min(max_level))
        }
        (None, EnvironmentLayout::Equirectangular) => Prefilter::Pmrem,
        (None, EnvironmentLayout::CubeFaces) => Prefilter::None,
    }
}

/// Decodes six fetched faces and stacks them into one layered texture.
fn assemble_cube(url: &str, faces: Vec<(String, Vec<u8>)>, hdr: bool) -> Result<DecodedFace> {
    let faces = faces
        .iter()
        .map(|(face_url, bytes)| decode_face(face_url, bytes, hdr, ColorSpace::Rgbm16))
        .collect::<Result<Vec<_>>>()?;

    let first = faces
        .first()
        .ok_or_else(|| anyhow!("Cube map {url} has no faces"))?;
    let (size, format, color_space) = (first.size, first.format, first.color_space);
    ensure!(
        size.width == size.height,
        "Cube map faces of {url} must be square, got {}x{}",
        size.width,
        size.height
    );
    for (face, name) in faces.iter().zip(CUBE_FACES) {
        ensure!(
            face.size == size && face.format == format,
            "Cube map face {name} of {url} does not match the other faces"
        );
    }

    let pixels = faces.into_iter().flat_map(|face| face.pixels).collect();
    Ok(DecodedFace {
        size: Extent3D {
            depth_or_array_layers: 6,
            ..size
        },
        format,
        color_space,
        pixels,
    })
}

/// A lane loading environment maps and uploading them to the device.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentMapLoaderLane;

impl EnvironmentMapLoaderLane {
    async fn load_equirectangular(
        &self,
        url: &str,
        options: &EnvironmentMapOptions,
        context: &LoadContext,
    ) -> Result<(DecodedFace, EnvironmentLayout)> {
        let bytes = fetch_bytes(context, url).await?;
        let (source, hdr) = (url.to_owned(), options.hdr);
        let face = decode_off_runtime(url, move || {
            decode_face(&source, &bytes, hdr, ColorSpace::Srgb)
        })
        .await?;
        Ok((face, EnvironmentLayout::Equirectangular))
    }

    async fn load_cube(
        &self,
        url: &str,
        options: &EnvironmentMapOptions,
        context: &LoadContext,
    ) -> Result<(DecodedFace, EnvironmentLayout)> {
        let mut faces = Vec::with_capacity(CUBE_FACES.len());
        for face_url in cube_face_urls(url, options.hdr) {
            let bytes = fetch_bytes(context, &face_url).await?;
            faces.push((face_url, bytes));
        }

        let (source, hdr) = (url.to_owned(), options.hdr);
        let cube = decode_off_runtime(url, move || assemble_cube(&source, faces, hdr)).await?;
        Ok((cube, EnvironmentLayout::CubeFaces))
    }
}

#[async_trait]
impl AssetLoaderLane<EnvironmentMap> for EnvironmentMapLoaderLane {
    async fn load(
        &self,
        url: &str,
        options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<EnvironmentMap, Box<dyn Error + Send + Sync>> {
        let device = require_device(context)?;
        let env_options: EnvironmentMapOptions = options.parse()?;

        let (decoded, layout) = if env_options.equirectangular {
            self.load_equirectangular(url, &env_options, context).await?
        } else {
            self.load_cube(url, &env_options, context).await?
        };

        let (dimension, default_mapping) = match layout {
            EnvironmentLayout::Equirectangular => (
                TextureDimension::D2,
                TextureMapping::EquirectangularReflection,
            ),
            EnvironmentLayout::CubeFaces => (TextureDimension::Cube, TextureMapping::CubeReflection),
        };
        let prefilter = prefilter_for(&env_options, layout, decoded.size);
        let mip_level_count = match prefilter {
            Prefilter::None => 1,
            Prefilter::Pmrem | Prefilter::Level(_) => decoded.size.max_mips(),
        };

        let descriptor = TextureDescriptor {
            label: Some(Cow::Borrowed(url)),
            size: decoded.size,
            mip_level_count,
            dimension,
            format: decoded.format,
        };
        let id = device
            .create_texture(&descriptor, &decoded.pixels)
            .with_context(|| format!("Could not upload environment map {url}"))?;

        log::trace!("Uploaded {url} as {layout:?} with {prefilter:?}");

        Ok(EnvironmentMap {
            id,
            label: url.to_owned(),
            size: decoded.size,
            format: decoded.format,
            color_space: decoded.color_space,
            layout,
            prefilter,
            mapping: env_options.mapping.unwrap_or(default_mapping),
        })
    }

    fn strategy_name(&self) -> &'static str {
        "EnvironmentMapLoader"
    }
}
