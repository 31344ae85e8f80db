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

//! Texture loading and upload.

use super::{decode_off_runtime, fetch_bytes, is_jpeg, require_device};
use crate::asset_lane::AssetLoaderLane;
use anyhow::{Context, Result};
use async_trait::async_trait;
use prism_core::{
    asset::{AssetOptions, Texture},
    renderer::{
        AddressMode, ColorSpace, Extent3D, FilterMode, MipmapFilterMode, SamplerDescriptor,
        TextureDescriptor, TextureDimension, TextureFormat, TextureMapping,
    },
    LoadContext,
};
use serde::Deserialize;
use std::{borrow::Cow, error::Error};

/// Minification filter, combining the texel filter and the mip filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MinFilter {
    /// Nearest texel, no mipmaps.
    Nearest,
    /// Linear texel filter, no mipmaps.
    Linear,
    /// Nearest texel from the nearest mip.
    NearestMipmapNearest,
    /// Nearest texel, blended between mips.
    NearestMipmapLinear,
    /// Linear texel filter from the nearest mip.
    LinearMipmapNearest,
    /// Trilinear filtering.
    LinearMipmapLinear,
}

impl MinFilter {
    fn split(self) -> (FilterMode, Option<MipmapFilterMode>) {
        match self {
            MinFilter::Nearest => (FilterMode::Nearest, None),
            MinFilter::Linear => (FilterMode::Linear, None),
            MinFilter::NearestMipmapNearest => {
                (FilterMode::Nearest, Some(MipmapFilterMode::Nearest))
            }
            MinFilter::NearestMipmapLinear => (FilterMode::Nearest, Some(MipmapFilterMode::Linear)),
            MinFilter::LinearMipmapNearest => (FilterMode::Linear, Some(MipmapFilterMode::Nearest)),
            MinFilter::LinearMipmapLinear => (FilterMode::Linear, Some(MipmapFilterMode::Linear)),
        }
    }
}

/// Options understood by [`TextureLoaderLane`]. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextureOptions {
    /// Flip the image vertically before upload. Defaults to `true`.
    pub flip_y: Option<bool>,
    /// How the texture is mapped onto geometry.
    pub mapping: Option<TextureMapping>,
    /// Force a device format instead of deriving it from the color space.
    pub format: Option<TextureFormat>,
    /// How the texels are encoded. Defaults to linear.
    #[serde(alias = "colorSpace")]
    pub encoding: Option<ColorSpace>,
    /// UV repeat factors.
    pub repeat: Option<[f32; 2]>,
    /// Addressing along U. Defaults to clamp-to-edge.
    pub wrap_s: Option<AddressMode>,
    /// Addressing along V. Defaults to clamp-to-edge.
    pub wrap_t: Option<AddressMode>,
    /// Minification filter. Defaults to trilinear.
    pub min_filter: Option<MinFilter>,
    /// Magnification filter. Defaults to linear.
    pub mag_filter: Option<FilterMode>,
    /// Allocate a full mip chain. Defaults to `true`.
    pub generate_mipmaps: Option<bool>,
}

/// A texture decoded on the CPU and ready to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTexture {
    /// Level 0 texels in `format`.
    pub pixels: Vec<u8>,
    /// The full texture record, minus the device handle.
    pub size: Extent3D,
    /// The device format.
    pub format: TextureFormat,
    /// How the texels are encoded.
    pub color_space: ColorSpace,
    /// Mip levels to allocate.
    pub mip_level_count: u32,
    /// Sampling parameters.
    pub sampler: SamplerDescriptor,
    /// Whether the image was flipped.
    pub flip_y: bool,
    /// Whether the alpha channel is meaningful.
    pub has_alpha: bool,
}

/// Decodes `bytes` and applies every CPU-side texture option.
pub fn prepare_texture(url: &str, bytes: &[u8], options: &TextureOptions) -> Result<PreparedTexture> {
    let mut img = image::load_from_memory(bytes)
        .with_context(|| format!("Could not decode texture {url}"))?;

    let flip_y = options.flip_y.unwrap_or(true);
    if flip_y {
        img = img.flipv();
    }

    let color_space = options.encoding.unwrap_or_default();
    let format = options.format.unwrap_or(match color_space {
        ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear | ColorSpace::Rgbm16 => TextureFormat::Rgba8Unorm,
    });

    let pixels = match format {
        TextureFormat::Rgba32Float => bytemuck::cast_slice(&img.to_rgba32f().into_raw()).to_vec(),
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => img.to_rgba8().into_raw(),
    };

    let size = Extent3D::d2(img.width(), img.height());
    let mip_level_count = if options.generate_mipmaps.unwrap_or(true) {
        size.max_mips()
    } else {
        1
    };

    let (min_filter, mipmap_filter) = options
        .min_filter
        .unwrap_or(MinFilter::LinearMipmapLinear)
        .split();
    let sampler = SamplerDescriptor {
        address_mode_u: options.wrap_s.unwrap_or_default(),
        address_mode_v: options.wrap_t.unwrap_or_default(),
        mag_filter: options.mag_filter.unwrap_or(FilterMode::Linear),
        min_filter,
        mipmap_filter: mipmap_filter.filter(|_| mip_level_count > 1),
    };

    // JPEG has no alpha; an explicit format means the caller knows better.
    let has_alpha = options.format.is_some() || !is_jpeg(url);

    Ok(PreparedTexture {
        pixels,
        size,
        format,
        color_space,
        mip_level_count,
        sampler,
        flip_y,
        has_alpha,
    })
}

/// A lane dedicated to loading textures and uploading them to the device.
#[derive(Debug, Clone, Default)]
pub struct TextureLoaderLane;

#[async_trait]
impl AssetLoaderLane<Texture> for TextureLoaderLane {
    async fn load(
        &self,
        url: &str,
        options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<Texture, Box<dyn Error + Send + Sync>> {
        let device = require_device(context)?;
        let texture_options: TextureOptions = options.parse()?;

        let bytes = fetch_bytes(context, url).await?;
        let prepared = {
            let (source, decode_options) = (url.to_owned(), texture_options.clone());
            decode_off_runtime(url, move || prepare_texture(&source, &bytes, &decode_options))
                .await?
        };

        let limit = device.max_texture_dimension_2d();
        if prepared.size.width > limit || prepared.size.height > limit {
            return Err(format!(
                "Texture {url} is {}x{}, the device supports at most {limit}",
                prepared.size.width, prepared.size.height
            )
            .into());
        }

        let descriptor = TextureDescriptor {
            label: Some(Cow::Borrowed(url)),
            size: prepared.size,
            mip_level_count: prepared.mip_level_count,
            dimension: TextureDimension::D2,
            format: prepared.format,
        };
        let id = device
            .create_texture(&descriptor, &prepared.pixels)
            .with_context(|| format!("Could not upload texture {url}"))?;

        Ok(Texture {
            id,
            label: url.to_owned(),
            size: prepared.size,
            format: prepared.format,
            color_space: prepared.color_space,
            mip_level_count: prepared.mip_level_count,
            sampler: prepared.sampler,
            repeat: texture_options.repeat.unwrap_or([1.0, 1.0]),
            mapping: texture_options.mapping.unwrap_or_default(),
            flip_y: prepared.flip_y,
            has_alpha: prepared.has_alpha,
        })
    }

    fn strategy_name(&self) -> &'static str {
        "TextureLoader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_lane::loading::test_support::{context, encoded_image};
    use image::ImageFormat;
    use prism_infra::MemoryFetcher;
    use serde_json::json;

    #[test]
    fn defaults_follow_the_usual_texture_setup() {
        let png = encoded_image(4, 2, [255, 0, 0, 255], ImageFormat::Png);
        let prepared = prepare_texture("albedo.png", &png, &TextureOptions::default()).unwrap();

        assert_eq!(prepared.size, Extent3D::d2(4, 2));
        assert_eq!(prepared.format, TextureFormat::Rgba8Unorm);
        assert_eq!(prepared.color_space, ColorSpace::Linear);
        assert_eq!(prepared.mip_level_count, 3);
        assert!(prepared.flip_y);
        assert!(prepared.has_alpha);
        assert_eq!(prepared.sampler, SamplerDescriptor::default());
        assert_eq!(prepared.pixels.len(), 4 * 2 * 4);
    }

    #[test]
    fn options_override_the_defaults() {
        let options: TextureOptions = AssetOptions::new()
            .with("encoding", "srgb")
            .with("generateMipmaps", false)
            .with("wrapS", "repeat")
            .with("wrapT", "mirror-repeat")
            .with("minFilter", "nearest")
            .with("magFilter", "nearest")
            .parse()
            .unwrap();

        let png = encoded_image(8, 8, [0, 0, 0, 255], ImageFormat::Png);
        let prepared = prepare_texture("a.png", &png, &options).unwrap();

        assert_eq!(prepared.format, TextureFormat::Rgba8UnormSrgb);
        assert_eq!(prepared.mip_level_count, 1);
        assert_eq!(prepared.sampler.address_mode_u, AddressMode::Repeat);
        assert_eq!(prepared.sampler.address_mode_v, AddressMode::MirrorRepeat);
        assert_eq!(prepared.sampler.min_filter, FilterMode::Nearest);
        assert_eq!(prepared.sampler.mag_filter, FilterMode::Nearest);
        assert_eq!(prepared.sampler.mipmap_filter, None);
    }

    #[test]
    fn flip_y_reverses_rows() {
        let img = image::RgbaImage::from_fn(1, 2, |_, y| {
            if y == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let flipped = prepare_texture("a.png", &png, &TextureOptions::default()).unwrap();
        assert_eq!(&flipped.pixels[..4], &[0, 0, 255, 255]);

        let kept = TextureOptions {
            flip_y: Some(false),
            ..Default::default()
        };
        let unflipped = prepare_texture("a.png", &png, &kept).unwrap();
        assert_eq!(&unflipped.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn jpeg_sources_are_opaque_unless_a_format_is_forced() {
        let jpg = encoded_image(2, 2, [10, 20, 30, 255], ImageFormat::Jpeg);

        let prepared = prepare_texture("photo.jpg", &jpg, &TextureOptions::default()).unwrap();
        assert!(!prepared.has_alpha);

        let forced = TextureOptions {
            format: Some(TextureFormat::Rgba8Unorm),
            ..Default::default()
        };
        assert!(prepare_texture("photo.jpg", &jpg, &forced).unwrap().has_alpha);
    }

    #[tokio::test]
    async fn uploads_through_the_device() {
        let fetcher = MemoryFetcher::new().with_file(
            "albedo.png",
            encoded_image(16, 16, [1, 2, 3, 255], ImageFormat::Png),
        );
        let (context, device) = context(fetcher);
        let options = AssetOptions::new().with("repeat", json!([2.0, 3.0]));

        let texture = TextureLoaderLane
            .load("albedo.png", &options, &context)
            .await
            .unwrap();

        assert_eq!(texture.label, "albedo.png");
        assert_eq!(texture.repeat, [2.0, 3.0]);
        assert_eq!(texture.mip_level_count, 5);
        assert_eq!(device.texture_count(), 1);
        assert!(device.contains(texture.id));
    }

    #[tokio::test]
    async fn rejects_textures_larger_than_the_device_limit() {
        let fetcher = MemoryFetcher::new().with_file(
            "huge.png",
            encoded_image(64, 8, [0, 0, 0, 255], ImageFormat::Png),
        );
        let device = std::sync::Arc::new(prism_infra::HeadlessDevice::with_max_texture_dimension(32));
        let context = LoadContext::new(device.clone(), std::sync::Arc::new(fetcher));

        let err = TextureLoaderLane
            .load("huge.png", &AssetOptions::new(), &context)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("at most 32"));
        assert_eq!(device.texture_count(), 0);
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let (context, _) = context(MemoryFetcher::new());

        let err = TextureLoaderLane
            .load("missing.png", &AssetOptions::new(), &context)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("missing.png"));
    }
}
