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

//! Image loading: raster formats decoded to RGBA8, SVG kept as markup.

use super::{decode_off_runtime, fetch_bytes, normalized_path};
use crate::asset_lane::AssetLoaderLane;
use anyhow::Context;
use async_trait::async_trait;
use prism_core::{
    asset::{AssetOptions, Image},
    LoadContext,
};
use std::error::Error;

fn looks_like_svg(url: &str, bytes: &[u8]) -> bool {
    if normalized_path(url).ends_with(".svg") || url.starts_with("data:image/svg+xml") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// A lane decoding images on the CPU.
#[derive(Debug, Clone, Default)]
pub struct ImageLoaderLane;

#[async_trait]
impl AssetLoaderLane<Image> for ImageLoaderLane {
    async fn load(
        &self,
        url: &str,
        _options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<Image, Box<dyn Error + Send + Sync>> {
        let bytes = fetch_bytes(context, url).await?;

        if looks_like_svg(url, &bytes) {
            let markup = String::from_utf8(bytes)
                .with_context(|| format!("SVG image {url} is not valid UTF-8"))?;
            return Ok(Image::Svg { markup });
        }

        let source = url.to_owned();
        let raster = decode_off_runtime(url, move || {
            let rgba = image::load_from_memory(&bytes)
                .with_context(|| format!("Could not decode image {source}"))?
                .to_rgba8();
            let (width, height) = rgba.dimensions();
            Ok(Image::Raster {
                width,
                height,
                pixels: rgba.into_raw(),
            })
        })
        .await?;
        Ok(raster)
    }

    fn strategy_name(&self) -> &'static str {
        "ImageLoader"
    }
}
