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

//! The built-in lanes and the helpers they share.

mod binary_loader_lane;
mod environment_map_loader_lane;
mod gltf_loader_lane;
mod image_loader_lane;
mod json_loader_lane;
mod texture_loader_lane;

pub use binary_loader_lane::*;
pub use environment_map_loader_lane::*;
pub use gltf_loader_lane::*;
pub use image_loader_lane::*;
pub use json_loader_lane::*;
pub use texture_loader_lane::*;

use anyhow::{anyhow, Context, Result};
use prism_core::{renderer::GraphicsDevice, LoadContext};
use std::sync::Arc;

/// Fetches `url` through the context's fetcher.
pub(crate) async fn fetch_bytes(context: &LoadContext, url: &str) -> Result<Vec<u8>> {
    let fetcher = context
        .fetcher()
        .ok_or_else(|| anyhow!("No resource fetcher in the load context"))?;
    fetcher
        .fetch(url)
        .await
        .with_context(|| format!("Could not fetch {url}"))
}

/// Runs CPU-bound decoding on the blocking pool so the async workers keep
/// fetching while pixels and vertices are unpacked.
pub(crate) async fn decode_off_runtime<T, F>(url: &str, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .with_context(|| format!("Decoding {url} was interrupted"))?
}

/// Returns the context's graphics device, required by lanes that upload.
pub(crate) fn require_device(context: &LoadContext) -> Result<&Arc<dyn GraphicsDevice>> {
    context
        .device()
        .ok_or_else(|| anyhow!("A graphics device is required to upload textures"))
}

/// The URL without its query string or fragment, lower-cased.
pub(crate) fn normalized_path(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase()
}

pub(crate) fn is_jpeg(url: &str) -> bool {
    if url.starts_with("data:image/jpeg") {
        return true;
    }
    let path = normalized_path(url);
    path.ends_with(".jpg") || path.ends_with(".jpeg")
}

#[cfg(test)]
pub(crate) mod test_support {
    use prism_core::LoadContext;
    use prism_infra::{HeadlessDevice, MemoryFetcher};
    use std::io::Cursor;
    use std::sync::Arc;

    /// Encodes a `width`x`height` image filled with `rgba` in `format`.
    pub fn encoded_image(
        width: u32,
        height: u32,
        rgba: [u8; 4],
        format: image::ImageFormat,
    ) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let dynamic = match format {
            image::ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(
                image::DynamicImage::ImageRgba8(img).to_rgb8(),
            ),
            _ => image::DynamicImage::ImageRgba8(img),
        };
        let mut bytes = Vec::new();
        dynamic
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("Failed to encode test image");
        bytes
    }

    pub fn context(fetcher: MemoryFetcher) -> (LoadContext, Arc<HeadlessDevice>) {
        let device = Arc::new(HeadlessDevice::new());
        let context = LoadContext::new(device.clone(), Arc::new(fetcher));
        (context, device)
    }
}
