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

//! glTF / GLB model loader lane with support for embedded and external buffers.

use super::{decode_off_runtime, fetch_bytes};
use crate::asset_lane::AssetLoaderLane;
use anyhow::{anyhow, ensure, Context, Result};
use async_trait::async_trait;
use gltf::{buffer::Source, Buffer, Semantic};
use prism_core::{
    asset::{AssetOptions, Model, ModelMesh, ModelPrimitive},
    fetch::resolve_relative,
    LoadContext,
};
use serde::Deserialize;
use std::error::Error;

/// The Draco geometry compression extension.
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";
/// The meshoptimizer buffer compression extension.
pub const MESHOPT_EXTENSION: &str = "EXT_meshopt_compression";

/// Options understood by [`GltfLoaderLane`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelOptions {
    /// Accept Draco-compressed primitives and leave them for a decoder.
    pub draco: bool,
    /// Accept meshopt-compressed buffers and leave them for a decoder.
    pub mesh_opt: bool,
}

/// Lane for loading glTF and GLB models.
#[derive(Debug, Clone, Default)]
pub struct GltfLoaderLane;

impl GltfLoaderLane {
    /// Returns the compression extension the document relies on, after
    /// checking that the caller opted into it.
    fn check_required_extensions(
        gltf: &gltf::Gltf,
        url: &str,
        options: &ModelOptions,
    ) -> Result<Option<&'static str>> {
        let mut compression = None;
        for extension in gltf.document.extensions_required() {
            match extension {
                DRACO_EXTENSION if options.draco => compression = Some(DRACO_EXTENSION),
                MESHOPT_EXTENSION if options.mesh_opt => compression = Some(MESHOPT_EXTENSION),
                DRACO_EXTENSION => anyhow::bail!(
                    "Could not load GLTF asset {url}: it uses Draco compression, enable the `draco` option"
                ),
                MESHOPT_EXTENSION => anyhow::bail!(
                    "Could not load GLTF asset {url}: it uses meshopt compression, enable the `meshOpt` option"
                ),
                other => log::warn!("GLTF asset {url} requires unsupported extension {other}"),
            }
        }
        Ok(compression)
    }

    /// Runs the structural glTF validation. Unsupported required extensions
    /// were already accepted or refused by `check_required_extensions`.
    fn validate(gltf: &gltf::Gltf, url: &str) -> Result<()> {
        use gltf::json::validation::{Error as ValidationError, Validate};

        let root = gltf.document.as_json();
        let mut problems = Vec::new();
        root.validate(root, gltf::json::Path::new, &mut |path, error| {
            let path = path();
            let settled = error == ValidationError::Unsupported
                && path.as_str().starts_with("extensionsRequired");
            if !settled {
                problems.push(format!("{path}: {error}"));
            }
        });
        ensure!(
            problems.is_empty(),
            "Could not load GLTF asset {url}: {}",
            problems.join(", ")
        );
        Ok(())
    }

    /// Checks that every view fits its buffer and every accessor fits its
    /// view, so reading vertices can never index out of bounds.
    fn check_ranges(gltf: &gltf::Gltf, url: &str, buffer_data: &[Vec<u8>]) -> Result<()> {
        for view in gltf.views() {
            let available = buffer_data.get(view.buffer().index()).map_or(0, Vec::len);
            ensure!(
                view.offset()
                    .checked_add(view.length())
                    .is_some_and(|end| end <= available),
                "Buffer view {} of {url} runs past the end of buffer {}",
                view.index(),
                view.buffer().index()
            );
        }

        for accessor in gltf.accessors() {
            let size = accessor.size();
            if let Some(view) = accessor.view() {
                let stride = view.stride().unwrap_or(size);
                ensure!(
                    span_fits(accessor.offset(), stride, accessor.count(), size, view.length()),
                    "Accessor {} of {url} reads past the end of buffer view {}",
                    accessor.index(),
                    view.index()
                );
            }
            if let Some(sparse) = accessor.sparse() {
                let (indices, values) = (sparse.indices(), sparse.values());
                let index_size = indices.index_type().size();
                let indices_view = indices.view();
                let values_view = values.view();
                ensure!(
                    span_fits(
                        indices.offset(),
                        indices_view.stride().unwrap_or(index_size),
                        sparse.count(),
                        index_size,
                        indices_view.length()
                    ) && span_fits(
                        values.offset(),
                        values_view.stride().unwrap_or(size),
                        sparse.count(),
                        size,
                        values_view.length()
                    ),
                    "Sparse accessor {} of {url} reads past the end of its buffer views",
                    accessor.index()
                );
            }
        }
        Ok(())
    }

    async fn load_buffer_data(
        gltf: &gltf::Gltf,
        url: &str,
        context: &LoadContext,
    ) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                Source::Bin => gltf
                    .blob
                    .clone()
                    .context("GLB file references binary chunk but it is missing")?,
                Source::Uri(uri) => fetch_bytes(context, &resolve_relative(url, uri)).await?,
            };
            anyhow::ensure!(
                data.len() >= buffer.length(),
                "Buffer {} of {url} is {} bytes, expected at least {}",
                buffer.index(),
                data.len(),
                buffer.length()
            );
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    fn build_model(
        gltf: &gltf::Gltf,
        url: &str,
        buffer_data: &[Vec<u8>],
        compression: Option<&str>,
    ) -> Result<Model> {
        if compression != Some(MESHOPT_EXTENSION) {
            Self::check_ranges(gltf, url, buffer_data)?;
        }

        let meshes = gltf
            .meshes()
            .map(|mesh| Self::extract_mesh(mesh, buffer_data, compression))
            .collect();

        let image_uris = gltf
            .images()
            .filter_map(|image| match image.source() {
                gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                    Some(resolve_relative(url, uri))
                }
                _ => None,
            })
            .collect();

        Ok(Model {
            label: url.to_owned(),
            meshes,
            materials: gltf.materials().map(|m| m.name().map(str::to_owned)).collect(),
            animations: gltf.animations().map(|a| a.name().map(str::to_owned)).collect(),
            node_count: gltf.nodes().count(),
            scene_count: gltf.scenes().count(),
            image_uris,
        })
    }

    fn extract_mesh(
        mesh: gltf::Mesh<'_>,
        buffer_data: &[Vec<u8>],
        compression: Option<&str>,
    ) -> ModelMesh {
        let primitives = mesh
            .primitives()
            .map(|primitive| {
                let material = primitive.material().index();

                // Compressed geometry has accessors without views, or lives in
                // meshopt-encoded buffers the reader cannot interpret.
                let compressed = match compression {
                    Some(MESHOPT_EXTENSION) => compression,
                    Some(_) => primitive
                        .get(&Semantic::Positions)
                        .filter(|accessor| accessor.view().is_none())
                        .and(compression),
                    None => None,
                };
                if let Some(extension) = compressed {
                    return ModelPrimitive {
                        material,
                        compression: Some(extension.to_owned()),
                        ..Default::default()
                    };
                }

                let get_buffer_data =
                    |buffer: Buffer<'_>| buffer_data.get(buffer.index()).map(Vec::as_slice);
                let reader = primitive.reader(get_buffer_data);

                ModelPrimitive {
                    positions: reader
                        .read_positions()
                        .map(|positions| positions.collect())
                        .unwrap_or_default(),
                    normals: reader.read_normals().map(|normals| normals.collect()),
                    tex_coords: reader
                        .read_tex_coords(0)
                        .map(|coords| coords.into_f32().collect()),
                    indices: reader
                        .read_indices()
                        .map(|indices| indices.into_u32().collect()),
                    material,
                    compression: None,
                }
            })
            .collect();

        ModelMesh {
            name: mesh.name().map(str::to_owned),
            primitives,
        }
    }
}

/// Whether `count` elements of `size` bytes, `stride` apart from `offset`,
/// fit in `length` bytes.
fn span_fits(offset: usize, stride: usize, count: usize, size: usize, length: usize) -> bool {
    count
        .checked_sub(1)
        .and_then(|last| last.checked_mul(stride))
        .and_then(|span| span.checked_add(offset))
        .and_then(|span| span.checked_add(size))
        .is_some_and(|end| end <= length)
}

#[async_trait]
impl AssetLoaderLane<Model> for GltfLoaderLane {
    async fn load(
        &self,
        url: &str,
        options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<Model, Box<dyn Error + Send + Sync>> {
        let model_options: ModelOptions = options.parse()?;
        let bytes = fetch_bytes(context, url).await?;

        let (source, parse_options) = (url.to_owned(), model_options.clone());
        let (gltf, compression) = decode_off_runtime(url, move || {
            // Parsed unvalidated: the crate rejects every compression
            // extension outright, before the options can opt into them.
            let gltf = gltf::Gltf::from_slice_without_validation(&bytes)
                .map_err(|e| anyhow!("Could not load GLTF asset {source}: {e}"))?;
            let compression = Self::check_required_extensions(&gltf, &source, &parse_options)?;
            Self::validate(&gltf, &source)?;
            Ok((gltf, compression))
        })
        .await?;

        let buffer_data = match compression {
            Some(MESHOPT_EXTENSION) => Vec::new(),
            _ => Self::load_buffer_data(&gltf, url, context).await?,
        };

        let source = url.to_owned();
        let model = decode_off_runtime(url, move || {
            Self::build_model(&gltf, &source, &buffer_data, compression)
        })
        .await?;
        Ok(model)
    }

    fn strategy_name(&self) -> &'static str {
        "GltfLoader"
    }
}
