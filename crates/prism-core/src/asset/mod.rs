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

//! Provides the foundational traits and primitive types for Prism's asset system.
//!
//! This module defines the "common language" for all asset-related operations.
//! It contains the contracts that the loading lanes and the asset manager use,
//! but it has no knowledge of how assets are loaded or cached.
//!
//! The key components are:
//! - The [`Asset`] trait: A marker for all types that can be treated as assets.
//! - [`AssetDescriptor`]: a request to load one resource.
//! - [`AssetType`]: the closed set of loading strategies, with extension inference.
//! - The resource types produced by the built-in lanes.

mod descriptor;
mod handle;
mod kind;
mod options;
mod resources;

pub use descriptor::*;
pub use handle::*;
pub use kind::*;
pub use options::*;
pub use resources::*;

/// A marker trait for types that can be managed by the asset system.
///
/// The supertraits enforce critical safety guarantees:
/// - `Send` + `Sync`: The asset can be produced on a loader task and shared
///   with whichever thread builds the scene.
/// - `'static`: The asset does not borrow anything, so it can live in the
///   cache for the lifetime of the manager.
///
/// # Examples
///
/// ```
/// use prism_core::asset::Asset;
///
/// // A simple struct representing a level layout.
/// struct LevelLayout {
///     // ... fields
/// }
///
/// // By implementing Asset, `LevelLayout` can now be produced by a loader lane.
/// impl Asset for LevelLayout {}
/// ```
pub trait Asset: Send + Sync + 'static {}

impl Asset for serde_json::Value {}
