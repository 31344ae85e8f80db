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

use super::{Asset, AssetType};
use std::{any::Any, fmt, ops::Deref, sync::Arc};

/// A thread-safe, reference-counted handle to a loaded asset.
///
/// This acts as a smart pointer, providing shared ownership of an asset's data.
/// Cloning a handle is cheap, as it only increments the reference count
/// and does not duplicate the underlying asset data.
#[derive(Debug)]
pub struct AssetHandle<T: Asset>(Arc<T>);

impl<T: Asset> AssetHandle<T> {
    /// Creates a new `AssetHandle` that takes ownership of the asset data.
    pub fn new(asset: T) -> Self {
        Self(Arc::new(asset))
    }

    /// Wraps an already shared asset without copying it.
    pub fn from_arc(asset: Arc<T>) -> Self {
        Self(asset)
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: Asset> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Asset> Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A type-erased asset as stored in the cache.
///
/// The concrete type is recovered with [`LoadedAsset::downcast`]. The erased
/// value is never copied, so every handle obtained from the same entry shares
/// one allocation with what the loader produced.
#[derive(Clone)]
pub struct LoadedAsset {
    asset_type: AssetType,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl LoadedAsset {
    /// Erases a freshly loaded asset.
    pub fn new<A: Asset>(asset_type: AssetType, asset: A) -> Self {
        Self {
            asset_type,
            type_name: std::any::type_name::<A>(),
            value: Arc::new(asset),
        }
    }

    /// The loading strategy that produced this asset.
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// The Rust type name of the stored asset, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the stored asset is an `A`.
    pub fn is<A: Asset>(&self) -> bool {
        self.value.is::<A>()
    }

    /// Recovers a typed handle, or `None` if the stored asset is not an `A`.
    pub fn downcast<A: Asset>(&self) -> Option<AssetHandle<A>> {
        self.value
            .clone()
            .downcast::<A>()
            .ok()
            .map(AssetHandle::from_arc)
    }
}

impl fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedAsset")
            .field("asset_type", &self.asset_type)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Dummy(u32);
    impl Asset for Dummy {}

    #[test]
    fn downcast_shares_the_allocation() {
        let loaded = LoadedAsset::new(AssetType::Json, Dummy(7));

        let a = loaded.downcast::<Dummy>().expect("should downcast");
        let b = loaded.downcast::<Dummy>().expect("should downcast");

        assert_eq!(*a, Dummy(7));
        assert!(AssetHandle::ptr_eq(&a, &b));
    }

    #[test]
    fn downcast_to_wrong_type_is_none() {
        let loaded = LoadedAsset::new(AssetType::Json, Dummy(1));

        assert!(loaded.is::<Dummy>());
        assert!(loaded.downcast::<serde_json::Value>().is_none());
    }
}
