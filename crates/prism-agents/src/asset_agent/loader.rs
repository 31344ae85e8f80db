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

//! A registry for loader lanes, erasing their asset types.

use async_trait::async_trait;
use prism_core::{
    asset::{Asset, AssetOptions, AssetType, LoadedAsset},
    LoadContext,
};
use prism_lanes::asset_lane::AssetLoaderLane;
use std::{collections::HashMap, error::Error, marker::PhantomData, sync::Arc};

/// Internal trait for loading any asset type.
#[async_trait]
pub(crate) trait AnyLoaderLane: Send + Sync {
    async fn load_any(
        &self,
        asset_type: AssetType,
        url: &str,
        options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<LoadedAsset, Box<dyn Error + Send + Sync>>;

    fn strategy_name(&self) -> &'static str;
}

/// Adapts a typed `AssetLoaderLane<A>` to [`AnyLoaderLane`].
struct AssetLoaderLaneWrapper<A: Asset, L: AssetLoaderLane<A>>(L, PhantomData<fn() -> A>);

#[async_trait]
impl<A: Asset, L: AssetLoaderLane<A> + 'static> AnyLoaderLane for AssetLoaderLaneWrapper<A, L> {
    async fn load_any(
        &self,
        asset_type: AssetType,
        url: &str,
        options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<LoadedAsset, Box<dyn Error + Send + Sync>> {
        let asset: A = self.0.load(url, options, context).await?;
        Ok(LoadedAsset::new(asset_type, asset))
    }

    fn strategy_name(&self) -> &'static str {
        self.0.strategy_name()
    }
}

/// Maps each asset type to the lane that loads it.
#[derive(Default)]
pub(crate) struct AssetLoaderLaneRegistry {
    lanes: HashMap<AssetType, Arc<dyn AnyLoaderLane>>,
}

impl AssetLoaderLaneRegistry {
    /// Registers `lane` for `asset_type`, replacing any previous lane.
    pub(crate) fn register<A: Asset>(
        &mut self,
        asset_type: AssetType,
        lane: impl AssetLoaderLane<A> + 'static,
    ) {
        let wrapped = AssetLoaderLaneWrapper(lane, PhantomData);
        if let Some(previous) = self.lanes.insert(asset_type, Arc::new(wrapped)) {
            log::debug!(
                "Replaced the {} lane for '{asset_type}'",
                previous.strategy_name()
            );
        }
    }

    pub(crate) fn get(&self, asset_type: AssetType) -> Option<Arc<dyn AnyLoaderLane>> {
        self.lanes.get(&asset_type).cloned()
    }

    pub(crate) fn contains(&self, asset_type: AssetType) -> bool {
        self.lanes.contains_key(&asset_type)
    }

    pub(crate) fn strategy_names(&self) -> Vec<(AssetType, &'static str)> {
        let mut names: Vec<_> = self
            .lanes
            .iter()
            .map(|(asset_type, lane)| (*asset_type, lane.strategy_name()))
            .collect();
        names.sort_by_key(|(asset_type, _)| asset_type.as_str());
        names
    }
}
