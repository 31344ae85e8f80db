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

//! JSON documents.

use super::fetch_bytes;
use crate::asset_lane::AssetLoaderLane;
use anyhow::Context;
use async_trait::async_trait;
use prism_core::{asset::AssetOptions, LoadContext};
use serde_json::Value;
use std::error::Error;

/// A lane parsing JSON documents into [`serde_json::Value`].
#[derive(Debug, Clone, Default)]
pub struct JsonLoaderLane;

#[async_trait]
impl AssetLoaderLane<Value> for JsonLoaderLane {
    async fn load(
        &self,
        url: &str,
        _options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<Value, Box<dyn Error + Send + Sync>> {
        let bytes = fetch_bytes(context, url).await?;
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("Could not parse JSON asset {url}"))?;
        Ok(value)
    }

    fn strategy_name(&self) -> &'static str {
        "JsonLoader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_lane::loading::test_support::context;
    use prism_infra::MemoryFetcher;
    use serde_json::json;

    #[tokio::test]
    async fn parses_documents() {
        let fetcher = MemoryFetcher::new().with_file("levels/1.json", r#"{ "spawn": [0, 1, 2] }"#);
        let (context, _) = context(fetcher);

        let value = JsonLoaderLane
            .load("levels/1.json", &AssetOptions::new(), &context)
            .await
            .unwrap();

        assert_eq!(value, json!({ "spawn": [0, 1, 2] }));
    }

    #[tokio::test]
    async fn malformed_documents_fail() {
        let fetcher = MemoryFetcher::new().with_file("broken.json", "{ nope");
        let (context, _) = context(fetcher);

        let err = JsonLoaderLane
            .load("broken.json", &AssetOptions::new(), &context)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("broken.json"));
    }
}
