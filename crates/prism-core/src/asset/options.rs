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

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// An open, type-specific configuration bag forwarded verbatim to a loader lane.
///
/// Two bags are equal when their contents are structurally equal, regardless
/// of insertion order. The asset manager relies on this to decide whether a
/// second request for the same URL is a duplicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetOptions(Map<String, Value>);

impl AssetOptions {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`AssetOptions::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if no option is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interprets the bag as a lane-specific options struct.
    ///
    /// Unknown keys are ignored by the target type unless it opts out, so
    /// scene code can pass options meant for a richer lane without breaking.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for AssetOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_is_structural() {
        let a = AssetOptions::new()
            .with("flipY", false)
            .with("repeat", json!([2.0, 2.0]));
        let b = AssetOptions::new()
            .with("repeat", json!([2.0, 2.0]))
            .with("flipY", false);
        let c = AssetOptions::new().with("flipY", true);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, AssetOptions::new());
    }

    #[test]
    fn parses_into_typed_options() {
        #[derive(Deserialize, Default)]
        #[serde(default, rename_all = "camelCase")]
        struct Opts {
            flip_y: Option<bool>,
            level: Option<u32>,
        }

        let options = AssetOptions::new().with("flipY", false).with("other", 1);
        let parsed: Opts = options.parse().unwrap();

        assert_eq!(parsed.flip_y, Some(false));
        assert_eq!(parsed.level, None);
    }
}
