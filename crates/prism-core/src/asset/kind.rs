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

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The closed set of loading strategies an asset can be dispatched to.
///
/// A descriptor either names its type explicitly or has it inferred from the
/// URL's file extension with [`AssetType::from_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssetType {
    /// A glTF / GLB scene.
    Model,
    /// A JSON document.
    Json,
    /// A decoded raster image, or SVG markup.
    Image,
    /// An image uploaded to the graphics device as a sampled texture.
    Texture,
    /// An environment map (equirectangular or cube faces) uploaded to the device.
    EnvironmentMap,
    /// Raw, undecoded audio bytes.
    Audio,
    /// Raw, undecoded video bytes.
    Video,
}

impl AssetType {
    /// Every asset type, in dispatch-table order.
    pub const ALL: [AssetType; 7] = [
        AssetType::Model,
        AssetType::Json,
        AssetType::Image,
        AssetType::Texture,
        AssetType::EnvironmentMap,
        AssetType::Audio,
        AssetType::Video,
    ];

    /// The canonical tag for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Model => "model",
            AssetType::Json => "json",
            AssetType::Image => "image",
            AssetType::Texture => "texture",
            AssetType::EnvironmentMap => "environment-map",
            AssetType::Audio => "audio",
            AssetType::Video => "video",
        }
    }

    /// Infers a type from the extension of `url`, ignoring any query string or
    /// fragment. Returns `None` when the extension is not recognized.
    ///
    /// Textures and environment maps share extensions with plain images, so
    /// they must always be requested explicitly.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let (_, extension) = path.rsplit_once('.')?;

        match extension.to_ascii_lowercase().as_str() {
            "gltf" | "glb" => Some(AssetType::Model),
            "json" => Some(AssetType::Json),
            "svg" | "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tga" | "tif" => {
                Some(AssetType::Image)
            }
            "wav" | "mp3" => Some(AssetType::Audio),
            "mp4" | "webm" | "ogg" | "ogv" => Some(AssetType::Video),
            _ => None,
        }
    }

    /// Resolves the type of a descriptor: the explicit tag if present,
    /// otherwise the inferred one.
    pub fn resolve(explicit: Option<AssetType>, url: &str) -> Result<Self, ConfigurationError> {
        explicit
            .or_else(|| Self::from_url(url))
            .ok_or_else(|| ConfigurationError::UnknownAssetType {
                url: url.to_owned(),
            })
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = ConfigurationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "model" | "gltf" => Ok(AssetType::Model),
            "json" => Ok(AssetType::Json),
            "image" | "svg" => Ok(AssetType::Image),
            "texture" => Ok(AssetType::Texture),
            "environment-map" | "env-map" | "envmap" | "envMap" => Ok(AssetType::EnvironmentMap),
            "audio" => Ok(AssetType::Audio),
            "video" => Ok(AssetType::Video),
            other => Err(ConfigurationError::UnknownTypeTag(other.to_owned())),
        }
    }
}

impl TryFrom<String> for AssetType {
    type Error = ConfigurationError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<AssetType> for String {
    fn from(asset_type: AssetType) -> Self {
        asset_type.as_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_type_from_extension() {
        assert_eq!(AssetType::from_url("model.glb"), Some(AssetType::Model));
        assert_eq!(AssetType::from_url("scenes/a.gltf"), Some(AssetType::Model));
        assert_eq!(AssetType::from_url("data/level.JSON"), Some(AssetType::Json));
        assert_eq!(AssetType::from_url("logo.svg"), Some(AssetType::Image));
        assert_eq!(AssetType::from_url("photo.jpeg"), Some(AssetType::Image));
        assert_eq!(AssetType::from_url("hit.mp3"), Some(AssetType::Audio));
        assert_eq!(AssetType::from_url("intro.ogv"), Some(AssetType::Video));
    }

    #[test]
    fn inference_ignores_query_and_fragment() {
        assert_eq!(
            AssetType::from_url("textures/albedo.png?v=3#top"),
            Some(AssetType::Image)
        );
    }

    #[test]
    fn unknown_extension_is_a_configuration_error() {
        assert_eq!(AssetType::from_url("unknown.xyz"), None);
        assert_eq!(AssetType::from_url("no-extension"), None);

        let err = AssetType::resolve(None, "unknown.xyz").unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownAssetType { url } if url == "unknown.xyz"));
    }

    #[test]
    fn explicit_type_wins_over_extension() {
        let resolved = AssetType::resolve(Some(AssetType::Texture), "albedo.png").unwrap();
        assert_eq!(resolved, AssetType::Texture);

        // An explicit type also rescues unknown extensions.
        let resolved = AssetType::resolve(Some(AssetType::EnvironmentMap), "hdr/studio").unwrap();
        assert_eq!(resolved, AssetType::EnvironmentMap);
    }

    #[test]
    fn parses_tag_aliases() {
        assert_eq!("gltf".parse::<AssetType>().unwrap(), AssetType::Model);
        assert_eq!("envMap".parse::<AssetType>().unwrap(), AssetType::EnvironmentMap);
        assert_eq!("env-map".parse::<AssetType>().unwrap(), AssetType::EnvironmentMap);
        assert_eq!("svg".parse::<AssetType>().unwrap(), AssetType::Image);
        assert!("mesh".parse::<AssetType>().is_err());
    }

    #[test]
    fn tags_round_trip_through_serde() {
        let parsed: AssetType = serde_json::from_str("\"envmap\"").unwrap();
        assert_eq!(parsed, AssetType::EnvironmentMap);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"environment-map\"");
    }
}
