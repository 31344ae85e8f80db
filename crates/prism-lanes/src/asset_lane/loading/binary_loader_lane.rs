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

//! Audio and video lanes.
//!
//! Media files are kept as their encoded bytes. Decoding a whole track up
//! front would multiply its memory footprint, so playback code is expected to
//! stream-decode from these buffers instead.

use super::{fetch_bytes, normalized_path};
use crate::asset_lane::AssetLoaderLane;
use async_trait::async_trait;
use prism_core::{
    asset::{AssetOptions, AudioBuffer, VideoBlob},
    LoadContext,
};
use std::error::Error;

/// Guesses a video MIME type from the URL extension.
pub fn video_mime_type(url: &str) -> &'static str {
    let path = normalized_path(url);
    match path.rsplit_once('.').map(|(_, extension)| extension) {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg") | Some("ogv") => "video/ogg",
        _ => "application/octet-stream",
    }
}

/// A lane fetching audio files without decoding them.
#[derive(Debug, Clone, Default)]
pub struct AudioLoaderLane;

#[async_trait]
impl AssetLoaderLane<AudioBuffer> for AudioLoaderLane {
    async fn load(
        &self,
        url: &str,
        _options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<AudioBuffer, Box<dyn Error + Send + Sync>> {
        let bytes = fetch_bytes(context, url).await?;
        Ok(AudioBuffer { bytes })
    }

    fn strategy_name(&self) -> &'static str {
        "AudioLoader"
    }
}

/// A lane fetching video files without decoding them.
#[derive(Debug, Clone, Default)]
pub struct VideoLoaderLane;

#[async_trait]
impl AssetLoaderLane<VideoBlob> for VideoLoaderLane {
    async fn load(
        &self,
        url: &str,
        _options: &AssetOptions,
        context: &LoadContext,
    ) -> Result<VideoBlob, Box<dyn Error + Send + Sync>> {
        let bytes = fetch_bytes(context, url).await?;
        Ok(VideoBlob {
            mime_type: video_mime_type(url),
            bytes,
        })
    }

    fn strategy_name(&self) -> &'static str {
        "VideoLoader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_lane::loading::test_support::context;
    use prism_infra::MemoryFetcher;

    #[test]
    fn guesses_video_mime_types() {
        assert_eq!(video_mime_type("intro.MP4"), "video/mp4");
        assert_eq!(video_mime_type("loop.webm?autoplay"), "video/webm");
        assert_eq!(video_mime_type("clip.ogv"), "video/ogg");
        assert_eq!(video_mime_type("clip"), "application/octet-stream");
    }

    #[tokio::test]
    async fn media_is_kept_as_raw_bytes() {
        let fetcher = MemoryFetcher::new()
            .with_file("sfx/hit.wav", vec![1, 2, 3])
            .with_file("video/intro.webm", vec![4, 5]);
        let (context, _) = context(fetcher);

        let audio = AudioLoaderLane
            .load("sfx/hit.wav", &AssetOptions::new(), &context)
            .await
            .unwrap();
        assert_eq!(audio.bytes, vec![1, 2, 3]);

        let video = VideoLoaderLane
            .load("video/intro.webm", &AssetOptions::new(), &context)
            .await
            .unwrap();
        assert_eq!(video.mime_type, "video/webm");
        assert_eq!(video.bytes, vec![4, 5]);
    }
}
