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

//! Defines the error type for device resource creation.

use super::TextureId;
use std::fmt;

/// An error related to the creation or use of a device texture.
#[derive(Debug)]
pub enum ResourceError {
    /// The handle or ID used to reference a texture is invalid.
    InvalidHandle(TextureId),
    /// The texture exceeds what the device supports.
    TooLarge {
        /// The requested width and height.
        requested: (u32, u32),
        /// The device limit.
        limit: u32,
    },
    /// The uploaded data does not match the size implied by the descriptor.
    DataSizeMismatch {
        /// Bytes implied by the descriptor.
        expected: usize,
        /// Bytes actually provided.
        actual: usize,
    },
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidHandle(id) => write!(f, "Invalid texture handle: {id:?}"),
            ResourceError::TooLarge { requested, limit } => {
                write!(
                    f,
                    "Texture of {}x{} exceeds the device limit of {limit}",
                    requested.0, requested.1
                )
            }
            ResourceError::DataSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Texture data is {actual} bytes but the descriptor requires {expected}"
                )
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}
