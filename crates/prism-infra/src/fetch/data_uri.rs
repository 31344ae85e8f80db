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

//! Decoding of RFC 2397 `data:` URIs.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use prism_core::fetch::FetchError;

fn invalid(reason: impl Into<String>) -> FetchError {
    FetchError::InvalidDataUri {
        reason: reason.into(),
    }
}

/// Decodes the payload of a `data:` URI.
///
/// Returns `None` when `url` is not a data URI at all.
pub fn decode_data_uri(url: &str) -> Option<Result<Vec<u8>, FetchError>> {
    let rest = url.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err(invalid("missing ',' separator")));
    };

    let decoded = if header.ends_with(";base64") {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| invalid(e.to_string()))
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    };
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_regular_urls() {
        assert!(decode_data_uri("textures/a.png").is_none());
    }

    #[test]
    fn decodes_base64_payloads() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AQID")
            .unwrap()
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn decodes_percent_encoded_payloads() {
        let bytes = decode_data_uri("data:text/plain,a%20b").unwrap().unwrap();
        assert_eq!(bytes, b"a b");
    }

    #[test]
    fn stray_percent_signs_are_kept_literally() {
        let bytes = decode_data_uri("data:text/plain,100%25%20or%4").unwrap().unwrap();
        assert_eq!(bytes, b"100% or%4");
    }

    #[test]
    fn decodes_binary_escapes() {
        let bytes = decode_data_uri("data:application/octet-stream,%00%FF").unwrap().unwrap();
        assert_eq!(bytes, vec![0x00, 0xff]);
    }

    #[test]
    fn rejects_malformed_uris() {
        assert!(matches!(
            decode_data_uri("data:text/plain"),
            Some(Err(FetchError::InvalidDataUri { .. }))
        ));
        assert!(decode_data_uri("data:;base64,@@@").unwrap().is_err());
    }
}
