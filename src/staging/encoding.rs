//! Upload content encodings.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};

use super::error::{Error, Result};

/// Standard alphabet with canonical padding, tolerating non-zero trailing
/// bits so `YR==` decodes like `YQ==`.
const UPLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// How upload content is transported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentEncoding {
    /// Raw text, stored as UTF-8 bytes.
    #[default]
    Utf8,
    /// Standard base64, for binary files.
    Base64,
}

impl ContentEncoding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Base64 => "base64",
        }
    }

    /// Decodes `content` into the bytes to be written.
    ///
    /// Base64 input may be line-wrapped: all ASCII whitespace is dropped
    /// before decoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBase64`] for malformed base64 input.
    pub fn decode(self, content: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(content.as_bytes().to_vec()),
            Self::Base64 => {
                let compact: String = content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                Ok(UPLOAD_ENGINE.decode(compact)?)
            },
        }
    }
}

impl FromStr for ContentEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "utf-8" => Ok(Self::Utf8),
            "base64" => Ok(Self::Base64),
            other => Err(Error::InvalidEncoding {
                encoding: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
