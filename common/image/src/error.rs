// Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while building or decoding a container image.
///
/// Every variant is terminal for a build: each one indicates a configuration
/// problem or a structurally invalid image, never a transient condition worth
/// retrying.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    /// The buffer does not hold a valid section at the given offset.
    #[error("malformed section at offset {offset:#x}: {reason}")]
    MalformedSection { offset: usize, reason: String },

    /// Metadata does not fit in the required length with room for the
    /// padding section header.
    #[error(
        "metadata of {len} bytes cannot be padded to {required} bytes \
         (padding needs at least 8 bytes of room)"
    )]
    MetadataTooLarge { len: usize, required: usize },

    /// Metadata cannot fit within the configured firmware offset.
    #[error("metadata of {len} bytes overflows the firmware offset, at most {max} allowed")]
    MetadataOverflow { len: usize, max: usize },

    /// A section payload exceeds what the 32-bit length field can describe.
    #[error("section payload of {0} bytes exceeds the 32-bit length field")]
    SectionTooLarge(usize),

    /// The requested digest algorithm is not available.
    #[error("unsupported digest algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    /// The external signer rejected the request or its key material.
    #[error("signing failed: {0}")]
    SigningError(String),
}
