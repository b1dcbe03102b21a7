// Licensed under the Apache-2.0 license

//! Builders for the two image branches and the final container.
//!
//! The build is a strict pipeline of owned buffers: [`build_verified`]
//! produces the verified branch, [`build_verification`] computes the
//! authentication records over it, and [`assemble_image`] wraps both into the
//! final image. Each output is consumed exactly once by the next stage.

use crate::error::ImageError;
use crate::section::{encode_section, SectionKind, SECTION_HDR_LEN};

/// Byte used to fill the padding section payload. The value carries no
/// meaning; the bootloader skips the whole dummy section by length.
const PAD_FILL: u8 = 0x20;

/// Digest provider for the verification branch. The algorithm is fixed when
/// the implementation is constructed.
pub trait ImageHasher {
    /// Digest `data`, returning the raw digest bytes.
    fn digest(&self, data: &[u8]) -> Result<Vec<u8>, ImageError>;
}

/// Signature provider for the verification branch. Key material is owned by
/// the implementation; the container format does not mandate a scheme.
pub trait ImageSigner {
    /// Sign `data`, returning the encoded signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, ImageError>;
}

/// Authentication policy for the verification branch.
pub enum Authenticator<'a> {
    /// No authentication records; the bootloader boots the image unchecked.
    None,
    /// Integrity digest only.
    Check { hasher: &'a dyn ImageHasher },
    /// Digest plus signature, both over the verified branch.
    Sign {
        hasher: &'a dyn ImageHasher,
        signer: &'a dyn ImageSigner,
    },
}

/// Pad `data` to exactly `required_len` bytes by appending one dummy section.
///
/// Data that already has the required length is returned unchanged. Anything
/// longer, or anything leaving less than the 8 bytes a dummy section header
/// needs, fails with [`ImageError::MetadataTooLarge`].
pub fn pad_metadata(data: Vec<u8>, required_len: usize) -> Result<Vec<u8>, ImageError> {
    if data.len() == required_len {
        return Ok(data);
    }
    if data.len() > required_len || required_len - data.len() < SECTION_HDR_LEN {
        return Err(ImageError::MetadataTooLarge {
            len: data.len(),
            required: required_len,
        });
    }

    let filler = vec![PAD_FILL; required_len - data.len() - SECTION_HDR_LEN];
    let mut padded = data;
    padded.extend_from_slice(&encode_section(SectionKind::Dummy, &filler)?);
    Ok(padded)
}

/// Build the verified branch payload: padded metadata followed by the
/// firmware section.
///
/// The verified section header and the firmware section header occupy 8 bytes
/// each, so the metadata-plus-padding run must come to `fw_offset - 16` bytes
/// for the firmware payload to land exactly `fw_offset` bytes into the image.
/// Metadata longer than `fw_offset - 24` cannot leave room for the padding
/// section header and is rejected before padding is attempted.
pub fn build_verified(
    metadata: Vec<u8>,
    firmware: &[u8],
    fw_offset: u32,
) -> Result<Vec<u8>, ImageError> {
    let fw_offset = fw_offset as usize;
    let max = match fw_offset.checked_sub(3 * SECTION_HDR_LEN) {
        Some(max) => max,
        None => {
            return Err(ImageError::MetadataOverflow {
                len: metadata.len(),
                max: 0,
            })
        }
    };
    if metadata.len() > max {
        return Err(ImageError::MetadataOverflow {
            len: metadata.len(),
            max,
        });
    }

    let mut verified = pad_metadata(metadata, fw_offset - 2 * SECTION_HDR_LEN)?;
    verified.extend_from_slice(&encode_section(SectionKind::Firmware, firmware)?);
    Ok(verified)
}

/// Build the verification branch payload over the finished verified branch.
///
/// Collaborator failures propagate unchanged; there is no recovery here.
pub fn build_verification(
    verified: &[u8],
    auth: &Authenticator<'_>,
) -> Result<Vec<u8>, ImageError> {
    match auth {
        Authenticator::None => Ok(Vec::new()),
        Authenticator::Check { hasher } => {
            let digest = hasher.digest(verified)?;
            encode_section(SectionKind::Digest, &digest)
        }
        Authenticator::Sign { hasher, signer } => {
            let digest = hasher.digest(verified)?;
            let signature = signer.sign(verified)?;
            let mut out = encode_section(SectionKind::Digest, &digest)?;
            out.extend_from_slice(&encode_section(SectionKind::Signature, &signature)?);
            Ok(out)
        }
    }
}

/// Wrap the two branch payloads into the final image: the verified section
/// first, its verification section second. The order is part of the format.
pub fn assemble_image(verified: Vec<u8>, verification: Vec<u8>) -> Result<Vec<u8>, ImageError> {
    let mut image = encode_section(SectionKind::Verified, &verified)?;
    image.extend_from_slice(&encode_section(SectionKind::Verification, &verification)?);
    Ok(image)
}
