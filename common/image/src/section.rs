// Licensed under the Apache-2.0 license

//! Section tags and the wire codec for the container format.
//!
//! Every element of an image is a section: a 4-byte big-endian tag, a 4-byte
//! big-endian payload length, and the payload itself. The payloads of
//! [`SectionKind::Verified`] and [`SectionKind::Verification`] are themselves
//! concatenations of sections; all other kinds carry opaque bytes.

use zerocopy::byteorder::big_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::ImageError;

/// Size of the tag + length header preceding every section payload.
pub const SECTION_HDR_LEN: usize = 8;

/// The recognized section tags.
///
/// The values are part of the on-device format and must not change: the
/// bootloader matches them to locate the verified branch and the
/// authentication records inside a flashed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SectionKind {
    /// Authentication records (digest/signature) over the verified branch.
    Verification = 0x6ef4_4bc0,
    /// Everything the bootloader authenticates before jumping to it.
    Verified = 0x1eda_84bc,
    /// Padding; the payload carries no meaning.
    Dummy = 0xba50_911a,
    /// The raw firmware binary.
    Firmware = 0x40b8_0c0f,
    /// A digest over the verified branch.
    Digest = 0x9f38_f5e6,
    /// A signature over the verified branch.
    Signature = 0x50b6_7a95,
}

impl SectionKind {
    /// Map a wire tag back to its kind. Unrecognized tags are invalid.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            t if t == SectionKind::Verification as u32 => Some(SectionKind::Verification),
            t if t == SectionKind::Verified as u32 => Some(SectionKind::Verified),
            t if t == SectionKind::Dummy as u32 => Some(SectionKind::Dummy),
            t if t == SectionKind::Firmware as u32 => Some(SectionKind::Firmware),
            t if t == SectionKind::Digest as u32 => Some(SectionKind::Digest),
            t if t == SectionKind::Signature as u32 => Some(SectionKind::Signature),
            _ => None,
        }
    }

    /// The tag value written to the wire.
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Whether the payload of this kind is itself a sequence of sections.
    pub fn is_container(self) -> bool {
        matches!(self, SectionKind::Verified | SectionKind::Verification)
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Verification => "verification",
            SectionKind::Verified => "verified",
            SectionKind::Dummy => "dummy",
            SectionKind::Firmware => "firmware",
            SectionKind::Digest => "digest",
            SectionKind::Signature => "signature",
        }
    }
}

/// The header in front of every section payload.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct SectionHeader {
    tag: U32,
    length: U32,
}

/// A section decoded out of a byte buffer; the payload borrows the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedSection<'a> {
    pub kind: SectionKind,
    /// Declared payload length; always equals `payload.len()`.
    pub len: usize,
    pub payload: &'a [u8],
    /// Header plus payload bytes, i.e. where the next section starts.
    pub consumed: usize,
}

/// Encode one section: tag, payload length, payload.
pub fn encode_section(kind: SectionKind, payload: &[u8]) -> Result<Vec<u8>, ImageError> {
    let length =
        u32::try_from(payload.len()).map_err(|_| ImageError::SectionTooLarge(payload.len()))?;
    let header = SectionHeader {
        tag: U32::new(kind.tag()),
        length: U32::new(length),
    };
    let mut out = Vec::with_capacity(SECTION_HDR_LEN + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decode the section starting at `offset` within `buf`.
///
/// Fails when fewer than 8 bytes remain for the header, when the tag is not
/// recognized, or when the declared length exceeds the remaining buffer.
pub fn decode_section(buf: &[u8], offset: usize) -> Result<DecodedSection<'_>, ImageError> {
    let rest = buf.get(offset..).ok_or_else(|| ImageError::MalformedSection {
        offset,
        reason: format!("offset beyond end of {}-byte buffer", buf.len()),
    })?;
    let (header, body) =
        SectionHeader::read_from_prefix(rest).map_err(|_| ImageError::MalformedSection {
            offset,
            reason: format!("{} bytes remaining, need 8 for a section header", rest.len()),
        })?;
    let kind = SectionKind::from_tag(header.tag.get()).ok_or_else(|| {
        ImageError::MalformedSection {
            offset,
            reason: format!("unrecognized section tag {:#010x}", header.tag.get()),
        }
    })?;
    let len = header.length.get() as usize;
    if len > body.len() {
        return Err(ImageError::MalformedSection {
            offset,
            reason: format!(
                "declared length {} exceeds {} remaining bytes",
                len,
                body.len()
            ),
        });
    }
    Ok(DecodedSection {
        kind,
        len,
        payload: &body[..len],
        consumed: SECTION_HDR_LEN + len,
    })
}
