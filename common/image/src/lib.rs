// Licensed under the Apache-2.0 license

//! Container image format for firmware consumed by a secure bootloader.
//!
//! An image is a nested sequence of typed, length-prefixed sections with
//! exactly two top-level branches: the verified branch carries padding,
//! metadata, and the raw firmware payload, and the verification branch
//! carries the digest/signature records computed over it. The layout keeps
//! the firmware payload — and with it the vector table — at a fixed offset
//! from the image base, so the bootloader can locate it without parsing.
//!
//! This crate owns the format: the section codec, the padding and branch
//! builders, the final assembly, and the walker used to audit an image.
//! Digest and signature computation are behind the [`ImageHasher`] and
//! [`ImageSigner`] traits; implementations live with the tools that hold the
//! algorithm choice and the key material.

pub mod build;
pub mod error;
pub mod section;
pub mod walk;

pub use build::{
    assemble_image, build_verification, build_verified, pad_metadata, Authenticator, ImageHasher,
    ImageSigner,
};
pub use error::ImageError;
pub use section::{decode_section, encode_section, DecodedSection, SectionKind, SECTION_HDR_LEN};
pub use walk::{walk_sections, SectionInfo, Walker, MAX_WALK_DEPTH};
