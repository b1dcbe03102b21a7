// Licensed under the Apache-2.0 license

//! Packages a raw firmware binary into the container image a secure
//! bootloader consumes.
//!
//! The `create` operation reads the input binary, builds the verified branch
//! with the firmware payload held at the configured vector-table offset,
//! computes the requested authentication records over it, and writes the
//! assembled image atomically. The `inspect` operation walks an existing
//! image and prints its section structure, which `create` also reports after
//! every build.
//!
//! The container format itself lives in the `fw-image` crate; this crate owns
//! the CLI surface, the digest/signer implementations, and file I/O.

pub mod args;
pub mod crypto;
pub mod output;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fw_image::{
    assemble_image, build_verification, build_verified, walk_sections, Authenticator,
};

use crate::args::{Commands, CreateArgs};
use crate::crypto::{P384Signer, Sha2Hasher};

pub fn execute(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Create(args) => create(args),
        Commands::Inspect(args) => inspect(&args.input, args.base),
    }
}

fn create(args: CreateArgs) -> Result<()> {
    let firmware = std::fs::read(&args.input)
        .with_context(|| format!("cannot read input file '{}'", args.input.display()))?;
    let metadata = match &args.metadata {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("cannot read metadata file '{}'", path.display()))?,
        None => Vec::new(),
    };

    let verified = build_verified(metadata, &firmware, args.offset)?;

    let hasher;
    let signer;
    let auth = if args.sign {
        let key = args
            .key
            .as_ref()
            .ok_or_else(|| anyhow!("--sign requires a --key file"))?;
        hasher = Sha2Hasher::new(&args.hash_type)?;
        signer = P384Signer::from_pem_file(key)?;
        Authenticator::Sign {
            hasher: &hasher,
            signer: &signer,
        }
    } else if args.check {
        hasher = Sha2Hasher::new(&args.hash_type)?;
        Authenticator::Check { hasher: &hasher }
    } else {
        Authenticator::None
    };

    let verification = build_verification(&verified, &auth)?;
    let image = assemble_image(verified, verification)?;

    output::write_atomic(&args.output, &image)?;
    log::info!(
        "wrote {} byte image to '{}'",
        image.len(),
        args.output.display()
    );

    print_structure(&image, args.base)
}

fn inspect(path: &Path, base: u32) -> Result<()> {
    let image = std::fs::read(path)
        .with_context(|| format!("cannot read image file '{}'", path.display()))?;
    print_structure(&image, base)
}

/// Print one line per section, indented by nesting depth.
fn print_structure(image: &[u8], base: u32) -> Result<()> {
    for section in walk_sections(image, base as u64) {
        let section = section?;
        println!(
            "{}section {} at {:#010x}, data {:#010x}, len {} bytes",
            "\t".repeat(section.depth),
            section.kind.name(),
            section.offset,
            section.payload_offset,
            section.len
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_image::{decode_section, ImageError, SectionInfo, SectionKind, SECTION_HDR_LEN};
    use p384::ecdsa::signature::Verifier;
    use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
    use p384::pkcs8::{EncodePrivateKey, LineEnding};
    use sha2::{Digest, Sha512};
    use tempfile::TempDir;

    const FW_BASE: u32 = 0x0800_8000;
    const FW_OFFSET: u32 = 0x400;

    fn create_args(dir: &TempDir, firmware: &[u8]) -> CreateArgs {
        let input = dir.path().join("firmware.bin");
        std::fs::write(&input, firmware).unwrap();
        CreateArgs {
            input,
            output: dir.path().join("firmware.img"),
            metadata: None,
            check: false,
            sign: false,
            key: None,
            hash_type: "sha512".to_string(),
            base: FW_BASE,
            offset: FW_OFFSET,
        }
    }

    fn verified_payload(image: &[u8]) -> &[u8] {
        decode_section(image, 0).unwrap().payload
    }

    fn verification_payload(image: &[u8]) -> &[u8] {
        let verified = decode_section(image, 0).unwrap();
        decode_section(image, verified.consumed).unwrap().payload
    }

    #[test]
    fn create_places_firmware_at_configured_offset() {
        let dir = TempDir::new().unwrap();
        let args = create_args(&dir, b"\x00\x01\x02\x03");
        let output = args.output.clone();
        create(args).unwrap();

        let image = std::fs::read(&output).unwrap();
        let sections: Vec<SectionInfo> = walk_sections(&image, FW_BASE as u64)
            .collect::<Result<_, _>>()
            .unwrap();
        let firmware = sections
            .iter()
            .find(|s| s.kind == SectionKind::Firmware)
            .unwrap();
        assert_eq!(firmware.payload_offset, (FW_BASE + FW_OFFSET) as u64);
        assert_eq!(
            &image[FW_OFFSET as usize..FW_OFFSET as usize + 4],
            b"\x00\x01\x02\x03"
        );
    }

    #[test]
    fn create_without_authentication_leaves_verification_empty() {
        let dir = TempDir::new().unwrap();
        let args = create_args(&dir, b"fw");
        let output = args.output.clone();
        create(args).unwrap();

        let image = std::fs::read(&output).unwrap();
        assert!(verification_payload(&image).is_empty());
    }

    #[test]
    fn create_check_mode_records_digest() {
        let dir = TempDir::new().unwrap();
        let mut args = create_args(&dir, b"fw");
        args.check = true;
        let output = args.output.clone();
        create(args).unwrap();

        let image = std::fs::read(&output).unwrap();
        let digest = decode_section(verification_payload(&image), 0).unwrap();
        assert_eq!(digest.kind, SectionKind::Digest);
        assert_eq!(
            digest.payload,
            Sha512::digest(verified_payload(&image)).as_slice()
        );
    }

    #[test]
    fn create_sign_mode_records_verifiable_signature() {
        let dir = TempDir::new().unwrap();
        let key = SigningKey::from_slice(&[0x01; 48]).unwrap();
        let key_path = dir.path().join("signing-key.pem");
        std::fs::write(
            &key_path,
            key.to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes(),
        )
        .unwrap();

        let mut args = create_args(&dir, b"fw");
        args.sign = true;
        args.key = Some(key_path);
        let output = args.output.clone();
        create(args).unwrap();

        let image = std::fs::read(&output).unwrap();
        let verification = verification_payload(&image);
        let digest = decode_section(verification, 0).unwrap();
        assert_eq!(digest.kind, SectionKind::Digest);
        assert_eq!(digest.len, 64);

        let signature = decode_section(verification, digest.consumed).unwrap();
        assert_eq!(signature.kind, SectionKind::Signature);
        let signature = Signature::from_der(signature.payload).unwrap();
        VerifyingKey::from(&key)
            .verify(verified_payload(&image), &signature)
            .unwrap();
    }

    #[test]
    fn create_embeds_metadata_before_padding() {
        let dir = TempDir::new().unwrap();
        let metadata_path = dir.path().join("metadata.bin");
        std::fs::write(&metadata_path, b"board rev 3").unwrap();

        let mut args = create_args(&dir, b"fw");
        args.metadata = Some(metadata_path);
        let output = args.output.clone();
        create(args).unwrap();

        let image = std::fs::read(&output).unwrap();
        let verified = verified_payload(&image);
        assert!(verified.starts_with(b"board rev 3"));

        let dummy = decode_section(verified, b"board rev 3".len()).unwrap();
        assert_eq!(dummy.kind, SectionKind::Dummy);
        assert_eq!(
            b"board rev 3".len() + SECTION_HDR_LEN + dummy.len,
            FW_OFFSET as usize - 2 * SECTION_HDR_LEN
        );
    }

    #[test]
    fn create_rejects_oversized_metadata() {
        let dir = TempDir::new().unwrap();
        let metadata_path = dir.path().join("metadata.bin");
        std::fs::write(&metadata_path, vec![0; FW_OFFSET as usize]).unwrap();

        let mut args = create_args(&dir, b"fw");
        args.metadata = Some(metadata_path);
        let output = args.output.clone();
        let err = create(args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImageError>(),
            Some(ImageError::MetadataOverflow { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn create_rejects_unknown_hash_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut args = create_args(&dir, b"fw");
        args.check = true;
        args.hash_type = "md5".to_string();
        let output = args.output.clone();

        let err = create(args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImageError>(),
            Some(ImageError::UnsupportedAlgorithm(_))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn inspect_rejects_truncated_image() {
        let dir = TempDir::new().unwrap();
        let args = create_args(&dir, b"fw");
        let output = args.output.clone();
        create(args).unwrap();

        let mut image = std::fs::read(&output).unwrap();
        image.pop();
        let truncated = dir.path().join("truncated.img");
        std::fs::write(&truncated, &image).unwrap();

        let err = inspect(&truncated, FW_BASE).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImageError>(),
            Some(ImageError::MalformedSection { .. })
        ));
    }

    #[test]
    fn inspect_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(inspect(&dir.path().join("absent.img"), FW_BASE).is_err());
    }
}
