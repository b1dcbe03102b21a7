// Licensed under the Apache-2.0 license

//! Digest and signature providers plugged into the verification branch.

use std::path::Path;

use anyhow::{Context, Result};
use fw_image::{ImageError, ImageHasher, ImageSigner};
use p384::ecdsa::signature::Signer;
use p384::ecdsa::{Signature, SigningKey};
use p384::pkcs8::DecodePrivateKey;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// SHA-2 digest provider, selected by algorithm name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sha2Hasher {
    Sha256,
    Sha384,
    Sha512,
}

impl Sha2Hasher {
    /// Look up an algorithm by its configured name.
    pub fn new(name: &str) -> Result<Self, ImageError> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Sha2Hasher::Sha256),
            "sha384" => Ok(Sha2Hasher::Sha384),
            "sha512" => Ok(Sha2Hasher::Sha512),
            _ => Err(ImageError::UnsupportedAlgorithm(name.to_string())),
        }
    }
}

impl ImageHasher for Sha2Hasher {
    fn digest(&self, data: &[u8]) -> Result<Vec<u8>, ImageError> {
        let digest = match self {
            Sha2Hasher::Sha256 => Sha256::digest(data).to_vec(),
            Sha2Hasher::Sha384 => Sha384::digest(data).to_vec(),
            Sha2Hasher::Sha512 => Sha512::digest(data).to_vec(),
        };
        log::debug!("verified branch digest: {}", hex::encode(&digest));
        Ok(digest)
    }
}

/// ECDSA P-384 signature provider backed by a PKCS#8 PEM key file.
pub struct P384Signer {
    key: SigningKey,
}

impl P384Signer {
    /// Load a signing key from a PKCS#8 PEM file.
    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read signing key '{}'", path.display()))?;
        let key = SigningKey::from_pkcs8_pem(&pem).map_err(|e| {
            ImageError::SigningError(format!("invalid P-384 key in '{}': {e}", path.display()))
        })?;
        Ok(P384Signer { key })
    }
}

impl ImageSigner for P384Signer {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, ImageError> {
        let signature: Signature = self.key.sign(data);
        let der = signature.to_der();
        log::debug!("verified branch signature: {}", hex::encode(der.as_bytes()));
        Ok(der.as_bytes().to_vec())
    }
}
