// Licensed under the Apache-2.0 license

//! The arguments for the operations the firmware packer supports.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use clap_num::maybe_hex;

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Package a raw firmware binary into a bootable container image.
    Create(CreateArgs),

    /// Walk an existing image and print its section structure.
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Input binary file.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output firmware image file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Optional metadata file placed in the verified branch ahead of the
    /// firmware payload.  Must fit within the vector-table offset.
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Add a firmware digest for integrity checking.
    #[arg(short, long, conflicts_with = "sign")]
    pub check: bool,

    /// Sign the firmware image.  A firmware digest is added too.
    #[arg(short, long, requires = "key")]
    pub sign: bool,

    /// PKCS#8 PEM file holding the P-384 signing key.
    #[arg(short, long)]
    pub key: Option<PathBuf>,

    /// Hash algorithm for signing/integrity checking.
    #[arg(long, default_value = "sha512")]
    pub hash_type: String,

    /// Firmware base address for loading.
    #[arg(short, long, value_parser = maybe_hex::<u32>, default_value_t = 0x0800_8000)]
    pub base: u32,

    /// Offset of the vector table inside the image.
    #[arg(long, value_parser = maybe_hex::<u32>, default_value_t = 0x400)]
    pub offset: u32,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Image file to inspect.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Firmware base address the image is flashed at.
    #[arg(short, long, value_parser = maybe_hex::<u32>, default_value_t = 0x0800_8000)]
    pub base: u32,
}
