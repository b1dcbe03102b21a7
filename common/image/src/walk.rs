// Licensed under the Apache-2.0 license

//! Depth-limited traversal of a section tree.
//!
//! The walk is the read side of the format: the structure report after a
//! build and the `inspect` command are both clients, and a validator checking
//! the firmware-offset invariant against an existing image would be another.

use crate::error::ImageError;
use crate::section::{decode_section, SECTION_HDR_LEN, SectionKind};

/// How many levels below the top of the tree the walk descends. Container
/// sections nested deeper than this are reported but not walked into.
pub const MAX_WALK_DEPTH: usize = 1;

/// One section encountered during a walk.
///
/// Offsets are absolute: the start of the walked buffer is mapped to the
/// `base_address` given to [`walk_sections`], so a walk over a flashed image
/// reports the addresses the bootloader sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    pub kind: SectionKind,
    /// Absolute address of the section header.
    pub offset: u64,
    /// Absolute address of the first payload byte.
    pub payload_offset: u64,
    /// Payload length in bytes.
    pub len: usize,
    /// 0 for top-level sections, 1 for their children, and so on.
    pub depth: usize,
}

/// Walk the section tree of `image` in depth-first order.
///
/// The iterator is lazy and stops permanently after yielding an error; a
/// fresh call re-walks from the start. A truncated buffer or an unrecognized
/// tag anywhere in the tree yields [`ImageError::MalformedSection`], never a
/// silently shortened walk.
pub fn walk_sections(image: &[u8], base_address: u64) -> Walker<'_> {
    Walker {
        image,
        base_address,
        frames: vec![Frame {
            cursor: 0,
            end: image.len(),
            depth: 0,
        }],
        failed: false,
    }
}

/// Iterator over a section tree; see [`walk_sections`].
pub struct Walker<'a> {
    image: &'a [u8],
    base_address: u64,
    frames: Vec<Frame>,
    failed: bool,
}

/// A partially consumed run of sibling sections.
struct Frame {
    cursor: usize,
    end: usize,
    depth: usize,
}

impl Iterator for Walker<'_> {
    type Item = Result<SectionInfo, ImageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let image = self.image;
        loop {
            let frame = self.frames.last_mut()?;
            if frame.cursor >= frame.end {
                self.frames.pop();
                continue;
            }

            let offset = frame.cursor;
            let depth = frame.depth;
            let end = frame.end;
            let section = match decode_section(&image[..end], offset) {
                Ok(section) => section,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };
            frame.cursor += section.consumed;

            if section.kind.is_container() && depth < MAX_WALK_DEPTH && section.len > 0 {
                self.frames.push(Frame {
                    cursor: offset + SECTION_HDR_LEN,
                    end: offset + SECTION_HDR_LEN + section.len,
                    depth: depth + 1,
                });
            }

            return Some(Ok(SectionInfo {
                kind: section.kind,
                offset: self.base_address + offset as u64,
                payload_offset: self.base_address + (offset + SECTION_HDR_LEN) as u64,
                len: section.len,
                depth,
            }));
        }
    }
}
