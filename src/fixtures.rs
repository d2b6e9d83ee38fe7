//! Synthesizes minimal, valid bundle byte streams for this crate's own test
//! suite (unit tests and the `tests/` integration suite alike). Not a
//! general-purpose packer.

use crate::manifest::{FOOTER_LEN, SIGNATURE};
use crate::path_string;

pub fn build_bundle(prefix: &[u8], bundle_id: &str, files: &[(&str, &[u8], i32)]) -> Vec<u8> {
    let mut buf = prefix.to_vec();

    let mut entries = Vec::new();
    for (path, payload, ty) in files {
        let offset = buf.len() as i64;
        buf.extend_from_slice(payload);
        entries.push((*path, offset, payload.len() as i64, *ty));
    }

    let header_offset = buf.len() as i64;
    buf.extend_from_slice(&0u32.to_le_bytes()); // major
    buf.extend_from_slice(&1u32.to_le_bytes()); // minor
    buf.extend_from_slice(&(entries.len() as i32).to_le_bytes());
    buf.extend_from_slice(&path_string::encode(bundle_id));

    for (path, offset, size, ty) in &entries {
        buf.extend_from_slice(&offset.to_le_bytes());
        buf.extend_from_slice(&size.to_le_bytes());
        buf.extend_from_slice(&ty.to_le_bytes());
        buf.extend_from_slice(&path_string::encode(path));
    }

    buf.extend_from_slice(&header_offset.to_le_bytes());
    buf.push(14u8);
    buf.extend_from_slice(SIGNATURE);
    buf
}

/// Same as [`build_bundle`] but with `major_version` forced to an
/// unsupported value, for exercising the version-mismatch path.
pub fn build_bundle_with_major_version(
    prefix: &[u8],
    bundle_id: &str,
    files: &[(&str, &[u8], i32)],
    major_version: u32,
) -> Vec<u8> {
    let mut bundle = build_bundle(prefix, bundle_id, files);
    let header_offset_bytes_pos = bundle.len() - FOOTER_LEN;
    let header_offset = i64::from_le_bytes(
        bundle[header_offset_bytes_pos..header_offset_bytes_pos + 8]
            .try_into()
            .unwrap(),
    );
    let major_pos = header_offset as usize;
    bundle[major_pos..major_pos + 4].copy_from_slice(&major_version.to_le_bytes());
    bundle
}
