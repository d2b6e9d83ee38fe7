//! Bundle recognition and manifest parsing: trailer lookup, header/version
//! check, and the sequence of embedded file entries.

mod file_entry;
mod footer;
mod header;

pub use file_entry::{FileEntry, FileType};
pub use footer::{BundleFooter, FOOTER_LEN, SIGNATURE};
pub use header::BundleHeader;

use crate::error::BundleError;
use crate::reader::Reader;
use std::collections::HashSet;

pub struct Manifest {
    pub major_version: u32,
    pub minor_version: u32,
    pub bundle_id: String,
    pub files: Vec<FileEntry>,
}

impl Manifest {
    /// Parse a complete bundle manifest out of `data`: footer at the tail,
    /// header at the offset the footer points to, then `num_embedded_files`
    /// file entries in order.
    pub fn parse(data: &[u8]) -> Result<Self, BundleError> {
        let mut reader = Reader::new(data);

        let footer_offset = (data.len() as i64)
            .checked_sub(FOOTER_LEN as i64)
            .ok_or_else(|| BundleError::corruption("bundle is smaller than the footer"))?;
        reader.set_offset(footer_offset)?;
        let footer = BundleFooter::read(&mut reader)?;

        reader.set_offset(footer.manifest_header_offset)?;
        let header = BundleHeader::read(&mut reader)?;

        let mut files = Vec::with_capacity(header.num_embedded_files as usize);
        let mut seen_paths = HashSet::new();
        for _ in 0..header.num_embedded_files {
            let entry = FileEntry::read(&mut reader)?;
            if !seen_paths.insert(entry.relative_path.clone()) {
                log::warn!(
                    "duplicate relative_path [{}] in bundle manifest; last entry wins",
                    entry.relative_path
                );
            }
            files.push(entry);
        }

        Ok(Manifest {
            major_version: header.major_version,
            minor_version: header.minor_version,
            bundle_id: header.bundle_id,
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::build_bundle;

    #[test]
    fn parses_two_entry_manifest() {
        let bundle = build_bundle(
            b"fake-executable-bytes",
            "abcd1234",
            &[("app.dll", b"ABC", 1), ("app.deps.json", b"{}", 3)],
        );
        let manifest = Manifest::parse(&bundle).unwrap();
        assert_eq!(manifest.bundle_id, "abcd1234");
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files[0].relative_path, "app.dll");
        assert_eq!(manifest.files[1].relative_path, "app.deps.json");
    }

    #[test]
    fn plain_executable_is_not_a_bundle() {
        let data = b"just a regular ELF-ish binary, no trailer here".to_vec();
        assert!(matches!(
            Manifest::parse(&data),
            Err(BundleError::NotABundle)
        ));
    }

    #[test]
    fn wrong_version_fails() {
        let mut bundle = build_bundle(b"prefix", "id", &[("a", b"x", 0)]);
        // major_version lives right after the prefix + payload bytes; flip it.
        let header_major_pos = b"prefix".len() + 1;
        bundle[header_major_pos] = 1;
        assert!(matches!(
            Manifest::parse(&bundle),
            Err(BundleError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_paths_are_permitted() {
        let bundle = build_bundle(
            b"prefix",
            "id",
            &[("dup.txt", b"first", 0), ("dup.txt", b"second", 0)],
        );
        let manifest = Manifest::parse(&bundle).unwrap();
        assert_eq!(manifest.files.len(), 2);
    }
}
