use crate::error::BundleError;
use crate::reader::Reader;

/// Canonical in-bundle directory separator; rewritten to the host's native
/// separator when an entry's relative path is decoded.
const BUNDLE_DIR_SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Unknown,
    Assembly,
    NativeBinary,
    DepsJson,
    RuntimeConfigJson,
}

impl FileType {
    fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(FileType::Unknown),
            1 => Some(FileType::Assembly),
            2 => Some(FileType::NativeBinary),
            3 => Some(FileType::DepsJson),
            4 => Some(FileType::RuntimeConfigJson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub offset: i64,
    pub size: i64,
    pub file_type: FileType,
    pub relative_path: String,
}

impl FileEntry {
    pub fn read(reader: &mut Reader) -> Result<Self, BundleError> {
        let offset = reader.read_i64_le()?;
        let size = reader.read_i64_le()?;
        let raw_type = reader.read_i32_le()?;

        if offset <= 0 {
            return Err(BundleError::corruption("invalid FileEntry detected: offset <= 0"));
        }
        if size <= 0 {
            return Err(BundleError::corruption("invalid FileEntry detected: size <= 0"));
        }
        let file_type = FileType::from_raw(raw_type)
            .ok_or_else(|| BundleError::corruption("invalid FileEntry detected: unknown type"))?;

        let mut relative_path = reader.read_path_string()?;
        rewrite_separators(&mut relative_path);

        Ok(FileEntry {
            offset,
            size,
            file_type,
            relative_path,
        })
    }
}

/// Rewrite the bundle's canonical `/` separators to the host's native
/// separator. A no-op on hosts whose native separator is already `/`.
fn rewrite_separators(path: &mut String) {
    if std::path::MAIN_SEPARATOR == BUNDLE_DIR_SEPARATOR {
        return;
    }
    let rewritten: String = path
        .chars()
        .map(|c| {
            if c == BUNDLE_DIR_SEPARATOR {
                std::path::MAIN_SEPARATOR
            } else {
                c
            }
        })
        .collect();
    *path = rewritten;
}
