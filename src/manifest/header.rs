use crate::error::BundleError;
use crate::reader::Reader;

pub const CURRENT_MAJOR_VERSION: u32 = 0;
pub const CURRENT_MINOR_VERSION: u32 = 1;

pub struct BundleHeader {
    pub major_version: u32,
    pub minor_version: u32,
    pub num_embedded_files: i32,
    pub bundle_id: String,
}

impl BundleHeader {
    pub fn read(reader: &mut Reader) -> Result<Self, BundleError> {
        let major_version = reader.read_u32_le()?;
        let minor_version = reader.read_u32_le()?;
        let num_embedded_files = reader.read_i32_le()?;

        if major_version != CURRENT_MAJOR_VERSION
            || minor_version != CURRENT_MINOR_VERSION
            || num_embedded_files <= 0
        {
            log::error!("Manifest header version compatibility check failed.");
            return Err(BundleError::VersionMismatch {
                major: major_version,
                minor: minor_version,
            });
        }

        let bundle_id = reader.read_path_string()?;

        Ok(BundleHeader {
            major_version,
            minor_version,
            num_embedded_files,
            bundle_id,
        })
    }
}
