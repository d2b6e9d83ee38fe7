use crate::error::BundleError;
use crate::reader::Reader;

pub const SIGNATURE: &[u8; 14] = b".NetCoreBundle";

/// `manifest_header_offset` (i64) + `signature_length` (u8) + 14-byte signature.
pub const FOOTER_LEN: usize = 8 + 1 + 14;

pub struct BundleFooter {
    pub manifest_header_offset: i64,
}

impl BundleFooter {
    /// Read the footer from the current cursor position. The caller is
    /// expected to have seeked to `bundle_length - FOOTER_LEN` first.
    pub fn read(reader: &mut Reader) -> Result<Self, BundleError> {
        let manifest_header_offset = reader.read_i64_le()?;
        let signature_length = reader.read_u8()?;
        let signature = reader.direct_read(14)?;

        if signature_length != 14 || signature != SIGNATURE.as_slice() {
            log::info!("This executable is not recognized as a bundle.");
            return Err(BundleError::NotABundle);
        }

        if manifest_header_offset <= 0 {
            return Err(BundleError::corruption(
                "manifest header offset is not positive",
            ));
        }

        Ok(BundleFooter {
            manifest_header_offset,
        })
    }
}
