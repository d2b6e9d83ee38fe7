//! The 7-bit continuation-style length-prefixed string encoding used for the
//! bundle ID and every file entry's relative path.

/// Matches POSIX PATH_MAX; the bundle format bounds path lengths against it
/// regardless of the host platform's actual limit.
pub const PATH_MAX: usize = 4096;

/// Encode `s` the way a conforming packer would: a 1- or 2-byte continuation
/// length prefix followed by the raw UTF-8 bytes. Only used by tests to build
/// synthetic bundles; production code only decodes.
pub fn encode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    assert!(len >= 1 && len <= PATH_MAX, "length out of range: {len}");

    let mut out = Vec::with_capacity(2 + len);
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let first = (len & 0x7f) as u8 | 0x80;
        let second = (len >> 7) as u8;
        assert!(second & 0x80 == 0, "length too large to encode in two bytes");
        out.push(first);
        out.push(second);
    }
    out.extend_from_slice(bytes);
    out
}
