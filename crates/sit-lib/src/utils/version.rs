use anyhow::{Context, Result};
use std::path::Path;

/// Key of the version resource string holding the product version
const PRODUCT_VERSION_KEY: &str = "ProductVersion";

/// Trailing dot-separated component of a version string.
///
/// `0.14.1.2.29197` -> `29197`. An empty string stays empty.
pub fn build_number(version: &str) -> &str {
    version.rsplit('.').next().unwrap_or_default()
}

/// Read the `ProductVersion` string from a PE file's version resource.
///
/// Returns `Ok(None)` when the file has no such entry.
pub fn read_product_version(path: &Path) -> Result<Option<String>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Read version metadata {:?}", path))?;
    Ok(product_version_from_bytes(&bytes))
}

/// Locate the UTF-16LE `ProductVersion` key of a `StringFileInfo` table and
/// decode the value that follows it.
pub fn product_version_from_bytes(bytes: &[u8]) -> Option<String> {
    let key: Vec<u8> = PRODUCT_VERSION_KEY
        .encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect();

    let key_start = bytes
        .windows(key.len())
        .position(|window| window == key.as_slice())?;
    let value_bytes = &bytes[key_start + key.len()..];

    let mut units = value_bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .peekable();

    // The value is aligned to a 32-bit boundary, so at most one padding unit
    // sits between the key terminator and the value.
    if units.peek() == Some(&0) {
        units.next();
    }

    let value: Vec<u16> = units.take_while(|unit| *unit != 0).collect();
    if value.is_empty() {
        return None;
    }
    String::from_utf16(&value).ok()
}
