//! HPDEC tag and file-extension helpers.

use std::path::Path;

/// Tag that opens every HPDEC stream.
pub const MAGIC: &str = "HPDEC";

/// Conventional file extension (without the dot).
pub const EXTENSION: &str = "hpdec";

/// Whether `ext` names the HPDEC extension (case-insensitive, no dot).
pub fn is_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case(EXTENSION)
}

/// Whether `path` ends in `.hpdec` (case-insensitive).
pub fn has_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_case_insensitive() {
        assert!(is_extension("hpdec"));
        assert!(is_extension("HPDEC"));
        assert!(!is_extension(".hpdec"));
        assert!(!is_extension("ppm"));
    }

    #[test]
    fn path_extension() {
        assert!(has_extension(Path::new("HPDEC/bars_modified.hpdec")));
        assert!(has_extension(Path::new("out.HpDec")));
        assert!(!has_extension(Path::new("out.png")));
        assert!(!has_extension(Path::new("hpdec")));
    }
}
