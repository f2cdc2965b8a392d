use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default reference table.
pub const LOCATION_FILE_ENV: &str = "IDCARD_LOCATION_FILE";

/// Reference table shipped with the crate.
pub const BUNDLED_LOCATION_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/location.json");

/// `$IDCARD_LOCATION_FILE` when set and non-empty, else the bundled table.
pub fn default_location_path() -> PathBuf {
    match env::var_os(LOCATION_FILE_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(BUNDLED_LOCATION_FILE),
    }
}

/// An explicit non-empty path wins over the default.
pub fn resolve_location_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => default_location_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let p = Path::new("/tmp/custom.json");
        assert_eq!(resolve_location_path(Some(p)), p);
    }

    #[test]
    fn test_empty_path_falls_back() {
        assert_eq!(resolve_location_path(Some(Path::new(""))), default_location_path());
        assert_eq!(resolve_location_path(None), default_location_path());
    }
}
