//! Spot Mapping
//!
//! Translates literal archive paths to their canonical archive path and to the
//! logical "spot" (named dataset collection) that contains them.

use crate::error::ApiError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only lookup between archive paths and spots
pub trait SpotResolver: Send + Sync {
    /// Canonical archive path for a literal path. Never empty.
    fn archive_path(&self, path: &Path) -> String;

    /// Spot identifier owning the path, if any
    fn spot(&self, path: &Path) -> Option<String>;

    /// Root directory of every known spot
    fn spot_roots(&self) -> Vec<PathBuf>;
}

/// Spot mapping backed by the operator's spot file.
///
/// Each non-empty line of the file is `<spot_name> <archive_path>`. Lines
/// starting with `#` are comments.
#[derive(Debug, Clone, Default)]
pub struct SpotMapping {
    path_to_spot: BTreeMap<PathBuf, String>,
    archive_roots: Vec<PathBuf>,
}

impl SpotMapping {
    /// Create an empty mapping. Symlink targets outside `archive_roots` keep
    /// their literal path; an empty list accepts every target.
    pub fn new(archive_roots: Vec<PathBuf>) -> Self {
        Self {
            path_to_spot: BTreeMap::new(),
            archive_roots,
        }
    }

    /// Load the spot file
    pub fn load(spot_file: &Path, archive_roots: Vec<PathBuf>) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(spot_file).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to read spot file {}: {}",
                spot_file.display(),
                e
            ))
        })?;
        let mut mapping = Self::new(archive_roots);
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(spot), Some(path)) => mapping.insert(spot, path),
                _ => warn!(
                    "Ignoring malformed spot file line {} in {}: {:?}",
                    line_no + 1,
                    spot_file.display(),
                    line
                ),
            }
        }
        debug!(spots = mapping.len(), "Loaded spot mapping");
        Ok(mapping)
    }

    /// Register a spot root
    pub fn insert(&mut self, spot: &str, path: impl Into<PathBuf>) {
        self.path_to_spot.insert(path.into(), spot.to_string());
    }

    pub fn len(&self) -> usize {
        self.path_to_spot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_to_spot.is_empty()
    }

    fn inside_archive(&self, path: &Path) -> bool {
        self.archive_roots.is_empty() || self.archive_roots.iter().any(|r| path.starts_with(r))
    }

    fn longest_spot(&self, path: &Path) -> Option<String> {
        path.ancestors()
            .find_map(|ancestor| self.path_to_spot.get(ancestor))
            .cloned()
    }
}

impl SpotResolver for SpotMapping {
    fn archive_path(&self, path: &Path) -> String {
        let literal = path_text(path);
        match dunce::canonicalize(path) {
            Ok(resolved) if self.inside_archive(&resolved) => path_text(&resolved),
            Ok(resolved) => {
                debug!(
                    path = %literal,
                    target = %resolved.display(),
                    "Target resolves outside the archive, keeping literal path"
                );
                literal
            }
            Err(_) => literal,
        }
    }

    fn spot(&self, path: &Path) -> Option<String> {
        self.longest_spot(path).or_else(|| {
            let canonical = self.archive_path(path);
            self.longest_spot(Path::new(&canonical))
        })
    }

    fn spot_roots(&self) -> Vec<PathBuf> {
        self.path_to_spot.keys().cloned().collect()
    }
}

/// Path as text. Non-UTF-8 bytes become U+FFFD and are logged.
pub fn path_text(path: &Path) -> String {
    match path.to_str() {
        Some(text) => text.to_string(),
        None => {
            let lossy = path.to_string_lossy().into_owned();
            warn!(path = %lossy, "Path is not valid UTF-8, replacing invalid bytes");
            lossy
        }
    }
}

/// File-name-safe stand-in for a spot name when a path has no spot
pub fn path_slug(path: &Path) -> String {
    let slug: String = path
        .to_string_lossy()
        .trim_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if slug.is_empty() {
        "root".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_spot_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("spot_mapping.txt");
        fs::write(
            &file,
            "# comment\nspot-1-cru /badc/cru\n\nspot-2-ukmo /badc/ukmo/data\nbroken\n",
        )
        .unwrap();

        let mapping = SpotMapping::load(&file, Vec::new()).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping.spot(Path::new("/badc/ukmo/data/x/y")),
            Some("spot-2-ukmo".to_string())
        );
        assert_eq!(
            mapping.spot(Path::new("/badc/cru")),
            Some("spot-1-cru".to_string())
        );
        assert_eq!(mapping.spot(Path::new("/neodc/other")), None);
    }

    #[test]
    fn test_missing_spot_file_is_config_error() {
        let err = SpotMapping::load(Path::new("/definitely/not/here.txt"), Vec::new()).unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(_)));
    }

    #[test]
    fn test_archive_path_of_plain_directory_is_itself() {
        let temp = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp.path()).unwrap();
        let dir = root.join("plain");
        fs::create_dir(&dir).unwrap();

        let mapping = SpotMapping::new(vec![root.clone()]);
        assert_eq!(mapping.archive_path(&dir), dir.to_string_lossy());
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_path_only_resolves_inside_archive() {
        let temp = TempDir::new().unwrap();
        let base = dunce::canonicalize(temp.path()).unwrap();
        let archive = base.join("archive");
        let outside = base.join("outside");
        fs::create_dir_all(archive.join("shared")).unwrap();
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(archive.join("shared"), archive.join("inner")).unwrap();
        std::os::unix::fs::symlink(&outside, archive.join("escape")).unwrap();

        let mapping = SpotMapping::new(vec![archive.clone()]);
        assert_eq!(
            mapping.archive_path(&archive.join("inner")),
            archive.join("shared").to_string_lossy()
        );
        assert_eq!(
            mapping.archive_path(&archive.join("escape")),
            archive.join("escape").to_string_lossy()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_replaced() {
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(std::ffi::OsStr::from_bytes(b"/badc/\xffdata"));
        assert_eq!(path_text(path), "/badc/\u{FFFD}data");
        assert_eq!(path_text(Path::new("/badc/cru")), "/badc/cru");

        let mapping = SpotMapping::default();
        assert_eq!(mapping.archive_path(path), "/badc/\u{FFFD}data");
    }

    #[test]
    fn test_path_slug() {
        assert_eq!(path_slug(Path::new("/badc/cru/data")), "badc_cru_data");
        assert_eq!(path_slug(Path::new("/")), "root");
    }
}
