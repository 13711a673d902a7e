//! # Path Resolution Module
//!
//! Centralizza la logica di calcolo dei path di output del batch e la regola di skip.

use crate::format::FormatRegistry;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Re-root `input_file` under `output_dir`, replacing its extension.
    ///
    /// ```text
    /// input_dir:  /photos         input_file: /photos/2023/trip/a.PNG
    /// output_dir: /converted      target:     jpg
    /// result:     /converted/2023/trip/a.jpg
    /// ```
    pub fn output_path(input_file: &Path, input_dir: &Path, output_dir: &Path, target_ext: &str) -> PathBuf {
        let relative = match input_file.strip_prefix(input_dir) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => {
                debug!("{} is not under {}, using file name only", input_file.display(), input_dir.display());
                input_file.file_name().map(PathBuf::from).unwrap_or_default()
            }
        };

        output_dir.join(relative).with_extension(target_ext)
    }

    /// Skip when the output already exists and the source already has the target extension.
    ///
    /// Outputs of a different source format are not skipped and get overwritten.
    pub fn should_skip(input_file: &Path, output_file: &Path, target_ext: &str) -> bool {
        output_file.exists() && FormatRegistry::extension_of(input_file).as_deref() == Some(target_ext)
    }

    /// Location of `output_dir` relative to `input_dir` when it is strictly nested inside it
    pub fn nested_output_dir(input_dir: &Path, output_dir: &Path) -> Option<PathBuf> {
        let input = input_dir.canonicalize().ok()?;
        let output = output_dir.canonicalize().ok()?;
        let relative = output.strip_prefix(&input).ok()?;
        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(relative.to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_preserves_structure() {
        let out = PathResolver::output_path(
            Path::new("/photos/2023/trip/a.PNG"),
            Path::new("/photos"),
            Path::new("/converted"),
            "jpg",
        );
        assert_eq!(out, PathBuf::from("/converted/2023/trip/a.jpg"));
    }

    #[test]
    fn test_output_path_replaces_last_extension_only() {
        let out = PathResolver::output_path(
            Path::new("/in/archive.v2.tif"),
            Path::new("/in"),
            Path::new("/out"),
            "png",
        );
        assert_eq!(out, PathBuf::from("/out/archive.v2.png"));
    }

    #[test]
    fn test_should_skip_requires_same_extension() {
        let tmp = TempDir::new().unwrap();
        let existing = tmp.path().join("a.png");
        std::fs::write(&existing, b"x").unwrap();

        assert!(PathResolver::should_skip(Path::new("/src/a.png"), &existing, "png"));
        assert!(PathResolver::should_skip(Path::new("/src/a.PNG"), &existing, "png"));
        assert!(!PathResolver::should_skip(Path::new("/src/a.jpg"), &existing, "png"));
        assert!(!PathResolver::should_skip(Path::new("/src/b.png"), &tmp.path().join("b.png"), "png"));
    }

    #[test]
    fn test_nested_output_dir() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("converted");
        std::fs::create_dir(&nested).unwrap();
        let sibling = TempDir::new().unwrap();

        assert_eq!(
            PathResolver::nested_output_dir(tmp.path(), &nested),
            Some(PathBuf::from("converted"))
        );
        assert_eq!(PathResolver::nested_output_dir(tmp.path(), tmp.path()), None);
        assert_eq!(PathResolver::nested_output_dir(tmp.path(), sibling.path()), None);
    }
}
