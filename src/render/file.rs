use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::error::{CreateError, Result};

/// One source file moving through read -> render -> write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub source_absolute: PathBuf,
    /// Relative to the template directory, `/`-separated, no leading separator.
    pub source_relative: String,
    /// `source_relative` after rendering.
    pub destination_relative: String,
    pub destination_absolute: PathBuf,
    pub raw_content: Option<String>,
    pub processed_content: Option<String>,
}

/// Join the components of a relative path with `/`.
pub fn normalize_relative(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Check that a rendered path stays inside the destination directory.
pub fn validate_rendered_path(source_relative: &str, rendered: &str) -> Result<PathBuf> {
    let invalid = || CreateError::InvalidRenderedPath {
        source_path: source_relative.to_string(),
        rendered: rendered.to_string(),
    };

    if rendered.starts_with('/') || rendered.starts_with('\\') {
        return Err(invalid());
    }
    // A blank segment means a name rendered to nothing. Other whitespace is kept.
    if rendered.split('/').any(|segment| segment.trim().is_empty()) {
        return Err(invalid());
    }

    let path = PathBuf::from(rendered);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(invalid()),
        }
    }
    Ok(path)
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CreateError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })
}

/// Write `content` to `path` through a temporary sibling file, so the destination
/// either holds the full content or does not exist.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| CreateError::Io {
        context: format!("creating directory {}", parent.display()),
        source: e,
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| CreateError::Io {
        context: format!("creating temporary file in {}", parent.display()),
        source: e,
    })?;
    temp.write_all(content.as_bytes())
        .and_then(|_| temp.flush())
        .map_err(|e| CreateError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        })?;
    temp.persist(path).map_err(|e| CreateError::Io {
        context: format!("writing {}", path.display()),
        source: e.error,
    })?;
    Ok(())
}

pub fn is_dir_empty(path: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(path).map_err(|e| CreateError::Io {
        context: format!("listing {}", path.display()),
        source: e,
    })?;
    Ok(entries.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("package.json", true)]
    #[case("My App/foo.txt", true)]
    #[case("./src/index.js", true)]
    #[case("", false)]
    #[case("   ", false)]
    #[case("/etc/passwd", false)]
    #[case("../outside.txt", false)]
    #[case("src/../../outside.txt", false)]
    #[case("output//filename.txt", false)]
    #[case("output/ /filename.txt", false)]
    fn test_validate_rendered_path(#[case] rendered: &str, #[case] valid: bool) {
        assert_eq!(validate_rendered_path("src", rendered).is_ok(), valid);
    }

    #[rstest]
    #[case(" My App/foo.txt")]
    #[case("notes.txt ")]
    fn test_rendered_path_keeps_whitespace(#[case] rendered: &str) {
        assert_eq!(validate_rendered_path("src", rendered).unwrap(), PathBuf::from(rendered));
    }

    #[test]
    fn test_normalize_relative() {
        let path = Path::new("a").join("b").join("c.txt");
        assert_eq!(normalize_relative(&path), "a/b/c.txt");
    }

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/file.txt");
        write_atomic(&target, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");

        // No temporary files are left behind.
        let leftovers: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_is_dir_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_dir_empty(dir.path()).unwrap());
        std::fs::write(dir.path().join("foo"), "").unwrap();
        assert!(!is_dir_empty(dir.path()).unwrap());
    }
}
