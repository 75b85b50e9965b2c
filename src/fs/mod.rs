//! Filesystem abstraction used by option validation and the engine
//!
//! Build mode works against the real filesystem. Transform mode wraps its
//! single input string in a [`MockFs`] so the engine can treat it like any
//! other file.

mod path;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

pub use path::{dirname_posix, normalize_posix, resolve_posix};

/// The operations the orchestrators and engine need from a filesystem
pub trait FileSystem: Send + Sync {
    /// Turn a possibly-relative path into an absolute one, or `None` if
    /// the path can't be resolved
    fn abs(&self, path: &str) -> Option<String>;

    /// Parent directory of an absolute path
    fn dir(&self, path: &str) -> String;

    /// Read a file's contents as text
    fn read_file(&self, path: &str) -> Option<String>;
}

/// The host filesystem, resolving relative paths against a fixed cwd
#[derive(Debug, Clone)]
pub struct RealFs {
    cwd: Option<PathBuf>,
}

impl RealFs {
    /// Create a filesystem rooted at the process working directory
    pub fn new() -> Self {
        Self {
            cwd: std::env::current_dir().ok(),
        }
    }

    /// Create a filesystem that resolves relative paths against `cwd`
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

impl Default for RealFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Lexically remove `.` and `..` components
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

impl FileSystem for RealFs {
    fn abs(&self, path: &str) -> Option<String> {
        if path.contains('\0') {
            return None;
        }

        let path = Path::new(path);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.as_ref()?.join(path)
        };

        clean(&joined).to_str().map(str::to_string)
    }

    fn dir(&self, path: &str) -> String {
        Path::new(path)
            .parent()
            .map(|parent| parent.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string())
    }

    fn read_file(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

/// An in-memory filesystem over a fixed set of virtual files.
///
/// Keys are normalized to absolute POSIX paths rooted at `/`.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: HashMap<String, String>,
}

impl MockFs {
    pub fn new<K, V>(files: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(path, contents)| (resolve_posix(path.as_ref(), "/"), contents.into()))
                .collect(),
        }
    }
}

impl FileSystem for MockFs {
    fn abs(&self, path: &str) -> Option<String> {
        Some(resolve_posix(path, "/"))
    }

    fn dir(&self, path: &str) -> String {
        dirname_posix(path).to_string()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.files.get(&resolve_posix(path, "/")).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_paths() {
        let fs = MockFs::new([("in.ts", "let x = 1")]);
        assert_eq!(fs.abs("in.ts").as_deref(), Some("/in.ts"));
        assert_eq!(fs.abs("./a/../in.ts").as_deref(), Some("/in.ts"));
        assert_eq!(fs.dir("/a/b.js"), "/a");
        assert_eq!(fs.read_file("/in.ts").as_deref(), Some("let x = 1"));
        assert_eq!(fs.read_file("in.ts").as_deref(), Some("let x = 1"));
        assert_eq!(fs.read_file("/missing.ts"), None);
    }

    #[test]
    fn test_real_fs_abs_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::with_cwd(dir.path());

        let abs = fs.abs("src/../out.js").unwrap();
        assert_eq!(Path::new(&abs), dir.path().join("out.js"));
        assert_eq!(Path::new(&fs.dir(&abs)), dir.path());
        assert_eq!(fs.abs("bad\0path"), None);
    }

    #[test]
    fn test_real_fs_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("entry.ts");
        std::fs::write(&file, "export {}").unwrap();

        let fs = RealFs::new();
        let path = file.to_str().unwrap();
        assert_eq!(fs.read_file(path).as_deref(), Some("export {}"));
        assert_eq!(fs.read_file(&format!("{}.missing", path)), None);
    }
}
