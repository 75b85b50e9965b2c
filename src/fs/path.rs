//! POSIX path helpers for the in-memory filesystem
//!
//! The mock filesystem keys files by virtual absolute paths that always use
//! `/`, independent of the host platform.

/// Normalize a POSIX path - resolves . and .. segments
#[inline]
pub fn normalize_posix(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let is_absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::with_capacity(path.matches('/').count() + 1);

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                if !parts.is_empty() && parts.last() != Some(&"..") {
                    parts.pop();
                } else if !is_absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let mut result = String::with_capacity(path.len());
    if is_absolute {
        result.push('/');
    }
    result.push_str(&parts.join("/"));

    if result.is_empty() {
        return ".".to_string();
    }

    result
}

/// Resolve a POSIX path against `cwd` into an absolute, normalized path
#[inline]
pub fn resolve_posix(path: &str, cwd: &str) -> String {
    if path.starts_with('/') {
        normalize_posix(path)
    } else {
        normalize_posix(&format!("{}/{}", cwd, path))
    }
}

/// Get directory name (POSIX)
#[inline]
pub fn dirname_posix(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }

    let path = path.trim_end_matches('/');

    if path.is_empty() {
        return "/";
    }

    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}
