//! Target inspection — where a request points on disk or on the network.
//!
//! Helpers shared by the classifier: tilde expansion, lexical path
//! normalisation, system-directory matching, and URL host extraction.

use std::path::{Component, Path, PathBuf};

/// Expand `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if (path.starts_with("~/") || path == "~")
        && let Ok(home) = home_dir()
    {
        return path.replacen('~', &home, 1);
    }
    path.to_string()
}

fn home_dir() -> Result<String, ()> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").map_err(|_| ())
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").map_err(|_| ())
    }
}

/// Resolve `.` and `..` without touching the filesystem.
///
/// `..` never climbs above the root, so `/tmp/../../etc` becomes `/etc`.
pub fn normalize_lexically(path: &str) -> PathBuf {
    let expanded = expand_tilde(path).replace('\\', "/");
    let mut out = PathBuf::new();
    for component in Path::new(&expanded).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Return the first system prefix the path falls under, if any.
///
/// Comparison is case-insensitive and runs on the normalised path, so
/// traversal tricks and a missing trailing slash (`/etc`) still match. When
/// the path (or its parent) exists, the symlink-resolved location is checked
/// as well.
pub fn matching_system_prefix<'a>(path: &str, prefixes: &'a [String]) -> Option<&'a str> {
    let lexical = normalize_lexically(path);
    first_prefix(&lexical, prefixes).or_else(|| {
        resolve_on_disk(path).and_then(|resolved| first_prefix(&resolved, prefixes))
    })
}

fn first_prefix<'a>(path: &Path, prefixes: &'a [String]) -> Option<&'a str> {
    let normalized = path.to_string_lossy().replace('\\', "/").to_lowercase();
    // Strip the Windows extended-length prefix that canonicalize() adds
    let normalized = normalized.strip_prefix("//?/").unwrap_or(&normalized);
    let with_slash = format!("{}/", normalized.trim_end_matches('/'));

    prefixes
        .iter()
        .find(|prefix| {
            let prefix = expand_tilde(prefix).replace('\\', "/").to_lowercase();
            let prefix = format!("{}/", prefix.trim_end_matches('/'));
            with_slash.starts_with(&prefix)
        })
        .map(String::as_str)
}

/// Where the path actually lands once symlinks are followed.
///
/// An existing path is canonicalized. A dangling symlink resolves to its
/// target. A new file resolves through its canonicalized parent. Returns
/// `None` when nothing along the way exists.
pub fn resolve_on_disk(path: &str) -> Option<PathBuf> {
    let input = PathBuf::from(expand_tilde(path));

    if let Ok(canonical) = input.canonicalize() {
        return Some(canonical);
    }

    if let Ok(target) = std::fs::read_link(&input) {
        let joined = match input.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target,
        };
        return Some(normalize_lexically(&joined.to_string_lossy()));
    }

    let parent = input.parent().filter(|p| !p.as_os_str().is_empty())?;
    let file_name = input.file_name()?;
    parent
        .canonicalize()
        .ok()
        .map(|canonical_parent| canonical_parent.join(file_name))
}

/// Extract the host from a URL, without scheme, credentials, port, or path.
pub fn extract_host(url: &str) -> Option<String> {
    let lower = url.trim().to_lowercase();

    let rest = match lower.split_once("://") {
        Some((_, rest)) => rest,
        None => lower.as_str(),
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let host = if let Some(bracketed) = authority.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or(bracketed)
    } else {
        authority.split(':').next().unwrap_or(authority)
    };

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
