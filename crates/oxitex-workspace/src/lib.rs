//! Workspace root state and path resolution.
//!
//! The workspace is the directory relative filenames resolve against. It is
//! set once at startup, may be swapped at runtime, and every resolution
//! reads whichever root is current at that moment. File classification,
//! listing, and cleanup live in [`files`]; starter documents in [`template`].

pub mod files;
pub mod template;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Process-wide workspace root.
///
/// Interior-mutable so one shared instance can serve concurrent requests;
/// reads take a snapshot of the root, so a concurrent
/// [`change_root`](Self::change_root) affects later resolutions, never one
/// already in flight.
#[derive(Debug)]
pub struct Workspace {
    root: RwLock<PathBuf>,
}

impl Workspace {
    /// Creates a workspace rooted at `root`, creating the directory if
    /// needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root: RwLock::new(root),
        })
    }

    /// The current root.
    pub fn root(&self) -> PathBuf {
        self.read_root()
    }

    /// Joins `filename` onto the workspace, honoring the optional `path`
    /// hint: an absolute hint wins outright, a relative hint nests under
    /// the root.
    pub fn resolve(&self, filename: &str, path: Option<&str>) -> PathBuf {
        match path {
            Some(hint) if Path::new(hint).is_absolute() => Path::new(hint).join(filename),
            Some(hint) => self.read_root().join(hint).join(filename),
            None => self.read_root().join(filename),
        }
    }

    /// Resolves a directory argument: absolute stands, relative nests under
    /// the root, absent means the root itself.
    pub fn resolve_dir(&self, path: Option<&str>) -> PathBuf {
        match path {
            Some(hint) if Path::new(hint).is_absolute() => PathBuf::from(hint),
            Some(hint) => self.read_root().join(hint),
            None => self.read_root(),
        }
    }

    /// Replaces the root, creating the new directory first.
    ///
    /// The stored root is the canonicalized form of `new_root`, resolved
    /// against the process's current directory when given relative. Returns
    /// `(old, new)` on success; on failure the old root stays in place.
    pub fn change_root(&self, new_root: &str) -> io::Result<(PathBuf, PathBuf)> {
        let candidate = Path::new(new_root);
        let absolute = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            std::env::current_dir()?.join(candidate)
        };
        std::fs::create_dir_all(&absolute)?;
        let resolved = absolute.canonicalize()?;

        let old = match self.root.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, resolved.clone()),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), resolved.clone()),
        };
        Ok((old, resolved))
    }

    fn read_root(&self) -> PathBuf {
        match self.root.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        (dir, ws)
    }

    #[test]
    fn new_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("projects").join("thesis");
        let ws = Workspace::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(ws.root(), root);
    }

    #[test]
    fn bare_filename_resolves_under_root() {
        let (dir, ws) = workspace();
        assert_eq!(ws.resolve("main.tex", None), dir.path().join("main.tex"));
    }

    #[test]
    fn relative_hint_nests_under_root() {
        let (dir, ws) = workspace();
        assert_eq!(
            ws.resolve("main.tex", Some("chapters")),
            dir.path().join("chapters").join("main.tex")
        );
    }

    #[test]
    fn absolute_hint_bypasses_root() {
        let (_dir, ws) = workspace();
        let elsewhere = tempfile::tempdir().unwrap();
        let hint = elsewhere.path().to_string_lossy().into_owned();
        assert_eq!(
            ws.resolve("main.tex", Some(&hint)),
            elsewhere.path().join("main.tex")
        );
    }

    #[test]
    fn resolve_dir_defaults_to_root() {
        let (dir, ws) = workspace();
        assert_eq!(ws.resolve_dir(None), dir.path());
        assert_eq!(ws.resolve_dir(Some("out")), dir.path().join("out"));
    }

    #[test]
    fn change_root_creates_and_switches() {
        let (dir, ws) = workspace();
        let target = dir.path().join("elsewhere");
        let hint = target.to_string_lossy().into_owned();

        let (old, new) = ws.change_root(&hint).unwrap();
        assert_eq!(old, dir.path());
        assert!(target.is_dir());
        // Canonicalized, so resolve symlinked temp prefixes before comparing.
        assert_eq!(new, target.canonicalize().unwrap());
        assert_eq!(ws.root(), new);
        assert_eq!(ws.resolve("a.tex", None), new.join("a.tex"));
    }
}
