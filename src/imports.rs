//! Import path derivation and alias allocation for controller packages.
//!
//! Several API sub-trees usually contain a package literally named
//! `controller`, so the generated router cannot import them by their base
//! name. Each unique import path gets a `controllerN` alias instead.

use log::warn;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const ALIAS_PREFIX: &str = "controller";

/// Import path computed for a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub path: String,
    /// The directory was outside the project root and `path` is a best
    /// effort guess.
    pub degraded: bool,
}

/// Computes the Go import path of the package containing `file`.
///
/// The directory of the file is made relative to `project_root` and prefixed
/// with `module_name`; the project root itself maps to the bare module name.
/// A directory outside the root does not fail the run: its absolute path is
/// used as the suffix and a warning is logged.
pub fn import_path_for(module_name: &str, project_root: &Path, file: &Path) -> ResolvedImport {
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    let dir = absolute(dir);
    let root = absolute(project_root);

    let (relative, degraded) = match dir.strip_prefix(&root) {
        Ok(rel) => (to_slash(rel), false),
        Err(_) => {
            warn!(
                "{} is outside project root {}; using best-effort import path",
                dir.display(),
                root.display()
            );
            (to_slash(&dir), true)
        }
    };

    let relative = relative.trim_matches('/');
    let path = if relative.is_empty() {
        module_name.to_string()
    } else {
        format!("{}/{}", module_name.trim_end_matches('/'), relative)
    };

    ResolvedImport { path, degraded }
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Bijective mapping between import paths and aliases for one run.
///
/// Entries are append-only and kept in registration order.
#[derive(Debug, Default)]
pub struct ImportRegistry {
    entries: Vec<(String, String)>,
    by_path: HashMap<String, usize>,
    aliases: HashSet<String>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the alias of `import_path`, allocating `controllerN` on first
    /// sight. N starts at the number of aliases already assigned and advances
    /// past any alias that is taken.
    pub fn register(&mut self, import_path: &str) -> &str {
        if let Some(&idx) = self.by_path.get(import_path) {
            return &self.entries[idx].1;
        }

        let mut n = self.entries.len();
        let mut alias = format!("{}{}", ALIAS_PREFIX, n);
        while self.aliases.contains(&alias) {
            n += 1;
            alias = format!("{}{}", ALIAS_PREFIX, n);
        }

        self.aliases.insert(alias.clone());
        self.by_path
            .insert(import_path.to_string(), self.entries.len());
        self.entries.push((import_path.to_string(), alias));
        &self.entries[self.entries.len() - 1].1
    }

    /// `(import_path, alias)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }

    /// Number of registered import paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
