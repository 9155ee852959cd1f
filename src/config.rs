//! Project configuration discovery.
//!
//! A godo project is identified by a `godoconfig.json` file or, failing
//! that, by a `go.mod` file whose `module` directive names the project. The
//! directory holding that file is the project root. Discovery happens once
//! per run and produces an immutable [`ProjectConfig`] that is passed to
//! every component that needs it.

use crate::error::{Error, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Project settings file, looked up before `go.mod`.
pub const CONFIG_FILE_NAME: &str = "godoconfig.json";
pub const GO_MOD_FILE_NAME: &str = "go.mod";

const DEFAULT_CMD: &str = "default-api";

/// The `module` directive of a `go.mod` file, optionally quoted.
static MODULE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*module\s+["`]?([^\s"`]+)["`]?"#).expect("module pattern is valid")
});

/// Resolved project settings, read-only for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Directory containing `godoconfig.json` or `go.mod`
    pub root: PathBuf,
    /// Go module path, prefix of every generated import path
    pub module_name: String,
    /// Cmd used when none is given on the command line
    pub default_cmd: String,
}

/// On-disk shape of `godoconfig.json`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    project_name: String,
    #[serde(default)]
    default_cmd: String,
}

impl ProjectConfig {
    /// Builds a config for a known root and module, with default settings.
    pub fn new(root: impl Into<PathBuf>, module_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            module_name: module_name.into(),
            default_cmd: DEFAULT_CMD.to_string(),
        }
    }

    /// Walks up from `start` until a directory with `godoconfig.json` or a
    /// parsable `go.mod` is found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] listing every path tried when neither file
    /// is found, or when the project name resolves to an empty string.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = fs::canonicalize(start).map_err(|e| Error::io(start, e))?;
        let mut tried = Vec::new();

        for dir in start.ancestors() {
            let config_path = dir.join(CONFIG_FILE_NAME);
            tried.push(config_path.display().to_string());
            if config_path.is_file() {
                match Self::load_config_file(dir, &config_path) {
                    Ok(config) => return config.validated(),
                    Err(e) => debug!("Ignoring {}: {}", config_path.display(), e),
                }
            }

            let mod_path = dir.join(GO_MOD_FILE_NAME);
            tried.push(mod_path.display().to_string());
            if mod_path.is_file() {
                match Self::load_go_mod(dir, &mod_path) {
                    Ok(config) => return config.validated(),
                    // Keep walking up when go.mod has no module directive.
                    Err(e) => debug!("Ignoring {}: {}", mod_path.display(), e),
                }
            }
        }

        Err(Error::Config(format!(
            "could not find {} nor parse {}; attempted: {}",
            CONFIG_FILE_NAME,
            GO_MOD_FILE_NAME,
            tried.join("; ")
        )))
    }

    fn load_config_file(root: &Path, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let file: ConfigFile = serde_json::from_str(&content)?;

        let mut config = Self::new(root, file.project_name);
        if !file.default_cmd.is_empty() {
            config.default_cmd = file.default_cmd;
        }
        debug!("Loaded project config from {}", path.display());
        Ok(config)
    }

    fn load_go_mod(root: &Path, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let module = parse_module_directive(&content).ok_or_else(|| {
            Error::Config(format!("module directive not found in {}", path.display()))
        })?;
        debug!("Loaded module '{}' from {}", module, path.display());
        Ok(Self::new(root, module))
    }

    fn validated(self) -> Result<Self> {
        if self.module_name.trim().is_empty() {
            return Err(Error::Config(format!(
                "project name is empty in {} or {} under {}",
                CONFIG_FILE_NAME,
                GO_MOD_FILE_NAME,
                self.root.display()
            )));
        }
        Ok(self)
    }

    /// Resolves a project-relative path; absolute paths are returned as is.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// `cmd` falls back to the configured default when empty.
    pub fn cmd_or_default<'a>(&'a self, cmd: Option<&'a str>) -> &'a str {
        match cmd {
            Some(c) if !c.trim().is_empty() => c,
            _ => &self.default_cmd,
        }
    }

    /// Whether `cmd/<cmd>` exists in the project.
    pub fn cmd_exists(&self, cmd: &str) -> bool {
        self.resolve(Path::new("cmd").join(cmd)).is_dir()
    }

    /// Root of the controller tree for one cmd.
    pub fn api_dir(&self, cmd: &str) -> PathBuf {
        self.resolve(format!("internal/{}/transport/http/api", cmd))
    }

    /// Directory the generated router is written to.
    pub fn router_dir(&self, cmd: &str) -> PathBuf {
        self.resolve(format!("internal/{}/transport/http/router", cmd))
    }

    /// Directory shared middleware files are generated into.
    pub fn middleware_dir(&self) -> PathBuf {
        self.resolve("internal/common/transport/http/middleware")
    }

    /// Import path of the shared middleware package.
    pub fn middleware_import_path(&self) -> String {
        format!(
            "{}/internal/common/transport/http/middleware",
            self.module_name.trim_end_matches('/')
        )
    }

    /// Import path of the controller tree for one cmd.
    pub fn api_import_path(&self, cmd: &str) -> String {
        format!(
            "{}/internal/{}/transport/http/api",
            self.module_name.trim_end_matches('/'),
            cmd
        )
    }
}

/// Extracts the module path from `go.mod` content.
///
/// # Arguments
///
/// * `content` - Text of a `go.mod` file
///
/// # Returns
///
/// The path named by the first `module` directive, without quotes, or
/// `None` if there is no such directive.
pub fn parse_module_directive(content: &str) -> Option<String> {
    MODULE_REGEX
        .captures(content)
        .map(|caps| caps[1].to_string())
}
