use crate::imports::{import_path_for, ImportRegistry};
use crate::parser::{ParsedFile, TypeDecl};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// Name suffix that marks a type as a controller by convention.
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// Doc comment directive that marks a type as a controller explicitly.
static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*@controller(?:\s|$)").expect("marker pattern is valid"));

/// Decides whether a type declaration is a controller.
pub trait ControllerMatcher {
    fn is_controller(&self, decl: &TypeDecl) -> bool;
}

/// Matches types whose name ends in a suffix (`Controller` by default).
///
/// Purely syntactic: unexported types and types without any methods match
/// too.
#[derive(Debug, Clone)]
pub struct SuffixMatcher {
    suffix: String,
}

impl SuffixMatcher {
    /// Matches type names ending in `suffix`.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for SuffixMatcher {
    fn default() -> Self {
        Self::new(CONTROLLER_SUFFIX)
    }
}

impl ControllerMatcher for SuffixMatcher {
    fn is_controller(&self, decl: &TypeDecl) -> bool {
        decl.name.ends_with(&self.suffix)
    }
}

/// Matches types whose doc comment has a line starting with `@controller`.
#[derive(Debug, Clone, Default)]
pub struct MarkerMatcher;

impl ControllerMatcher for MarkerMatcher {
    fn is_controller(&self, decl: &TypeDecl) -> bool {
        decl.doc
            .as_ref()
            .is_some_and(|doc| doc.lines().any(|line| MARKER_REGEX.is_match(line)))
    }
}

/// Matches when any of its matchers does.
pub struct AnyMatcher {
    matchers: Vec<Box<dyn ControllerMatcher>>,
}

impl AnyMatcher {
    /// Combines `matchers`; an empty list matches nothing.
    pub fn new(matchers: Vec<Box<dyn ControllerMatcher>>) -> Self {
        Self { matchers }
    }
}

impl ControllerMatcher for AnyMatcher {
    fn is_controller(&self, decl: &TypeDecl) -> bool {
        self.matchers.iter().any(|m| m.is_controller(decl))
    }
}

/// A discovered controller type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerType {
    pub type_name: String,
    /// Import path of the package declaring the type
    pub import_path: String,
    /// Alias the generated router imports that package under
    pub alias: String,
}

/// Selects controller types from parsed files and registers their packages.
pub struct ControllerDetector<'a> {
    module_name: &'a str,
    project_root: &'a Path,
    matcher: &'a dyn ControllerMatcher,
}

impl<'a> ControllerDetector<'a> {
    pub fn new(
        module_name: &'a str,
        project_root: &'a Path,
        matcher: &'a dyn ControllerMatcher,
    ) -> Self {
        Self {
            module_name,
            project_root,
            matcher,
        }
    }

    /// Returns the controller types declared in `parsed`, in source order.
    ///
    /// The file's import path is registered with `registry` when its first
    /// controller is found, so packages without controllers never get an
    /// alias (and never produce an unused import).
    pub fn detect(
        &self,
        parsed: &ParsedFile,
        registry: &mut ImportRegistry,
    ) -> Vec<ControllerType> {
        let mut import_path: Option<String> = None;
        let mut found = Vec::new();

        for decl in parsed.source.types.iter().filter(|d| self.matcher.is_controller(d)) {
            let path = import_path
                .get_or_insert_with(|| {
                    import_path_for(self.module_name, self.project_root, &parsed.path).path
                })
                .clone();
            let alias = registry.register(&path).to_string();

            debug!("Found controller {}.{} ({})", path, decl.name, alias);
            found.push(ControllerType {
                type_name: decl.name.clone(),
                import_path: path,
                alias,
            });
        }

        found
    }
}
