//! The `gen rt` pipeline: scan, parse, detect, extract, assemble, render.

use crate::config::ProjectConfig;
use crate::detector::{
    AnyMatcher, ControllerDetector, ControllerMatcher, ControllerType, MarkerMatcher, SuffixMatcher,
};
use crate::error::Result;
use crate::extractor::AnnotationExtractor;
use crate::imports::ImportRegistry;
use crate::parser::go::GoParser;
use crate::parser::{DeclarationParser, ParsedFile};
use crate::renderer::TemplateWriter;
use crate::router_builder::{RouterBuilder, RouterConfig};
use crate::scanner::ControllerScanner;
use crate::templates::ROUTER_TEMPLATE;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// File name of the generated router.
pub const ROUTER_FILE_NAME: &str = "router.go";

/// Outcome of analysing the controller tree of one cmd.
#[derive(Debug)]
pub struct RouterAnalysis {
    pub config: RouterConfig,
    pub controllers: Vec<ControllerType>,
    pub files_parsed: usize,
    /// Traversal problems that did not stop the scan
    pub warnings: Vec<String>,
}

/// Generates the router of one cmd.
pub struct RouterGenerator<'a> {
    project: &'a ProjectConfig,
    parser: GoParser,
    matcher: Box<dyn ControllerMatcher>,
}

impl<'a> RouterGenerator<'a> {
    /// Go parser with suffix-based discovery.
    pub fn new(project: &'a ProjectConfig) -> Self {
        Self {
            project,
            parser: GoParser,
            matcher: Box::new(SuffixMatcher::default()),
        }
    }

    /// Also treats types marked `@controller` as controllers.
    pub fn with_marker(mut self, enabled: bool) -> Self {
        if enabled {
            self.matcher = Box::new(AnyMatcher::new(vec![
                Box::new(SuffixMatcher::default()),
                Box::new(MarkerMatcher),
            ]));
        }
        self
    }

    /// Analyses `internal/<cmd>/transport/http/api`.
    pub fn analyze(&self, cmd: &str) -> Result<RouterAnalysis> {
        self.analyze_dir(&self.project.api_dir(cmd))
    }

    /// Analyses an arbitrary API root.
    ///
    /// # Arguments
    ///
    /// * `api_root` - Directory whose `controller` subdirectories are scanned
    ///
    /// # Returns
    ///
    /// The assembled router configuration plus the controllers found and
    /// any traversal warnings.
    ///
    /// # Errors
    ///
    /// Any controller file that cannot be read or parsed aborts the run:
    /// [`Error::Io`](crate::error::Error::Io) or
    /// [`Error::Parse`](crate::error::Error::Parse) for the first such file.
    pub fn analyze_dir(&self, api_root: &Path) -> Result<RouterAnalysis> {
        info!("Scanning controllers under {}", api_root.display());
        let scan = ControllerScanner::new(api_root.to_path_buf()).scan();
        info!(
            "Found {} controller files in {} controller directories",
            scan.controller_files.len(),
            scan.controller_dirs.len()
        );

        // Parse everything first so a broken file fails before any output.
        let parsed_files = scan
            .controller_files
            .iter()
            .map(|path| self.parser.parse_file(path))
            .collect::<Result<Vec<ParsedFile>>>()?;

        let detector = ControllerDetector::new(
            &self.project.module_name,
            &self.project.root,
            self.matcher.as_ref(),
        );
        let mut registry = ImportRegistry::new();
        let mut builder = RouterBuilder::new(self.project.middleware_import_path());
        let mut controllers = Vec::new();

        for parsed in &parsed_files {
            for controller in detector.detect(parsed, &mut registry) {
                builder.add_controller(&controller);
                builder.add_routes(&AnnotationExtractor::extract(&parsed.source, &controller));
                controllers.push(controller);
            }
        }

        let config = builder.build(&registry);
        if config.is_empty() {
            warn!("No controllers found under {}", api_root.display());
        }
        info!(
            "Discovered {} controllers in {} packages, {} routes",
            controllers.len(),
            config.imports.len(),
            config.http_methods.len()
        );

        Ok(RouterAnalysis {
            config,
            controllers,
            files_parsed: parsed_files.len(),
            warnings: scan.warnings,
        })
    }

    /// Renders `router.go` for `cmd` from an analysis and returns its path.
    pub fn write_router(&self, cmd: &str, analysis: &RouterAnalysis) -> Result<PathBuf> {
        let dest = self.project.router_dir(cmd).join(ROUTER_FILE_NAME);
        let data = analysis
            .config
            .template_data(self.project.api_import_path(cmd));

        TemplateWriter::new().render_to_file(ROUTER_TEMPLATE, &data, &dest)?;
        info!("Wrote {}", dest.display());
        Ok(dest)
    }

    /// Analyses and renders in one go.
    pub fn generate(&self, cmd: &str) -> Result<(RouterAnalysis, PathBuf)> {
        let analysis = self.analyze(cmd)?;
        let dest = self.write_router(cmd, &analysis)?;
        Ok((analysis, dest))
    }
}
