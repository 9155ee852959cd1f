use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Name a directory must have for its Go files to be treated as controllers.
pub const CONTROLLER_DIR_NAME: &str = "controller";

/// Controller directory scanner.
///
/// Walks the API tree of one cmd depth-first, in file-name order. A
/// directory named exactly `controller` has every `.go` file in its subtree
/// collected, and the walk does not look for further `controller`
/// directories below it. Hidden directories are skipped; the Go toolchain
/// ignores them as packages.
///
/// # Example
///
/// ```no_run
/// use godo::scanner::ControllerScanner;
/// use std::path::PathBuf;
///
/// let scanner = ControllerScanner::new(PathBuf::from("internal/default-api/transport/http/api"));
/// let result = scanner.scan();
/// println!("Found {} controller files", result.controller_files.len());
/// ```
pub struct ControllerScanner {
    root_path: PathBuf,
}

/// Result of a scan.
///
/// Scanning never fails as a whole: unreadable entries become warnings.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// `controller` directories, in walk order
    pub controller_dirs: Vec<PathBuf>,
    /// `.go` files below those directories, in walk order
    pub controller_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be read
    pub warnings: Vec<String>,
}

impl ControllerScanner {
    /// Creates a scanner rooted at `root_path`.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walks the tree and collects controller directories and files.
    ///
    /// # Returns
    ///
    /// A [`ScanResult`]. Entries that cannot be read are logged, recorded in
    /// [`ScanResult::warnings`] and skipped; the walk goes on with their
    /// siblings.
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();

        let mut walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        while let Some(entry) = walker.next() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() && entry.file_name() == CONTROLLER_DIR_NAME {
                        debug!("Found controller directory: {}", entry.path().display());
                        self.collect_go_files(entry.path(), &mut result);
                        result.controller_dirs.push(entry.into_path());
                        walker.skip_current_dir();
                    }
                }
                Err(e) => record_warning(&mut result, e),
            }
        }

        result
    }

    fn collect_go_files(&self, dir: &Path, result: &mut ScanResult) {
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_go_file(entry.path()) {
                        result.controller_files.push(entry.into_path());
                    }
                }
                Err(e) => record_warning(result, e),
            }
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_go_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("go")
}

fn record_warning(result: &mut ScanResult, e: walkdir::Error) {
    let warning = format!("Failed to access path: {}", e);
    warn!("{}", warning);
    result.warnings.push(warning);
}
