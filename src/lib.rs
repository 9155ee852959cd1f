//! godo - router generation for Go web projects.
//!
//! godo statically analyses the controller packages of a Go (gin) project
//! and writes the `router.go` that registers them. Routing metadata lives in
//! method doc comments:
//!
//! ```go
//! // @http_method GET
//! // @middleware Auth Logging
//! func (ctrl *UserController) List(c *gin.Context) {}
//! ```
//!
//! # Architecture
//!
//! 1. [`scanner`] - Finds `controller` directories and their `.go` files
//! 2. [`parser`] - Parses Go declarations and their doc comments with tree-sitter
//! 3. [`detector`] - Selects controller types and registers their packages
//! 4. [`imports`] - Derives import paths and `controllerN` aliases
//! 5. [`extractor`] - Reads `@http_method` / `@middleware` directives
//! 6. [`router_builder`] - Assembles the [`router_builder::RouterConfig`]
//! 7. [`renderer`] - Renders templates and writes files atomically
//! 8. [`generator`] - Runs steps 1 to 7 for one cmd
//!
//! [`scaffold`] creates controllers, actions and middleware, and [`config`]
//! locates the project and its module name.
//!
//! # Example Usage
//!
//! ```no_run
//! use godo::config::ProjectConfig;
//! use godo::generator::RouterGenerator;
//! use godo::serializer::serialize_yaml;
//! use std::path::Path;
//!
//! let project = ProjectConfig::discover(Path::new(".")).unwrap();
//! let generator = RouterGenerator::new(&project);
//! let analysis = generator.analyze("default-api").unwrap();
//! println!("{}", serialize_yaml(&analysis.config).unwrap());
//! generator.write_router("default-api", &analysis).unwrap();
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod imports;
pub mod parser;
pub mod renderer;
pub mod router_builder;
pub mod scaffold;
pub mod scanner;
pub mod serializer;
pub mod templates;
