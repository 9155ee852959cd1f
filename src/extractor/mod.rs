//! Route annotation extraction.
//!
//! For every discovered controller type, each method whose receiver is that
//! type (by value or by pointer) becomes a route. Its HTTP verb and
//! middleware chain come from the directives in the method's doc comment;
//! see [`annotation`] for the grammar.
//!
//! # Example
//!
//! ```no_run
//! use godo::detector::ControllerType;
//! use godo::extractor::AnnotationExtractor;
//! use godo::parser::{DeclarationParser, go::GoParser};
//! use std::path::Path;
//!
//! let parsed = GoParser.parse_file(Path::new("api/controller/user.go")).unwrap();
//! let controller = ControllerType {
//!     type_name: "UserController".to_string(),
//!     import_path: "shop/api/controller".to_string(),
//!     alias: "controller0".to_string(),
//! };
//! for route in AnnotationExtractor::extract(&parsed.source, &controller) {
//!     println!("{} {}", route.method, route.key);
//! }
//! ```

pub mod annotation;

use crate::detector::ControllerType;
use crate::parser::SourceFile;
use annotation::MethodAnnotations;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    /// Any other upper-cased token, passed through verbatim
    Extension(String),
}

impl HttpMethod {
    /// The verb as written in the generated router.
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Extension(verb) => verb,
        }
    }

    /// `false` for [`HttpMethod::Extension`] verbs.
    pub fn is_standard(&self) -> bool {
        !matches!(self, HttpMethod::Extension(_))
    }
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Post
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Case-insensitive. Unknown non-empty tokens become
    /// [`HttpMethod::Extension`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let verb = s.trim().to_uppercase();
        Ok(match verb.as_str() {
            "" => return Err("empty HTTP method".to_string()),
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "OPTIONS" => HttpMethod::Options,
            "HEAD" => HttpMethod::Head,
            _ => HttpMethod::Extension(verb),
        })
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Qualified route identifier `<import-path>.<TypeName>.<MethodName>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub import_path: String,
    pub type_name: String,
    pub method_name: String,
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.import_path, self.type_name, self.method_name)
    }
}

impl Serialize for RouteKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Routing metadata of one controller method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteAnnotation {
    pub key: RouteKey,
    pub method: HttpMethod,
    /// `None` when the method declares no middleware
    pub middlewares: Option<Vec<String>>,
}

/// Extracts [`RouteAnnotation`]s for a controller from its declaring file.
pub struct AnnotationExtractor;

impl AnnotationExtractor {
    /// One annotation per method of `controller` declared in `source`, in
    /// source order. Methods without directives default to `POST` with no
    /// middleware.
    pub fn extract(source: &SourceFile, controller: &ControllerType) -> Vec<RouteAnnotation> {
        let routes: Vec<RouteAnnotation> = source
            .methods_of(&controller.type_name)
            .map(|func| {
                let key = RouteKey {
                    import_path: controller.import_path.clone(),
                    type_name: controller.type_name.clone(),
                    method_name: func.name.clone(),
                };
                let directives = MethodAnnotations::parse(func.doc.as_ref());
                let method = directives
                    .http_method
                    .as_deref()
                    .and_then(|v| v.parse::<HttpMethod>().ok())
                    .unwrap_or_default();
                if !method.is_standard() {
                    warn!("{}: non-standard HTTP method {}", key, method);
                }

                RouteAnnotation {
                    key,
                    method,
                    middlewares: directives.middlewares,
                }
            })
            .collect();

        debug!(
            "Extracted {} routes for {}.{}",
            routes.len(),
            controller.import_path,
            controller.type_name
        );
        routes
    }
}
