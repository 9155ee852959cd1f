//! Grammar of the routing directives found in method doc comments.
//!
//! ```text
//! // @http_method GET
//! // @middleware Auth Logging
//! ```
//!
//! Any other comment line is ignored. When a directive appears more than
//! once, the last occurrence wins.

use crate::parser::DocComment;
use once_cell::sync::Lazy;
use regex::Regex;

/// Directive naming the HTTP verb of an action.
pub const HTTP_METHOD_ANNOTATION: &str = "@http_method";
/// Directive listing the middleware run before an action.
pub const MIDDLEWARE_ANNOTATION: &str = "@middleware";

/// A directive name as a whole word, then its optional argument.
static DIRECTIVE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(@http_method|@middleware)(?:\s+(.*?))?\s*$")
        .expect("directive pattern is valid")
});

/// Directives read from one doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodAnnotations {
    /// Upper-cased verb; `None` when absent or blank
    pub http_method: Option<String>,
    /// `None` when absent or blank, otherwise at least one name
    pub middlewares: Option<Vec<String>>,
}

impl MethodAnnotations {
    /// Reads the directives of a method's doc comment.
    ///
    /// # Arguments
    ///
    /// * `doc` - The comment attached to the method, if any
    ///
    /// # Returns
    ///
    /// The verb and middleware names found; both are `None` when the method
    /// has no comment or the comment has no directives.
    pub fn parse(doc: Option<&DocComment>) -> Self {
        let mut annotations = Self::default();
        let Some(doc) = doc else {
            return annotations;
        };

        for caps in doc.lines().filter_map(|line| DIRECTIVE_REGEX.captures(line)) {
            let argument = caps.get(2).map_or("", |m| m.as_str());
            match &caps[1] {
                HTTP_METHOD_ANNOTATION => {
                    let verb = argument.to_uppercase();
                    annotations.http_method = (!verb.is_empty()).then_some(verb);
                }
                MIDDLEWARE_ANNOTATION => {
                    let names: Vec<String> =
                        argument.split_whitespace().map(str::to_string).collect();
                    annotations.middlewares = (!names.is_empty()).then_some(names);
                }
                _ => {}
            }
        }

        annotations
    }
}
