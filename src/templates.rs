//! Go source templates shipped inside the binary.

use serde::Serialize;

/// Template of `internal/<cmd>/transport/http/router/router.go`.
pub const ROUTER_TEMPLATE: &str = include_str!("../templates/router.go.tmpl");

/// Template of a new controller file.
pub const CONTROLLER_TEMPLATE: &str = include_str!("../templates/controller.go.tmpl");

/// Template of a new middleware file.
pub const MIDDLEWARE_TEMPLATE: &str = include_str!("../templates/middleware.go.tmpl");

/// Data of [`CONTROLLER_TEMPLATE`].
#[derive(Debug, Clone, Serialize)]
pub struct ControllerTemplateData {
    pub controller_struct_name: String,
}

/// Data of [`MIDDLEWARE_TEMPLATE`].
#[derive(Debug, Clone, Serialize)]
pub struct MiddlewareTemplateData {
    pub middleware_name: String,
}
