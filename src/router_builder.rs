use crate::detector::ControllerType;
use crate::extractor::{HttpMethod, RouteAnnotation};
use crate::imports::ImportRegistry;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Package qualifier of middleware handlers in the generated router.
pub const MIDDLEWARE_PACKAGE: &str = "middleware";

/// Router configuration builder.
///
/// Collects controllers in discovery order and route annotations as they are
/// extracted, then assembles the [`RouterConfig`] handed to the renderer.
pub struct RouterBuilder {
    /// Import path of the shared middleware package
    middleware_import_path: String,
    registrations: Vec<Registration>,
    http_methods: BTreeMap<String, HttpMethod>,
    middlewares: BTreeMap<String, Vec<String>>,
}

/// An aliased import of a controller package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStatement {
    pub alias: String,
    pub path: String,
}

/// Registration of one controller in the router's `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub alias: String,
    pub type_name: String,
}

impl Registration {
    /// `RegisterController(<alias>.New<TypeName>())`
    pub fn statement(&self) -> String {
        format!("RegisterController({}.New{}())", self.alias, self.type_name)
    }
}

/// Everything the router template needs, as plain data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouterConfig {
    /// Controller package imports, in alias order
    pub imports: Vec<ImportStatement>,
    /// Controller registrations, in discovery order
    pub registrations: Vec<Registration>,
    /// Route key to HTTP verb
    pub http_methods: BTreeMap<String, HttpMethod>,
    /// Route key to qualified middleware handlers (`middleware.Auth`)
    pub middlewares: BTreeMap<String, Vec<String>>,
    /// Present only when `middlewares` is non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middleware_import: Option<String>,
}

impl RouterBuilder {
    /// Creates an empty builder.
    ///
    /// # Arguments
    ///
    /// * `middleware_import_path` - Import path of the shared middleware
    ///   package, emitted only if some route declares middleware
    pub fn new(middleware_import_path: impl Into<String>) -> Self {
        debug!("Initializing RouterBuilder");
        Self {
            middleware_import_path: middleware_import_path.into(),
            registrations: Vec::new(),
            http_methods: BTreeMap::new(),
            middlewares: BTreeMap::new(),
        }
    }

    /// Queues the `init` registration of `controller`.
    pub fn add_controller(&mut self, controller: &ControllerType) {
        debug!(
            "Adding controller: {}.{}",
            controller.alias, controller.type_name
        );
        self.registrations.push(Registration {
            alias: controller.alias.clone(),
            type_name: controller.type_name.clone(),
        });
    }

    /// Records the verb and middleware of one route.
    ///
    /// A route key seen twice keeps its latest annotation and logs a warning.
    pub fn add_route(&mut self, route: &RouteAnnotation) {
        let key = route.key.to_string();
        debug!("Adding route: {} {}", route.method, key);

        if self.http_methods.insert(key.clone(), route.method.clone()).is_some() {
            warn!("Route {} is declared more than once; keeping the last", key);
        }

        match &route.middlewares {
            Some(names) if !names.is_empty() => {
                let handlers = names
                    .iter()
                    .map(|name| format!("{}.{}", MIDDLEWARE_PACKAGE, name))
                    .collect();
                self.middlewares.insert(key, handlers);
            }
            _ => {
                self.middlewares.remove(&key);
            }
        }
    }

    /// [`add_route`](Self::add_route) for each of `routes`.
    pub fn add_routes<'a>(&mut self, routes: impl IntoIterator<Item = &'a RouteAnnotation>) {
        for route in routes {
            self.add_route(route);
        }
    }

    /// Assembles the final configuration. Import statements come from
    /// `registry`, which holds exactly the packages that declared a
    /// controller.
    pub fn build(self, registry: &ImportRegistry) -> RouterConfig {
        debug!(
            "Building router config: {} imports, {} controllers, {} routes",
            registry.len(),
            self.registrations.len(),
            self.http_methods.len()
        );

        let imports = registry
            .entries()
            .map(|(path, alias)| ImportStatement {
                alias: alias.to_string(),
                path: path.to_string(),
            })
            .collect();

        let middleware_import =
            (!self.middlewares.is_empty()).then_some(self.middleware_import_path);

        RouterConfig {
            imports,
            registrations: self.registrations,
            http_methods: self.http_methods,
            middlewares: self.middlewares,
            middleware_import,
        }
    }
}

/// One `"key": "METHOD",` row of the HTTP method table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpMethodRow {
    pub key: String,
    pub method: String,
}

/// One `"key": {middleware.A, middleware.B},` row of the middleware table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiddlewareRow {
    pub key: String,
    /// Comma separated handlers, without braces
    pub handlers: String,
}

/// Render context of the router template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterTemplateData {
    /// Import path of the API root; the router derives URL paths from
    /// controller package paths below it
    pub api_import_prefix: String,
    pub middleware_import: Option<String>,
    pub imports: Vec<ImportStatement>,
    pub http_methods: Vec<HttpMethodRow>,
    pub middlewares: Vec<MiddlewareRow>,
    pub registrations: Vec<String>,
}

impl RouterConfig {
    /// `true` when no controller was registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Flattens the configuration into the rows the router template loops
    /// over.
    ///
    /// # Arguments
    ///
    /// * `api_import_prefix` - Import path of the cmd's API root, stripped
    ///   from controller packages when the router builds URL paths
    pub fn template_data(&self, api_import_prefix: impl Into<String>) -> RouterTemplateData {
        RouterTemplateData {
            api_import_prefix: api_import_prefix.into(),
            middleware_import: self.middleware_import.clone(),
            imports: self.imports.clone(),
            http_methods: self
                .http_methods
                .iter()
                .map(|(key, method)| HttpMethodRow {
                    key: key.clone(),
                    method: method.to_string(),
                })
                .collect(),
            middlewares: self
                .middlewares
                .iter()
                .map(|(key, handlers)| MiddlewareRow {
                    key: key.clone(),
                    handlers: handlers.join(", "),
                })
                .collect(),
            registrations: self.registrations.iter().map(Registration::statement).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::RouteKey;

    const MIDDLEWARE_IMPORT: &str = "shop/internal/common/transport/http/middleware";

    fn controller(alias: &str, path: &str, type_name: &str) -> ControllerType {
        ControllerType {
            type_name: type_name.to_string(),
            import_path: path.to_string(),
            alias: alias.to_string(),
        }
    }

    fn route(
        path: &str,
        type_name: &str,
        method_name: &str,
        method: HttpMethod,
        mdw: Option<&[&str]>,
    ) -> RouteAnnotation {
        RouteAnnotation {
            key: RouteKey {
                import_path: path.to_string(),
                type_name: type_name.to_string(),
                method_name: method_name.to_string(),
            },
            method,
            middlewares: mdw.map(|names| names.iter().map(|n| n.to_string()).collect()),
        }
    }

    #[test]
    fn test_build_without_middleware_omits_import() {
        let mut registry = ImportRegistry::new();
        registry.register("shop/api/controller");

        let mut builder = RouterBuilder::new(MIDDLEWARE_IMPORT);
        builder.add_controller(&controller("controller0", "shop/api/controller", "UserController"));
        builder.add_route(&route(
            "shop/api/controller",
            "UserController",
            "GetInfo",
            HttpMethod::Post,
            None,
        ));
        let config = builder.build(&registry);

        assert_eq!(config.imports.len(), 1);
        assert_eq!(
            config.registrations[0].statement(),
            "RegisterController(controller0.NewUserController())"
        );
        assert_eq!(
            config.http_methods.get("shop/api/controller.UserController.GetInfo"),
            Some(&HttpMethod::Post)
        );
        assert!(config.middlewares.is_empty());
        assert_eq!(config.middleware_import, None);
    }

    #[test]
    fn test_middlewares_are_qualified_and_import_emitted() {
        let registry = ImportRegistry::new();
        let mut builder = RouterBuilder::new(MIDDLEWARE_IMPORT);
        builder.add_routes(&[
            route("p", "UserController", "List", HttpMethod::Get, Some(&["Auth", "Logging"])),
            route("p", "UserController", "Info", HttpMethod::Get, Some(&[])),
        ]);
        let config = builder.build(&registry);

        assert_eq!(
            config.middlewares.get("p.UserController.List"),
            Some(&vec!["middleware.Auth".to_string(), "middleware.Logging".to_string()])
        );
        assert!(!config.middlewares.contains_key("p.UserController.Info"));
        assert_eq!(config.middleware_import.as_deref(), Some(MIDDLEWARE_IMPORT));
    }

    #[test]
    fn test_tables_are_sorted_by_key() {
        let registry = ImportRegistry::new();
        let mut builder = RouterBuilder::new(MIDDLEWARE_IMPORT);
        builder.add_route(&route("b", "T", "M", HttpMethod::Get, None));
        builder.add_route(&route("a", "T", "Z", HttpMethod::Put, None));
        builder.add_route(&route("a", "T", "A", HttpMethod::Delete, None));
        let config = builder.build(&registry);

        let keys: Vec<_> = config.http_methods.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a.T.A", "a.T.Z", "b.T.M"]);
    }

    #[test]
    fn test_template_data_rows() {
        let mut registry = ImportRegistry::new();
        registry.register("shop/api/controller");
        registry.register("shop/api/admin/controller");

        let mut builder = RouterBuilder::new(MIDDLEWARE_IMPORT);
        builder.add_controller(&controller("controller0", "shop/api/controller", "UserController"));
        builder.add_controller(&controller(
            "controller1",
            "shop/api/admin/controller",
            "AdminController",
        ));
        builder.add_route(&route(
            "shop/api/controller",
            "UserController",
            "List",
            HttpMethod::Get,
            Some(&["Auth", "Logging"]),
        ));
        let data = builder.build(&registry).template_data("shop/api");

        assert_eq!(data.api_import_prefix, "shop/api");
        assert_eq!(
            data.imports,
            vec![
                ImportStatement {
                    alias: "controller0".to_string(),
                    path: "shop/api/controller".to_string()
                },
                ImportStatement {
                    alias: "controller1".to_string(),
                    path: "shop/api/admin/controller".to_string()
                },
            ]
        );
        assert_eq!(
            data.registrations,
            vec![
                "RegisterController(controller0.NewUserController())",
                "RegisterController(controller1.NewAdminController())"
            ]
        );
        assert_eq!(data.http_methods[0].method, "GET");
        assert_eq!(data.middlewares[0].handlers, "middleware.Auth, middleware.Logging");
    }

    #[test]
    fn test_empty_config() {
        let config = RouterBuilder::new(MIDDLEWARE_IMPORT).build(&ImportRegistry::new());
        assert!(config.is_empty());
        assert!(config.imports.is_empty());
        assert_eq!(config.middleware_import, None);
    }
}
