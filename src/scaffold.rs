//! Controller, action and middleware scaffolding (`gen ctrl`, `gen act`,
//! `gen mdw`).
//!
//! A controller route such as `admin/user` maps to
//! `internal/<cmd>/transport/http/api/admin/controller/user.go` declaring
//! `UserController`. Actions are appended as annotated stub methods that
//! `gen rt` picks up.

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::extractor::annotation::{HTTP_METHOD_ANNOTATION, MIDDLEWARE_ANNOTATION};
use crate::extractor::HttpMethod;
use crate::parser::go::GoParser;
use crate::parser::DeclarationParser;
use crate::renderer::{write_atomic, TemplateWriter};
use crate::scanner::CONTROLLER_DIR_NAME;
use crate::templates::{
    ControllerTemplateData, MiddlewareTemplateData, CONTROLLER_TEMPLATE, MIDDLEWARE_TEMPLATE,
};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Where a controller lives and what its type is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerLocation {
    pub path: PathBuf,
    pub struct_name: String,
}

/// An action requested on the command line as `name[:verb]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub method: HttpMethod,
}

/// Uppercases the first character of `s`.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolves a controller route of `cmd` to its file and type name.
pub fn locate_controller(
    project: &ProjectConfig,
    cmd: &str,
    route: &str,
) -> Result<ControllerLocation> {
    if route.is_empty() {
        return Err(Error::InvalidArgument("controller route is empty".to_string()));
    }
    if route.starts_with('/') || route.ends_with('/') {
        return Err(Error::InvalidArgument(
            "controller route must not start or end with '/'".to_string(),
        ));
    }
    if route.split('/').any(str::is_empty) {
        return Err(Error::InvalidArgument(format!(
            "controller route '{}' has an empty segment",
            route
        )));
    }

    let (directory, component) = match route.rsplit_once('/') {
        Some((dir, component)) => (Some(dir), component),
        None => (None, route),
    };

    let mut path = project.api_dir(cmd);
    if let Some(dir) = directory {
        path.push(dir);
    }
    path.push(CONTROLLER_DIR_NAME);
    path.push(format!("{}.go", component));

    let struct_name = format!("{}Controller", capitalize_first(component));
    validate_controller_name(&struct_name)?;

    Ok(ControllerLocation { path, struct_name })
}

/// Rejects controller type names that are not usable as Go identifiers.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `name` contains a space, `_` or
/// `-`.
pub fn validate_controller_name(name: &str) -> Result<()> {
    for (needle, label) in [(' ', "spaces"), ('_', "_"), ('-', "-")] {
        if name.contains(needle) {
            return Err(Error::InvalidArgument(format!(
                "controller name can not contain {}",
                label
            )));
        }
    }
    Ok(())
}

/// Parses `name[:verb]` arguments. Names are capitalized; the verb is
/// case-insensitive and defaults to `POST`.
pub fn parse_actions<S: AsRef<str>>(args: &[S]) -> Result<Vec<Action>> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            let (name, verb) = match arg.split_once(':') {
                Some((name, verb)) => (name, Some(verb)),
                None => (arg, None),
            };

            if !is_go_identifier(name) {
                return Err(Error::InvalidArgument(format!("invalid action name: '{}'", name)));
            }

            let method = match verb {
                None => HttpMethod::default(),
                Some(verb) => verb
                    .parse::<HttpMethod>()
                    .ok()
                    .filter(HttpMethod::is_standard)
                    .ok_or_else(|| Error::InvalidArgument(format!("invalid method: {}", verb)))?,
            };

            Ok(Action {
                name: capitalize_first(name),
                method,
            })
        })
        .collect()
}

fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Reports whether `path` declares `method_name` on `struct_name`, with a
/// value or pointer receiver.
pub fn controller_has_method(path: &Path, struct_name: &str, method_name: &str) -> Result<bool> {
    let parsed = GoParser.parse_file(path)?;
    Ok(parsed.source.has_method(struct_name, method_name))
}

fn action_stub(struct_name: &str, action: &Action) -> String {
    format!(
        "\n// {} {}\n// {}\nfunc (ctrl *{}) {}(c *gin.Context) {{\n}}\n",
        HTTP_METHOD_ANNOTATION, action.method, MIDDLEWARE_ANNOTATION, struct_name, action.name
    )
}

/// Appends a stub method for every action not yet defined on the controller
/// and returns the names that were added.
pub fn write_actions(path: &Path, struct_name: &str, actions: &[Action]) -> Result<Vec<String>> {
    let mut content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let parsed = GoParser.parse_source(&content).map_err(|e| Error::Parse {
        file: path.to_path_buf(),
        source: e,
    })?;

    let mut added: Vec<String> = Vec::new();
    for action in actions {
        if parsed.has_method(struct_name, &action.name) || added.contains(&action.name) {
            warn!("action method already exists: {}", action.name);
            continue;
        }
        content.push_str(&action_stub(struct_name, action));
        added.push(action.name.clone());
    }

    if !added.is_empty() {
        write_atomic(&content, path)?;
        info!("Added {} to {}", added.join(", "), path.display());
    }
    Ok(added)
}

fn require_cmd(project: &ProjectConfig, cmd: &str) -> Result<()> {
    if project.cmd_exists(cmd) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("cmd '{}' does not exist", cmd)))
    }
}

/// `gen ctrl`: creates a controller file and appends `actions` to it.
///
/// # Arguments
///
/// * `project` - The discovered project
/// * `cmd` - Cmd the controller belongs to; `cmd/<cmd>` must exist
/// * `route` - Controller route such as `admin/user`
/// * `actions` - `name[:verb]` specs, possibly empty
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for an unknown cmd, a malformed route
/// or action, or a controller file that already exists.
pub fn generate_controller<S: AsRef<str>>(
    project: &ProjectConfig,
    cmd: &str,
    route: &str,
    actions: &[S],
) -> Result<ControllerLocation> {
    require_cmd(project, cmd)?;
    let location = locate_controller(project, cmd, route)?;
    let actions = parse_actions(actions)?;

    if location.path.exists() {
        return Err(Error::InvalidArgument(format!(
            "controller already exists: {}",
            location.path.display()
        )));
    }

    let data = ControllerTemplateData {
        controller_struct_name: location.struct_name.clone(),
    };
    TemplateWriter::new().render_to_file(CONTROLLER_TEMPLATE, &data, &location.path)?;
    info!("Created {} in {}", location.struct_name, location.path.display());

    if !actions.is_empty() {
        write_actions(&location.path, &location.struct_name, &actions)?;
    }
    Ok(location)
}

/// `gen act`: appends actions to an existing controller.
pub fn add_actions<S: AsRef<str>>(
    project: &ProjectConfig,
    cmd: &str,
    route: &str,
    actions: &[S],
) -> Result<Vec<String>> {
    if actions.is_empty() {
        return Err(Error::InvalidArgument("actions is empty".to_string()));
    }
    require_cmd(project, cmd)?;
    let location = locate_controller(project, cmd, route)?;
    let actions = parse_actions(actions)?;

    if !location.path.is_file() {
        return Err(Error::InvalidArgument(format!(
            "controller does not exist: {}",
            location.path.display()
        )));
    }

    write_actions(&location.path, &location.struct_name, &actions)
}

/// `gen mdw`: creates one middleware file per name, skipping existing ones.
/// Returns the files that were written.
pub fn generate_middlewares<S: AsRef<str>>(
    project: &ProjectConfig,
    names: &[S],
) -> Result<Vec<PathBuf>> {
    let writer = TemplateWriter::new();
    let mut written = Vec::new();

    for name in names {
        let name = name.as_ref();
        if !is_go_identifier(name) {
            return Err(Error::InvalidArgument(format!("invalid middleware name: '{}'", name)));
        }

        let middleware_name = capitalize_first(name);
        let path = project.middleware_dir().join(format!("{}.go", middleware_name));
        if path.exists() {
            warn!("{} already exists", path.display());
            continue;
        }

        let data = MiddlewareTemplateData { middleware_name };
        writer.render_to_file(MIDDLEWARE_TEMPLATE, &data, &path)?;
        info!("Created {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with_cmd(root: &Path) -> ProjectConfig {
        fs::create_dir_all(root.join("cmd/default-api")).unwrap();
        ProjectConfig::new(root, "shop")
    }

    #[test]
    fn test_locate_controller() {
        let project = ProjectConfig::new("/work/shop", "shop");

        let nested = locate_controller(&project, "default-api", "admin/user").unwrap();
        assert_eq!(
            nested.path,
            PathBuf::from("/work/shop/internal/default-api/transport/http/api/admin/controller/user.go")
        );
        assert_eq!(nested.struct_name, "UserController");

        let flat = locate_controller(&project, "default-api", "order").unwrap();
        assert_eq!(
            flat.path,
            PathBuf::from("/work/shop/internal/default-api/transport/http/api/controller/order.go")
        );
        assert_eq!(flat.struct_name, "OrderController");
    }

    #[test]
    fn test_locate_controller_rejects_bad_routes() {
        let project = ProjectConfig::new("/work/shop", "shop");
        for route in ["", "/user", "user/", "a//user", "user_info", "user-info", "a/b c"] {
            assert!(
                locate_controller(&project, "default-api", route).is_err(),
                "route {:?} should be rejected",
                route
            );
        }
    }

    #[test]
    fn test_parse_actions() {
        let actions = parse_actions(&["list:get", "create", "remove:DELETE"]).unwrap();
        assert_eq!(
            actions,
            vec![
                Action { name: "List".to_string(), method: HttpMethod::Get },
                Action { name: "Create".to_string(), method: HttpMethod::Post },
                Action { name: "Remove".to_string(), method: HttpMethod::Delete },
            ]
        );

        assert!(parse_actions(&["list:fetch"]).is_err());
        assert!(parse_actions(&["list:"]).is_err());
        assert!(parse_actions(&[":get"]).is_err());
        assert!(parse_actions(&["bad-name"]).is_err());
    }

    #[test]
    fn test_generate_controller_with_actions() {
        let temp_dir = TempDir::new().unwrap();
        let project = project_with_cmd(temp_dir.path());

        let location =
            generate_controller(&project, "default-api", "admin/user", &["list:get", "create"])
                .unwrap();

        let content = fs::read_to_string(&location.path).unwrap();
        assert!(content.contains("type UserController struct{}"));
        assert!(content.contains("func NewUserController() *UserController {"));
        assert!(content.contains(concat!(
            "// @http_method GET\n// @middleware\n",
            "func (ctrl *UserController) List(c *gin.Context) {"
        )));
        assert!(content.contains(concat!(
            "// @http_method POST\n// @middleware\n",
            "func (ctrl *UserController) Create(c *gin.Context) {"
        )));

        // The result must stay parsable by the router generator.
        let parsed = GoParser.parse_source(&content).unwrap();
        assert!(parsed.has_method("UserController", "List"));
        assert!(parsed.has_method("UserController", "Create"));
    }

    #[test]
    fn test_generate_controller_requires_cmd_and_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let project = ProjectConfig::new(root, "shop");

        let err = generate_controller(&project, "missing", "user", &[] as &[&str]).unwrap_err();
        assert!(err.to_string().contains("cmd 'missing' does not exist"));

        let project = project_with_cmd(root);
        generate_controller(&project, "default-api", "user", &[] as &[&str]).unwrap();
        let err = generate_controller(&project, "default-api", "user", &[] as &[&str]).unwrap_err();
        assert!(err.to_string().contains("controller already exists"));
    }

    #[test]
    fn test_add_actions_skips_existing_methods() {
        let temp_dir = TempDir::new().unwrap();
        let project = project_with_cmd(temp_dir.path());
        let location = generate_controller(&project, "default-api", "user", &["info"]).unwrap();

        // Value receivers count as existing too.
        let mut content = fs::read_to_string(&location.path).unwrap();
        content.push_str("\nfunc (ctrl UserController) Update(c *gin.Context) {}\n");
        fs::write(&location.path, content).unwrap();

        let added = add_actions(
            &project,
            "default-api",
            "user",
            &["info", "update", "delete:delete", "delete"],
        )
        .unwrap();
        assert_eq!(added, vec!["Delete".to_string()]);

        assert!(controller_has_method(&location.path, "UserController", "Delete").unwrap());
        assert!(!controller_has_method(&location.path, "OtherController", "Delete").unwrap());
    }

    #[test]
    fn test_add_actions_requires_existing_controller() {
        let temp_dir = TempDir::new().unwrap();
        let project = project_with_cmd(temp_dir.path());

        let err = add_actions(&project, "default-api", "user", &["list"]).unwrap_err();
        assert!(err.to_string().contains("controller does not exist"));
        assert!(add_actions(&project, "default-api", "user", &[] as &[&str]).is_err());
    }

    #[test]
    fn test_generate_middlewares_skips_existing() {
        let temp_dir = TempDir::new().unwrap();
        let project = ProjectConfig::new(temp_dir.path(), "shop");

        let written = generate_middlewares(&project, &["auth"]).unwrap();
        assert_eq!(written, vec![project.middleware_dir().join("Auth.go")]);
        let content = fs::read_to_string(&written[0]).unwrap();
        assert!(content.contains("func Auth(c *gin.Context) {"));

        let written = generate_middlewares(&project, &["auth", "logging"]).unwrap();
        assert_eq!(written, vec![project.middleware_dir().join("Logging.go")]);
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("user"), "User");
        assert_eq!(capitalize_first("User"), "User");
        assert_eq!(capitalize_first(""), "");
    }
}
