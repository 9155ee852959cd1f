//! Serialization of the assembled router configuration.
//!
//! `gen rt --dry-run` prints the [`RouterConfig`] instead of rendering it,
//! which is handy to inspect what discovery found.

use crate::error::Result;
use crate::router_builder::RouterConfig;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Output format for a dumped configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format '{}'. Supported formats: yaml, json", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Serializes a router configuration to YAML.
pub fn serialize_yaml(config: &RouterConfig) -> Result<String> {
    debug!("Serializing router config to YAML");
    Ok(serde_yaml::to_string(config)?)
}

/// Serializes a router configuration to pretty-printed JSON.
pub fn serialize_json(config: &RouterConfig) -> Result<String> {
    debug!("Serializing router config to JSON");
    Ok(serde_json::to_string_pretty(config)?)
}

/// Serializes a router configuration for `--dry-run`.
///
/// # Arguments
///
/// * `config` - The router configuration to print
/// * `format` - YAML or JSON
///
/// # Errors
///
/// Returns [`Error::Serialization`](crate::error::Error::Serialization) if
/// the serializer fails.
pub fn serialize(config: &RouterConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serialize_yaml(config),
        OutputFormat::Json => serialize_json(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::HttpMethod;
    use crate::router_builder::{ImportStatement, Registration};

    fn create_test_config() -> RouterConfig {
        let mut config = RouterConfig {
            imports: vec![ImportStatement {
                alias: "controller0".to_string(),
                path: "shop/api/controller".to_string(),
            }],
            registrations: vec![Registration {
                alias: "controller0".to_string(),
                type_name: "UserController".to_string(),
            }],
            ..RouterConfig::default()
        };
        config
            .http_methods
            .insert("shop/api/controller.UserController.List".to_string(), HttpMethod::Get);
        config
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_config()).unwrap();

        assert!(yaml.contains("imports:"));
        assert!(yaml.contains("alias: controller0"));
        assert!(yaml.contains("shop/api/controller.UserController.List: GET"));
        // No middleware, so no middleware import.
        assert!(!yaml.contains("middleware_import"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_config()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["imports"][0]["path"], "shop/api/controller");
        assert_eq!(parsed["registrations"][0]["type_name"], "UserController");
        assert_eq!(
            parsed["http_methods"]["shop/api/controller.UserController.List"],
            "GET"
        );
        assert!(json.lines().count() > 5, "JSON should be pretty printed");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("YAML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
