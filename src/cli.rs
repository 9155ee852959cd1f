use crate::config::ProjectConfig;
use crate::generator::RouterGenerator;
use crate::scaffold;
use crate::serializer::{serialize, OutputFormat};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::Input;
use log::{debug, info, warn};
use std::path::PathBuf;

const ROUTE_PROMPT: &str = "Controller route";
const ACTIONS_PROMPT: &str = "Actions (name[:verb], space separated)";

/// godo - scaffolding and router generation for Go web projects
#[derive(Parser, Debug)]
#[command(name = "godo")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Directory to start project discovery from (default: current directory)
    #[arg(long = "root", value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate code
    #[command(subcommand)]
    Gen(GenCommand),
}

/// Code generators under `godo gen`.
#[derive(Subcommand, Debug)]
pub enum GenCommand {
    /// Generate router.go from controller annotations
    Rt(RtArgs),
    /// Create a controller, optionally with actions
    Ctrl(CtrlArgs),
    /// Add actions to an existing controller
    Act(ActArgs),
    /// Create middleware files
    Mdw(MdwArgs),
}

/// Arguments of `godo gen rt`.
#[derive(Args, Debug)]
pub struct RtArgs {
    /// Cmd whose router is generated (default: from godoconfig.json)
    #[arg(long = "cmd", value_name = "NAME")]
    pub cmd: Option<String>,

    /// Also treat types whose doc comment has an @controller line as controllers
    #[arg(long = "marker")]
    pub marker: bool,

    /// Print the router configuration instead of writing router.go
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Format of the --dry-run output (yaml or json)
    #[arg(short = 'f', long = "format", default_value = "yaml")]
    pub output_format: OutputFormat,
}

/// Arguments of `godo gen ctrl`.
#[derive(Args, Debug)]
pub struct CtrlArgs {
    /// Controller route, e.g. admin/user (asked for when omitted)
    #[arg(value_name = "ROUTE")]
    pub route: Option<String>,

    /// Actions as name[:verb], e.g. list:get create
    #[arg(value_name = "ACTION")]
    pub actions: Vec<String>,

    /// Cmd the controller belongs to (default: from godoconfig.json)
    #[arg(long = "cmd", value_name = "NAME")]
    pub cmd: Option<String>,
}

/// Arguments of `godo gen act`.
#[derive(Args, Debug)]
pub struct ActArgs {
    /// Actions as name[:verb], e.g. list:get create (asked for when omitted)
    #[arg(value_name = "ACTION")]
    pub actions: Vec<String>,

    /// Route of the controller to extend (asked for when omitted)
    #[arg(long = "ctrl", value_name = "ROUTE")]
    pub controller: Option<String>,

    /// Cmd the controller belongs to (default: from godoconfig.json)
    #[arg(long = "cmd", value_name = "NAME")]
    pub cmd: Option<String>,
}

/// Arguments of `godo gen mdw`.
#[derive(Args, Debug)]
pub struct MdwArgs {
    /// Middleware names
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

/// Parse command line arguments
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Run the command
pub fn run(args: CliArgs) -> Result<()> {
    debug!("Parsed arguments: {:?}", args);

    let start = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let project = ProjectConfig::discover(&start)
        .with_context(|| format!("Failed to locate a godo project from {}", start.display()))?;
    info!("Project: {} ({})", project.module_name, project.root.display());

    match args.command {
        Command::Gen(GenCommand::Rt(rt)) => run_router(&project, rt),
        Command::Gen(GenCommand::Ctrl(ctrl)) => {
            let cmd = project.cmd_or_default(ctrl.cmd.as_deref());
            let route = value_or_ask(ctrl.route, ROUTE_PROMPT, ask)?;
            let location = scaffold::generate_controller(&project, cmd, &route, &ctrl.actions)
                .with_context(|| format!("Failed to generate controller '{}'", route))?;
            info!(
                "Controller {} ready at {}",
                location.struct_name,
                location.path.display()
            );
            Ok(())
        }
        Command::Gen(GenCommand::Act(act)) => {
            let cmd = project.cmd_or_default(act.cmd.as_deref());
            let actions = actions_or_ask(act.actions, ask)?;
            let route = value_or_ask(act.controller, ROUTE_PROMPT, ask)?;
            let added = scaffold::add_actions(&project, cmd, &route, &actions)
                .with_context(|| format!("Failed to add actions to '{}'", route))?;
            if added.is_empty() {
                warn!("No actions added");
            }
            Ok(())
        }
        Command::Gen(GenCommand::Mdw(mdw)) => {
            let written = scaffold::generate_middlewares(&project, &mdw.names)
                .context("Failed to generate middleware")?;
            info!("Created {} middleware files", written.len());
            Ok(())
        }
    }
}

/// Reads one line from the terminal.
fn ask(prompt: &str) -> Result<String> {
    let answer = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("Failed to read input for '{}'", prompt))?;
    Ok(answer.trim().to_string())
}

/// `given` if it is non-blank, otherwise the answer to `prompt`.
fn value_or_ask(
    given: Option<String>,
    prompt: &str,
    ask: impl FnOnce(&str) -> Result<String>,
) -> Result<String> {
    match given.filter(|v| !v.trim().is_empty()) {
        Some(value) => Ok(value),
        None => ask(prompt),
    }
}

/// `given` if non-empty, otherwise a whitespace-separated answer.
fn actions_or_ask(
    given: Vec<String>,
    ask: impl FnOnce(&str) -> Result<String>,
) -> Result<Vec<String>> {
    if !given.is_empty() {
        return Ok(given);
    }
    let actions: Vec<String> = ask(ACTIONS_PROMPT)?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if actions.is_empty() {
        bail!("actions are empty");
    }
    Ok(actions)
}

fn run_router(project: &ProjectConfig, args: RtArgs) -> Result<()> {
    let cmd = project.cmd_or_default(args.cmd.as_deref());
    info!("Generating router for cmd '{}'", cmd);

    let generator = RouterGenerator::new(project).with_marker(args.marker);
    let analysis = generator
        .analyze(cmd)
        .with_context(|| format!("Failed to analyze controllers of cmd '{}'", cmd))?;

    if args.dry_run {
        info!("Serializing to {} format...", args.output_format);
        println!("{}", serialize(&analysis.config, args.output_format)?);
    } else {
        let dest = generator
            .write_router(cmd, &analysis)
            .context("Failed to write router")?;
        info!("Router written to {}", dest.display());
    }

    info!("Summary:");
    info!("  - Controller files parsed: {}", analysis.files_parsed);
    info!("  - Controllers: {}", analysis.controllers.len());
    info!("  - Routes: {}", analysis.config.http_methods.len());
    info!("  - Warnings: {}", analysis.warnings.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gen_rt() {
        let args = CliArgs::try_parse_from([
            "godo", "-v", "gen", "rt", "--cmd", "admin-api", "--dry-run", "-f", "json",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Gen(GenCommand::Rt(rt)) => {
                assert_eq!(rt.cmd.as_deref(), Some("admin-api"));
                assert!(rt.dry_run);
                assert!(!rt.marker);
                assert_eq!(rt.output_format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_gen_ctrl_and_act() {
        let args =
            CliArgs::try_parse_from(["godo", "gen", "ctrl", "admin/user", "list:get", "create"])
                .unwrap();
        match args.command {
            Command::Gen(GenCommand::Ctrl(ctrl)) => {
                assert_eq!(ctrl.route.as_deref(), Some("admin/user"));
                assert_eq!(ctrl.actions, vec!["list:get", "create"]);
                assert_eq!(ctrl.cmd, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let args =
            CliArgs::try_parse_from(["godo", "gen", "act", "remove:delete", "--ctrl", "admin/user"])
                .unwrap();
        match args.command {
            Command::Gen(GenCommand::Act(act)) => {
                assert_eq!(act.controller.as_deref(), Some("admin/user"));
                assert_eq!(act.actions, vec!["remove:delete"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_required_arguments() {
        assert!(CliArgs::try_parse_from(["godo", "gen", "mdw"]).is_err());
        assert!(CliArgs::try_parse_from(["godo", "gen", "rt", "-f", "xml"]).is_err());
    }

    #[test]
    fn test_omitted_route_and_actions_parse_for_prompting() {
        let args = CliArgs::try_parse_from(["godo", "gen", "act"]).unwrap();
        match args.command {
            Command::Gen(GenCommand::Act(act)) => {
                assert!(act.actions.is_empty());
                assert_eq!(act.controller, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        let args = CliArgs::try_parse_from(["godo", "gen", "ctrl"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Gen(GenCommand::Ctrl(CtrlArgs { route: None, .. }))
        ));
    }

    #[test]
    fn test_value_or_ask_only_asks_when_missing() {
        let given = value_or_ask(Some("admin/user".to_string()), ROUTE_PROMPT, |_| {
            panic!("should not ask")
        })
        .unwrap();
        assert_eq!(given, "admin/user");

        let asked = value_or_ask(Some("  ".to_string()), ROUTE_PROMPT, |prompt| {
            assert_eq!(prompt, ROUTE_PROMPT);
            Ok("shop/order".to_string())
        })
        .unwrap();
        assert_eq!(asked, "shop/order");
    }

    #[test]
    fn test_actions_or_ask_splits_answer() {
        let actions = actions_or_ask(vec![], |_| Ok(" list:get   create ".to_string())).unwrap();
        assert_eq!(actions, vec!["list:get", "create"]);

        let given =
            actions_or_ask(vec!["remove".to_string()], |_| panic!("should not ask")).unwrap();
        assert_eq!(given, vec!["remove"]);

        let err = actions_or_ask(vec![], |_| Ok("   ".to_string())).unwrap_err();
        assert!(err.to_string().contains("actions are empty"));
    }
}
