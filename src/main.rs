//! godo - command-line scaffolder for Go web projects.
//!
//! # Usage
//!
//! ```bash
//! godo [OPTIONS] gen <rt|ctrl|act|mdw> [ARGS]
//! ```
//!
//! # Examples
//!
//! Regenerate the router of the default cmd:
//! ```bash
//! godo gen rt
//! ```
//!
//! Create a controller with two actions, then add a third:
//! ```bash
//! godo gen ctrl admin/user list:get create
//! godo gen act remove:delete --ctrl admin/user
//! ```
//!
//! Inspect what the router would contain:
//! ```bash
//! godo gen rt --dry-run -f json -v
//! ```

use anyhow::Result;
use godo::cli;
use log::info;

fn main() -> Result<()> {
    let args = cli::parse_args();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("godo starting...");

    cli::run(args)?;

    info!("Done");

    Ok(())
}
