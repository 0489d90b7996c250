//! Route table inspector.
//!
//! Loads a TOML route table and answers questions about it:
//!
//! ```text
//! route-table --config routes.toml list
//! route-table --config routes.toml match GET /user/7
//! route-table --config routes.toml generate user.show id=7
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use route_table::config::{load_config, ConfigError};
use route_table::observability::init_logging;
use route_table::routing::{Params, Route, Router};

#[derive(Parser)]
#[command(name = "route-table")]
#[command(about = "Inspect, match and reverse an HTTP route table", long_about = None)]
struct Cli {
    /// Route table file (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Log level; overrides the config file.
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered route
    List,
    /// Match a request and print the route and parameters
    Match {
        method: String,
        path: String,
    },
    /// Generate the URL of a named route
    Generate {
        name: String,
        /// Parameters as KEY=VALUE
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    init_logging(level)?;

    tracing::info!(
        path = %cli.config.display(),
        routes = config.routes.len(),
        groups = config.groups.len(),
        resources = config.resources.len(),
        "Configuration loaded"
    );

    let mut router = Router::from_config(&config).map_err(ConfigError::Build)?;

    match cli.command {
        Commands::List => {
            let routes: Vec<Value> = router.routes().iter().map(describe).collect();
            println!("{}", serde_json::to_string_pretty(&routes)?);
        }
        Commands::Match { method, path } => {
            let method = method.to_ascii_uppercase();
            let Some(matched) = router.dispatch(&method, &path) else {
                eprintln!("No route matches {} {}", method, path);
                return Ok(ExitCode::FAILURE);
            };
            let output = json!({
                "route": describe(matched.route()),
                "params": matched.params(),
                "options": matched.options(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Generate { name, params } => {
            let params: Params = params.into_iter().collect();
            println!("{}", router.generate(&name, params)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn describe(route: &Route) -> Value {
    json!({
        "methods": route.methods(),
        "path": route.path(),
        "name": route.name(),
        "handler": route.handler().to_string(),
        "middleware": route.middlewares(),
        "pattern": route.generate_pattern(),
    })
}
