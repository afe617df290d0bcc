use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use module_router::config::load_or_default;
use module_router::http::HandlerTable;
use module_router::lifecycle::RouteService;
use module_router::routing::RegistrationOptions;

#[derive(Parser)]
#[command(name = "routes-cli")]
#[command(about = "Inspect discovered modules and synthesized routes", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "MODULE_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the primary, variant and merged module lists
    Modules,
    /// Print every synthesized route
    Routes {
        /// Register only these methods
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// Never register these methods
        #[arg(long, value_delimiter = ',')]
        except: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    let service = RouteService::from_config(&config, HandlerTable::preview())?;

    let output = match cli.command {
        Commands::Modules => serde_json::to_value(&*service.registry().discover())?,
        Commands::Routes { only, except } => {
            let service = service.with_options(RegistrationOptions {
                only,
                except,
                patterns: config.routing.patterns.clone(),
            });
            let (table, reports) = service.route_table()?;
            json!({
                "modules": reports,
                "routes": table.routes(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
