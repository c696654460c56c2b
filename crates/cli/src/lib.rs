pub mod bootstrap;
pub mod clipboard;
pub mod commands;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use storefront_core::config::{AppConfig, ConfigOverrides, LoadOptions, StoreBackend};

use crate::commands::catalog::CatalogArgs;
use crate::commands::order::OrderArgs;
use crate::commands::share::ShareArgs;
use crate::commands::show::ShowArgs;
use crate::commands::theme::ThemeArgs;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Browse the product catalog and place cash-on-delivery orders",
    long_about = "Browse products from the configured document store, view product details with \
                  reviews, share product links and submit orders, plus operator commands for \
                  migrations, demo data, config inspection and readiness checks.",
    after_help = "Examples:\n  storefront catalog --search ring\n  storefront show ring-silver-classic\n  storefront order ring-silver-classic --full-name \"Salma B\" --phone +212600000000 --address \"12 Rue Tarik\" --city Tetouan\n  storefront doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a storefront.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_parser = parse_backend, help = "Override store.backend")]
    backend: Option<StoreBackend>,
    #[arg(long, global = true, help = "Override store.database_url")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List products, optionally filtered by name")]
    Catalog(CatalogArgs),
    #[command(about = "Show one product with its gallery and reviews")]
    Show(ShowArgs),
    #[command(about = "Place a pending cash-on-delivery order for a product")]
    Order(OrderArgs),
    #[command(about = "Copy a product link to the terminal clipboard")]
    Share(ShareArgs),
    #[command(about = "Show or toggle the saved light/dark theme")]
    Theme(ThemeArgs),
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo catalog into the local database")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, store connectivity and catalog readability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn parse_backend(value: &str) -> Result<StoreBackend, String> {
    value.parse::<StoreBackend>().map_err(|error| error.to_string())
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                backend: self.backend,
                database_url: self.database_url.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    if let Ok(config) = AppConfig::load(options.clone()) {
        bootstrap::init_logging(&config);
    }

    let result = match cli.command {
        Command::Catalog(args) => commands::catalog::run(&options, args),
        Command::Show(args) => commands::show::run(&options, args),
        Command::Order(args) => commands::order::run(&options, args),
        Command::Share(args) => commands::share::run(&options, args),
        Command::Theme(args) => commands::theme::run(&options, args),
        Command::Migrate => commands::migrate::run(&options),
        Command::Seed => commands::seed::run(&options),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(&options, json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
