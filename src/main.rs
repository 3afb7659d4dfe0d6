//! Graft CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "Extract subgraphs from dataflow graphs and transplant them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lift targets and their dependencies into a fresh graph
    Lift {
        /// Source graph file
        #[arg(short, long)]
        graph: PathBuf,

        /// Node (`name`) or value (`name:index`) to lift; repeatable
        #[arg(short, long = "target", required = true)]
        targets: Vec<String>,

        /// Value at which extraction stops; repeatable
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// TOML file with lift options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Turn placeholders reached during traversal into sources
        #[arg(long)]
        add_sources: bool,

        /// Write the lifted graph here instead of printing it
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the source -> copy value mapping
        #[arg(long)]
        print_map: bool,
    },
    /// Print a graph file
    Show {
        #[arg(short, long)]
        graph: PathBuf,
    },
    /// Check that every node of a graph file comes after its dependencies
    Check {
        #[arg(short, long)]
        graph: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("graft={}", log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Graft v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Lift {
            graph,
            targets,
            sources,
            config,
            add_sources,
            out,
            print_map,
        } => commands::lift(commands::LiftArgs {
            graph,
            targets,
            sources,
            config,
            add_sources,
            out,
            print_map,
        }),
        Commands::Show { graph } => commands::show(&graph),
        Commands::Check { graph } => commands::check(&graph),
    }
}
