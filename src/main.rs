use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod convert;
mod core;
mod graph;
mod manage;
mod parsing;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("pangraph=debug,info")
    } else {
        EnvFilter::new("pangraph=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Convert(args) => {
            cli::convert::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Inspect(args) => {
            cli::inspect::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Subgraph(args) => {
            cli::subgraph::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Nodes(args) => {
            cli::nodes::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Merge(args) => {
            cli::merge::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::ExportSv(args) => {
            cli::export_sv::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::RemoveBackbone(args) => {
            cli::remove_backbone::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
