//! didit-client CLI entry point.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dialoguer::Confirm;
use didit_client::cli::{Cli, Commands, OutputFormat};
use didit_client::output::{format_output, pretty};
use didit_client::{ClientConfig, DiditClient, EntriesBinding, Session};
use didit_core::view::EntriesView;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "didit_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env().with_overrides(cli.base_url.clone(), cli.timeout);
    let client = DiditClient::with_config(&config)?;
    let binding = EntriesBinding::new(Arc::new(client), Session::new(cli.user.clone()));

    if !binding.session().is_logged_in() {
        print_view(&binding.view(), cli.format);
        return Ok(());
    }

    binding.mount().await;

    match cli.command {
        Commands::List => {}
        Commands::Add => {
            binding.create_entry().await?;
            if !cli.quiet {
                eprintln!("Submitted");
            }
        }
        Commands::Delete { id, yes } => {
            let entry = binding.find_row(id)?;

            let phase = binding.press_delete(id);
            if !cli.quiet {
                eprintln!("{}", pretty::format_row(&entry, phase));
            }

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete entry {}?", id))
                    .default(false)
                    .interact()?;

            if confirmed {
                binding.confirm_delete(id).await?;
                if !cli.quiet {
                    eprintln!("Deleted entry {}", id);
                }
            } else {
                binding.cancel_delete(id);
                if !cli.quiet {
                    eprintln!("Cancelled");
                }
            }
        }
    }

    print_view(&binding.settled_view().await, cli.format);
    Ok(())
}

fn print_view(view: &EntriesView, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format_output(view, format)),
        OutputFormat::Pretty => println!("{}", pretty::format_view(view)),
    }
}
