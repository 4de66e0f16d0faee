// Command line for the catalog ingest client.

use crate::acquisition::AcquisitionSubmitter;
use crate::api::ApiClient;
use crate::config::{Overrides, Settings};
use crate::proposal::{self, ProposalSubmitter};
use crate::transport::Transport;
use crate::ui;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "scicat-ingest")]
#[command(about = "Register proposals and raw datasets with a SciCat catalog", long_about = None)]
pub struct Cli {
    /// Catalog API base URL (overrides SCICAT_BASE_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Two-line credentials file (overrides SCICAT_SECRETS).
    #[arg(long, global = true, value_name = "PATH")]
    pub secrets: Option<PathBuf>,

    /// Without a subcommand the interactive menu starts.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Register the local proposal file with the catalog.
    Register {
        #[arg(long, value_name = "PATH")]
        proposal: Option<PathBuf>,
    },

    /// Fetch a proposal and print it.
    Fetch {
        proposal_id: String,
    },

    /// Fetch a proposal and register one raw dataset per sample.
    Acquire {
        proposal_id: String,

        /// Scientific metadata embedded in every dataset.
        #[arg(long, value_name = "PATH")]
        metadata: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            base_url: self.base_url.clone(),
            secrets_path: self.secrets.clone(),
            ..Overrides::default()
        };
        match &self.command {
            Some(CliCommand::Register { proposal }) => overrides.proposal_path = proposal.clone(),
            Some(CliCommand::Acquire { metadata, .. }) => overrides.metadata_path = metadata.clone(),
            _ => {}
        }
        overrides
    }
}

pub fn run_from_args() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env()?.with_overrides(cli.overrides())?;
    tracing::debug!("settings: {:?}", settings);

    let api = ApiClient::connect(&settings)
        .with_context(|| format!("could not log in to {}", settings.base_url))?;

    dispatch(&api, &settings, cli.command)
}

/// Run one command against a logged-in client. Rejections by the backend are
/// printed and yield `Ok`; anything else is returned as an error.
pub fn dispatch<T: Transport>(
    api: &ApiClient<T>,
    settings: &Settings,
    command: Option<CliCommand>,
) -> Result<()> {
    match command {
        None => ui::main_menu(api, settings)?,
        Some(CliCommand::Register { .. }) => {
            let proposal = proposal::load_local(&settings.proposal_path)?;
            match ProposalSubmitter::new(api).register(&proposal) {
                Ok(id) => println!("Proposal is registered with Id: {}", id),
                Err(e) if e.is_recoverable() => println!("Could not register proposal, {}", e),
                Err(e) => return Err(e.into()),
            }
        }
        Some(CliCommand::Fetch { proposal_id }) => {
            match AcquisitionSubmitter::new(api).fetch_proposal(&proposal_id) {
                Ok(p) => {
                    println!("{}", serde_json::to_string_pretty(&p)?);
                    println!("Number of samples = {}", p.samples().len());
                }
                Err(e) if e.is_recoverable() => println!("Could not fetch proposal, {}", e),
                Err(e) => return Err(e.into()),
            }
        }
        Some(CliCommand::Acquire { proposal_id, .. }) => {
            let submitter = AcquisitionSubmitter::new(api);
            match submitter.fetch_proposal(&proposal_id) {
                Ok(p) => {
                    println!("Number of samples = {}", p.samples().len());
                    let report = submitter.handle_acquisitions(&p, &settings.metadata_path)?;
                    ui::print_report(&report);
                }
                Err(e) if e.is_recoverable() => println!("Could not fetch proposal, {}", e),
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}
