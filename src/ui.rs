// UI layer: interactive menu using `dialoguer`, used when no subcommand is
// given. Each action reports its own failure and returns to the menu.

use crate::acquisition::{AcquisitionReport, AcquisitionSubmitter};
use crate::api::ApiClient;
use crate::config::Settings;
use crate::proposal::{self, Proposal, ProposalSubmitter};
use crate::transport::Transport;
use anyhow::Result;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Main interactive menu. Runs until the user chooses "Exit".
pub fn main_menu<T: Transport>(api: &ApiClient<T>, settings: &Settings) -> Result<()> {
    // The last fetched proposal, reused by "Handle acquisitions".
    let mut fetched: Option<Proposal> = None;
    loop {
        let items = vec![
            "Register local proposal",
            "Fetch proposal",
            "Handle acquisitions",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_register(api, settings)?,
            1 => {
                if let Some(p) = handle_fetch(api)? {
                    fetched = Some(p);
                }
            }
            2 => {
                let Some(p) = fetched.as_ref() else {
                    println!("Fetch a proposal first.");
                    continue;
                };
                handle_acquisitions(api, settings, p)?;
            }
            3 => break,
            _ => {}
        }
    }
    Ok(())
}

fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn handle_register<T: Transport>(api: &ApiClient<T>, settings: &Settings) -> Result<()> {
    let path: String = Input::new()
        .with_prompt("Proposal file")
        .default(settings.proposal_path.display().to_string())
        .interact_text()?;
    let proposal = match proposal::load_local(&PathBuf::from(path)) {
        Ok(p) => p,
        Err(e) => {
            println!("Could not load proposal: {}", e);
            return Ok(());
        }
    };

    let pb = spinner("Registering...")?;
    let result = ProposalSubmitter::new(api).register(&proposal);
    pb.finish_and_clear();
    match result {
        Ok(id) => println!("Proposal is registered with Id: {}", id),
        Err(e) => println!("Could not register proposal, {}", e),
    }
    Ok(())
}

fn handle_fetch<T: Transport>(api: &ApiClient<T>) -> Result<Option<Proposal>> {
    let id: String = Input::new().with_prompt("Proposal id").interact_text()?;

    let pb = spinner("Fetching...")?;
    let result = AcquisitionSubmitter::new(api).fetch_proposal(id.trim());
    pb.finish_and_clear();
    match result {
        Ok(p) => {
            println!("Fetched Proposal: {}", serde_json::to_string_pretty(&p)?);
            println!("Number of samples = {}", p.samples().len());
            Ok(Some(p))
        }
        Err(e) => {
            println!("Could not fetch proposal, {}", e);
            Ok(None)
        }
    }
}

fn handle_acquisitions<T: Transport>(
    api: &ApiClient<T>,
    settings: &Settings,
    proposal: &Proposal,
) -> Result<()> {
    let path: String = Input::new()
        .with_prompt("Metadata file")
        .default(settings.metadata_path.display().to_string())
        .interact_text()?;

    let pb = spinner("Submitting datasets...")?;
    let result = AcquisitionSubmitter::new(api).handle_acquisitions(proposal, &PathBuf::from(path));
    pb.finish_and_clear();
    match result {
        Ok(report) => print_report(&report),
        Err(e) => println!("Could not handle acquisitions: {}", e),
    }
    Ok(())
}

/// One line per sample, then a total.
pub fn print_report(report: &AcquisitionReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => println!("Handled acquisition for {}", outcome.specimen_name),
            Err(e) => println!(
                "Could not handle acquisition for {}: {}",
                outcome.specimen_name, e
            ),
        }
    }
    println!(
        "{} of {} datasets registered",
        report.accepted(),
        report.outcomes.len()
    );
}
