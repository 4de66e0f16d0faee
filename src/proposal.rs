// Proposal records and their registration with the catalog.
//
// The required fields are checked when a proposal is parsed, whether it
// comes from a local file or from the backend. Everything else in the
// document is kept in `extra` and sent back untouched.

use crate::api::ApiClient;
use crate::error::{CatalogError, Result};
use crate::transport::Transport;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub const PROPOSALS_PATH: [&str; 1] = ["proposals"];

/// One physical specimen of a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub specimen_name: String,
    pub qr_code_label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalMetadata {
    pub samples: Vec<Sample>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(rename = "proposalId")]
    pub proposal_id: String,
    #[serde(rename = "ownerGroup")]
    pub owner_group: String,
    #[serde(rename = "accessGroups")]
    pub access_groups: Vec<String>,
    pub pi_firstname: String,
    pub pi_lastname: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub pi_email: String,
    pub metadata: ProposalMetadata,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proposal {
    /// Parse and validate a proposal document. `origin` names the source in errors.
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| CatalogError::Malformed {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.metadata.samples
    }

    pub fn principal_investigator(&self) -> String {
        format!("{} {}", self.pi_firstname, self.pi_lastname)
    }

    pub fn owner(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

#[derive(Deserialize)]
struct RegisteredProposal {
    #[serde(rename = "proposalId")]
    proposal_id: Option<String>,
}

/// Read a proposal from a local JSON file.
pub fn load_local(path: &Path) -> Result<Proposal> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::LocalFile {
        path: path.to_path_buf(),
        source,
    })?;
    Proposal::from_json(&text, &path.display().to_string())
}

pub struct ProposalSubmitter<'a, T: Transport> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> ProposalSubmitter<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        ProposalSubmitter { client }
    }

    /// POST the proposal. Returns the id assigned by the backend; anything
    /// but 201 is a recoverable `Submission` error.
    pub fn register(&self, proposal: &Proposal) -> Result<String> {
        let body = serde_json::to_value(proposal).map_err(|source| CatalogError::Malformed {
            origin: format!("proposal {}", proposal.proposal_id),
            source,
        })?;
        let res = self.client.post(&PROPOSALS_PATH, body)?;
        if res.status != StatusCode::CREATED {
            let message = res.message();
            tracing::warn!("could not register proposal {}: {}", proposal.proposal_id, message);
            return Err(CatalogError::Submission {
                status: res.status,
                message,
            });
        }
        let id = res
            .json::<RegisteredProposal>()
            .ok()
            .and_then(|r| r.proposal_id)
            .unwrap_or_else(|| proposal.proposal_id.clone());
        tracing::info!("proposal is registered with id {}", id);
        Ok(id)
    }
}
