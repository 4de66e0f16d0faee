// Fetching proposals and turning their samples into raw datasets.
//
// `handle_acquisitions` is best effort: every sample gets its own request,
// and a rejected or failed request does not stop the remaining ones.

use crate::api::ApiClient;
use crate::error::{CatalogError, Result};
use crate::proposal::{Proposal, Sample, PROPOSALS_PATH};
use crate::transport::Transport;
use chrono::Local;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

pub const DATASETS_PATH: [&str; 1] = ["datasets"];

pub const DATASET_TYPE: &str = "raw";
pub const SOURCE_FOLDER: &str = "/mnt/ips-mnt-01/smart-morph";
pub const SOURCE_FOLDER_HOST: &str = "ips-mnt-01.ips.kit.edu";
pub const NUMBER_OF_FILES: u32 = 3;
pub const KEYWORDS: [&str; 4] = ["entomology", "biology", "insects", "museums"];
pub const CREATION_LOCATION: &str =
    "Deutsches Elektronen-Synchrotron DESY / PETRA III / P23 / HIKA";
pub const USED_SOFTWARE: [&str; 2] = ["Concert", "Ufo-Tofu"];

/// Body of `POST /datasets` for one sample.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRecord {
    pub pid: String,
    #[serde(rename = "type")]
    pub dataset_type: String,
    pub owner_group: String,
    pub access_groups: Vec<String>,
    pub principal_investigator: String,
    pub owner: String,
    pub owner_email: String,
    pub contact_email: String,
    pub source_folder: String,
    pub source_folder_host: String,
    pub number_of_files: u32,
    pub creation_time: String,
    pub keywords: Vec<String>,
    pub description: String,
    pub dataset_name: String,
    pub scientific_metadata: Value,
    pub data_quality_metrics: u32,
    pub start_time: String,
    pub end_time: String,
    pub creation_location: String,
    pub proposal_id: String,
    pub used_software: Vec<String>,
}

/// Local wall-clock time, e.g. `2024-11-05T14:03:27.123456`.
fn now_iso() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

impl DatasetRecord {
    pub fn for_sample(proposal: &Proposal, sample: &Sample, metadata: &Value) -> Self {
        DatasetRecord {
            pid: format!("{}_{}", proposal.proposal_id, sample.qr_code_label),
            dataset_type: DATASET_TYPE.to_string(),
            owner_group: proposal.owner_group.clone(),
            access_groups: proposal.access_groups.clone(),
            principal_investigator: proposal.principal_investigator(),
            owner: proposal.owner(),
            owner_email: proposal.email.clone(),
            contact_email: proposal.pi_email.clone(),
            source_folder: SOURCE_FOLDER.to_string(),
            source_folder_host: SOURCE_FOLDER_HOST.to_string(),
            number_of_files: NUMBER_OF_FILES,
            creation_time: now_iso(),
            keywords: KEYWORDS.iter().map(|k| k.to_string()).collect(),
            description: format!("Serial-MicroCT of {}", sample.specimen_name),
            dataset_name: sample.specimen_name.clone(),
            scientific_metadata: metadata.clone(),
            data_quality_metrics: 0,
            start_time: now_iso(),
            end_time: now_iso(),
            creation_location: CREATION_LOCATION.to_string(),
            proposal_id: proposal.proposal_id.clone(),
            used_software: USED_SOFTWARE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Outcome of one sample's dataset submission.
#[derive(Debug)]
pub struct SampleOutcome {
    pub specimen_name: String,
    pub pid: String,
    pub result: Result<()>,
}

#[derive(Debug, Default)]
pub struct AcquisitionReport {
    pub outcomes: Vec<SampleOutcome>,
}

impl AcquisitionReport {
    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.accepted()
    }

    pub fn is_complete(&self) -> bool {
        self.rejected() == 0
    }
}

/// Read the scientific metadata blob embedded in every dataset.
pub fn load_metadata(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::LocalFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CatalogError::Malformed {
        origin: path.display().to_string(),
        source,
    })
}

pub struct AcquisitionSubmitter<'a, T: Transport> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> AcquisitionSubmitter<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        AcquisitionSubmitter { client }
    }

    /// GET a proposal by id. Anything but 200 is a recoverable `Fetch` error.
    pub fn fetch_proposal(&self, proposal_id: &str) -> Result<Proposal> {
        let res = self.client.get(&[PROPOSALS_PATH[0], proposal_id])?;
        if res.status != StatusCode::OK {
            let message = res.message();
            tracing::warn!("could not fetch proposal {}: {}", proposal_id, message);
            return Err(CatalogError::Fetch {
                status: res.status,
                message,
            });
        }
        let proposal = Proposal::from_json(&res.body, &format!("proposal {proposal_id}"))?;
        tracing::info!(
            "fetched proposal {} with {} samples",
            proposal.proposal_id,
            proposal.samples().len()
        );
        Ok(proposal)
    }

    /// Submit one dataset per sample of `proposal`, in order.
    pub fn handle_acquisitions(
        &self,
        proposal: &Proposal,
        metadata_path: &Path,
    ) -> Result<AcquisitionReport> {
        let metadata = load_metadata(metadata_path)?;
        let mut report = AcquisitionReport::default();
        for sample in proposal.samples() {
            let record = DatasetRecord::for_sample(proposal, sample, &metadata);
            let pid = record.pid.clone();
            let result = self.submit(&record);
            match &result {
                Ok(()) => tracing::info!("handled acquisition for {}", sample.specimen_name),
                Err(e) => tracing::warn!(
                    "could not handle acquisition for {}: {}",
                    sample.specimen_name,
                    e
                ),
            }
            report.outcomes.push(SampleOutcome {
                specimen_name: sample.specimen_name.clone(),
                pid,
                result,
            });
        }
        Ok(report)
    }

    fn submit(&self, record: &DatasetRecord) -> Result<()> {
        let body = serde_json::to_value(record).map_err(|source| CatalogError::Malformed {
            origin: format!("dataset {}", record.pid),
            source,
        })?;
        let res = self.client.post(&DATASETS_PATH, body)?;
        if res.status != StatusCode::CREATED {
            return Err(CatalogError::Submission {
                status: res.status,
                message: res.message(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposal() -> Proposal {
        let doc = json!({
            "proposalId": "PROP9",
            "ownerGroup": "smart-morph",
            "accessGroups": ["ips"],
            "pi_firstname": "Ada",
            "pi_lastname": "Lovelace",
            "firstname": "Charles",
            "lastname": "Babbage",
            "email": "charles@example.org",
            "pi_email": "ada@example.org",
            "metadata": {
                "samples": [{"specimen_name": "wasp-1", "qr_code_label": "QR42"}]
            }
        });
        Proposal::from_json(&doc.to_string(), "test").unwrap()
    }

    #[test]
    fn record_combines_proposal_and_sample() {
        let p = proposal();
        let meta = json!({"voxel_size_um": 1.5});
        let record = DatasetRecord::for_sample(&p, &p.samples()[0], &meta);
        assert_eq!(record.pid, "PROP9_QR42");
        assert_eq!(record.description, "Serial-MicroCT of wasp-1");
        assert_eq!(record.dataset_name, "wasp-1");
        assert_eq!(record.principal_investigator, "Ada Lovelace");
        assert_eq!(record.owner, "Charles Babbage");
        assert_eq!(record.owner_email, "charles@example.org");
        assert_eq!(record.contact_email, "ada@example.org");
        assert_eq!(record.scientific_metadata, meta);
    }

    #[test]
    fn record_serializes_catalog_keys() {
        let p = proposal();
        let record = DatasetRecord::for_sample(&p, &p.samples()[0], &json!({}));
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["type"], "raw");
        assert_eq!(v["ownerGroup"], "smart-morph");
        assert_eq!(v["accessGroups"], json!(["ips"]));
        assert_eq!(v["numberOfFiles"], 3);
        assert_eq!(v["dataQualityMetrics"], 0);
        assert_eq!(v["sourceFolderHost"], "ips-mnt-01.ips.kit.edu");
        assert_eq!(v["usedSoftware"], json!(["Concert", "Ufo-Tofu"]));
        assert_eq!(
            v["keywords"],
            json!(["entomology", "biology", "insects", "museums"])
        );
        assert_eq!(v["proposalId"], "PROP9");
        for key in ["creationTime", "startTime", "endTime"] {
            let ts = v[key].as_str().unwrap();
            assert!(
                chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok(),
                "bad timestamp {key}: {ts}"
            );
        }
        assert_eq!(v.as_object().unwrap().len(), 22);
    }

    #[test]
    fn load_metadata_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_metadata(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn report_counts() {
        let report = AcquisitionReport {
            outcomes: vec![
                SampleOutcome {
                    specimen_name: "a".into(),
                    pid: "P_a".into(),
                    result: Ok(()),
                },
                SampleOutcome {
                    specimen_name: "b".into(),
                    pid: "P_b".into(),
                    result: Err(CatalogError::Submission {
                        status: StatusCode::BAD_REQUEST,
                        message: "{}".into(),
                    }),
                },
            ],
        };
        assert_eq!(report.accepted(), 1);
        assert_eq!(report.rejected(), 1);
        assert!(!report.is_complete());
    }
}
