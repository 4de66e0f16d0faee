//! Scripted transport: replays queued responses and records every request.
#![allow(dead_code)]

use reqwest::StatusCode;
use scicat_ingest::error::{CatalogError, Result};
use scicat_ingest::transport::{ApiRequest, ApiResponse, Transport};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<ApiResponse>>,
    requests: Vec<ApiRequest>,
}

/// Clones share the same script, so a test can keep a handle after moving
/// one into an `ApiClient`.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: impl Into<String>) -> &Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.inner
            .borrow_mut()
            .responses
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    /// Queue a failure in place of a response.
    pub fn fail(&self, err: CatalogError) -> &Self {
        self.inner.borrow_mut().responses.push_back(Err(err));
        self
    }

    pub fn reply_json(&self, status: u16, body: Value) -> &Self {
        self.reply(status, body.to_string())
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.borrow().requests.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path()))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut script = self.inner.borrow_mut();
        script.requests.push(request);
        script
            .responses
            .pop_front()
            .expect("no scripted response left")
    }

    fn base_url(&self) -> &str {
        "http://catalog.test/api/v3"
    }
}

/// A real reqwest error, as a connection failure would surface it.
pub fn transport_error() -> CatalogError {
    let err = reqwest::blocking::Client::new()
        .get("not a url")
        .build()
        .expect_err("unparsable URL");
    CatalogError::Transport(err)
}

pub fn login_ok(transport: &ScriptedTransport) {
    transport.reply_json(201, json!({"id": "tok-123", "ttl": 1209600}));
}

pub fn credentials() -> scicat_ingest::credentials::Credentials {
    scicat_ingest::credentials::Credentials::parse("user=ingestor\npassword=s3cret\n")
        .expect("credentials")
}

pub fn proposal_doc(samples: &[(&str, &str)]) -> Value {
    let samples: Vec<Value> = samples
        .iter()
        .map(|(name, qr)| json!({"specimen_name": name, "qr_code_label": qr}))
        .collect();
    json!({
        "proposalId": "PROP9",
        "title": "Serial MicroCT of museum insects",
        "ownerGroup": "smart-morph",
        "accessGroups": ["ips", "desy"],
        "pi_firstname": "Ada",
        "pi_lastname": "Lovelace",
        "firstname": "Charles",
        "lastname": "Babbage",
        "email": "charles@example.org",
        "pi_email": "ada@example.org",
        "metadata": {"samples": samples}
    })
}
