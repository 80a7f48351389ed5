use serde::{Deserialize, Serialize};

/// The four record commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Create,
    Update,
    Retrieve,
    Delete,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Create => "CREATE",
            Command::Update => "UPDATE",
            Command::Retrieve => "RETRIEVE",
            Command::Delete => "DELETE",
        }
    }
}

/// A key/value pair as held by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: String,
}

/// Write request as received; `value` stays optional until validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordInput {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl RecordInput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: Some(value.into()) }
    }
}

/// Outcome of one command, built per request and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub key: String,
    pub value: Option<String>,
    pub command: Command,
    #[serde(rename = "result")]
    pub succeeded: bool,
    pub error: Option<String>,
}

impl OperationResult {
    pub fn success(command: Command, key: impl Into<String>, value: Option<String>) -> Self {
        Self { key: key.into(), value, command, succeeded: true, error: None }
    }
}
