use serde::Serialize;
use serde_json::Value;

use crate::cmd;
use crate::error::{LoginError, LoginResult};

const SUBSCRIPTION_ID: &str = "/compute/subscriptionId";
const NAME: &str = "/compute/name";
const PUBLIC_IP: &str = "/network/interface/0/ipv4/ipAddress/0/publicIpAddress";

/// The instance metadata fields the login rule is built from.
/// The subscription id is the password input and is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadata {
    #[serde(skip)]
    subscription_id: String,
    name: String,
    public_ip: String,
}

impl InstanceMetadata {
    #[must_use]
    pub fn new(subscription_id: &str, name: &str, public_ip: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            name: name.to_string(),
            public_ip: public_ip.to_string(),
        }
    }

    /// Extract the fields from a metadata document. Every field
    /// must be present as a string.
    pub fn from_document(doc: &Value) -> LoginResult<Self> {
        Ok(Self {
            subscription_id: field(doc, SUBSCRIPTION_ID)?,
            name: field(doc, NAME)?,
            public_ip: field(doc, PUBLIC_IP)?,
        })
    }

    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn public_ip(&self) -> &str {
        &self.public_ip
    }
}

fn field(doc: &Value, pointer: &str) -> LoginResult<String> {
    doc.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LoginError::MissingField(pointer.to_string()))
}

/// Parse a metadata response.
///
/// Returns `None` when the response is not a JSON object or is an
/// empty one, which callers treat as "no metadata available".
pub fn parse(text: &str) -> LoginResult<Option<InstanceMetadata>> {
    let doc: Value = serde_json::from_str(text)?;

    match &doc {
        Value::Object(map) if !map.is_empty() => InstanceMetadata::from_document(&doc).map(Some),
        _ => Ok(None),
    }
}

/// Queries the Azure instance metadata service through `curl`.
///
/// # Example
///
/// ```
/// use horizon_login::metadata::MetadataClient;
///
/// let client = MetadataClient::new();
///
/// assert_eq!(client.program, "curl");
/// assert_eq!(
///     client.query_url(),
///     "http://169.254.169.254/metadata/instance?api-version=2019-06-01"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MetadataClient {
    pub program: String,
    pub args: Vec<String>,
    pub url: String,
    pub api_version: String,
}

impl MetadataClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "curl".to_string(),
            args: vec!["-s".to_string(), "-H".to_string(), "Metadata:true".to_string()],
            url: "http://169.254.169.254/metadata/instance".to_string(),
            api_version: "2019-06-01".to_string(),
        }
    }

    #[must_use]
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// Replace the fetch command. The query URL is still appended
    /// as the last argument.
    #[must_use]
    pub fn command(mut self, program: &str, args: &[&str]) -> Self {
        self.program = program.to_string();
        self.args = args.iter().map(|a| (*a).to_string()).collect();
        self
    }

    #[must_use]
    pub fn query_url(&self) -> String {
        format!("{}?api-version={}", self.url, self.api_version)
    }

    /// Issue a single metadata query and parse the response.
    pub fn fetch(&self) -> LoginResult<Option<InstanceMetadata>> {
        let url = self.query_url();
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.push(&url);

        let output = cmd::run(&self.program, &args)?;
        parse(&output.stdout)
    }
}

impl Default for MetadataClient {
    fn default() -> Self {
        Self::new()
    }
}
