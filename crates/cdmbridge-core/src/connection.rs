//! Connection string for the metadata service
//!
//! Format: `AuthType=ClientSecret;Url=https://org.crm4.dynamics.com;ClientId=..;ClientSecret=..;TenantId=..;`
//! Keys are case-insensitive and empty segments are ignored. Keys this tool
//! has no use for (`RedirectUri`, `LoginPrompt`, `Authority`, ...) are kept
//! by name only in `ignored_keys`.

use std::fmt;
use std::str::FromStr;

/// Parsed connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Authentication scheme (e.g. `ClientSecret`)
    pub auth_type: Option<String>,

    /// Service endpoint
    pub url: String,

    pub client_id: Option<String>,

    pub client_secret: Option<String>,

    pub tenant_id: Option<String>,

    /// Keys with no matching setting, lowercased
    pub ignored_keys: Vec<String>,
}

impl ConnectionConfig {
    /// Create settings for an endpoint with no credentials
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            auth_type: None,
            url: url.into(),
            client_id: None,
            client_secret: None,
            tenant_id: None,
            ignored_keys: Vec::new(),
        }
    }

    /// Parse a semicolon-delimited connection string
    pub fn parse(input: &str) -> Result<Self, ConnectionStringError> {
        let mut auth_type = None;
        let mut url = None;
        let mut client_id = None;
        let mut client_secret = None;
        let mut tenant_id = None;
        let mut ignored_keys = Vec::new();

        for segment in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::MalformedSegment(segment.to_string()))?;

            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "authtype" => auth_type = Some(value),
                "url" | "serviceuri" => url = Some(value),
                "clientid" | "appid" => client_id = Some(value),
                "clientsecret" | "secret" => client_secret = Some(value),
                "tenantid" => tenant_id = Some(value),
                other => ignored_keys.push(other.to_string()),
            }
        }

        let url = url
            .filter(|u| !u.is_empty())
            .ok_or(ConnectionStringError::MissingUrl)?;

        Ok(Self {
            auth_type,
            url,
            client_id,
            client_secret,
            tenant_id,
            ignored_keys,
        })
    }

    /// Whether all client-secret credentials are present
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.tenant_id.is_some()
    }
}

impl FromStr for ConnectionConfig {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// The secret is never printed.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("auth_type", &self.auth_type)
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("tenant_id", &self.tenant_id)
            .field("ignored_keys", &self.ignored_keys)
            .finish()
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.auth_type {
            Some(auth) => write!(f, "{} ({})", self.url, auth),
            None => write!(f, "{}", self.url),
        }
    }
}

/// Connection string errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionStringError {
    #[error("Connection string has no Url")]
    MissingUrl,

    #[error("Malformed connection string segment: '{0}' (expected Key=Value)")]
    MalformedSegment(String),
}
