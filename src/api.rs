use crate::error::ApiError;
use crate::keymap::{Keymaps, WireKeymaps};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Body of the bulk save and of the snapshot load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeymapsPayload {
    pub keymaps: WireKeymaps,
}

/// JSON answer of the save endpoint, for both success and failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SaveResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub message: Option<String>,
}

/// Fallback when the backend rejects a save without saying why.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Where keymap snapshots are loaded from and saved to.
///
/// `save` receives the full six-layer snapshot and must apply it as a single
/// all-or-nothing unit.
pub trait KeymapApi: Send + Sync {
    fn load(&self) -> Result<Keymaps, ApiError>;
    fn save(&self, keymaps: &Keymaps) -> Result<SaveReceipt, ApiError>;
}

/// Talks to the keymap endpoint of a remote server.
#[derive(Debug, Clone)]
pub struct HttpKeymapClient {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl HttpKeymapClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie: None,
        }
    }

    /// Cookie header value identifying an already authenticated session.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/keymaps/current", self.base_url)
    }

    fn request(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        let builder = builder.header(ACCEPT, "application/json");
        match &self.session_cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }
}

impl KeymapApi for HttpKeymapClient {
    fn load(&self) -> Result<Keymaps, ApiError> {
        let resp = self.request(self.client.get(self.endpoint())).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body: SaveResponse = resp.json().unwrap_or_default();
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: body.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            });
        }

        let payload: KeymapsPayload = resp.json()?;
        Keymaps::from_wire(payload.keymaps).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn save(&self, keymaps: &Keymaps) -> Result<SaveReceipt, ApiError> {
        let payload = KeymapsPayload {
            keymaps: keymaps.to_wire(),
        };
        info!(assignments = keymaps.len(), url = %self.endpoint(), "saving keymaps");

        let resp = self
            .request(self.client.patch(self.endpoint()))
            .json(&payload)
            .send()?;
        let status = resp.status();
        let body: SaveResponse = resp.json().unwrap_or_default();

        if status.is_success() {
            Ok(SaveReceipt {
                message: body.message,
            })
        } else {
            let message = body.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            warn!(status = status.as_u16(), %message, "keymap save rejected");
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
