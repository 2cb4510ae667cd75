use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// An actor vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-issued stable id.
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

/// Emails allowed to sign in. An empty list lets everyone in.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    emails: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        self.emails.is_empty() || self.emails.contains(&email.trim().to_lowercase())
    }
}

pub fn authorize<'a>(identity: &'a Identity, allow_list: &AllowList) -> Result<&'a Identity> {
    if allow_list.is_allowed(&identity.email) {
        Ok(identity)
    } else {
        warn!(email = %identity.email, "sign-in rejected by allow list");
        Err(Error::NotAllowed(identity.email.clone()))
    }
}
