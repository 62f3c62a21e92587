// ============================================================
// Layer 6 — Storage Credentials
// ============================================================
// The credential file holds a bearer token for the storage API,
// in one of two shapes:
//
//   {"access_token": "ya29...."}     ← JSON, as printed by most
//                                       token helpers
//   ya29....                         ← the raw token on one line
//
// A missing, unreadable or empty file is a CredentialError and
// stops the remote fetch before any network traffic happens.

use std::{fmt, fs, path::Path};

use serde::Deserialize;

use crate::domain::errors::LoadError;

#[derive(Clone)]
pub struct Credentials {
    token: String,
}

#[derive(Deserialize)]
struct TokenFile {
    access_token: String,
}

impl Credentials {
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let fail = |reason: String| LoadError::Credential {
            path: path.to_path_buf(),
            reason,
        };

        if !path.exists() {
            return Err(fail("file not found".to_string()));
        }
        let text = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let text = text.trim();

        if text.starts_with('{') {
            let parsed: TokenFile = serde_json::from_str(text)
                .map_err(|e| fail(format!("expected an 'access_token' field: {e}")))?;
            return Self::from_token(parsed.access_token).ok_or_else(|| fail("empty access_token".into()));
        }

        Self::from_token(text.to_string()).ok_or_else(|| fail("file is empty".to_string()))
    }

    fn from_token(token: String) -> Option<Self> {
        let token = token.trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self { token })
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.token
    }
}

// Never print the token itself
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}
