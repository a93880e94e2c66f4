use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer credential returned by the orchestrator's token endpoint.
///
/// Obtained once per run and attached to every subsequent call. There is no
/// refresh path; a token that expires mid-run surfaces as a failed status
/// fetch.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub authorization: String,
}

impl AccessToken {
    pub fn new(authorization: impl Into<String>) -> Self {
        Self {
            authorization: authorization.into(),
        }
    }
}

// The token value must never reach logs; Debug prints a placeholder.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("authorization", &"<redacted>")
            .finish()
    }
}
