//! Authenticated principal.

use serde::{Deserialize, Serialize};

/// Identity carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// Unique id of the caller
    pub uid: String,
}

impl Auth {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}
