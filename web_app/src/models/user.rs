use serde::{Deserialize, Serialize};

use crate::consts;

/// Identity stored in the signed identity cookie once a user logs in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub username: String,
}

impl SessionUser {
    pub fn anonymous() -> Self {
        Self {
            username: consts::ANONYMOUS_USER.to_string(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.username == consts::ANONYMOUS_USER
    }
}
