use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of an authenticated user, as handed over by the auth layer.
///
/// `0` is the unset value and never names a real user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    pub fn is_missing(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user_{}", self.0)
    }
}
