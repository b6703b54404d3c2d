use serde::{Deserialize, Serialize};

/// The identity of a verified admin account.
///
/// This is what a session carries; it never contains the password or its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
}
