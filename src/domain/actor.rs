use serde::{Deserialize, Serialize};

/// The staff member or system on whose behalf an operation runs.
///
/// Passed explicitly to every mutating engine operation; `name` is what gets
/// stamped into `created_by`/`checked_in_by`/`checked_out_by`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Actor for unattended flows (replays, maintenance jobs).
    pub fn system() -> Self {
        Self::new("system", "System")
    }
}
