//! Session context passed to the query service

use serde::{Deserialize, Serialize};

/// Identity of the logged-in user, injected into the folder system at
/// construction and attached to every query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// User name of the logged-in staff member
    pub user_name: String,
    /// Facility the user is currently working at, if any
    pub working_facility: Option<String>,
}

impl SessionContext {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            working_facility: None,
        }
    }

    /// Builder method to set the working facility
    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.working_facility = Some(facility.into());
        self
    }
}
