//! Domain entities. Pure data structures for the core business.
//!
//! No provider/IO types here — adapters map into these.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A member of the welfare group. Owned by the persistence layer; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
}

/// Per-recipient values available to message templates.
///
/// Built by a `MessageContextFactory` from a [`User`] and consumed once while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    pub name: String,
    pub first_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub team: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub organization: String,
}

impl MessageContext {
    /// Placeholder names understood by [`MessageContext::field`].
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "first_name",
        "phone",
        "email",
        "team",
        "join_date",
        "organization",
    ];

    /// Look up a placeholder value. `None` means the field name is unknown;
    /// a known but absent optional field yields an empty string.
    pub fn field(&self, key: &str) -> Option<String> {
        let value = match key {
            "name" => self.name.clone(),
            "first_name" => self.first_name.clone(),
            "phone" => self.phone.clone(),
            "email" => self.email.clone().unwrap_or_default(),
            "team" => self.team.clone().unwrap_or_default(),
            "join_date" => self
                .join_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            "organization" => self.organization.clone(),
            _ => return None,
        };
        Some(value)
    }
}
