//! Customer profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::CustomerId;

/// A customer profile as returned by the commerce API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Backend customer id.
    pub id: Option<CustomerId>,
    /// The customer's email address.
    pub email: Option<Email>,
    /// First name.
    pub firstname: Option<String>,
    /// Last name.
    pub lastname: Option<String>,
    /// Whether the customer opted into the newsletter.
    #[serde(default)]
    pub is_subscribed: bool,
    /// When the account was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// The customer's full name, for greeting lines.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (&self.firstname, &self.lastname) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        }
    }
}
