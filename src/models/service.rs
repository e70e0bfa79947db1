use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NOT_SPECIFIED: &str = "not specified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of both the create and the partial-update admin calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Result of resolving a booking's service reference. Services can be deleted
/// while bookings keep pointing at them, so the dangling case is expected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceLookup<'a> {
    Found(&'a Service),
    Dangling(&'a str),
    Unspecified,
}

impl<'a> ServiceLookup<'a> {
    pub fn resolve(services: &'a [Service], service_id: &'a str) -> Self {
        if service_id.trim().is_empty() {
            return ServiceLookup::Unspecified;
        }
        services
            .iter()
            .find(|s| s.id == service_id)
            .map(ServiceLookup::Found)
            .unwrap_or(ServiceLookup::Dangling(service_id))
    }

    /// Name shown in admin listings and the export.
    pub fn display_name(&self) -> &'a str {
        match self {
            ServiceLookup::Found(service) => &service.name,
            ServiceLookup::Dangling(_) | ServiceLookup::Unspecified => NOT_SPECIFIED,
        }
    }

    /// Name used in admin notifications: a dangling reference is shown raw,
    /// since clients may submit a free-text service name.
    pub fn notification_label(&self) -> &'a str {
        match self {
            ServiceLookup::Found(service) => &service.name,
            ServiceLookup::Dangling(raw) => raw,
            ServiceLookup::Unspecified => NOT_SPECIFIED,
        }
    }
}
