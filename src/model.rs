use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PlanError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub base_url: String,
    pub geocode_url: String,
    pub user_agent: String,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

/// One travel-plan request as the backend expects it: camelCase keys,
/// ISO dates, budgets as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub total_budget: f64,
    pub nightly_budget: f64,
    pub preferences: String,
}

impl TravelRequest {
    /// Field-level validation, run before anything touches the network.
    /// `today` is passed in so callers and tests agree on the clock.
    pub fn validate(&self, today: NaiveDate) -> Result<(), PlanError> {
        if self.origin.trim().chars().count() < 2 {
            return Err(PlanError::validation("origin", "enter the origin city"));
        }
        if self.destination.trim().chars().count() < 2 {
            return Err(PlanError::validation("destination", "enter the destination"));
        }
        if self.departure_date < today {
            return Err(PlanError::validation(
                "departureDate",
                "departure date cannot be in the past",
            ));
        }
        if let Some(ret) = self.return_date {
            if ret < self.departure_date {
                return Err(PlanError::validation(
                    "returnDate",
                    "return date must be on or after the departure date",
                ));
            }
        }
        if !self.total_budget.is_finite() || self.total_budget < 0.0 {
            return Err(PlanError::validation(
                "totalBudget",
                "budget cannot be negative",
            ));
        }
        if !self.nightly_budget.is_finite() || self.nightly_budget < 0.0 {
            return Err(PlanError::validation(
                "nightlyBudget",
                "budget cannot be negative",
            ));
        }
        if self.preferences.trim().chars().count() < 10 {
            return Err(PlanError::validation(
                "preferences",
                "describe your preferences (at least 10 characters)",
            ));
        }
        Ok(())
    }
}

/// Events emitted by the engine and consumed by presentation layers.
#[derive(Debug, Clone)]
pub enum PlanEvent {
    /// The outbound request was accepted and the body is about to stream.
    RequestSent,
    /// The full accumulated plan text after one more chunk arrived.
    /// Every snapshot is a prefix of the next one.
    Snapshot { text: String },
    Info(String),
}

/// A persisted plan: the request that produced it plus the final text.
/// On disk this keeps the field names the original web client wrote
/// (`formData`, `plan`), so either client can read the other's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlan {
    pub id: String,
    #[serde(rename = "formData")]
    pub request: TravelRequest,
    #[serde(rename = "plan")]
    pub plan_text: String,
}

impl SavedPlan {
    /// Ids are RFC 3339 creation timestamps; newest-first ordering falls
    /// out of the list order rather than the id.
    pub fn new(request: TravelRequest, plan_text: String) -> Self {
        let id = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into());
        Self {
            id,
            request,
            plan_text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}
