//! The tagged query model and its structural validation.
//!
//! A caller's query payload is discriminated by a `type` field into one
//! of three shapes. Parsing and validation both happen before any
//! network call is made.

use serde::Deserialize;

use crate::api::{MonitoringClass, MonitoringGroup, MonitoringObject, PerformanceCounter};
use crate::error::Error;
use crate::Result;

/// Criteria applied when an alerts query leaves its criteria blank.
pub const DEFAULT_ALERT_CRITERIA: &str = "Severity = 2 AND ResolutionState = 0";

/// Default time range for performance queries, in minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// One logical query submitted to the dispatch layer.
///
/// The payload stays raw JSON here; [`Query::parse`] classifies it so a
/// bad payload fails only its own ref, not the whole batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Caller-supplied key the response is aggregated under.
    pub ref_id: String,
    /// Time range for performance queries, in minutes.
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// The query payload, discriminated by its `type` field.
    pub query: serde_json::Value,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

/// A classified query payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Query {
    Alerts(AlertsQuery),
    Performance(PerformanceQuery),
    State(StateQuery),
}

/// Alert listing by criteria string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub criteria: String,
}

impl AlertsQuery {
    /// The caller's criteria, or the default when blank.
    pub fn effective_criteria(&self) -> &str {
        let trimmed = self.criteria.trim();
        if trimmed.is_empty() {
            DEFAULT_ALERT_CRITERIA
        } else {
            trimmed
        }
    }
}

/// Performance series for a counter selection over instances or a group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceQuery {
    #[serde(default)]
    pub counters: Vec<PerformanceCounter>,
    #[serde(default)]
    pub instances: Vec<MonitoringObject>,
    #[serde(default)]
    pub groups: Vec<MonitoringGroup>,
    #[serde(default)]
    pub classes: Vec<MonitoringClass>,
}

/// Health state for explicit instances or a group+class pair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateQuery {
    #[serde(default)]
    pub instances: Vec<MonitoringObject>,
    #[serde(default)]
    pub groups: Vec<MonitoringGroup>,
    #[serde(default)]
    pub classes: Vec<MonitoringClass>,
}

impl Query {
    /// Classify a raw payload by its `type` discriminator.
    ///
    /// An unrecognized or missing discriminator is
    /// [`Error::UnknownQueryType`]; a recognized discriminator with a
    /// malformed body is [`Error::InvalidQuery`]. Both are caller
    /// input, so both classify as local.
    pub fn parse(raw: &serde_json::Value) -> Result<Self> {
        let kind = raw.get("type").and_then(|v| v.as_str()).unwrap_or_default();
        match kind {
            "alerts" | "performance" | "state" => serde_json::from_value(raw.clone())
                .map_err(|err| Error::InvalidQuery(format!("malformed {kind} query: {err}"))),
            other => Err(Error::UnknownQueryType(other.to_string())),
        }
    }

    /// Check the shape's required inputs. Runs before any fetch.
    pub fn validate(&self) -> Result<()> {
        match self {
            Query::Alerts(_) => Ok(()),
            Query::Performance(q) => {
                if q.counters.is_empty() {
                    return Err(Error::InvalidQuery(
                        "at least one performance counter is required".into(),
                    ));
                }
                if q.instances.is_empty() && q.groups.is_empty() {
                    return Err(Error::InvalidQuery(
                        "at least one instance or group is required".into(),
                    ));
                }
                if !q.groups.is_empty() && q.classes.is_empty() {
                    return Err(Error::InvalidQuery(
                        "a group performance query requires a class".into(),
                    ));
                }
                Ok(())
            }
            Query::State(q) => {
                if q.instances.is_empty() && (q.groups.is_empty() || q.classes.is_empty()) {
                    return Err(Error::InvalidQuery(
                        "explicit instances or a group and class pair are required".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}
