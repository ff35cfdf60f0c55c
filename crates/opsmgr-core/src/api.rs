//! Wire types for the Operations Manager data API.
//!
//! Field renames follow the backend's JSON exactly; the casing is
//! inconsistent across endpoints (camelCase envelopes, lowercased row
//! columns) and is preserved as-is. Response types derive `Default` so
//! an empty response body decodes to the zero value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A performance counter identity (object, counter, instance).
///
/// The lowercase field names match both the counter-listing rows and
/// the performance request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceCounter {
    #[serde(rename = "objectname")]
    pub object_name: String,
    #[serde(rename = "countername")]
    pub counter_name: String,
    #[serde(rename = "instancename", default)]
    pub instance_name: String,
}

/// A monitored object (class instance).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringObject {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub full_name: String,
}

/// A monitoring class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringClass {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub full_name: String,
}

/// A monitoring group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringGroup {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub full_name: String,
}

/// Envelope for endpoints that answer with `scopeDatas`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeResponse<T> {
    #[serde(default = "Vec::new")]
    pub scope_datas: Vec<T>,
}

/// Envelope for endpoints that answer with a `rows` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowsResponse<T> {
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
}

// ============================================================================
// Alerts
// ============================================================================

/// Request body for the alert query endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest<'a> {
    pub criteria: &'a str,
    pub display_columns: &'a [&'a str],
    pub class_id: &'a str,
}

/// One alert row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub severity: String,
    #[serde(rename = "monitoringobjectdisplayname", default)]
    pub monitoring_object: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(rename = "ageinmilliseconds", default)]
    pub age_in_milliseconds: f64,
    #[serde(rename = "repeatcount", default)]
    pub repeat_count: i64,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "monitoringobjectid", default)]
    pub monitoring_object_id: String,
    #[serde(rename = "monitoringclassid", default)]
    pub monitoring_class_id: String,
}

/// Response from the alert query endpoint.
pub type AlertsResult = RowsResponse<AlertRow>;

// ============================================================================
// State
// ============================================================================

/// Request body for the state query endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRequest<'a> {
    pub class_id: &'a str,
    pub group_id: &'a str,
    pub object_ids: &'a [&'a str],
    pub criteria: &'a str,
    pub display_columns: &'a [&'a str],
}

/// One row of an object/group/class state response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateRow {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "healthstate", default)]
    pub health_state: String,
    #[serde(rename = "displayname", default)]
    pub display_name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "maintenancemode", default)]
    pub maintenance_mode: String,
}

/// Response from the state query endpoint.
pub type StateResponse = RowsResponse<StateRow>;

// ============================================================================
// Health state
// ============================================================================

/// One monitor node under an object's health rollup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorNode {
    #[serde(default)]
    pub health_state: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub monitor_id: String,
    #[serde(default)]
    pub monitor_display_name: Option<String>,
    #[serde(default)]
    pub monitor_name: String,
    #[serde(default)]
    pub last_time_modified: String,
}

/// Health state of a single monitored object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthState {
    #[serde(default)]
    pub child_node_datas: Vec<MonitorNode>,
    #[serde(default)]
    pub alert_count: i64,
    #[serde(default)]
    pub health_state: String,
    #[serde(default)]
    pub object_id: String,
}

// ============================================================================
// Performance
// ============================================================================

/// Request body for the performance-data endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRequest<'a> {
    pub duration: u32,
    pub id: &'a str,
    pub performance_counters: &'a [PerformanceCounter],
}

/// One sampled series: timestamp (RFC3339) to raw value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub id: String,
}

/// One legend row summarizing a series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegendRow {
    #[serde(rename = "performanceobject", default)]
    pub performance_object: String,
    #[serde(rename = "performancecounter", default)]
    pub performance_counter: String,
    #[serde(rename = "performanceinstance", default)]
    pub performance_instance: String,
    #[serde(rename = "averagevalue", default)]
    pub average_value: f64,
    #[serde(rename = "maximumvalue", default)]
    pub maximum_value: f64,
    #[serde(rename = "minimumvalue", default)]
    pub minimum_value: f64,
    #[serde(rename = "lastvalue", default)]
    pub last_value: f64,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub id: String,
}

/// Legend table attached to a performance response.
pub type Legend = RowsResponse<LegendRow>;

/// Raw performance response for one object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceData {
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(default)]
    pub legends: Legend,
}

/// Performance data joined with the object it was fetched for.
///
/// The object metadata does not come over the wire; it is attached
/// locally so frame builders can label series.
#[derive(Debug, Clone)]
pub struct PerformanceSeries {
    pub object: MonitoringObject,
    pub data: PerformanceData,
}
