//! Frame builders for query results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use opsmgr_core::api::{AlertsResult, HealthState, MonitoringObject, PerformanceSeries, StateResponse};
use opsmgr_core::frame::{Field, Frame, Visualization};

/// Build the alerts table frame.
pub(crate) fn alerts_frame(alerts: &AlertsResult) -> Frame {
    let rows = &alerts.rows;

    Frame::new("data")
        .with_field(Field::str(
            "ID",
            rows.iter().map(|r| r.id.clone()).collect(),
        ))
        .with_field(Field::str(
            "Name",
            rows.iter().map(|r| r.name.clone()).collect(),
        ))
        .with_field(Field::str(
            "Severity",
            rows.iter().map(|r| r.severity.clone()).collect(),
        ))
        .with_field(Field::str(
            "Description",
            rows.iter().map(|r| r.description.clone()).collect(),
        ))
        .with_field(Field::str(
            "Object display name",
            rows.iter().map(|r| r.monitoring_object.clone()).collect(),
        ))
        .with_field(Field::str(
            "Age",
            rows.iter().map(|r| r.age.clone()).collect(),
        ))
        .with_field(Field::float(
            "Age (milliseconds)",
            rows.iter().map(|r| r.age_in_milliseconds).collect(),
        ))
        .with_field(Field::int(
            "Repeat count",
            rows.iter().map(|r| r.repeat_count).collect(),
        ))
        .with_visualization(Visualization::Table)
}

/// Build one time-series frame per object.
///
/// Sample timestamps come back as RFC3339 map keys; they are sorted
/// before parsing. Unparseable samples are skipped and logged.
pub(crate) fn performance_frames(series: &[PerformanceSeries]) -> Vec<Frame> {
    series
        .iter()
        .map(|entry| {
            let mut times: Vec<DateTime<Utc>> = Vec::new();
            let mut values: Vec<f64> = Vec::new();

            for dataset in &entry.data.datasets {
                let mut keys: Vec<&String> = dataset.data.keys().collect();
                keys.sort();

                for key in keys {
                    let time = match DateTime::parse_from_rfc3339(key) {
                        Ok(time) => time.with_timezone(&Utc),
                        Err(err) => {
                            warn!(timestamp = %key, error = %err, "skipping unparseable sample time");
                            continue;
                        }
                    };
                    let Some(value) = dataset.data[key].as_f64() else {
                        warn!(timestamp = %key, object = %entry.object.display_name, "skipping non-numeric sample");
                        continue;
                    };
                    times.push(time);
                    values.push(value);
                }
            }

            let count = times.len();
            Frame::new(&entry.object.display_name)
                .with_field(Field::time("Time", times))
                .with_field(Field::float("Value", values))
                .with_field(Field::str(
                    "Object id",
                    vec![entry.object.id.clone(); count],
                ))
                .with_field(Field::str(
                    "Object display name",
                    vec![entry.object.display_name.clone(); count],
                ))
                .with_field(Field::str(
                    "Object path",
                    vec![entry.object.path.clone().unwrap_or_default(); count],
                ))
                .with_field(Field::str(
                    "Object full name",
                    vec![entry.object.full_name.clone(); count],
                ))
                .with_visualization(Visualization::Graph)
        })
        .collect()
}

/// Build the health-state table frame for explicit instances, joining
/// health rows to object metadata by object id.
pub(crate) fn health_state_frame(states: &[HealthState], objects: &[MonitoringObject]) -> Frame {
    let by_id: HashMap<&str, &MonitoringObject> = objects
        .iter()
        .map(|object| (object.id.as_str(), object))
        .collect();

    let mut ids = Vec::with_capacity(states.len());
    let mut health_states = Vec::with_capacity(states.len());
    let mut alert_counts = Vec::with_capacity(states.len());
    let mut display_names = Vec::with_capacity(states.len());
    let mut class_names = Vec::with_capacity(states.len());
    let mut full_names = Vec::with_capacity(states.len());
    let mut paths = Vec::with_capacity(states.len());

    for state in states {
        ids.push(state.object_id.clone());
        health_states.push(state.health_state.clone());
        alert_counts.push(state.alert_count);

        // Unknown ids keep empty metadata so every column stays the
        // same length.
        match by_id.get(state.object_id.as_str()) {
            Some(object) => {
                display_names.push(object.display_name.clone());
                class_names.push(object.class_name.clone());
                full_names.push(object.full_name.clone());
                paths.push(object.path.clone().unwrap_or_default());
            }
            None => {
                display_names.push(String::new());
                class_names.push(String::new());
                full_names.push(String::new());
                paths.push(String::new());
            }
        }
    }

    Frame::new("states")
        .with_field(Field::str("Id", ids))
        .with_field(Field::str("Health state", health_states))
        .with_field(Field::int("Alert count", alert_counts))
        .with_field(Field::str("Class instance name", display_names))
        .with_field(Field::str("Class name", class_names))
        .with_field(Field::str("Full name", full_names))
        .with_field(Field::str("Path", paths))
        .with_visualization(Visualization::Table)
}

/// Build the state table frame for a group+class query.
pub(crate) fn group_state_frame(states: &StateResponse) -> Frame {
    let rows = &states.rows;

    Frame::new("groupStates")
        .with_field(Field::str(
            "Id",
            rows.iter().map(|r| r.id.clone()).collect(),
        ))
        .with_field(Field::str(
            "Health state",
            rows.iter().map(|r| r.health_state.clone()).collect(),
        ))
        .with_field(Field::str(
            "Name",
            rows.iter().map(|r| r.display_name.clone()).collect(),
        ))
        .with_field(Field::str(
            "Path",
            rows.iter()
                .map(|r| r.path.clone().unwrap_or_default())
                .collect(),
        ))
        .with_field(Field::str(
            "Maintenance mode",
            rows.iter().map(|r| r.maintenance_mode.clone()).collect(),
        ))
        .with_visualization(Visualization::Table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsmgr_core::api::{AlertRow, Dataset, PerformanceData, StateRow};
    use serde_json::json;

    fn object(id: &str, name: &str) -> MonitoringObject {
        MonitoringObject {
            id: id.into(),
            display_name: name.into(),
            class_name: "Windows Computer".into(),
            path: Some(format!("{name}.contoso.local")),
            full_name: format!("Microsoft.Windows.Computer:{name}"),
        }
    }

    #[test]
    fn alerts_frame_has_one_row_per_alert() {
        let alerts = AlertsResult {
            rows: vec![AlertRow {
                id: "a1".into(),
                severity: "2".into(),
                name: "Disk full".into(),
                ..Default::default()
            }],
        };
        let frame = alerts_frame(&alerts);
        assert_eq!(frame.row_count(), 1);
        assert_eq!(frame.fields.len(), 8);
    }

    #[test]
    fn performance_frames_sort_samples_and_skip_bad_points() {
        let mut data = HashMap::new();
        data.insert("2024-05-02T10:01:00Z".to_string(), json!(2.0));
        data.insert("2024-05-02T10:00:00Z".to_string(), json!(1.0));
        data.insert("not-a-time".to_string(), json!(3.0));
        data.insert("2024-05-02T10:02:00Z".to_string(), json!("high"));

        let series = vec![PerformanceSeries {
            object: object("o1", "SQL01"),
            data: PerformanceData {
                datasets: vec![Dataset {
                    data,
                    id: "d1".into(),
                }],
                ..Default::default()
            },
        }];

        let frames = performance_frames(&series);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name, "SQL01");
        // two valid samples, in timestamp order
        assert_eq!(frames[0].row_count(), 2);
        match &frames[0].fields[1].values {
            opsmgr_core::frame::FieldValues::Float(values) => {
                assert_eq!(values, &vec![1.0, 2.0]);
            }
            other => panic!("unexpected value column: {other:?}"),
        }
    }

    #[test]
    fn health_state_frame_joins_by_object_id() {
        let states = vec![
            HealthState {
                object_id: "o1".into(),
                health_state: "Success".into(),
                alert_count: 2,
                ..Default::default()
            },
            HealthState {
                object_id: "missing".into(),
                health_state: "Error".into(),
                alert_count: 0,
                ..Default::default()
            },
        ];
        let objects = vec![object("o1", "SQL01")];

        let frame = health_state_frame(&states, &objects);
        assert_eq!(frame.row_count(), 2);
        // every column has the same length even for the unmatched id
        for field in &frame.fields {
            assert_eq!(field.len(), 2);
        }
    }

    #[test]
    fn group_state_frame_carries_maintenance_mode() {
        let states = StateResponse {
            rows: vec![StateRow {
                id: "o1".into(),
                health_state: "Success".into(),
                display_name: "SQL01".into(),
                path: None,
                maintenance_mode: "False".into(),
            }],
        };
        let frame = group_state_frame(&states);
        assert_eq!(frame.row_count(), 1);
        assert_eq!(frame.fields.len(), 5);
    }
}
