//! Backend endpoint paths and fixed request columns.

/// POST: login exchange.
pub const AUTHENTICATE: &str = "/OperationsManager/authenticate";

/// POST: alert query.
pub const ALERTS: &str = "/OperationsManager/data/alert";

/// POST: performance-data query for one object.
pub const PERFORMANCE: &str = "/OperationsManager/data/performance";

/// POST: class listing by display-name criteria.
pub const SCOM_CLASSES: &str = "/OperationsManager/data/scomClasses";

/// POST: group listing.
pub const SCOM_GROUPS: &str = "/OperationsManager/data/scomGroups";

/// POST: object listing by id criteria.
pub const SCOM_OBJECTS: &str = "/OperationsManager/data/scomObjects";

/// POST: object listing by class name.
pub const SCOM_OBJECTS_BY_CLASS: &str = "/OperationsManager/data/scomObjectsByClass";

/// POST: object/group/class state query.
pub const STATE: &str = "/OperationsManager/data/state";

/// GET: health state for one object.
pub fn monitoring(object_id: &str) -> String {
    format!("/OperationsManager/data/monitoring/{object_id}")
}

/// GET: performance counters available on one object.
pub fn performance_counters(object_id: &str) -> String {
    format!("/OperationsManager/data/performanceCounters/{object_id}")
}

/// GET: classes one object belongs to.
pub fn classes_for_object(object_id: &str) -> String {
    format!("/OperationsManager/data/classesForObject/{object_id}")
}

/// Columns requested from the alert endpoint.
pub const ALERT_COLUMNS: &[&str] = &[
    "severity",
    "monitoringobjectdisplayname",
    "name",
    "age",
    "repeatcount",
    "description",
    "monitoringobjectid",
    "monitoringclassid",
];

/// Columns requested from the state endpoint.
pub const STATE_COLUMNS: &[&str] = &["healthstate", "displayname", "path", "maintenancemode"];
