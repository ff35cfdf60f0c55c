//! Resource-call router.
//!
//! The hosting side addresses client operations by name with
//! query-string style parameters; results come back as plain JSON.

use std::collections::HashMap;

use tracing::{debug, instrument};

use opsmgr_core::{Error, Result};

use crate::client::OpsClient;

/// Multi-valued request parameters, as parsed from a query string.
pub type ResourceParams = HashMap<String, Vec<String>>;

fn first<'a>(params: &'a ResourceParams, key: &str) -> &'a str {
    params
        .get(key)
        .and_then(|values| values.first())
        .map(String::as_str)
        .unwrap_or_default()
}

fn all(params: &ResourceParams, key: &str) -> Vec<String> {
    params.get(key).cloned().unwrap_or_default()
}

impl OpsClient {
    /// Dispatch a named resource operation.
    #[instrument(skip(self, params))]
    pub async fn call_resource(
        &self,
        path: &str,
        params: &ResourceParams,
    ) -> Result<serde_json::Value> {
        debug!("resource call");

        let result = match path {
            "getClasses" => to_json(self.get_classes(first(params, "query")).await?)?,
            "getObjects" => to_json(self.get_objects_by_class(first(params, "className")).await?)?,
            "getCounters" => {
                to_json(self.get_performance_counters(&all(params, "entityIds")).await?)?
            }
            "getObjectsHealthState" => to_json(
                self.get_objects_by_class(first(params, "selectedClassNameHealthState"))
                    .await?,
            )?,
            "getGroups" => to_json(self.get_groups().await?)?,
            "getObjectsByGroup" => to_json(
                self.get_state(first(params, "groupId"), first(params, "classIdGroup"))
                    .await?
                    .rows,
            )?,
            "getClassesForObject" => {
                to_json(self.get_classes_for_object(first(params, "objectId")).await?)?
            }
            other => return Err(Error::UnknownResource(other.to_string())),
        };

        Ok(result)
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(Error::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_returns_empty_for_missing_keys() {
        let mut params = ResourceParams::new();
        params.insert("query".into(), vec!["SQL".into()]);

        assert_eq!(first(&params, "query"), "SQL");
        assert_eq!(first(&params, "className"), "");
        assert!(all(&params, "entityIds").is_empty());
    }
}
