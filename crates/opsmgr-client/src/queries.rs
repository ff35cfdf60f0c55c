//! Top-level query dispatch.
//!
//! A batch of logical queries is classified, validated, fetched, and
//! framed; each query runs as an independent concurrent unit and its
//! outcome is aggregated under the caller's ref id, so one failing
//! query never blanks its siblings.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument};

use opsmgr_core::api::MonitoringObject;
use opsmgr_core::query::{PerformanceQuery, StateQuery};
use opsmgr_core::{Error, ErrorOrigin, Frame, Query, QueryRequest, Result};

use crate::client::OpsClient;
use crate::fanout::{FailurePolicy, fan_out};
use crate::frames;

/// Outcome of one query, keyed by its ref id in the batch response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_origin: Option<ErrorOrigin>,
}

impl QueryResponse {
    fn success(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            error: None,
            error_origin: None,
        }
    }

    fn failure(err: &Error) -> Self {
        Self {
            frames: Vec::new(),
            error: Some(err.to_string()),
            error_origin: Some(err.origin()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl OpsClient {
    /// Run a batch of logical queries concurrently.
    ///
    /// Each query either fully succeeds or fully fails; its outcome,
    /// error included, lands under its own ref id.
    #[instrument(skip(self, requests), fields(queries = requests.len()))]
    pub async fn run_queries(
        &self,
        requests: Vec<QueryRequest>,
    ) -> HashMap<String, QueryResponse> {
        debug!("dispatching query batch");

        let tasks = requests
            .into_iter()
            .map(|request| {
                let client = self.clone();
                (request.ref_id.clone(), async move {
                    Ok(match client.handle_query(&request).await {
                        Ok(frames) => QueryResponse::success(frames),
                        Err(err) => QueryResponse::failure(&err),
                    })
                })
            })
            .collect();

        // Per-query errors are captured into the response value, so the
        // engine itself cannot fail here.
        fan_out(tasks, FailurePolicy::BestEffort, self.max_concurrency())
            .await
            .unwrap_or_default()
    }

    async fn handle_query(&self, request: &QueryRequest) -> Result<Vec<Frame>> {
        let query = Query::parse(&request.query)?;
        query.validate()?;

        match query {
            Query::Alerts(q) => {
                let alerts = self.get_alerts(q.effective_criteria()).await?;
                Ok(vec![frames::alerts_frame(&alerts)])
            }
            Query::Performance(q) => self.handle_performance_query(request, q).await,
            Query::State(q) => self.handle_state_query(q).await,
        }
    }

    async fn handle_performance_query(
        &self,
        request: &QueryRequest,
        query: PerformanceQuery,
    ) -> Result<Vec<Frame>> {
        // A group query addresses the group's members; resolve them
        // through the state endpoint first.
        let instances = match (query.groups.first(), query.classes.first()) {
            (Some(group), Some(class)) => {
                let members = self.get_state(&group.id, &class.id).await?;
                members
                    .rows
                    .into_iter()
                    .map(|row| MonitoringObject {
                        id: row.id,
                        display_name: row.display_name,
                        class_name: String::new(),
                        path: row.path,
                        full_name: String::new(),
                    })
                    .collect()
            }
            _ => query.instances,
        };

        let series = self
            .get_performance_data(request.duration_minutes, &instances, &query.counters)
            .await?;
        Ok(frames::performance_frames(&series))
    }

    async fn handle_state_query(&self, query: StateQuery) -> Result<Vec<Frame>> {
        if !query.instances.is_empty() {
            let states = self.get_health_states(&query.instances).await?;
            return Ok(vec![frames::health_state_frame(&states, &query.instances)]);
        }

        // Validation guarantees the group+class pair when no explicit
        // instances are given.
        let (Some(group), Some(class)) = (query.groups.first(), query.classes.first()) else {
            return Err(Error::InvalidQuery(
                "explicit instances or a group and class pair are required".into(),
            ));
        };

        let states = self.get_state(&group.id, &class.id).await?;
        Ok(vec![frames::group_state_frame(&states)])
    }
}
