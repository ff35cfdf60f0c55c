//! The Operations Manager client and its typed request dispatcher.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use opsmgr_core::api::{
    AlertRequest, AlertsResult, HealthState, MonitoringClass, MonitoringGroup, MonitoringObject,
    PerformanceCounter, PerformanceData, PerformanceRequest, PerformanceSeries, RowsResponse,
    ScopeResponse, StateRequest, StateResponse,
};
use opsmgr_core::{AuthScheme, ConnectionSettings, Error, Result};

use crate::auth::{BasicExchange, CredentialExchange};
use crate::endpoints;
use crate::fanout::{FailurePolicy, fan_out};
use crate::session::SessionState;
use crate::transport::AuthTransport;

/// Fixed per-request timeout for every network call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a health check, with a message fit for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub ok: bool,
    pub message: String,
}

/// An authenticated client for one Operations Manager backend.
///
/// Cheap to clone (internal `Arc`) and safe to share across tasks; the
/// session tokens are the only shared mutable state and are guarded by
/// the transport.
#[derive(Clone)]
pub struct OpsClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: AuthTransport,
    settings: ConnectionSettings,
}

impl OpsClient {
    /// Authenticate against the backend and build a usable client.
    ///
    /// The first credential exchange runs here; a client is never
    /// handed out without a populated session.
    #[instrument(skip(settings), fields(base = %settings.base_url()))]
    pub async fn connect(settings: ConnectionSettings) -> Result<Self> {
        info!("connecting to Operations Manager backend");

        let http = build_http_client(&settings)?;
        let exchange = build_exchange(&settings, http.clone());

        let tokens = exchange.authenticate(&settings).await?;
        debug!("initial session established");

        let state = SessionState::new(tokens);
        let transport = AuthTransport::new(http, settings.clone(), state, exchange);

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                settings,
            }),
        })
    }

    /// Verify the configured credentials without keeping a client.
    pub async fn check_health(settings: &ConnectionSettings) -> HealthStatus {
        let attempt = match build_http_client(settings) {
            Ok(http) => build_exchange(settings, http)
                .authenticate(settings)
                .await
                .map(|_| ()),
            Err(err) => Err(err),
        };

        match attempt {
            Ok(()) => HealthStatus {
                ok: true,
                message: "data source is working".into(),
            },
            Err(err) => {
                error!(error = %err, "health check failed");
                HealthStatus {
                    ok: false,
                    message: "authentication against the backend failed, check logs for details"
                        .into(),
                }
            }
        }
    }

    pub(crate) fn max_concurrency(&self) -> usize {
        self.inner.settings.max_concurrency()
    }

    // ========================================================================
    // Typed request dispatcher
    // ========================================================================

    async fn dispatch<T>(&self, method: Method, endpoint: &str, body: Option<Vec<u8>>) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self
            .inner
            .transport
            .send(method, endpoint, body.as_deref())
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.is_empty() {
            return Ok(T::default());
        }

        serde_json::from_slice(&bytes).map_err(Error::Decode)
    }

    async fn get_json<T>(&self, endpoint: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        self.dispatch(Method::GET, endpoint, None).await
    }

    async fn post_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        // Serialized once so the transport can replay the exact bytes
        // on its post-refresh retry.
        let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
        self.dispatch(Method::POST, endpoint, Some(payload)).await
    }

    // ========================================================================
    // API operations
    // ========================================================================

    /// Fetch alerts matching a criteria expression.
    #[instrument(skip(self))]
    pub async fn get_alerts(&self, criteria: &str) -> Result<AlertsResult> {
        debug!("fetching alerts");
        let request = AlertRequest {
            criteria,
            display_columns: endpoints::ALERT_COLUMNS,
            class_id: "",
        };
        self.post_json(endpoints::ALERTS, &request).await
    }

    /// Fetch performance series for every instance, all counters at once.
    ///
    /// Every instance is mandatory for the requested view, so the
    /// fan-out is fail-fast.
    #[instrument(skip(self, instances, counters), fields(instances = instances.len()))]
    pub async fn get_performance_data(
        &self,
        duration_minutes: u32,
        instances: &[MonitoringObject],
        counters: &[PerformanceCounter],
    ) -> Result<Vec<PerformanceSeries>> {
        debug!("fetching performance data");

        let tasks = instances
            .iter()
            .map(|instance| {
                let client = self.clone();
                let instance = instance.clone();
                let counters = counters.to_vec();
                (instance.id.clone(), async move {
                    let request = PerformanceRequest {
                        duration: duration_minutes,
                        id: &instance.id,
                        performance_counters: &counters,
                    };
                    let data: PerformanceData =
                        client.post_json(endpoints::PERFORMANCE, &request).await?;
                    Ok(PerformanceSeries {
                        object: instance,
                        data,
                    })
                })
            })
            .collect();

        let results = fan_out(tasks, FailurePolicy::FailFast, self.max_concurrency()).await?;

        let mut series: Vec<PerformanceSeries> = results.into_values().collect();
        series.sort_by(|a, b| a.object.id.cmp(&b.object.id));
        Ok(series)
    }

    /// List the performance counters available across a set of objects,
    /// de-duplicated by counter name.
    #[instrument(skip(self, object_ids), fields(objects = object_ids.len()))]
    pub async fn get_performance_counters(
        &self,
        object_ids: &[String],
    ) -> Result<Vec<PerformanceCounter>> {
        debug!("listing performance counters");

        let tasks = object_ids
            .iter()
            .map(|id| {
                let client = self.clone();
                let endpoint = endpoints::performance_counters(id);
                (id.clone(), async move {
                    let response: RowsResponse<PerformanceCounter> =
                        client.get_json(&endpoint).await?;
                    Ok(response.rows)
                })
            })
            .collect();

        let results = fan_out(tasks, FailurePolicy::FailFast, self.max_concurrency()).await?;

        let mut unique = BTreeMap::new();
        for counter in results.into_values().flatten() {
            unique.insert(counter.counter_name.clone(), counter);
        }
        Ok(unique.into_values().collect())
    }

    /// Fetch health state for every object; a missing object breaks the
    /// requested view, so the fan-out is fail-fast.
    #[instrument(skip(self, objects), fields(objects = objects.len()))]
    pub async fn get_health_states(
        &self,
        objects: &[MonitoringObject],
    ) -> Result<Vec<HealthState>> {
        debug!("fetching health states");
        let ids: Vec<String> = objects.iter().map(|object| object.id.clone()).collect();
        self.fetch_health_states(&ids, FailurePolicy::FailFast)
            .await
    }

    /// Poll health state across many objects, keeping whatever answers.
    ///
    /// One unreachable object must not blank the whole view, so the
    /// fan-out is best-effort; dropped items are logged by the engine.
    #[instrument(skip(self, object_ids), fields(objects = object_ids.len()))]
    pub async fn poll_health_states(&self, object_ids: &[String]) -> Result<Vec<HealthState>> {
        debug!("polling health states");
        self.fetch_health_states(object_ids, FailurePolicy::BestEffort)
            .await
    }

    async fn fetch_health_states(
        &self,
        object_ids: &[String],
        policy: FailurePolicy,
    ) -> Result<Vec<HealthState>> {
        let tasks = object_ids
            .iter()
            .map(|id| {
                let client = self.clone();
                let endpoint = endpoints::monitoring(id);
                (id.clone(), async move {
                    client.get_json::<HealthState>(&endpoint).await
                })
            })
            .collect();

        let results = fan_out(tasks, policy, self.max_concurrency()).await?;

        let mut entries: Vec<(String, HealthState)> = results.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries.into_iter().map(|(_, state)| state).collect())
    }

    /// List classes whose display name matches the filter.
    #[instrument(skip(self))]
    pub async fn get_classes(&self, display_name_filter: &str) -> Result<Vec<MonitoringClass>> {
        debug!("listing classes");
        let criteria = format!("DisplayName LIKE '%{display_name_filter}%'");
        let response: ScopeResponse<MonitoringClass> =
            self.post_json(endpoints::SCOM_CLASSES, &criteria).await?;
        Ok(response.scope_datas)
    }

    /// List the classes one object belongs to.
    #[instrument(skip(self))]
    pub async fn get_classes_for_object(&self, object_id: &str) -> Result<Vec<MonitoringClass>> {
        debug!("listing classes for object");
        let response: RowsResponse<MonitoringClass> = self
            .get_json(&endpoints::classes_for_object(object_id))
            .await?;
        Ok(response.rows)
    }

    /// List all groups.
    #[instrument(skip(self))]
    pub async fn get_groups(&self) -> Result<Vec<MonitoringGroup>> {
        debug!("listing groups");
        let criteria = "DisplayName LIKE '%%'";
        let response: ScopeResponse<MonitoringGroup> =
            self.post_json(endpoints::SCOM_GROUPS, criteria).await?;
        Ok(response.scope_datas)
    }

    /// Fetch objects by their ids. The backend only answers criteria
    /// queries here, so this fans out one request per id.
    #[instrument(skip(self, object_ids), fields(objects = object_ids.len()))]
    pub async fn get_objects(&self, object_ids: &[String]) -> Result<Vec<MonitoringObject>> {
        debug!("fetching objects by id");

        let tasks = object_ids
            .iter()
            .map(|id| {
                let client = self.clone();
                let criteria = format!("Id = '{id}'");
                (id.clone(), async move {
                    let response: ScopeResponse<MonitoringObject> =
                        client.post_json(endpoints::SCOM_OBJECTS, &criteria).await?;
                    Ok(response.scope_datas)
                })
            })
            .collect();

        let results = fan_out(tasks, FailurePolicy::FailFast, self.max_concurrency()).await?;

        let mut entries: Vec<(String, Vec<MonitoringObject>)> = results.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries
            .into_iter()
            .flat_map(|(_, objects)| objects)
            .collect())
    }

    /// List the objects belonging to a class.
    #[instrument(skip(self))]
    pub async fn get_objects_by_class(&self, class_name: &str) -> Result<Vec<MonitoringObject>> {
        debug!("listing objects by class");
        let response: RowsResponse<MonitoringObject> = self
            .post_json(endpoints::SCOM_OBJECTS_BY_CLASS, class_name)
            .await?;
        Ok(response.rows)
    }

    /// Fetch state rows for a group and class pair.
    #[instrument(skip(self))]
    pub async fn get_state(&self, group_id: &str, class_id: &str) -> Result<StateResponse> {
        debug!("fetching state data");
        let request = StateRequest {
            class_id,
            group_id,
            object_ids: &[],
            criteria: "",
            display_columns: endpoints::STATE_COLUMNS,
        };
        self.post_json(endpoints::STATE, &request).await
    }
}

impl std::fmt::Debug for OpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsClient")
            .field("settings", &self.inner.settings)
            .finish()
    }
}

/// The single place the configured scheme picks an exchange; `connect`
/// and `check_health` must not diverge here.
fn build_exchange(
    settings: &ConnectionSettings,
    http: reqwest::Client,
) -> Box<dyn CredentialExchange> {
    match settings.auth_scheme() {
        AuthScheme::Basic => Box::new(BasicExchange::new(http)),
    }
}

fn build_http_client(settings: &ConnectionSettings) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("opsmgr/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .danger_accept_invalid_certs(settings.skip_tls_verify())
        .build()?)
}
