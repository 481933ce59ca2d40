//! Services manager for the Photoview entries and the HTTP server.
//!
//! Services register with the manager and are started/stopped/restarted together.
//! Start order respects [dependencies](Service::dependencies); a service is only
//! started after all of its dependencies. The HTTP server depends on every
//! Photoview entry so that routes never see a half-configured registry.
//!
//! **HTTP route registration:** main registers `/api/*` route builders via
//! [add_api_routes](ServicesManagerBuilder::add_api_routes). The
//! [HttpServerService] builds the app by calling
//! [build_api_router](ServicesManager::build_api_router), which merges them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::Router;
use parking_lot::RwLock as ParkingRwLock;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::app::AppState;
use crate::services::entries::IntegrationEntries;
use crate::services::http_server::{HttpServerConfig, HttpServerService};
use crate::services::photoview::service::SERVICE_PREFIX;
use crate::services::photoview::{PhotoviewEntryConfig, PhotoviewEntryService};

/// Health status of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Result of a service health check.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceHealth {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            message: Some(message.into()),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
        }
    }
}

/// A service that can be started, stopped, restarted, and health-checked by the manager.
///
/// Log lifecycle events with [tracing] and include the service name
/// (e.g. `tracing::info!(service = %self.name(), "Started")`).
///
/// **Dependencies:** Return the list of service names that must be started before this
/// service via [dependencies](Service::dependencies).
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Unique name for logging and lookup (e.g. "http", "photoview:default").
    fn name(&self) -> &str;

    /// Names of services that must be started before this one. Start order is
    /// computed from this; cycles are an error.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Start background tasks or connections. Idempotent allowed.
    async fn start(&self) -> Result<()>;

    /// Stop background tasks and release resources. Idempotent allowed.
    async fn stop(&self) -> Result<()>;

    /// Restart the service: stop then start.
    async fn restart(&self) -> Result<()> {
        self.stop().await?;
        self.start().await
    }

    /// Report current health. Used by `/readyz`.
    async fn health(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}

/// Pending registration for the builder.
pub enum ServiceRegistration {
    Photoview(PhotoviewEntryConfig),
    Http(HttpServerConfig),
    Service(Arc<dyn Service>),
}

/// Types that can be added to a [ServicesManagerBuilder] via [add_service](ServicesManagerBuilder::add_service).
pub trait IntoServiceRegistration {
    #[doc(hidden)]
    fn into_registration(self) -> ServiceRegistration;
}

impl IntoServiceRegistration for PhotoviewEntryConfig {
    fn into_registration(self) -> ServiceRegistration {
        ServiceRegistration::Photoview(self)
    }
}

impl IntoServiceRegistration for HttpServerConfig {
    fn into_registration(self) -> ServiceRegistration {
        ServiceRegistration::Http(self)
    }
}

impl IntoServiceRegistration for Arc<dyn Service> {
    fn into_registration(self) -> ServiceRegistration {
        ServiceRegistration::Service(self)
    }
}

type ApiRouteBuilder = Box<dyn Fn(AppState) -> Router<AppState> + Send + Sync>;

/// Builder for [ServicesManager]: add services with configs, then [build](ServicesManagerBuilder::build) or [start](ServicesManagerBuilder::start).
///
/// # Example
///
/// ```ignore
/// let services = ServicesManager::builder(http)
///     .add_api_routes("photoview", |_| api::photoview_router())
///     .add_service(PhotoviewEntryConfig { entry_id, credentials })
///     .add_service(HttpServerConfig { config })
///     .start()
///     .await?;
/// ```
pub struct ServicesManagerBuilder {
    http: reqwest::Client,
    registrations: Vec<ServiceRegistration>,
    /// Route builders for /api/*; merged in order when the HTTP app is built.
    api_route_registrations: Vec<(String, ApiRouteBuilder)>,
}

impl ServicesManagerBuilder {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            registrations: Vec::new(),
            api_route_registrations: Vec::new(),
        }
    }

    /// Register a route builder for `/api/*`. `name` is for logging; `builder`
    /// receives [AppState] and returns a [Router] to merge under `/api`.
    pub fn add_api_routes<N, F>(mut self, name: N, builder: F) -> Self
    where
        N: Into<String>,
        F: Fn(AppState) -> Router<AppState> + Send + Sync + 'static,
    {
        self.api_route_registrations
            .push((name.into(), Box::new(builder)));
        self
    }

    /// Add a service: a [PhotoviewEntryConfig], an [HttpServerConfig], or a
    /// pre-built [Arc]\[[dyn](Service)\].
    pub fn add_service<T: IntoServiceRegistration>(mut self, t: T) -> Self {
        self.registrations.push(t.into_registration());
        self
    }

    /// Build the manager and register all services. Does not start them.
    pub async fn build(self) -> Result<Arc<ServicesManager>> {
        let manager = Arc::new(ServicesManager::new());
        for (name, builder) in self.api_route_registrations {
            manager.register_api_routes(name, builder);
        }

        let entry_services: Vec<String> = self
            .registrations
            .iter()
            .filter_map(|reg| match reg {
                ServiceRegistration::Photoview(config) => Some(config.service_name()),
                _ => None,
            })
            .collect();

        for reg in self.registrations {
            match reg {
                ServiceRegistration::Photoview(config) => {
                    let svc = Arc::new(PhotoviewEntryService::new(
                        config,
                        self.http.clone(),
                        manager.entries(),
                    ));
                    manager.register(svc).await;
                }
                ServiceRegistration::Http(config) => {
                    let http_svc = Arc::new(HttpServerService::new(
                        manager.clone(),
                        config.config,
                        entry_services.clone(),
                    ));
                    manager.register(http_svc).await;
                }
                ServiceRegistration::Service(svc) => {
                    manager.register(svc).await;
                }
            }
        }
        Ok(manager)
    }

    /// Build the manager, register all services, and start them in dependency order.
    pub async fn start(self) -> Result<Arc<ServicesManager>> {
        let manager = self.build().await?;
        manager.start_all().await?;
        Ok(manager)
    }
}

/// Registry and lifecycle controller for services.
pub struct ServicesManager {
    services: RwLock<HashMap<String, Arc<dyn Service>>>,
    started: RwLock<HashSet<String>>,
    entries: Arc<IntegrationEntries>,
    /// Route builders for /api/*; used by [build_api_router](ServicesManager::build_api_router).
    api_route_builders: ParkingRwLock<Vec<(String, ApiRouteBuilder)>>,
}

impl Default for ServicesManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServicesManager {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
            started: RwLock::new(HashSet::new()),
            entries: Arc::new(IntegrationEntries::new()),
            api_route_builders: ParkingRwLock::new(Vec::new()),
        }
    }

    pub fn builder(http: reqwest::Client) -> ServicesManagerBuilder {
        ServicesManagerBuilder::new(http)
    }

    /// Photoview clients of every entry that is currently set up.
    pub fn entries(&self) -> Arc<IntegrationEntries> {
        self.entries.clone()
    }

    pub fn register_api_routes(&self, name: String, builder: ApiRouteBuilder) {
        self.api_route_builders.write().push((name, builder));
    }

    /// Build the merged `/api` router from all registered route builders.
    pub fn build_api_router(&self, state: AppState) -> Router<AppState> {
        let builders = self.api_route_builders.read();
        let mut api = Router::new();
        for (name, f) in builders.iter() {
            api = api.merge(f(state.clone()));
            tracing::debug!(api_routes = %name, "Merged API route builder");
        }
        api
    }

    /// Compute start order from dependencies (topological order). Returns an error on unknown deps or cycles.
    async fn start_order(&self) -> Result<Vec<String>> {
        let guard = self.services.read().await;
        let names: HashSet<String> = guard.keys().cloned().collect();
        let mut deps: HashMap<String, Vec<String>> = HashMap::new();
        for (name, svc) in guard.iter() {
            let d = svc.dependencies();
            for dep in &d {
                if !names.contains(dep) {
                    anyhow::bail!(
                        "Service {} depends on {} which is not registered",
                        name,
                        dep
                    );
                }
            }
            deps.insert(name.clone(), d);
        }
        drop(guard);

        // Kahn's algorithm, ties broken by name so the order is stable.
        let mut in_degree: HashMap<String, usize> = deps
            .iter()
            .map(|(name, d)| (name.clone(), d.len()))
            .collect();
        let mut dependent_on: HashMap<String, Vec<String>> =
            names.iter().map(|n| (n.clone(), Vec::new())).collect();
        for (name, d) in &deps {
            for dep in d {
                if let Some(list) = dependent_on.get_mut(dep) {
                    list.push(name.clone());
                }
            }
        }
        let mut queue: Vec<String> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| n.clone())
            .collect();
        queue.sort_by(|a, b| b.cmp(a));
        let mut order = Vec::with_capacity(names.len());
        while let Some(n) = queue.pop() {
            order.push(n.clone());
            if let Some(dependents) = dependent_on.get(&n) {
                for s in dependents {
                    if let Some(deg) = in_degree.get_mut(s) {
                        *deg -= 1;
                        if *deg == 0 {
                            queue.push(s.clone());
                        }
                    }
                }
            }
            queue.sort_by(|a, b| b.cmp(a));
        }
        if order.len() != names.len() {
            anyhow::bail!("Service dependency cycle detected");
        }
        Ok(order)
    }

    /// Register a service. Does not start it. If a service with the same name
    /// exists, it is replaced (the previous instance is not stopped).
    pub async fn register(&self, service: Arc<dyn Service>) {
        let name = service.name().to_string();
        let mut guard = self.services.write().await;
        if guard.insert(name.clone(), service).is_some() {
            warn!(service = %name, "Service '{}' reregistered, overwriting previous", name);
        } else {
            info!(service = %name, "Service '{}' registered", name);
        }
    }

    /// Unregister a service by name. Does not stop it.
    pub async fn unregister(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.started.write().await.remove(name);
        let out = self.services.write().await.remove(name);
        if out.is_some() {
            info!(service = %name, "Service '{}' unregistered", name);
        }
        out
    }

    /// Start all registered services in dependency order (dependencies first).
    pub async fn start_all(&self) -> Result<()> {
        let order = self.start_order().await?;
        for name in &order {
            let svc = {
                let g = self.services.read().await;
                g.get(name).cloned()
            };
            if let Some(s) = svc {
                if let Err(e) = s.start().await {
                    warn!(service = %name, error = %e, "Service '{}' start failed", name);
                    return Err(e).context(format!("failed to start service {}", name));
                }
                self.started.write().await.insert(name.clone());
                info!(service = %name, "Service '{}' started", name);
            }
        }
        Ok(())
    }

    /// Stop all registered services in reverse dependency order (dependents first).
    pub async fn stop_all(&self) -> Result<()> {
        let order = self.start_order().await?;
        for name in order.into_iter().rev() {
            let svc = {
                let g = self.services.read().await;
                g.get(&name).cloned()
            };
            if let Some(s) = svc {
                if let Err(e) = s.stop().await {
                    warn!(service = %name, error = %e, "Service '{}' stop failed", name);
                } else {
                    info!(service = %name, "Service '{}' stopped", name);
                }
                self.started.write().await.remove(&name);
            }
        }
        Ok(())
    }

    /// Restart a single service by name. Dependencies are not restarted.
    pub async fn restart_one(&self, name: &str) -> Result<()> {
        let svc = {
            let guard = self.services.read().await;
            guard.get(name).cloned()
        };
        match svc {
            Some(s) => {
                self.started.write().await.remove(name);
                s.restart().await?;
                self.started.write().await.insert(name.to_string());
                info!(service = %name, "Service '{}' restarted", name);
                Ok(())
            }
            None => {
                anyhow::bail!("Service not found: {}", name)
            }
        }
    }

    /// Reload every Photoview entry: each gets a fresh client and logs in again
    /// on its next request. Returns how many entries were reloaded.
    pub async fn reload_entries(&self) -> Result<usize> {
        let mut names: Vec<String> = self
            .names()
            .await
            .into_iter()
            .filter(|name| name.starts_with(SERVICE_PREFIX))
            .collect();
        names.sort();
        for name in &names {
            self.restart_one(name).await?;
        }
        info!(count = names.len(), "Photoview entries reloaded");
        Ok(names.len())
    }

    /// Stop a single service by name. Returns whether it was found and stopped.
    pub async fn stop_one(&self, name: &str) -> bool {
        let svc = {
            let guard = self.services.read().await;
            guard.get(name).cloned()
        };
        if let Some(s) = svc {
            match s.stop().await {
                Ok(()) => {
                    self.started.write().await.remove(name);
                    info!(service = %name, "Service '{}' stopped", name);
                    true
                }
                Err(e) => {
                    warn!(service = %name, error = %e, "Service '{}' stop failed", name);
                    false
                }
            }
        } else {
            warn!(service = %name, "Service '{}' not found, cannot stop", name);
            false
        }
    }

    /// Start a single service by name. All of its dependencies must already be started.
    pub async fn start_one(&self, name: &str) -> Result<()> {
        let (svc, deps) = {
            let guard = self.services.read().await;
            let s = guard.get(name).cloned();
            let d = s.as_ref().map(|s| s.dependencies()).unwrap_or_default();
            (s, d)
        };
        let svc = svc.ok_or_else(|| anyhow::anyhow!("Service not found: {}", name))?;
        let started = self.started.read().await;
        for dep in &deps {
            if !started.contains(dep) {
                anyhow::bail!("Cannot start {}: dependency {} is not started", name, dep);
            }
        }
        drop(started);
        svc.start().await?;
        self.started.write().await.insert(name.to_string());
        info!(service = %name, "Service '{}' started", name);
        Ok(())
    }

    /// Health check for all registered services. Services whose check fails
    /// are reported as [Unhealthy](HealthStatus::Unhealthy).
    pub async fn health_all(&self) -> HashMap<String, ServiceHealth> {
        let services: Vec<(String, Arc<dyn Service>)> = {
            let guard = self.services.read().await;
            guard.iter().map(|(n, s)| (n.clone(), s.clone())).collect()
        };
        let mut out = HashMap::new();
        for (name, svc) in services {
            let h = match svc.health().await {
                Ok(h) => h,
                Err(e) => ServiceHealth::unhealthy(e.to_string()),
            };
            out.insert(name, h);
        }
        out
    }

    pub async fn is_started(&self, name: &str) -> bool {
        self.started.read().await.contains(name)
    }

    pub async fn names(&self) -> Vec<String> {
        let guard = self.services.read().await;
        guard.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::photoview::PhotoviewCredentials;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    struct Recorder {
        name: String,
        deps: Vec<String>,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Service for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn dependencies(&self) -> Vec<String> {
            self.deps.clone()
        }

        async fn start(&self) -> Result<()> {
            self.log.lock().push(format!("start {}", self.name));
            Ok(())
        }

        async fn stop(&self) -> Result<()> {
            self.log.lock().push(format!("stop {}", self.name));
            Ok(())
        }
    }

    fn recorder(name: &str, deps: &[&str], log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Service> {
        Arc::new(Recorder {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            log: log.clone(),
        })
    }

    #[tokio::test]
    async fn test_start_and_stop_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = ServicesManager::builder(reqwest::Client::new())
            .add_service(recorder("http", &["photoview:a", "photoview:b"], &log))
            .add_service(recorder("photoview:b", &[], &log))
            .add_service(recorder("photoview:a", &[], &log))
            .start()
            .await
            .unwrap();

        assert!(manager.is_started("http").await);
        manager.stop_all().await.unwrap();
        assert!(!manager.is_started("http").await);

        assert_eq!(
            *log.lock(),
            vec![
                "start photoview:a",
                "start photoview:b",
                "start http",
                "stop http",
                "stop photoview:b",
                "stop photoview:a",
            ]
        );
    }

    #[tokio::test]
    async fn test_cycle_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = ServicesManager::builder(reqwest::Client::new())
            .add_service(recorder("a", &["b"], &log))
            .add_service(recorder("b", &["a"], &log))
            .build()
            .await
            .unwrap();
        assert!(manager.start_all().await.is_err());
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_dependency_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = ServicesManager::builder(reqwest::Client::new())
            .add_service(recorder("a", &["missing"], &log))
            .build()
            .await
            .unwrap();
        assert!(manager.start_all().await.is_err());
    }

    #[tokio::test]
    async fn test_start_one_requires_dependencies() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = ServicesManager::builder(reqwest::Client::new())
            .add_service(recorder("a", &[], &log))
            .add_service(recorder("b", &["a"], &log))
            .build()
            .await
            .unwrap();
        assert!(manager.start_one("b").await.is_err());
        manager.start_one("a").await.unwrap();
        manager.start_one("b").await.unwrap();
        assert!(manager.stop_one("b").await);
        assert!(!manager.stop_one("nope").await);
    }

    #[tokio::test]
    async fn test_reload_entries_skips_other_services() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = ServicesManager::builder(reqwest::Client::new())
            .add_service(PhotoviewEntryConfig {
                entry_id: "home".to_string(),
                credentials: PhotoviewCredentials::new("http://photos.local", "u", "p"),
            })
            .add_service(recorder("http", &["photoview:home"], &log))
            .start()
            .await
            .unwrap();
        log.lock().clear();

        let before = manager.entries().get("home").unwrap();
        assert_eq!(manager.reload_entries().await.unwrap(), 1);

        let after = manager.entries().get("home").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(log.lock().is_empty());
        assert!(manager.is_started("photoview:home").await);
    }

    #[tokio::test]
    async fn test_photoview_entries_follow_lifecycle() {
        let manager = ServicesManager::builder(reqwest::Client::new())
            .add_service(PhotoviewEntryConfig {
                entry_id: "home".to_string(),
                credentials: PhotoviewCredentials::new("http://photos.local", "u", "p"),
            })
            .start()
            .await
            .unwrap();

        let entries = manager.entries();
        assert_eq!(entries.ids(), vec!["home"]);

        let before = entries.get("home").unwrap();
        manager.restart_one("photoview:home").await.unwrap();
        assert!(!Arc::ptr_eq(&before, &entries.get("home").unwrap()));

        let health = manager.health_all().await;
        assert_eq!(health["photoview:home"].status, HealthStatus::Degraded);

        assert!(manager.stop_one("photoview:home").await);
        assert!(entries.is_empty());
        assert!(manager.unregister("photoview:home").await.is_some());
        assert!(manager.names().await.is_empty());
    }
}
