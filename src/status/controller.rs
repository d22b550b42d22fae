// src/status/controller.rs
use super::state::{CheckState, StatusSnapshot};
use crate::health::{HealthProbe, HealthResult};
use crate::render::Renderer;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

pub const FAILURE_ERROR: &str = "Failed to connect to API";
pub const FAILURE_HINT: &str = "Make sure the backend is reachable";

/// Result of a check that was not skipped by the in-flight guard.
#[derive(Debug)]
pub struct CheckRun {
    pub state: CheckState,
    /// Detached version lookup, only started after a successful check.
    /// Dropping the handle does not cancel it.
    pub info_task: Option<JoinHandle<()>>,
}

pub struct StatusController {
    probe: Arc<dyn HealthProbe>,
    renderer: Arc<dyn Renderer>,
    in_flight: AtomicBool,
    snapshot: RwLock<StatusSnapshot>,
}

impl StatusController {
    pub fn new(probe: Arc<dyn HealthProbe>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            probe,
            renderer,
            in_flight: AtomicBool::new(false),
            snapshot: RwLock::new(StatusSnapshot::default()),
        }
    }

    pub fn state(&self) -> CheckState {
        self.read().state
    }

    pub fn is_checking(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.read().payload.clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.read().clone()
    }

    /// Runs one health check against `base_url`.
    ///
    /// Returns `None` without touching any state when a check is already in
    /// flight. Otherwise the state ends as Online or Offline and the guard is
    /// released, even if the probe or the renderer panics.
    pub async fn run_check(&self, base_url: &Url) -> Option<CheckRun> {
        let Some(guard) = InFlight::acquire(self) else {
            debug!("Check already in flight, ignoring trigger");
            return None;
        };

        self.set_state(CheckState::Checking);
        self.renderer.on_state_change(CheckState::Checking);

        let result = self.probe_health(base_url).await;

        let run = match result {
            HealthResult::Success(payload) => {
                info!("API at {} is online", base_url);
                self.resolve(CheckState::Online, payload);

                CheckRun {
                    state: CheckState::Online,
                    info_task: Some(self.spawn_info_fetch(base_url)),
                }
            }
            HealthResult::Failure(message) => {
                warn!("API at {} is offline: {}", base_url, message);
                self.resolve(CheckState::Offline, failure_payload(&message));

                CheckRun {
                    state: CheckState::Offline,
                    info_task: None,
                }
            }
        };

        drop(guard);
        Some(run)
    }

    /// Runs the probe on its own task so a panicking probe still yields a
    /// `Failure`.
    async fn probe_health(&self, base_url: &Url) -> HealthResult {
        let probe = self.probe.clone();
        let base_url = base_url.clone();

        match tokio::spawn(async move { probe.check_health(&base_url).await }).await {
            Ok(result) => result,
            Err(e) => {
                error!("Health probe task failed: {}", e);
                HealthResult::Failure(e.to_string())
            }
        }
    }

    fn spawn_info_fetch(&self, base_url: &Url) -> JoinHandle<()> {
        let probe = self.probe.clone();
        let renderer = self.renderer.clone();
        let base_url = base_url.clone();

        tokio::spawn(async move {
            if let Some(version) = probe.fetch_info(&base_url).await {
                debug!("API reports version {}", version);
                renderer.on_version(&version);
            }
        })
    }

    fn resolve(&self, state: CheckState, payload: Value) {
        {
            let mut snapshot = self.write();
            snapshot.state = state;
            snapshot.payload = Some(payload.clone());
            snapshot.checked_at = Some(Utc::now());
        }

        self.renderer.on_state_change(state);
        self.renderer.on_payload(&payload);
    }

    fn set_state(&self, state: CheckState) {
        self.write().state = state;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StatusSnapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StatusSnapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn failure_payload(message: &str) -> Value {
    json!({
        "error": FAILURE_ERROR,
        "message": message,
        "hint": FAILURE_HINT,
    })
}

/// Held for the duration of one check. Dropping it releases the flag and,
/// if the check was abandoned mid-way, resolves the state to Offline.
struct InFlight<'a> {
    controller: &'a StatusController,
}

impl<'a> InFlight<'a> {
    fn acquire(controller: &'a StatusController) -> Option<Self> {
        controller
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { controller })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        {
            let mut snapshot = self.controller.write();
            if snapshot.state == CheckState::Checking {
                error!("Check abandoned before completion, marking API offline");
                snapshot.state = CheckState::Offline;
                snapshot.checked_at = Some(Utc::now());
            }
        }
        self.controller.in_flight.store(false, Ordering::Release);
    }
}
