// ── Session polling controller ──
//
// Keeps one patient's sessions approximately fresh while the charts view
// is visible. The timer is owned by a CancellationToken and restarted on
// every patient or view change; each tick launches its own fetch, so two
// fetches may overlap and the last response wins.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::{EntityId, Session};
use crate::store::{EntityStore, RemotePatientScoped};

/// Which tab of the sessions screen is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SessionView {
    #[default]
    Charts,
    Table,
}

/// Something that can refresh one patient's data.
pub trait PollTarget: Send + Sync + 'static {
    fn refresh(&self, patient_id: &EntityId) -> impl Future<Output = ()> + Send;
}

impl<R: RemotePatientScoped<Session>> PollTarget for EntityStore<Session, R> {
    async fn refresh(&self, patient_id: &EntityId) {
        self.fetch_by_patient(patient_id).await;
    }
}

#[derive(Default)]
struct PollState {
    mounted: bool,
    patient: Option<EntityId>,
    view: SessionView,
    timer: Option<CancellationToken>,
}

/// Fixed-interval refresh trigger scoped to the charts view.
///
/// Must be driven from inside a tokio runtime; outside one, fetches are
/// skipped with a warning.
pub struct PollingController<T: PollTarget> {
    target: Arc<T>,
    period: Duration,
    state: Mutex<PollState>,
}

impl<T: PollTarget> PollingController<T> {
    pub fn new(target: Arc<T>, period: Duration) -> Self {
        Self {
            target,
            period,
            state: Mutex::new(PollState::default()),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Screen opened for `patient`: fetch immediately and start ticking if
    /// the charts view is active.
    pub fn mount(&self, patient: Option<EntityId>) {
        let mut state = self.lock();
        state.mounted = true;
        state.patient = patient;
        if let Some(id) = state.patient.clone() {
            self.spawn_fetch(id);
        }
        self.restart_timer(&mut state);
    }

    /// Active patient changed: fetch immediately and restart the timer.
    /// Setting the same patient again is a no-op.
    pub fn set_patient(&self, patient: Option<EntityId>) {
        let mut state = self.lock();
        if state.patient == patient {
            return;
        }
        state.patient = patient;
        if state.mounted {
            if let Some(id) = state.patient.clone() {
                self.spawn_fetch(id);
            }
            self.restart_timer(&mut state);
        }
    }

    /// Tab switched. Only the charts view polls.
    pub fn set_view(&self, view: SessionView) {
        let mut state = self.lock();
        if state.view == view {
            return;
        }
        state.view = view;
        if state.mounted {
            self.restart_timer(&mut state);
        }
    }

    pub fn view(&self) -> SessionView {
        self.lock().view
    }

    /// Manual reload: fetch now and wait for it.
    pub async fn refresh_now(&self) {
        let patient = self.lock().patient.clone();
        if let Some(id) = patient {
            self.target.refresh(&id).await;
        }
    }

    /// Screen closed: stop the timer. A fetch already in flight completes.
    pub fn unmount(&self) {
        let mut state = self.lock();
        state.mounted = false;
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.lock().timer.is_some()
    }

    // ── Internal helpers ─────────────────────────────────────────────

    fn lock(&self) -> std::sync::MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn restart_timer(&self, state: &mut PollState) {
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }

        let Some(patient) = state.patient.clone() else {
            return;
        };
        if !state.mounted || state.view != SessionView::Charts {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime; session polling disabled");
            return;
        };

        let cancel = CancellationToken::new();
        debug!(%patient, period_ms = self.period.as_millis(), "session polling started");
        runtime.spawn(poll_task(
            Arc::clone(&self.target),
            patient,
            self.period,
            cancel.clone(),
        ));
        state.timer = Some(cancel);
    }

    fn spawn_fetch(&self, patient: EntityId) {
        spawn_fetch(Arc::clone(&self.target), patient);
    }
}

impl<T: PollTarget> Drop for PollingController<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
    }
}

fn spawn_fetch<T: PollTarget>(target: Arc<T>, patient: EntityId) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move { target.refresh(&patient).await });
        }
        Err(_) => warn!(%patient, "no tokio runtime; session fetch skipped"),
    }
}

async fn poll_task<T: PollTarget>(
    target: Arc<T>,
    patient: EntityId,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                debug!(%patient, "session poll tick");
                spawn_fetch(Arc::clone(&target), patient.clone());
            }
        }
    }
    debug!(%patient, "session polling stopped");
}
