use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;

use crate::{
    error::Result,
    model::sqlite::Store,
    scheduled_task::ScheduledTask,
};

use super::{ElectionWindow, Transition, WindowId, WindowStatus};

/// Map from (window, transition) to the armed task.
type TaskMap = HashMap<(WindowId, Transition), ScheduledTask<Result<()>>>;

/// How long to wait before retrying a transition whose store update failed.
const RETRY_INTERVAL_SECONDS: i64 = 30;

/// Phase transitions: scheduled tasks that move each window to `Started` at
/// its start time and to `Finished` at its stop time.
///
/// The tasks live independently of any client connection. Each one runs a
/// guarded update, so firing late, twice, or after a manual stop is harmless.
#[derive(Clone)]
pub struct PhaseScheduler {
    store: Store,
    tasks: Arc<Mutex<TaskMap>>,
}

impl PhaseScheduler {
    /// Create a scheduler with nothing armed.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            tasks: Default::default(),
        }
    }

    /// Is the given transition currently armed?
    pub async fn is_armed(&self, window: WindowId, transition: Transition) -> bool {
        self.tasks.lock().await.contains_key(&(window, transition))
    }

    /// When the given transition is due, if it is armed.
    pub async fn armed_for(&self, window: WindowId, transition: Transition) -> Option<DateTime<Utc>> {
        self.tasks
            .lock()
            .await
            .get(&(window, transition))
            .map(ScheduledTask::run_at)
    }

    /// Arm transitions for every window that has not finished yet.
    /// Used at startup so pending transitions survive a restart.
    pub async fn schedule_pending(&self) -> Result<()> {
        let windows = self.store.run(|conn| ElectionWindow::pending(conn)).await?;
        let count = windows.len();
        for window in windows {
            self.arm(window.id).await?;
        }
        debug!("Armed transitions for {count} pending window(s)");
        Ok(())
    }

    /// Arm both transitions for the given window, as currently stored.
    /// Anything previously armed for the same window is cancelled first.
    ///
    /// The row is read while the task map is locked, so when registrations
    /// race the last one to arm always sees the latest committed times.
    pub async fn arm(&self, id: WindowId) -> Result<()> {
        let mut tasks_locked = self.tasks.lock().await;
        for transition in [Transition::Start, Transition::Finish] {
            if let Some(task) = tasks_locked.remove(&(id, transition)) {
                let already_completed = task.cancel().await;
                if already_completed {
                    // A completed task removes itself, so this only happens if
                    // it finished in the gap before we took the lock.
                    trace!("arm: {transition:?} for window {id} had already run");
                }
            }
        }

        let window = self.store.run(move |conn| ElectionWindow::by_id(conn, id)).await?;
        let window = match window {
            Some(window) if window.status != WindowStatus::Finished => window,
            _ => {
                debug!("Window {id} is finished or gone; nothing to arm");
                return Ok(());
            }
        };
        for transition in [Transition::Start, Transition::Finish] {
            let due = window.due(transition);
            let task = ScheduledTask::new(
                Self::transition(self.store.clone(), id, transition, due, self.tasks.clone()),
                due,
            );
            tasks_locked.insert((id, transition), task);
        }
        debug!(
            "Armed window {id}: start at {}, finish at {}",
            window.start_time, window.stop_time
        );
        Ok(())
    }

    /// Cancel any transitions armed for the given window.
    pub async fn disarm(&self, window: WindowId) {
        let mut tasks_locked = self.tasks.lock().await;
        for transition in [Transition::Start, Transition::Finish] {
            if let Some(task) = tasks_locked.remove(&(window, transition)) {
                task.cancel().await;
            }
        }
        trace!("Disarmed window {window}");
    }

    /// Apply a transition to the given window.
    /// Since a failed attempt re-schedules itself, we must use `BoxFuture` to
    /// avoid an infinitely-recursive state machine.
    fn transition(
        store: Store,
        window: WindowId,
        transition: Transition,
        due: DateTime<Utc>,
        tasks: Arc<Mutex<TaskMap>>,
    ) -> BoxFuture<'static, Result<()>> {
        async move {
            debug!("Running {transition:?} transition for window {window}");
            let result = store
                .run(move |conn| ElectionWindow::apply(conn, window, transition, due))
                .await;
            match result {
                Ok(changed) => {
                    if changed {
                        info!("Window {window}: {transition:?} transition applied");
                    } else {
                        // Expected whenever the window was stopped or rescheduled.
                        debug!("Window {window}: {transition:?} transition no longer applies");
                    }
                    tasks.lock().await.remove(&(window, transition));
                    trace!("Transition completed; removed self from list");
                    Ok(())
                }
                Err(e) => {
                    error!("{transition:?} transition for window {window} failed: {e}");
                    let retry = Self::transition(store, window, transition, due, tasks.clone());
                    let retry_time = Utc::now() + Duration::seconds(RETRY_INTERVAL_SECONDS);
                    let mut tasks_locked = tasks.lock().await;
                    tasks_locked.insert((window, transition), ScheduledTask::new(retry, retry_time));
                    warn!("Failed transition will be retried in {RETRY_INTERVAL_SECONDS} seconds");
                    Err(e)
                }
            }
        }
        .boxed()
    }
}
