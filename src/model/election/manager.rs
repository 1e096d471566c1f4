use chrono::{DateTime, FixedOffset, Utc};

use crate::{error::Result, model::sqlite::Store};

use super::{ElectionWindow, PhaseScheduler, WindowStatus};

/// Owns the election window lifecycle: registration, forced stops, and the
/// phase transitions armed for each window.
///
/// Nothing about the current window is cached; every query goes to the store.
#[derive(Clone)]
pub struct WindowManager {
    store: Store,
    scheduler: PhaseScheduler,
    offset: FixedOffset,
}

impl WindowManager {
    pub fn new(store: Store, offset: FixedOffset) -> Self {
        let scheduler = PhaseScheduler::new(store.clone());
        Self {
            store,
            scheduler,
            offset,
        }
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    /// Register (or re-register) the window for `start`'s calendar day and
    /// arm its transitions. Returns the status the window was saved with.
    pub async fn register(
        &self,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        registered_by: &str,
        now: DateTime<Utc>,
    ) -> Result<WindowStatus> {
        let registered_by = registered_by.to_string();
        let offset = self.offset;
        let window = self
            .store
            .run(move |conn| ElectionWindow::upsert(conn, start, stop, &registered_by, now, offset))
            .await?;
        info!(
            "Window {} registered by {} as {}",
            window.id, window.registered_by, window.status
        );
        self.scheduler.arm(window.id).await?;
        Ok(window.status)
    }

    /// Close the most recently started open window immediately.
    pub async fn force_stop(&self, registered_by: &str, now: DateTime<Utc>) -> Result<ElectionWindow> {
        let registered_by = registered_by.to_string();
        let window = self
            .store
            .run(move |conn| ElectionWindow::force_stop(conn, &registered_by, now))
            .await?;
        info!("Window {} stopped by {}", window.id, window.registered_by);
        self.scheduler.disarm(window.id).await;
        Ok(window)
    }

    /// Status of the most recently created window, if there is one.
    pub async fn current_status(&self) -> Result<Option<WindowStatus>> {
        let latest = self.store.run(|conn| ElectionWindow::latest(conn)).await?;
        Ok(latest.map(|window| window.status))
    }

    /// Stop time of the latest window that is open for voting.
    pub async fn started_stop_time(&self) -> Result<Option<DateTime<Utc>>> {
        let started = self
            .store
            .run(|conn| ElectionWindow::latest_started(conn))
            .await?;
        Ok(started.map(|window| window.stop_time))
    }
}
