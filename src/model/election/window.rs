use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::error::{Error, Result};
use crate::model::common::time::local_day;

use super::WindowStatus;

pub type WindowId = i64;

/// The two deferred transitions armed for every window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Transition {
    /// `Scheduled -> Started` at the start time.
    Start,
    /// `-> Finished` at the stop time.
    Finish,
}

/// An election window from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionWindow {
    pub id: WindowId,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub registered_by: String,
    pub status: WindowStatus,
}

const COLUMNS: &str = "id, start_time, stop_time, registered_by, status";

impl ElectionWindow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_time: row.get(1)?,
            stop_time: row.get(2)?,
            registered_by: row.get(3)?,
            status: row.get(4)?,
        })
    }

    /// When the given transition is due.
    pub fn due(&self, transition: Transition) -> DateTime<Utc> {
        match transition {
            Transition::Start => self.start_time,
            Transition::Finish => self.stop_time,
        }
    }

    pub fn by_id(conn: &Connection, id: WindowId) -> Result<Option<Self>> {
        let sql = format!("SELECT {COLUMNS} FROM election_windows WHERE id = ?1");
        Ok(conn.query_row(&sql, [id], Self::from_row).optional()?)
    }

    /// The most recently created window, if any window exists at all.
    pub fn latest(conn: &Connection) -> Result<Option<Self>> {
        let sql = format!("SELECT {COLUMNS} FROM election_windows ORDER BY id DESC LIMIT 1");
        Ok(conn.query_row(&sql, [], Self::from_row).optional()?)
    }

    /// The most recently created window that is currently open for voting.
    pub fn latest_started(conn: &Connection) -> Result<Option<Self>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM election_windows WHERE status = ?1 ORDER BY id DESC LIMIT 1"
        );
        Ok(conn
            .query_row(&sql, [WindowStatus::Started], Self::from_row)
            .optional()?)
    }

    /// All windows that still have a transition ahead of them.
    pub fn pending(conn: &Connection) -> Result<Vec<Self>> {
        let sql = format!("SELECT {COLUMNS} FROM election_windows WHERE status != ?1 ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let windows = stmt
            .query_map([WindowStatus::Finished], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(windows)
    }

    /// Create the window for `start`'s calendar day, or overwrite the one
    /// that already exists for that day. The status is computed from `now`.
    pub fn upsert(
        conn: &mut Connection,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        registered_by: &str,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Result<Self> {
        if stop <= start {
            return Err(Error::InvalidWindow);
        }
        let status = WindowStatus::at(start, stop, now);
        let day = local_day(start, offset);

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id: WindowId = tx.query_row(
            "INSERT INTO election_windows (start_time, stop_time, start_day, registered_by, status)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (start_day) DO UPDATE SET
                 start_time = excluded.start_time,
                 stop_time = excluded.stop_time,
                 registered_by = excluded.registered_by,
                 status = excluded.status
             RETURNING id",
            params![start, stop, day, registered_by, status],
            |row| row.get(0),
        )?;
        let window = Self::by_id(&tx, id)?.ok_or(Error::Db(rusqlite::Error::QueryReturnedNoRows))?;
        tx.commit()?;
        Ok(window)
    }

    /// Close the most recently started window that is still open or pending.
    pub fn force_stop(
        conn: &Connection,
        registered_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let sql = format!(
            "UPDATE election_windows
                SET status = ?1, stop_time = ?2, registered_by = ?3
              WHERE id = (SELECT id FROM election_windows
                           WHERE status IN (?4, ?5)
                           ORDER BY start_time DESC, id DESC
                           LIMIT 1)
             RETURNING {COLUMNS}"
        );
        conn.query_row(
            &sql,
            params![
                WindowStatus::Finished,
                now,
                registered_by,
                WindowStatus::Scheduled,
                WindowStatus::Started,
            ],
            Self::from_row,
        )
        .optional()?
        .ok_or(Error::NoActiveWindow)
    }

    /// Apply a deferred transition that was armed for time `due`.
    ///
    /// The update is guarded: it only applies while the window's status still
    /// permits it and its schedule still matches `due`, so a late, duplicate,
    /// or superseded firing changes nothing. Returns whether a row changed.
    pub fn apply(
        conn: &Connection,
        id: WindowId,
        transition: Transition,
        due: DateTime<Utc>,
    ) -> Result<bool> {
        let changed = match transition {
            Transition::Start => conn.execute(
                "UPDATE election_windows SET status = ?1
                  WHERE id = ?2 AND status = ?3 AND start_time = ?4",
                params![WindowStatus::Started, id, WindowStatus::Scheduled, due],
            )?,
            Transition::Finish => conn.execute(
                "UPDATE election_windows SET status = ?1, stop_time = ?3
                  WHERE id = ?2 AND status != ?1 AND stop_time = ?3",
                params![WindowStatus::Finished, id, due],
            )?,
        };
        Ok(changed == 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use crate::model::sqlite::ensure_schema_exists;

    use super::*;

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema_exists(&conn).unwrap();
        conn
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 5, 6, h, m, 0).unwrap()
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM election_windows", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn status_on_registration() {
        let mut conn = db();

        let window = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "admin", at(8, 0), utc())
            .unwrap();
        assert_eq!(window.status, WindowStatus::Scheduled);

        let window = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "admin", at(10, 0), utc())
            .unwrap();
        assert_eq!(window.status, WindowStatus::Started);

        let window = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "admin", at(17, 0), utc())
            .unwrap();
        assert_eq!(window.status, WindowStatus::Finished);
    }

    #[test]
    fn rejects_empty_window() {
        let mut conn = db();
        let result = ElectionWindow::upsert(&mut conn, at(9, 0), at(9, 0), "admin", at(8, 0), utc());
        assert!(matches!(result, Err(Error::InvalidWindow)));
        let result = ElectionWindow::upsert(&mut conn, at(9, 0), at(8, 0), "admin", at(8, 0), utc());
        assert!(matches!(result, Err(Error::InvalidWindow)));
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn same_day_updates() {
        let mut conn = db();
        let first = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "alice", at(8, 0), utc())
            .unwrap();
        let second = ElectionWindow::upsert(&mut conn, at(11, 0), at(15, 30), "bob", at(8, 0), utc())
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(count(&conn), 1);
        assert_eq!(second.start_time, at(11, 0));
        assert_eq!(second.stop_time, at(15, 30));
        assert_eq!(second.registered_by, "bob");

        // A different day gets its own row.
        let next_day = ElectionWindow::upsert(
            &mut conn,
            at(9, 0) + Duration::days(1),
            at(17, 0) + Duration::days(1),
            "alice",
            at(8, 0),
            utc(),
        )
        .unwrap();
        assert_ne!(next_day.id, first.id);
        assert_eq!(count(&conn), 2);
        assert_eq!(ElectionWindow::latest(&conn).unwrap(), Some(next_day));
    }

    #[test]
    fn day_follows_offset() {
        let mut conn = db();
        let pkt = FixedOffset::east_opt(5 * 3600).unwrap();
        // 22:00 UTC on the 6th and 01:00 UTC on the 7th are both the 7th in Pakistan.
        let late = ElectionWindow::upsert(&mut conn, at(22, 0), at(23, 0), "a", at(8, 0), pkt)
            .unwrap();
        let early = ElectionWindow::upsert(
            &mut conn,
            at(1, 0) + Duration::days(1),
            at(2, 0) + Duration::days(1),
            "a",
            at(8, 0),
            pkt,
        )
        .unwrap();
        assert_eq!(late.id, early.id);
    }

    #[test]
    fn force_stop() {
        let mut conn = db();
        assert!(matches!(
            ElectionWindow::force_stop(&conn, "admin", at(10, 0)),
            Err(Error::NoActiveWindow)
        ));

        let window = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "alice", at(10, 0), utc())
            .unwrap();
        let stopped = ElectionWindow::force_stop(&conn, "bob", at(12, 0)).unwrap();
        assert_eq!(stopped.id, window.id);
        assert_eq!(stopped.status, WindowStatus::Finished);
        assert_eq!(stopped.stop_time, at(12, 0));
        assert_eq!(stopped.registered_by, "bob");

        // Already finished: nothing to stop, stop time untouched.
        assert!(matches!(
            ElectionWindow::force_stop(&conn, "carol", at(13, 0)),
            Err(Error::NoActiveWindow)
        ));
        let stored = ElectionWindow::by_id(&conn, window.id).unwrap().unwrap();
        assert_eq!(stored.stop_time, at(12, 0));
        assert_eq!(stored.registered_by, "bob");
    }

    #[test]
    fn force_stop_picks_latest_start() {
        let mut conn = db();
        let later = ElectionWindow::upsert(
            &mut conn,
            at(9, 0) + Duration::days(2),
            at(17, 0) + Duration::days(2),
            "a",
            at(8, 0),
            utc(),
        )
        .unwrap();
        let earlier = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "a", at(8, 0), utc())
            .unwrap();

        let stopped = ElectionWindow::force_stop(&conn, "a", at(8, 30)).unwrap();
        assert_eq!(stopped.id, later.id);
        let untouched = ElectionWindow::by_id(&conn, earlier.id).unwrap().unwrap();
        assert_eq!(untouched.status, WindowStatus::Scheduled);
    }

    #[test]
    fn guarded_transitions() {
        let mut conn = db();
        let window = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "a", at(8, 0), utc())
            .unwrap();

        // Start only applies once, and only for the armed schedule.
        assert!(!ElectionWindow::apply(&conn, window.id, Transition::Start, at(9, 5)).unwrap());
        assert!(ElectionWindow::apply(&conn, window.id, Transition::Start, at(9, 0)).unwrap());
        assert!(!ElectionWindow::apply(&conn, window.id, Transition::Start, at(9, 0)).unwrap());
        let started = ElectionWindow::by_id(&conn, window.id).unwrap().unwrap();
        assert_eq!(started.status, WindowStatus::Started);
        assert_eq!(ElectionWindow::latest_started(&conn).unwrap(), Some(started));

        assert!(ElectionWindow::apply(&conn, window.id, Transition::Finish, at(17, 0)).unwrap());
        assert!(!ElectionWindow::apply(&conn, window.id, Transition::Finish, at(17, 0)).unwrap());
        let finished = ElectionWindow::by_id(&conn, window.id).unwrap().unwrap();
        assert_eq!(finished.status, WindowStatus::Finished);
        assert_eq!(finished.stop_time, at(17, 0));
        assert!(ElectionWindow::latest_started(&conn).unwrap().is_none());

        // Finished is terminal for timers.
        assert!(!ElectionWindow::apply(&conn, window.id, Transition::Start, at(9, 0)).unwrap());
    }

    #[test]
    fn stale_finish_after_force_stop() {
        let mut conn = db();
        let window = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "a", at(10, 0), utc())
            .unwrap();
        ElectionWindow::force_stop(&conn, "a", at(11, 0)).unwrap();
        assert!(!ElectionWindow::apply(&conn, window.id, Transition::Finish, at(17, 0)).unwrap());
        let stored = ElectionWindow::by_id(&conn, window.id).unwrap().unwrap();
        assert_eq!(stored.stop_time, at(11, 0));
    }

    #[test]
    fn pending_windows() {
        let mut conn = db();
        let finished = ElectionWindow::upsert(&mut conn, at(9, 0), at(17, 0), "a", at(18, 0), utc())
            .unwrap();
        let scheduled = ElectionWindow::upsert(
            &mut conn,
            at(9, 0) + Duration::days(1),
            at(17, 0) + Duration::days(1),
            "a",
            at(18, 0),
            utc(),
        )
        .unwrap();
        assert_eq!(finished.status, WindowStatus::Finished);
        assert_eq!(ElectionWindow::pending(&conn).unwrap(), vec![scheduled]);
    }
}
