use chrono::Utc;

use crate::error::{Error, Result};
use crate::model::common::time::{format_timestamp, parse_timestamp};
use crate::Backend;

use super::{payload::fields, reply::NONE, Reply};

/// `registerElectionTime;start,stop,registeredBy`
pub(super) async fn register_election_time(backend: &Backend, payload: &str) -> Result<Reply> {
    let [start, stop, registered_by] = fields(payload)?;
    let offset = backend.config().utc_offset();
    let start = parse_timestamp(start, offset).ok_or_else(|| Error::BadTimestamp(start.to_string()))?;
    let stop = parse_timestamp(stop, offset).ok_or_else(|| Error::BadTimestamp(stop.to_string()))?;

    let status = backend
        .windows()
        .register(start, stop, registered_by, Utc::now())
        .await?;
    Ok(Reply::new(format!("OK: Election window saved ({status}).")))
}

/// `stopElectionTime;registeredBy`
pub(super) async fn stop_election_time(backend: &Backend, payload: &str) -> Result<Reply> {
    backend
        .windows()
        .force_stop(payload.trim(), Utc::now())
        .await?;
    Ok(Reply::new("OK: Election window stopped."))
}

/// `getElectionStatus`
pub(super) async fn get_election_status(backend: &Backend) -> Result<Reply> {
    let status = backend.windows().current_status().await?;
    Ok(Reply::new(status.map_or(NONE, |status| status.as_str())))
}

/// `selectElectionStopTime`
pub(super) async fn select_election_stop_time(backend: &Backend) -> Result<Reply> {
    let stop_time = backend.windows().started_stop_time().await?;
    let offset = backend.config().utc_offset();
    Ok(match stop_time {
        Some(stop_time) => Reply::new(format_timestamp(stop_time, offset)),
        None => Reply::new(NONE),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset};

    use crate::client::Client;
    use crate::model::common::time::WIRE_FORMAT;

    use super::*;

    /// Wall-clock time at the default +05:00 offset, in wire format.
    fn wire(at: chrono::DateTime<Utc>) -> String {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        at.with_timezone(&offset).format(WIRE_FORMAT).to_string()
    }

    #[backend_test]
    async fn status_follows_clock(client: Client) {
        let now = Utc::now();
        let cases = [
            (now + Duration::days(1), now + Duration::days(1) + Duration::hours(8), "Scheduled"),
            (now - Duration::days(3) - Duration::hours(8), now - Duration::days(3), "Finished"),
            (now - Duration::minutes(30), now + Duration::hours(8), "Started"),
        ];
        for (start, stop, expected) in cases {
            let reply = client
                .send(
                    "registerElectionTime",
                    &format!("{},{},admin", wire(start), wire(stop)),
                )
                .await
                .unwrap();
            assert_eq!(reply, format!("OK: Election window saved ({expected})."));
            assert_eq!(client.send("getElectionStatus", "").await.unwrap(), expected);
        }
    }

    #[backend_test]
    async fn same_day_updates_window(client: Client, backend: Backend) {
        let start = Utc::now() + Duration::days(10);
        for hours in [8, 4] {
            let reply = client
                .send(
                    "registerElectionTime",
                    &format!("{},{},admin", wire(start), wire(start + Duration::hours(hours))),
                )
                .await
                .unwrap();
            assert_eq!(reply, "OK: Election window saved (Scheduled).");
        }
        let windows: i64 = backend
            .store()
            .run(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM election_windows", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(windows, 1);
    }

    #[backend_test]
    async fn registration_errors(client: Client) {
        let start = Utc::now() + Duration::days(1);
        assert_eq!(
            client
                .send(
                    "registerElectionTime",
                    &format!("{},{},admin", wire(start), wire(start)),
                )
                .await
                .unwrap(),
            "ERROR:Stop time must be after start time"
        );
        assert_eq!(
            client
                .send("registerElectionTime", "tomorrow,later,admin")
                .await
                .unwrap(),
            "ERROR:bad timestamp 'tomorrow'"
        );
        assert_eq!(
            client.send("registerElectionTime", "2031-01-01 09:00:00").await.unwrap(),
            "ERROR:bad format"
        );
        assert_eq!(client.send("getElectionStatus", "").await.unwrap(), "NONE");
    }

    #[backend_test]
    async fn stop_and_stop_time(client: Client) {
        assert_eq!(
            client.send("stopElectionTime", "admin").await.unwrap(),
            "ERROR: No active window."
        );
        assert_eq!(client.send("selectElectionStopTime", "").await.unwrap(), "NONE");

        let now = Utc::now();
        let stop = now + Duration::hours(2);
        client
            .send(
                "registerElectionTime",
                &format!("{},{},admin", wire(now - Duration::minutes(5)), wire(stop)),
            )
            .await
            .unwrap();
        assert_eq!(
            client.send("selectElectionStopTime", "").await.unwrap(),
            wire(stop)
        );

        assert_eq!(
            client.send("stopElectionTime", "admin").await.unwrap(),
            "OK: Election window stopped."
        );
        assert_eq!(client.send("getElectionStatus", "").await.unwrap(), "Finished");
        assert_eq!(client.send("selectElectionStopTime", "").await.unwrap(), "NONE");
        assert_eq!(
            client.send("stopElectionTime", "admin").await.unwrap(),
            "ERROR: No active window."
        );
    }
}
