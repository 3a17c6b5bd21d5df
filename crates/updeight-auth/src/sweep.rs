//! Daily sweep of expired sessions.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Days, Local, TimeZone, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error};
use updeight_core::repository::{MemberRepository, SessionRepository};

use crate::session::SessionStore;

/// First instant strictly after `now` whose local wall clock reads
/// `hour:00:00`. Hours above 23 are clamped.
pub fn next_sweep_after<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let hour = hour.min(23);
    let tz = now.timezone();
    let today = now.date_naive();

    for offset in 0..=2 {
        let Some(day) = today.checked_add_days(Days::new(offset)) else {
            break;
        };
        let Some(naive) = day.and_hms_opt(hour, 0, 0) else {
            continue;
        };
        // `earliest` handles repeated wall-clock hours; skipped hours
        // (DST gaps) fall through to the next day.
        if let Some(candidate) = tz.from_local_datetime(&naive).earliest() {
            if candidate > *now {
                return candidate;
            }
        }
    }

    now.clone() + chrono::Duration::days(1)
}

/// Spawn the recurring sweep. Runs forever until the handle is aborted.
pub fn spawn_daily_sweep<S, M>(store: Arc<SessionStore<S, M>>, hour: u32) -> JoinHandle<()>
where
    S: SessionRepository + 'static,
    M: MemberRepository + 'static,
{
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = next_sweep_after(&now, hour);
            let wait = (next.clone() - now)
                .to_std()
                .unwrap_or(StdDuration::from_secs(60));
            debug!(next_sweep = %next, "Session sweep scheduled");
            tokio::time::sleep(wait).await;

            if let Err(e) = store.sweep_expired(Utc::now()).await {
                error!(error = %e, "Session sweep failed");
            }
        }
    })
}
