use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::bot::AppState;
use crate::scheduler::Scheduler;

/// Tick the presence check on a timer so it also runs when no updates arrive.
/// The tracker's gate still limits it to one check per minimum interval.
pub async fn register_presence_check(
    scheduler: &Scheduler,
    state: Arc<AppState>,
    period: Duration,
) -> anyhow::Result<()> {
    scheduler
        .add_repeated_job(period, "presence_check", move || {
            let state = state.clone();
            Box::pin(async move {
                state.tick(Utc::now()).await;
            })
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::tests::{make_state, test_config};
    use crate::commands;
    use teloxide::types::ChatId;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_timer_runs_check_without_updates() {
        let dir = std::env::temp_dir().join(format!("chanwatch-timer-{}", std::process::id()));
        let (state, platform) = make_state(test_config(dir));
        platform.set_visible(ChatId(-100123), true);
        let state = Arc::new(state);

        let mut scheduler = Scheduler::new().await.unwrap();
        register_presence_check(&scheduler, state.clone(), Duration::from_millis(200))
            .await
            .unwrap();
        scheduler.start().await.unwrap();

        let mut notified = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if !platform.sent().is_empty() {
                notified = true;
                break;
            }
        }
        scheduler.shutdown().await.unwrap();

        assert!(notified, "timer never ran the presence check");
        assert_eq!(
            platform.sent(),
            vec![(ChatId(42), commands::NOTIFY_ADDED.to_string())]
        );
    }
}
