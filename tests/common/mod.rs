//! Shared test helpers for the crate's integration suite.

use std::time::Duration;

/// Poll `condition` every 10ms until it returns `true` or `attempts` are
/// exhausted. The executor/notifier pipeline crosses several `tokio::spawn`
/// boundaries (worker loops, spawned submissions) with no single future an
/// integration test can simply `.await`, so tests synchronize on observable
/// state instead of sleeping a fixed guess.
pub async fn wait_until(mut attempts: u32, mut condition: impl FnMut() -> bool) -> bool {
    loop {
        if condition() {
            return true;
        }
        if attempts == 0 {
            return false;
        }
        attempts -= 1;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
