//! Timer-driven stepping.
//!
//! Steps run sequentially on one tokio task holding the engine lock for the
//! duration of each tick, so ticks never overlap and readers only observe the
//! ledger between ticks. Starting a new timer fully stops the previous one
//! first; changing the interval only changes the delay between ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::engine::Engine;

/// Drives an engine on a fixed interval.
#[derive(Debug)]
pub struct Runner {
    engine: Arc<Mutex<Engine>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Runner {
    pub fn new(engine: Arc<Mutex<Engine>>) -> Self {
        Self {
            engine,
            handle: Mutex::new(None),
        }
    }

    /// Start stepping every `interval_ms` milliseconds, stopping any running
    /// timer first.
    pub async fn start(&self, interval_ms: u64) {
        self.stop().await;

        let engine = Arc::clone(&self.engine);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let action = engine.lock().await.step();
                tracing::trace!(?action, "timer tick");
            }
        });

        *self.handle.lock().await = Some(task);
        tracing::info!(interval_ms, "simulation timer started");
    }

    /// Stop the timer. Safe to call when not running; the current tick, if
    /// any, completes because it holds the engine lock synchronously.
    pub async fn stop(&self) {
        if let Some(task) = self.handle.lock().await.take() {
            task.abort();
            tracing::info!("simulation timer stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn engine() -> Arc<Mutex<Engine>> {
        Arc::new(Mutex::new(
            Engine::new(SimConfig {
                seed: Some(1),
                ..SimConfig::default()
            })
            .unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_start_steps_and_stop_halts() {
        let engine = engine();
        let runner = Runner::new(Arc::clone(&engine));

        runner.start(1).await;
        assert!(runner.is_running().await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        runner.stop().await;
        assert!(!runner.is_running().await);

        let tick = engine.lock().await.tick();
        assert!(tick > 0, "timer should have stepped at least once");

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(engine.lock().await.tick(), tick, "stopped timer must not step");
    }

    #[tokio::test]
    async fn test_restart_replaces_timer() {
        let engine = engine();
        let runner = Runner::new(Arc::clone(&engine));

        runner.start(1000).await;
        runner.start(1).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        runner.stop().await;

        // Only the second timer was live; it stepped on its short interval.
        assert!(engine.lock().await.tick() > 1);
    }
}
