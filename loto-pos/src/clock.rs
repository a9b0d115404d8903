//! 页头时钟
//!
//! 每分钟刷新一次 `HH:MM`（业务时区）。后台任务随 [`ClockTicker`] 一起释放。

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const TICK: Duration = Duration::from_secs(60);

pub fn format_clock(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%H:%M").to_string()
}

pub struct ClockTicker {
    shutdown: CancellationToken,
    display: watch::Receiver<String>,
    handle: JoinHandle<()>,
}

impl ClockTicker {
    /// Start ticking every minute against the system clock
    pub fn start(tz: Tz) -> Self {
        Self::with_source(tz, TICK, Utc::now)
    }

    pub fn with_source<F>(tz: Tz, period: Duration, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + 'static,
    {
        let (tx, display) = watch::channel(format_clock(now(), tz));
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // 第一次 tick 立即返回，初始值已经写入
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!("Clock ticker stopped");
                        return;
                    }
                    _ = interval.tick() => {
                        if tx.send(format_clock(now(), tz)).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Self {
            shutdown,
            display,
            handle,
        }
    }

    pub fn current(&self) -> String {
        self.display.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.display.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
