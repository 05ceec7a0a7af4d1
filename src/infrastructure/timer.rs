//! # Clock and Timer
//!
//! Wall clock for vote start times, and a tokio-backed timer that posts delayed commands
//! onto the dispatch queue.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::application::dispatch::CommandSender;
use crate::domain::traits::{Clock, Timer};
use crate::domain::types::Command;

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct TokioTimer {
    queue: CommandSender,
}

impl TokioTimer {
    pub fn new(queue: CommandSender) -> Self {
        Self { queue }
    }
}

impl Timer for TokioTimer {
    fn schedule(&self, after: Duration, command: Command) {
        let queue = self.queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let ty = command.command_type();
            if queue.send(command).await.is_err() {
                tracing::warn!("Dropping timed {:?} command: queue closed", ty);
            }
        });
    }
}
