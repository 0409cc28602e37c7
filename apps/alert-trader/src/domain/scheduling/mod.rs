//! Scheduling of deferred work.
//!
//! Computes delays and one-shot cron expressions; delivery itself belongs to
//! the dispatcher port.

mod check;
mod cron;

pub use check::{ScheduledCheck, delay_until};
pub use cron::CronExpression;
