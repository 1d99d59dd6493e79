//! Air-quality alert pipeline.
//!
//! - `notification`: renders the per-subscriber email
//! - `dispatcher`: one sequential pass over the subscriber list
//! - `schedule`: daily trigger loop for the standalone scheduler process
//!
//! The HTTP trigger and the scheduler share the dispatcher but do not
//! coordinate; running both at once can send duplicate alerts.

pub mod dispatcher;
pub mod notification;
pub mod schedule;

pub use dispatcher::{AlertDispatcher, DispatchSummary};
pub use notification::Notification;
pub use schedule::{AlertScheduler, AlertSchedulerHandle, Clock, next_occurrence};
