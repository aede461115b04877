//! Fixed-rate tick scheduler for the chessclock room sweep.
//!
//! One scheduler drives one global loop that advances every running room.
//! The tick only decides *when* to sweep. How much time to charge comes
//! from the wall clock handed to the rooms, so a late or skipped tick never
//! loses or double-counts player time; it only delays the next broadcast.
//!
//! ```ignore
//! let mut scheduler = TickScheduler::new(config);
//! loop {
//!     let info = scheduler.wait_for_tick().await;
//!     registry.lock().await.sweep(clock.now_millis(), &codec);
//!     scheduler.record_tick_end();
//! }
//! ```

mod config;
mod metrics;
mod scheduler;

pub use config::{BudgetLevel, TickConfig, TickPolicy};
pub use metrics::TickMetrics;
pub use scheduler::{TickInfo, TickScheduler};
