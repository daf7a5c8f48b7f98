//! Invocation statistics subsystem.
//!
//! # Data Flow
//! ```text
//! request tasks ──record_hit──▶ bounded queue ──▶ recorder.rs (sole owner of the counter table)
//! request tasks ──track/drop──▶ bounded queue ──▶ gauge.rs (sole owner of the in-flight count)
//!
//! reporter.rs (timer):
//!     snapshot → due = hits − last_reported → PUT {collector}/hits/{target}
//!     → on 2xx: mark_reported(target, captured hits)
//! ```
//!
//! # Design Decisions
//! - Single writer per piece of state, reached only through its channel
//! - Producers wait on a full queue; no event is ever dropped
//! - Counters live for the process lifetime; nothing is persisted

pub mod gauge;
pub mod recorder;
pub mod reporter;
pub mod types;

pub use gauge::{ActiveRequestGuard, ActiveRequests};
pub use recorder::StatsRecorder;
pub use reporter::{HitSink, HttpHitSink, StatsReporter};
pub use types::{CounterEntry, InvocationRecord, ReportError, StatsError, StatsSnapshot};
