//! Logging for track builds, through `tracing` when the `tracing` feature
//! is on and compiled away otherwise.
//!
//! Events the crate emits:
//! - `debug`: one per spiral (sweep, span count, declination strategy), one
//!   per built segment, and one per cross-section when a track sets
//!   `"debug": true` (tagged with its `debugLabel`)
//! - `trace`: sections produced by each flattened span
//! - `warn`: a span hitting the subdivision depth limit, or a spiral
//!   needing more spans than allowed

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, trace, warn};
