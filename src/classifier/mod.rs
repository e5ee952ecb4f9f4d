//! Product page classification
//!
//! Two tiers:
//! - `PatternClassifier`: memoized URL-shape check, zero fetch cost
//! - `ContentClassifier`: confidence score over a rendered document, used only when the
//!   pattern check did not confirm the URL

mod content;
mod pattern;
mod signals;

pub use content::{score, ContentClassifier, Signal, Stage, Verdict, DEFAULT_THRESHOLD, SIGNAL_WEIGHTS};
pub use pattern::{PatternClassifier, ProductPatterns};
pub use signals::{extract_signals, Signals};
