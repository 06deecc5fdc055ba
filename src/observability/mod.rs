//! Observability
//!
//! Structured JSON logging for every table lifecycle event. Logging is
//! synchronous and never affects the outcome of the operation it describes.
//!
//! ```ignore
//! use tableforge::observability::{Event, Logger, Timer};
//!
//! let timer = Timer::new();
//! // ... create a table ...
//! Logger::event(Event::TableCreated, &[("table", "widgets"), ("duration_ms", &timer.elapsed_ms())]);
//! ```

mod events;
mod logger;
mod timer;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use timer::Timer;
