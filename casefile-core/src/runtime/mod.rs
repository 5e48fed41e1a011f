pub mod ctx;
pub mod progress;
pub mod timer;

pub use ctx::{Ctx, Session};
pub use progress::{CollectedLeads, ProgressTracker};
pub use timer::{Interval, Timers};
