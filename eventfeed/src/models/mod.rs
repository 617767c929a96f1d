//! Domain models for events, users and feedback

pub mod event;
pub mod feedback;
pub mod saved;
pub mod user;

pub use event::{Event, EventBuilder};
pub use feedback::{Feedback, FeedbackSignals, InteractionMetrics};
pub use saved::SavedEvent;
pub use user::{User, UserBuilder};
