pub mod direction;
pub mod history;

pub use direction::Direction;
pub use history::{HistoryTracker, VisitRecord};
