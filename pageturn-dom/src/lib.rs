pub mod document;
pub mod error;
pub mod head;
pub mod merger;

pub use document::{Container, Dom, Element, MemoryDocument};
pub use error::DomError;
pub use head::{HeadElement, HeadSwapPlan};
pub use merger::ContentMerger;
