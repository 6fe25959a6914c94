// Public handlers (no authentication required)
pub mod service;

pub use service::{health, root};
