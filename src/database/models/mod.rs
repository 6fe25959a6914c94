pub mod satellite;

pub use satellite::{PayloadKind, RawData, Satellite};
