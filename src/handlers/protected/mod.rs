// Protected handlers; every route here sits behind bearer_auth_middleware
pub mod satellite;

pub use satellite::{galileo_data_get, galileo_info_post, raw_data_get, satellite_info_post};
