pub mod cors;
pub mod logging;
pub mod upload_tracker;

pub use cors::*;
pub use upload_tracker::*;
