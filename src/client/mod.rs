//! Client side of the upload pathway.

pub mod candidate;
pub mod picker;

pub use candidate::*;
pub use picker::*;
