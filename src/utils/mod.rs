mod file_name;
pub mod shutdown;

pub use file_name::*;
pub use shutdown::*;
