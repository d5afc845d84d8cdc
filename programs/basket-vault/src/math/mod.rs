pub mod conversion;
pub mod fixed_point;

pub use conversion::*;
pub use fixed_point::*;
