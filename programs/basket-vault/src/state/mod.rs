pub mod basket;
pub mod position;

pub use basket::*;
pub use position::*;
