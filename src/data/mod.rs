//! Dataset access: column frames and the ordered source-resolution chain.

pub mod frame;
pub mod resolver;

pub use frame::*;
pub use resolver::*;
