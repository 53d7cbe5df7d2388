#[allow(clippy::module_inception)]
pub mod token;

pub use token::*;
