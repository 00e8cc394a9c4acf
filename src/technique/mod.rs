pub mod catalog;
pub mod types;

#[cfg(test)]
mod tests;

pub use catalog::*;
pub use types::*;
