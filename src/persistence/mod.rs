pub mod snapshot;
pub mod store;

#[cfg(test)]
mod tests;

pub use snapshot::*;
pub use store::*;
