mod distance_cache;
mod selector;

pub use distance_cache::*;
pub use selector::*;

#[cfg(test)]
mod selector_tests;
