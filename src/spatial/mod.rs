mod quadtree;
mod manager;

pub use quadtree::*;
pub use manager::*;
