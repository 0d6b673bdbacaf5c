pub mod item;
pub mod options;

pub use item::{Fields, Item};
pub use options::ViewerOptions;
