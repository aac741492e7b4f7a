//! Static budget classification: categories and their groups.

pub mod tree;

pub use tree::{CategoryDef, ClassificationTree, GroupDef, Resolution};
