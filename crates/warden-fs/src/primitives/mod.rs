pub mod remove_tree;

pub use remove_tree::remove_tree;
