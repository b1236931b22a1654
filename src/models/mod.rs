pub mod common;
pub mod generation;
pub mod history;
pub mod options;

pub use common::*;
pub use generation::*;
pub use history::*;
pub use options::*;
