pub mod error;
pub mod info;
pub mod tree;
pub mod tri_state;

pub use error::*;
pub use info::*;
pub use tree::*;
pub use tri_state::*;
