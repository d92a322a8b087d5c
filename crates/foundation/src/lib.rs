pub mod arena;
pub mod handles;

// Foundation crate: small, well-tested primitives only.
pub use arena::*;
pub use handles::*;
