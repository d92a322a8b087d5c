pub mod explorer;
pub mod host;
pub mod row;
pub mod text;

pub use explorer::*;
pub use host::*;
pub use row::*;
