pub mod memory;
pub mod path;
pub mod postgres;
pub mod traits;

pub use memory::*;
pub use path::*;
pub use postgres::*;
pub use traits::*;
