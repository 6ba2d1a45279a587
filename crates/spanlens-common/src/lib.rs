pub mod coord;
pub mod error;
pub mod lookup;
pub mod value;

pub use coord::*;
pub use error::*;
pub use lookup::*;
pub use value::*;
