mod error;
mod sortable;

pub use error::*;
pub use sortable::*;
