mod config;
mod encoding;
mod error;
mod generator;
mod layout;
mod time;

pub use crate::config::*;
pub use crate::encoding::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::time::*;
