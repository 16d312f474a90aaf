pub mod error;

pub use error::{AvrocolError, Result};
