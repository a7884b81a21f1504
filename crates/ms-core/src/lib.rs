pub mod ast;
pub mod error;
pub mod types;
pub mod value;

pub use error::{ErrorKind, ModScriptError};
pub use types::*;
pub use value::*;
