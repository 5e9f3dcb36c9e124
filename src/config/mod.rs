pub mod types;
pub mod builtin;
pub mod validator;
pub mod registry;

pub use types::*;
pub use builtin::*;
pub use validator::*;
pub use registry::*;
