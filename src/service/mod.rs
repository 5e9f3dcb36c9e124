//! CrudService: generic CRUD using the safe SQL builder.

mod crud;
pub mod validation;
pub use crud::CrudService;
pub use validation::{RequestValidator, ResourcePayload};
