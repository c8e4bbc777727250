//! Market data aggregate: what the backend sends, in domain form.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
