//! Chart aggregate: panel assignment, layout engine and the declarative
//! chart specification it produces.

pub mod assignment;
pub mod layout;
pub mod specification;
pub mod value_objects;

pub use assignment::*;
pub use layout::*;
pub use specification::*;
pub use value_objects::*;
