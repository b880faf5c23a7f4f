pub mod date_range;
pub mod document_id;
pub mod role;
pub mod sensor;
pub mod user;

pub use date_range::*;
pub use document_id::*;
pub use role::*;
pub use sensor::*;
pub use user::*;
