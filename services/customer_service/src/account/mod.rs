pub mod schema;
pub mod types;

pub use schema::{AccountSchema, FieldKind};
pub use types::CustomerAccount;
