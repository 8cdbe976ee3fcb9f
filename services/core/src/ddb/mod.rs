pub mod adapter;
pub mod delete_item;
pub mod get_item;
pub mod put_item;
pub mod query;
pub mod update_item;

pub use adapter::Adapter;
