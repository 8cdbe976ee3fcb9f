pub mod account;
pub mod context;
pub mod operations;
pub mod password;
pub mod persistence;
pub mod populate;
pub mod store;
pub mod subscription;
pub mod validation;

#[cfg(test)]
mod testing;

pub use account::CustomerAccount;
pub use operations::update_account::{AccountUpdateCoordinator, UpdateAccountError, UpdateRequest};
pub use store::StoreContext;
