use std::collections::HashMap;
use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;

/// Store scope in which an update happens, as supplied by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreContext {
    pub store_id: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Store {
    pub store_id: u32,
    pub code: String,
    pub website_id: u32,
    pub is_active: bool,
}

#[derive(Debug, Error)]
pub enum ResolveStoreError {
    #[error("The store that was requested wasn't found. Verify the store and try again.")]
    NotFound(u32),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[async_trait]
pub trait StoreResolver: Send + Sync {
    async fn resolve(&self, context: &StoreContext) -> Result<Store, ResolveStoreError>;
}

/// Resolves stores from a fixed, configured list. Inactive stores are treated as missing.
#[derive(Clone, Debug, Default)]
pub struct StaticStoreResolver {
    stores: HashMap<u32, Store>,
}

impl StaticStoreResolver {
    pub fn new(stores: impl IntoIterator<Item = Store>) -> Self {
        Self {
            stores: stores.into_iter().map(|s| (s.store_id, s)).collect(),
        }
    }
}

#[async_trait]
impl StoreResolver for StaticStoreResolver {
    async fn resolve(&self, context: &StoreContext) -> Result<Store, ResolveStoreError> {
        match self.stores.get(&context.store_id) {
            Some(store) if store.is_active => Ok(store.clone()),
            _ => Err(ResolveStoreError::NotFound(context.store_id)),
        }
    }
}
