//! Provider data handed to every data source

use crate::api::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct BackstageProviderData {
    pub client: Arc<Client>,
}

impl BackstageProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
