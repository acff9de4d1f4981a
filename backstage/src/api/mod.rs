//! Backstage catalog REST client

pub mod catalog;
pub mod client;
pub mod entity;
pub mod error;
pub mod pool;

pub use client::{Client, ClientConfig, DEFAULT_NAMESPACE};
pub use entity::{Entity, EntityKind, EntityResponse};
pub use error::ApiError;
