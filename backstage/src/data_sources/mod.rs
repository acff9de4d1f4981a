pub mod engine;
pub mod entity;
pub mod kinds;
pub mod model;
pub mod projector;
pub mod schema;
pub mod validation;

pub use entity::EntityDataSource;
pub use kinds::{KindDescriptor, KINDS};
