pub mod capacity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod service;
pub mod status_machine;

pub use capacity::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use pricing::*;
pub use repository::*;
pub use service::*;
pub use status_machine::*;
