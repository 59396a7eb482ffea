pub mod catalog;
pub mod clients;
pub mod config;
pub mod deserializers;
pub mod design;
pub mod error;
pub mod formatters;
pub mod resources;
pub mod schemas;
pub mod server;
pub mod tools;

pub use catalog::ComponentCatalog;
pub use config::Config;
pub use design::DesignPipeline;
pub use error::{DesignError, Result};
pub use server::DesignServer;
