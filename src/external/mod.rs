pub mod error;
mod granite;
pub mod graphdb;

pub use error::ExternalError;
pub use granite::{GraniteClient, GraniteConfig};
pub use graphdb::{GraphDbClient, GraphDbConfig};
