pub mod config;
pub mod error;
pub mod types;

pub use config::{config, set_config, PlumbingConfig};
pub use error::{Collision, PlumbingError, Result};
pub use types::{ClassId, PartId, Stage, TAGS_ATTR};
