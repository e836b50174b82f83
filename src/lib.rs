pub mod config;
pub mod convert;
mod error;
pub mod log;
pub mod metadata;
pub mod path;
pub mod schema;

pub use config::{Config, ConfigError};
pub use convert::{sniff, to_raw, to_typed, DataType, Numeric, ParameterSpec, TypedValue};
pub use error::Error;
pub use log::{ErrorLogger, LogEvent, LogKind};
pub use metadata::{JsonOptions, MetaData};
pub use path::PathAccessor;
pub use schema::{Schema, SchemaBuilder};
