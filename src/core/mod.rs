pub mod cache;
pub mod harvester;
pub mod resolver;

pub use crate::domain::model::{Documentation, ExtractionMode, FieldDocs, LayerRef};
pub use crate::domain::ports::{ConfigProvider, SchemaSource, Storage};
pub use crate::utils::error::Result;
