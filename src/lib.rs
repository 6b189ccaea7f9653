pub mod api;
pub mod error;
pub mod manager;
pub mod pagination;
pub mod param_bag;
pub mod resource;
pub mod scope;
pub mod serializer;
pub mod transformer;
mod serialization;

/// A transformed field mapping.
pub type Data = serde_json::Map<String, serde_json::Value>;

pub use api::{transform, transform_streamed, Document};
pub use error::{FractalError, Result};
pub use manager::{Manager, ManagerOptions};
pub use pagination::{Cursor, Paginator, SimplePaginator};
pub use param_bag::ParamBag;
pub use resource::{Resource, ResourceKind};
pub use scope::Scope;
pub use serializer::{ArraySerializer, DataArraySerializer, Serializer};
pub use transformer::{transformer_fn, FnTransformer, Transformer};
