//! Output shaping policies.
//!
//! A [`Serializer`] decides how transformed data is wrapped: how an item, a
//! collection and an absent value look, where metadata and pagination go,
//! and whether includes are embedded inline or side-loaded into a separate
//! top-level section. Implementations must be pure functions of their
//! arguments; the streaming execution relies on no serializer holding on to
//! the data it is handed.

mod array;

pub use array::{ArraySerializer, DataArraySerializer};

use crate::pagination::{Cursor, Paginator};
use crate::resource::Resource;
use crate::Data;
use serde_json::Value;

pub trait Serializer {
    /// Shapes a collection of transformed items.
    fn collection(&self, resource_key: Option<&str>, data: Vec<Data>) -> Value;

    /// Shapes a single transformed item.
    fn item(&self, resource_key: Option<&str>, data: Data) -> Value;

    /// Output for a null resource. `None` means the resource emits nothing.
    fn null(&self) -> Option<Value> {
        None
    }

    /// Fragment holding the resource's meta mapping, merged into the output.
    fn meta(&self, meta: &Data) -> Data;

    /// Pagination meta for page-number pagination, as `{meta_key: value}`.
    fn paginator(&self, paginator: &dyn Paginator) -> Data;

    /// Pagination meta for cursor pagination, as `{meta_key: value}`.
    fn cursor(&self, cursor: &Cursor) -> Data;

    /// Combines an item's own fields with its resolved includes.
    fn merge_includes(&self, transformed: Data, included: &Data) -> Data {
        if self.sideload_includes() {
            return transformed;
        }
        let mut merged = transformed;
        for (key, value) in included {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Whether included data is returned as a separate top-level section.
    fn sideload_includes(&self) -> bool {
        false
    }

    /// The side-loaded section built from the include fragments of the given
    /// items (one fragment per item).
    fn included_data(&self, resource: &Resource<'_>, included: &[Data]) -> Data {
        let _ = (resource, included);
        Data::new()
    }

    /// Lets a side-loading serializer annotate one item with references to
    /// the data that was side-loaded for it.
    fn inject_data(&self, data: Data, included: &Data) -> Data {
        let _ = included;
        data
    }

    /// Final pass over the accumulated side-loaded section, run only on the
    /// root scope.
    fn filter_includes(&self, included: Data, data: &Value) -> Data {
        let _ = data;
        included
    }

    /// Folds one more side-loaded section into an accumulated one. Arrays
    /// under the same key are concatenated; other keys keep their first value.
    fn merge_included(&self, accumulated: Data, next: Data) -> Data {
        let mut merged = accumulated;
        for (key, value) in next {
            if let Some(existing) = merged.get_mut(&key) {
                if let (Value::Array(existing), Value::Array(more)) = (existing, value) {
                    existing.extend(more);
                }
            } else {
                merged.insert(key, value);
            }
        }
        merged
    }

    fn inject_available_include_data(&self, data: Value, available_includes: &[String]) -> Value {
        let _ = available_includes;
        data
    }

    /// Fields kept even when a fieldset filter does not name them.
    fn mandatory_fields(&self) -> &[&str] {
        &[]
    }
}

impl<S: Serializer + ?Sized> Serializer for Box<S> {
    fn collection(&self, resource_key: Option<&str>, data: Vec<Data>) -> Value {
        (**self).collection(resource_key, data)
    }

    fn item(&self, resource_key: Option<&str>, data: Data) -> Value {
        (**self).item(resource_key, data)
    }

    fn null(&self) -> Option<Value> {
        (**self).null()
    }

    fn meta(&self, meta: &Data) -> Data {
        (**self).meta(meta)
    }

    fn paginator(&self, paginator: &dyn Paginator) -> Data {
        (**self).paginator(paginator)
    }

    fn cursor(&self, cursor: &Cursor) -> Data {
        (**self).cursor(cursor)
    }

    fn merge_includes(&self, transformed: Data, included: &Data) -> Data {
        (**self).merge_includes(transformed, included)
    }

    fn sideload_includes(&self) -> bool {
        (**self).sideload_includes()
    }

    fn included_data(&self, resource: &Resource<'_>, included: &[Data]) -> Data {
        (**self).included_data(resource, included)
    }

    fn inject_data(&self, data: Data, included: &Data) -> Data {
        (**self).inject_data(data, included)
    }

    fn filter_includes(&self, included: Data, data: &Value) -> Data {
        (**self).filter_includes(included, data)
    }

    fn merge_included(&self, accumulated: Data, next: Data) -> Data {
        (**self).merge_included(accumulated, next)
    }

    fn inject_available_include_data(&self, data: Value, available_includes: &[String]) -> Value {
        (**self).inject_available_include_data(data, available_includes)
    }

    fn mandatory_fields(&self) -> &[&str] {
        (**self).mandatory_fields()
    }
}
