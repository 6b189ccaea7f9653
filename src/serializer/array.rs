use super::Serializer;
use crate::pagination::{Cursor, Paginator};
use crate::Data;
use serde_json::{json, Value};

/// Emits items as-is and wraps collections under their resource key
/// (`"data"` when unnamed). Includes are embedded inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArraySerializer;

impl Serializer for ArraySerializer {
    fn collection(&self, resource_key: Option<&str>, data: Vec<Data>) -> Value {
        let key = resource_key.unwrap_or("data");
        let mut wrapped = Data::new();
        wrapped.insert(key.to_string(), items_to_value(data));
        Value::Object(wrapped)
    }

    fn item(&self, _resource_key: Option<&str>, data: Data) -> Value {
        Value::Object(data)
    }

    fn meta(&self, meta: &Data) -> Data {
        let mut fragment = Data::new();
        if !meta.is_empty() {
            fragment.insert("meta".to_string(), Value::Object(meta.clone()));
        }
        fragment
    }

    fn paginator(&self, paginator: &dyn Paginator) -> Data {
        let current_page = paginator.current_page();
        let last_page = paginator.last_page();

        let mut links = Data::new();
        if current_page > 1 {
            links.insert("previous".to_string(), json!(paginator.url(current_page - 1)));
        }
        if current_page < last_page {
            links.insert("next".to_string(), json!(paginator.url(current_page + 1)));
        }

        let pagination = json!({
            "total": paginator.total(),
            "count": paginator.count(),
            "per_page": paginator.per_page(),
            "current_page": current_page,
            "total_pages": last_page,
            "links": links,
        });

        let mut fragment = Data::new();
        fragment.insert("pagination".to_string(), pagination);
        fragment
    }

    fn cursor(&self, cursor: &Cursor) -> Data {
        let rendered = json!({
            "current": cursor.current,
            "prev": cursor.prev,
            "next": cursor.next,
            "count": cursor.count.unwrap_or(0),
        });

        let mut fragment = Data::new();
        fragment.insert("cursor".to_string(), rendered);
        fragment
    }
}

/// Like [`ArraySerializer`] but every item and collection sits under a
/// `"data"` key, and a null resource renders as `{"data": null}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataArraySerializer;

impl Serializer for DataArraySerializer {
    fn collection(&self, _resource_key: Option<&str>, data: Vec<Data>) -> Value {
        json!({ "data": items_to_value(data) })
    }

    fn item(&self, _resource_key: Option<&str>, data: Data) -> Value {
        json!({ "data": data })
    }

    fn null(&self) -> Option<Value> {
        Some(json!({ "data": null }))
    }

    fn meta(&self, meta: &Data) -> Data {
        ArraySerializer.meta(meta)
    }

    fn paginator(&self, paginator: &dyn Paginator) -> Data {
        ArraySerializer.paginator(paginator)
    }

    fn cursor(&self, cursor: &Cursor) -> Data {
        ArraySerializer.cursor(cursor)
    }
}

fn items_to_value(items: Vec<Data>) -> Value {
    Value::Array(items.into_iter().map(Value::Object).collect())
}
