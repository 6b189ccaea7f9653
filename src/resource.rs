use crate::error::{FractalError, Result};
use crate::pagination::{Cursor, Paginator};
use crate::transformer::{Binding, Bound, Transformer};
use crate::Data;
use serde_json::Value;
use std::fmt::{self, Display};
use std::rc::Rc;

/// Which variant a [`Resource`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Item,
    Collection,
    Null,
    Primitive,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Item => write!(f, "item"),
            ResourceKind::Collection => write!(f, "collection"),
            ResourceKind::Null => write!(f, "null"),
            ResourceKind::Primitive => write!(f, "primitive"),
        }
    }
}

pub(crate) type Element<'a> = Box<dyn Bound<'a> + 'a>;
pub(crate) type Elements<'a> = Box<dyn Iterator<Item = Element<'a>> + 'a>;
type PrimitiveFn<'a> = Box<dyn Fn(Value) -> Value + 'a>;

pub(crate) enum ResourceData<'a> {
    Item(Element<'a>),
    Collection(Elements<'a>),
    Null,
    Primitive(Value, Option<PrimitiveFn<'a>>),
}

/// Data to transform together with the transformer to use and the
/// metadata that travels with it.
///
/// A resource is single-use: its data is handed to the transformer exactly
/// once, and collections are pulled lazily from the wrapped iterator.
pub struct Resource<'a> {
    kind: ResourceKind,
    data: Option<ResourceData<'a>>,
    resource_key: Option<String>,
    meta: Data,
    cursor: Option<Cursor>,
    paginator: Option<Box<dyn Paginator + 'a>>,
}

impl<'a> Resource<'a> {
    fn new(kind: ResourceKind, data: ResourceData<'a>) -> Self {
        Self {
            kind,
            data: Some(data),
            resource_key: None,
            meta: Data::new(),
            cursor: None,
            paginator: None,
        }
    }

    /// A single value and its transformer.
    pub fn item<X>(source: X::Source, transformer: X) -> Self
    where
        X: Transformer<'a> + 'a,
        X::Source: 'a,
    {
        let element = Box::new(Binding {
            source,
            transformer: Rc::new(transformer),
        });
        Self::new(ResourceKind::Item, ResourceData::Item(element))
    }

    /// A sequence of values sharing one transformer. The iterator is not
    /// advanced until the resource is transformed.
    pub fn collection<I, X>(items: I, transformer: X) -> Self
    where
        I: IntoIterator<Item = X::Source>,
        I::IntoIter: 'a,
        X: Transformer<'a> + 'a,
        X::Source: 'a,
    {
        let transformer = Rc::new(transformer);
        let elements = items.into_iter().map(move |source| {
            Box::new(Binding {
                source,
                transformer: Rc::clone(&transformer),
            }) as Element<'a>
        });
        Self::new(
            ResourceKind::Collection,
            ResourceData::Collection(Box::new(elements)),
        )
    }

    pub fn null() -> Self {
        Self::new(ResourceKind::Null, ResourceData::Null)
    }

    /// A raw value that bypasses the serializer.
    pub fn primitive(value: impl Into<Value>) -> Self {
        Self::new(
            ResourceKind::Primitive,
            ResourceData::Primitive(value.into(), None),
        )
    }

    /// A raw value passed through `transform` before it is emitted.
    pub fn primitive_with<F>(value: impl Into<Value>, transform: F) -> Self
    where
        F: Fn(Value) -> Value + 'a,
    {
        Self::new(
            ResourceKind::Primitive,
            ResourceData::Primitive(value.into(), Some(Box::new(transform))),
        )
    }

    pub fn with_resource_key(mut self, key: impl Into<String>) -> Self {
        self.resource_key = Some(key.into());
        self
    }

    pub fn with_meta(mut self, meta: Data) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_paginator(mut self, paginator: impl Paginator + 'a) -> Self {
        self.paginator = Some(Box::new(paginator));
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn resource_key(&self) -> Option<&str> {
        self.resource_key.as_deref()
    }

    pub fn set_resource_key(&mut self, key: impl Into<String>) {
        self.resource_key = Some(key.into());
    }

    pub fn meta(&self) -> &Data {
        &self.meta
    }

    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    pub fn set_meta_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.meta.insert(key.into(), value.into());
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn paginator(&self) -> Option<&dyn Paginator> {
        self.paginator.as_deref().map(|p| p as &dyn Paginator)
    }

    /// Whether the data is still waiting to be transformed.
    pub fn is_pending(&self) -> bool {
        self.data.is_some()
    }

    pub(crate) fn take_data(&mut self, operation: &'static str) -> Result<ResourceData<'a>> {
        self.data
            .take()
            .ok_or(FractalError::ResourceConsumed { operation })
    }
}

impl fmt::Debug for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind)
            .field("pending", &self.data.is_some())
            .field("resource_key", &self.resource_key)
            .field("meta", &self.meta)
            .field("cursor", &self.cursor)
            .field("has_paginator", &self.paginator.is_some())
            .finish()
    }
}
