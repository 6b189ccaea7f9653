//! Execution of one node of the include tree.
//!
//! A [`Scope`] binds a [`Resource`] to its dotted position below the root and
//! to the shared [`Manager`]. Executing it fires the resource's transformer on
//! every value, resolves the includes that pass the requested/excluded test
//! into child scopes, and lets the serializer shape the result.
//!
//! Two front-ends drive the same per-element routine:
//!
//! * [`Scope::to_value`] materialises the whole tree, keeping every element's
//!   include fragments until the collection is finished.
//! * [`Scope::to_value_streamed`] and [`Scope::stream`] finish one collection
//!   element (including its nested collections, recursively in the same mode)
//!   before pulling the next one from the resource's iterator.
//!
//! Both produce the same document. The one difference is side-loading: the
//! eager path hands all include fragments of a collection to the serializer
//! at once, so it can de-duplicate shared included objects, while the
//! streamed path hands them over one element at a time and folds the results,
//! so duplicates across elements survive.

use crate::api::Document;
use crate::error::{FractalError, Result};
use crate::manager::Manager;
use crate::resource::{Element, Resource, ResourceData, ResourceKind};
use crate::serialization::merge_fragment;
use crate::transformer::Bound;
use crate::Data;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Eager,
    Bounded,
}

impl Strategy {
    fn operation(self) -> &'static str {
        match self {
            Strategy::Eager => "to_value",
            Strategy::Bounded => "to_value_streamed",
        }
    }
}

/// One transformed element: its final fields, and the include fragments a
/// side-loading serializer still needs (empty otherwise).
struct Fired {
    data: Data,
    included: Data,
}

enum Shaped {
    Item(Data),
    Collection(Vec<Data>),
    Null,
}

pub struct Scope<'a> {
    manager: &'a Manager,
    resource: Resource<'a>,
    scope_identifier: Option<String>,
    parent_scopes: Vec<String>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        manager: &'a Manager,
        resource: Resource<'a>,
        scope_identifier: Option<String>,
        parent_scopes: Vec<String>,
    ) -> Self {
        Scope {
            manager,
            resource,
            scope_identifier,
            parent_scopes,
        }
    }

    pub fn manager(&self) -> &'a Manager {
        self.manager
    }

    pub fn resource(&self) -> &Resource<'a> {
        &self.resource
    }

    /// The segment this scope adds to the path, `None` for an unnamed root.
    pub fn scope_identifier(&self) -> Option<&str> {
        self.scope_identifier.as_deref()
    }

    /// Identifiers of every ancestor, root first. An unnamed root is stored as
    /// an empty segment.
    pub fn parent_scopes(&self) -> &[String] {
        &self.parent_scopes
    }

    pub fn is_root_scope(&self) -> bool {
        self.parent_scopes.is_empty()
    }

    /// Dotted path of this scope from the root, with `append` added as a
    /// final segment when given.
    pub fn identifier(&self, append: Option<&str>) -> String {
        self.parent_scopes
            .iter()
            .map(String::as_str)
            .chain(self.scope_identifier.as_deref())
            .chain(append)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether `segment`, nested below this scope, was requested.
    pub fn is_requested(&self, segment: &str) -> bool {
        let path = self.include_path(segment);
        self.manager.requested_includes().contains(&path)
    }

    /// Whether `segment`, nested below this scope, was excluded.
    pub fn is_excluded(&self, segment: &str) -> bool {
        let path = self.include_path(segment);
        self.manager.requested_excludes().contains(&path)
    }

    pub fn embed_child_scope(&self, identifier: &str, resource: Resource<'a>) -> Scope<'a> {
        self.manager.create_data(resource, Some(identifier), Some(self))
    }

    /// Transforms the whole tree in memory and returns the shaped document.
    pub fn to_value(self) -> Result<Option<Value>> {
        self.execute(Strategy::Eager)
    }

    /// Same output as [`Scope::to_value`], but collections at every depth are
    /// transformed one element at a time and each element's intermediates are
    /// released before the next one is pulled.
    pub fn to_value_streamed(self) -> Result<Option<Value>> {
        self.execute(Strategy::Bounded)
    }

    pub fn to_json(self) -> Result<String> {
        Document::from(self.to_value()?).to_json()
    }

    pub fn to_yaml(self) -> Result<String> {
        Document::from(self.to_value()?).to_yaml()
    }

    /// Hands each finished collection element to `sink`, in iteration order,
    /// without keeping any of them. Elements are shaped like single items;
    /// collection metadata (meta, pagination) is not produced.
    ///
    /// Other resources are transformed as a whole and delivered in one sink
    /// call, or none when they produce no output.
    pub fn stream<F>(self, mut sink: F) -> Result<()>
    where
        F: FnMut(Value) -> Result<()>,
    {
        if self.resource.kind() == ResourceKind::Collection {
            return self.stream_collection(sink);
        }
        if let Some(value) = self.to_value_streamed()? {
            sink(value)?;
        }
        Ok(())
    }

    /// Like [`Scope::stream`], but only accepts collection resources.
    pub fn stream_collection<F>(mut self, mut sink: F) -> Result<()>
    where
        F: FnMut(Value) -> Result<()>,
    {
        let invalid = |found| FractalError::InvalidResource {
            operation: "stream_collection",
            expected: ResourceKind::Collection,
            found,
        };
        let found = self.resource.kind();
        if found != ResourceKind::Collection {
            return Err(invalid(found));
        }
        let elements = match self.resource.take_data("stream_collection")? {
            ResourceData::Collection(elements) => elements,
            _ => return Err(invalid(found)),
        };

        log::debug!("streaming collection scope `{}`", self.identifier(None));
        let mut available: Option<Vec<String>> = None;
        for (index, element) in elements.enumerate() {
            log::trace!("streaming element {index} of `{}`", self.identifier(None));
            let available = available.get_or_insert_with(|| owned(element.available_includes()));
            let fired = self.fire_element(element, Strategy::Bounded)?;
            let sideloaded = self.sideload(std::slice::from_ref(&fired.included));
            let value = self.finish(Shaped::Item(fired.data), sideloaded, available, false);
            if let Some(value) = value {
                sink(value)?;
            }
        }
        Ok(())
    }

    fn execute(mut self, strategy: Strategy) -> Result<Option<Value>> {
        log::debug!(
            "executing {} scope `{}` ({:?})",
            self.resource.kind(),
            self.identifier(None),
            strategy
        );
        let serializer = self.manager.serializer();
        let mut available = Vec::new();

        let (shaped, sideloaded) = match self.resource.take_data(strategy.operation())? {
            ResourceData::Item(element) => {
                available = owned(element.available_includes());
                let fired = self.fire_element(element, strategy)?;
                let sideloaded = self.sideload(std::slice::from_ref(&fired.included));
                (Shaped::Item(fired.data), sideloaded)
            }
            ResourceData::Collection(elements) if strategy == Strategy::Eager => {
                let mut items = Vec::new();
                let mut included = Vec::new();
                for element in elements {
                    if items.is_empty() {
                        available = owned(element.available_includes());
                    }
                    let fired = self.fire_element(element, strategy)?;
                    items.push(fired.data);
                    included.push(fired.included);
                }
                let sideloaded = self.sideload(&included);
                (Shaped::Collection(items), sideloaded)
            }
            ResourceData::Collection(elements) => {
                let mut items = Vec::new();
                let mut sideloaded: Option<Data> = None;
                for (index, element) in elements.enumerate() {
                    log::trace!("element {index} of `{}`", self.identifier(None));
                    if items.is_empty() {
                        available = owned(element.available_includes());
                    }
                    let fired = self.fire_element(element, strategy)?;
                    items.push(fired.data);
                    if let Some(part) = self.sideload(std::slice::from_ref(&fired.included)) {
                        sideloaded = Some(match sideloaded {
                            Some(accumulated) => serializer.merge_included(accumulated, part),
                            None => part,
                        });
                    }
                }
                if items.is_empty() {
                    sideloaded = self.sideload(&[]);
                }
                (Shaped::Collection(items), sideloaded)
            }
            ResourceData::Null => (Shaped::Null, self.sideload(&[])),
            ResourceData::Primitive(value, transform) => {
                let value = match transform {
                    Some(transform) => transform(value),
                    None => value,
                };
                return Ok(Some(value));
            }
        };

        Ok(self.finish(shaped, sideloaded, &available, true))
    }

    /// Fires the transformer on one element and prepares its include
    /// fragments for side-loading. The element is dropped before returning.
    fn fire_element(&self, element: Element<'a>, strategy: Strategy) -> Result<Fired> {
        let (data, included) = self.fire_transformer(element.as_ref(), strategy)?;
        drop(element);

        let serializer = self.manager.serializer();
        if !serializer.sideload_includes() {
            return Ok(Fired {
                data,
                included: Data::new(),
            });
        }
        let included = self.filter_fieldsets(included);
        let data = serializer.inject_data(data, &included);
        Ok(Fired { data, included })
    }

    fn fire_transformer(&self, element: &dyn Bound<'a>, strategy: Strategy) -> Result<(Data, Data)> {
        let mut data = element.transform(self)?;
        let mut included = Data::new();

        if !element.default_includes().is_empty() || !element.available_includes().is_empty() {
            included = self.fire_included_transformers(element, strategy)?;
            data = self.manager.serializer().merge_includes(data, &included);
        }

        Ok((self.filter_fieldsets(data), included))
    }

    fn fire_included_transformers(&self, element: &dyn Bound<'a>, strategy: Strategy) -> Result<Data> {
        let includes = self.which_includes(element);
        log::debug!(
            "resolving includes {:?} under `{}`",
            includes,
            self.identifier(None)
        );

        let mut included = Data::new();
        for name in includes {
            let params = self.manager.include_params(&self.include_path(name));
            let Some(resource) = element.include(name, &params, self)? else {
                log::trace!("include `{name}` omitted under `{}`", self.identifier(None));
                continue;
            };
            let child = self.embed_child_scope(name, resource);
            let value = child.execute(strategy)?;
            included.insert(name.to_string(), value.unwrap_or(Value::Null));
        }
        Ok(included)
    }

    /// Default includes plus requested available ones, in declaration order,
    /// minus anything excluded.
    fn which_includes<'e>(&self, element: &'e dyn Bound<'a>) -> Vec<&'e str> {
        let mut includes: Vec<&str> = Vec::new();
        for &name in element.default_includes() {
            if !includes.contains(&name) {
                includes.push(name);
            }
        }
        for &name in element.available_includes() {
            if !includes.contains(&name) && self.is_requested(name) {
                includes.push(name);
            }
        }
        includes.retain(|name| !self.is_excluded(name));
        includes
    }

    /// Path used to match requested and excluded includes: the parent chain
    /// without the root's own name, then this scope, then `segment`.
    fn include_path(&self, segment: &str) -> String {
        if self.parent_scopes.is_empty() {
            return segment.to_string();
        }
        self.parent_scopes[1..]
            .iter()
            .map(String::as_str)
            .chain(self.scope_identifier.as_deref())
            .chain(std::iter::once(segment))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Keeps only the fields requested for this resource type plus the
    /// serializer's mandatory fields. Without a fieldset the data passes
    /// through untouched.
    fn filter_fieldsets(&self, mut data: Data) -> Data {
        let Some(fieldset) = self
            .resource
            .resource_key()
            .and_then(|key| self.manager.fieldset(key))
        else {
            return data;
        };
        let mandatory = self.manager.serializer().mandatory_fields();
        data.retain(|field, _| {
            fieldset.iter().any(|f| f == field) || mandatory.contains(&field.as_str())
        });
        data
    }

    fn sideload(&self, included: &[Data]) -> Option<Data> {
        let serializer = self.manager.serializer();
        if !serializer.sideload_includes() {
            return None;
        }
        Some(serializer.included_data(&self.resource, included))
    }

    fn finish(
        &self,
        shaped: Shaped,
        sideloaded: Option<Data>,
        available: &[String],
        with_meta: bool,
    ) -> Option<Value> {
        let serializer = self.manager.serializer();
        let resource_key = self.resource.resource_key();

        let mut data = match shaped {
            Shaped::Item(item) => Some(serializer.item(resource_key, item)),
            Shaped::Collection(items) => Some(serializer.collection(resource_key, items)),
            Shaped::Null => serializer.null(),
        };

        if let Some(mut included) = sideloaded {
            if self.is_root_scope() {
                included = serializer.filter_includes(included, data.as_ref().unwrap_or(&Value::Null));
            }
            data = merge_fragment(data, included);
        }

        if !available.is_empty() {
            data = data.map(|data| serializer.inject_available_include_data(data, available));
        }

        if !with_meta {
            return data;
        }

        let mut meta = self.resource.meta().clone();
        if self.resource.kind() == ResourceKind::Collection {
            if let Some(cursor) = self.resource.cursor() {
                meta.extend(serializer.cursor(cursor));
            } else if let Some(paginator) = self.resource.paginator() {
                meta.extend(serializer.paginator(paginator));
            }
        }
        merge_fragment(data, serializer.meta(&meta))
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("identifier", &self.identifier(None))
            .field("resource", &self.resource)
            .finish()
    }
}
