#![allow(dead_code)]

use fractal_core::pagination::{Cursor, Paginator};
use fractal_core::{
    ArraySerializer, Data, FractalError, ParamBag, Resource, Result, Scope, Serializer, Transformer,
};
use serde_json::{json, Value};
use std::cell::RefCell;

pub struct Tag {
    pub label: &'static str,
}

pub struct Profile {
    pub country: &'static str,
}

pub struct Author {
    pub id: u32,
    pub name: &'static str,
    pub profile: Profile,
}

pub struct Book {
    pub id: u32,
    pub title: &'static str,
    pub year: u32,
    pub author: Author,
    pub tags: Vec<Tag>,
}

pub fn library() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            title: "Hogfather",
            year: 1996,
            author: Author {
                id: 10,
                name: "Terry Pratchett",
                profile: Profile { country: "UK" },
            },
            tags: vec![Tag { label: "fantasy" }, Tag { label: "satire" }],
        },
        Book {
            id: 2,
            title: "Dune",
            year: 1965,
            author: Author {
                id: 20,
                name: "Frank Herbert",
                profile: Profile { country: "US" },
            },
            tags: vec![Tag { label: "science-fiction" }],
        },
    ]
}

pub fn object(value: Value) -> Data {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[derive(Default)]
pub struct BookTransformer {
    pub defaults: Vec<&'static str>,
}

impl BookTransformer {
    pub fn with_defaults(defaults: &[&'static str]) -> Self {
        Self {
            defaults: defaults.to_vec(),
        }
    }
}

impl<'a> Transformer<'a> for BookTransformer {
    type Source = &'a Book;

    fn transform(&self, book: &&'a Book, _scope: &Scope<'a>) -> Result<Data> {
        Ok(object(json!({
            "id": book.id,
            "title": book.title,
            "year": book.year,
        })))
    }

    fn default_includes(&self) -> &[&str] {
        &self.defaults
    }

    fn available_includes(&self) -> &[&str] {
        &["author", "tags", "summary", "sequel"]
    }

    fn include(
        &self,
        name: &str,
        book: &&'a Book,
        params: &ParamBag,
        _scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>> {
        match name {
            "author" => Ok(Some(
                Resource::item(&book.author, AuthorTransformer).with_resource_key("authors"),
            )),
            "tags" => {
                let limit = match params.first("limit") {
                    Some(limit) => limit.parse::<usize>().map_err(FractalError::transformer)?,
                    None => usize::MAX,
                };
                Ok(Some(
                    Resource::collection(book.tags.iter().take(limit), TagTransformer)
                        .with_resource_key("tags"),
                ))
            }
            "summary" => Ok(Some(Resource::primitive_with(book.title, |title| {
                json!(format!("{} (summary)", title.as_str().unwrap_or_default()))
            }))),
            "sequel" => Ok(None),
            _ => Err(FractalError::MissingInclude {
                include: name.to_string(),
                transformer: "BookTransformer",
            }),
        }
    }
}

pub struct AuthorTransformer;

impl<'a> Transformer<'a> for AuthorTransformer {
    type Source = &'a Author;

    fn transform(&self, author: &&'a Author, _scope: &Scope<'a>) -> Result<Data> {
        Ok(object(json!({ "id": author.id, "name": author.name })))
    }

    fn available_includes(&self) -> &[&str] {
        &["profile"]
    }

    fn include(
        &self,
        name: &str,
        author: &&'a Author,
        _params: &ParamBag,
        _scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>> {
        match name {
            "profile" => Ok(Some(Resource::item(&author.profile, ProfileTransformer))),
            _ => Ok(None),
        }
    }
}

pub struct ProfileTransformer;

impl<'a> Transformer<'a> for ProfileTransformer {
    type Source = &'a Profile;

    fn transform(&self, profile: &&'a Profile, _scope: &Scope<'a>) -> Result<Data> {
        Ok(object(json!({ "country": profile.country })))
    }
}

pub struct TagTransformer;

impl<'a> Transformer<'a> for TagTransformer {
    type Source = &'a Tag;

    fn transform(&self, tag: &&'a Tag, _scope: &Scope<'a>) -> Result<Data> {
        Ok(object(json!({ "label": tag.label })))
    }
}

/// Emits items and collections without any wrapping.
pub struct PassThroughSerializer;

impl Serializer for PassThroughSerializer {
    fn collection(&self, _resource_key: Option<&str>, data: Vec<Data>) -> Value {
        Value::Array(data.into_iter().map(Value::Object).collect())
    }

    fn item(&self, _resource_key: Option<&str>, data: Data) -> Value {
        Value::Object(data)
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

/// Side-loads every included object into a top-level `included` list,
/// dropping duplicates among the fragments it is handed at once, and marks
/// each item with the names of its relationships.
pub struct SideloadSerializer;

impl Serializer for SideloadSerializer {
    fn collection(&self, _resource_key: Option<&str>, data: Vec<Data>) -> Value {
        json!({ "data": data })
    }

    fn item(&self, _resource_key: Option<&str>, data: Data) -> Value {
        json!({ "data": data })
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

    fn sideload_includes(&self) -> bool {
        true
    }

    fn included_data(&self, _resource: &Resource<'_>, included: &[Data]) -> Data {
        let mut objects: Vec<Value> = Vec::new();
        for fragment in included {
            for value in fragment.values() {
                let candidates = match value {
                    Value::Object(map) => match map.get("data") {
                        Some(Value::Array(items)) => items.clone(),
                        Some(item) => vec![item.clone()],
                        None => vec![value.clone()],
                    },
                    Value::Null => vec![],
                    other => vec![other.clone()],
                };
                for candidate in candidates {
                    if !objects.contains(&candidate) {
                        objects.push(candidate);
                    }
                }
            }
        }
        object(json!({ "included": objects }))
    }

    fn inject_data(&self, mut data: Data, included: &Data) -> Data {
        if !included.is_empty() {
            let names: Vec<&String> = included.keys().collect();
            data.insert("relationships".to_string(), json!(names));
        }
        data
    }

    fn mandatory_fields(&self) -> &[&str] {
        &["id"]
    }
}

/// Transformer that remembers the scope path of every call.
#[derive(Default)]
pub struct RecordingTransformer {
    pub seen: RefCell<Vec<String>>,
}

impl<'a> Transformer<'a> for RecordingTransformer {
    type Source = u32;

    fn transform(&self, id: &u32, scope: &Scope<'a>) -> Result<Data> {
        self.seen
            .borrow_mut()
            .push(format!("{}#{id}", scope.identifier(None)));
        Ok(object(json!({ "id": id })))
    }
}

/// Fails when transforming the given id.
pub struct FailingTransformer {
    pub fail_on: u32,
}

impl<'a> Transformer<'a> for FailingTransformer {
    type Source = u32;

    fn transform(&self, id: &u32, _scope: &Scope<'a>) -> Result<Data> {
        if *id == self.fail_on {
            return Err(FractalError::transformer(format!("cannot transform {id}")));
        }
        Ok(object(json!({ "id": id })))
    }
}
