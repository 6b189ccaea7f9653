use fractal_core::{
    ArraySerializer, Data, Manager, ParamBag, Resource, Result, Scope, Transformer,
};
use serde_json::json;

struct Book {
    title: &'static str,
    author: &'static str,
    tags: Vec<&'static str>,
}

struct BookTransformer;

impl<'a> Transformer<'a> for BookTransformer {
    type Source = &'a Book;

    fn transform(&self, book: &&'a Book, _scope: &Scope<'a>) -> Result<Data> {
        let mut data = Data::new();
        data.insert("title".into(), json!(book.title));
        data.insert("author".into(), json!(book.author));
        Ok(data)
    }

    fn available_includes(&self) -> &[&str] {
        &["tags"]
    }

    fn include(
        &self,
        _name: &str,
        book: &&'a Book,
        _params: &ParamBag,
        _scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>> {
        Ok(Some(Resource::primitive(json!(book.tags))))
    }
}

fn main() {
    let books = vec![
        Book {
            title: "Hogfather",
            author: "Terry Pratchett",
            tags: vec!["fantasy", "satire"],
        },
        Book {
            title: "Dune",
            author: "Frank Herbert",
            tags: vec!["science-fiction"],
        },
    ];

    let mut manager = Manager::with_serializer(ArraySerializer);
    manager.parse_includes("tags");

    let resource = Resource::collection(&books, BookTransformer).with_resource_key("books");
    match manager.create_data(resource, None, None).to_json() {
        Ok(json_output) => println!("Transformed books:\n{json_output}"),
        Err(e) => eprintln!("Failed to transform books: {e:?}"),
    }

    let resource = Resource::collection(&books, BookTransformer);
    let streamed = manager.create_data(resource, None, None).stream(|book| {
        println!("streamed: {book}");
        Ok(())
    });
    if let Err(e) = streamed {
        eprintln!("Streaming failed: {e:?}");
    }
}
