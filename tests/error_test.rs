mod common;

use common::{object, FailingTransformer, PassThroughSerializer, RecordingTransformer};
use fractal_core::{
    Data, FractalError, Manager, ParamBag, Resource, ResourceKind, Result, Scope, Transformer,
};
use serde_json::json;
use std::rc::Rc;

/// Parent whose `children` include is a nested collection sharing one
/// transformer instance.
struct ParentTransformer<X> {
    children: Rc<X>,
}

impl<'a, X> Transformer<'a> for ParentTransformer<X>
where
    X: Transformer<'a, Source = u32> + 'a,
{
    type Source = u32;

    fn transform(&self, id: &u32, _scope: &Scope<'a>) -> Result<Data> {
        Ok(object(json!({ "id": id })))
    }

    fn default_includes(&self) -> &[&str] {
        &["children"]
    }

    fn include(
        &self,
        _name: &str,
        id: &u32,
        _params: &ParamBag,
        _scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>> {
        let ids = vec![id * 10, id * 10 + 1];
        Ok(Some(Resource::collection(ids, Rc::clone(&self.children))))
    }
}

#[test]
fn test_transformer_error_propagates_unchanged() {
    let manager = Manager::with_serializer(PassThroughSerializer);
    let result = manager
        .create_data(
            Resource::collection(vec![1, 2, 3], FailingTransformer { fail_on: 2 }),
            None,
            None,
        )
        .to_value();

    match result {
        Err(FractalError::Transformer(error)) => assert_eq!(error.to_string(), "cannot transform 2"),
        other => panic!("Expected transformer error, got {other:?}"),
    }
}

#[test]
fn test_streamed_error_aborts_whole_collection() {
    let manager = Manager::with_serializer(PassThroughSerializer);
    let result = manager
        .create_data(
            Resource::collection(vec![1, 2, 3], FailingTransformer { fail_on: 3 }),
            None,
            None,
        )
        .to_value_streamed();
    assert!(matches!(result, Err(FractalError::Transformer(_))));
}

#[test]
fn test_push_mode_stops_at_failing_element() {
    let manager = Manager::with_serializer(PassThroughSerializer);
    let mut delivered = Vec::new();
    let result = manager
        .create_data(
            Resource::collection(vec![1, 2, 3], FailingTransformer { fail_on: 2 }),
            None,
            None,
        )
        .stream(|value| {
            delivered.push(value);
            Ok(())
        });

    assert!(result.is_err());
    assert_eq!(delivered, vec![json!({"id": 1})]);
}

#[test]
fn test_nested_include_error_propagates() {
    let manager = Manager::with_serializer(PassThroughSerializer);
    let children = Rc::new(FailingTransformer { fail_on: 21 });
    let parent = ParentTransformer {
        children: Rc::clone(&children),
    };

    let result = manager
        .create_data(Resource::collection(vec![1, 2], parent), None, None)
        .to_value_streamed();

    assert_eq!(result.unwrap_err().to_string(), "cannot transform 21");
    // Nothing holds on to the shared transformer once the call failed.
    assert_eq!(Rc::strong_count(&children), 1);
}

#[test]
fn test_shared_transformer_sees_each_scope_in_order() {
    let manager = Manager::with_serializer(PassThroughSerializer);
    let recorder = Rc::new(RecordingTransformer::default());
    let parent = ParentTransformer {
        children: Rc::clone(&recorder),
    };

    let value = manager
        .create_data(Resource::collection(vec![1, 2], parent), None, None)
        .to_value_streamed()
        .unwrap();

    assert_eq!(
        value,
        Some(json!([
            {"id": 1, "children": [{"id": 10}, {"id": 11}]},
            {"id": 2, "children": [{"id": 20}, {"id": 21}]}
        ]))
    );
    assert_eq!(
        *recorder.seen.borrow(),
        ["children#10", "children#11", "children#20", "children#21"]
    );
    assert_eq!(Rc::strong_count(&recorder), 1);
}

#[test]
fn test_missing_include_resolution() {
    struct Forgetful;

    impl<'a> Transformer<'a> for Forgetful {
        type Source = u32;

        fn transform(&self, _id: &u32, _scope: &Scope<'a>) -> Result<Data> {
            Ok(Data::new())
        }

        fn default_includes(&self) -> &[&str] {
            &["owner"]
        }
    }

    let manager = Manager::new();
    let result = manager
        .create_data(Resource::item(1, Forgetful), None, None)
        .to_value();

    match result {
        Err(FractalError::MissingInclude { include, transformer }) => {
            assert_eq!(include, "owner");
            assert!(transformer.ends_with("Forgetful"));
        }
        other => panic!("Expected missing include error, got {other:?}"),
    }
}

#[test]
fn test_stream_collection_rejects_items() {
    let manager = Manager::new();
    let result = manager
        .create_data(Resource::item(1, FailingTransformer { fail_on: 0 }), None, None)
        .stream_collection(|_| Ok(()));

    match result {
        Err(FractalError::InvalidResource {
            operation,
            expected,
            found,
        }) => {
            assert_eq!(operation, "stream_collection");
            assert_eq!(expected, ResourceKind::Collection);
            assert_eq!(found, ResourceKind::Item);
        }
        other => panic!("Expected invalid resource error, got {other:?}"),
    }
}

#[test]
fn test_invalid_resource_message() {
    let error = FractalError::InvalidResource {
        operation: "stream_collection",
        expected: ResourceKind::Collection,
        found: ResourceKind::Null,
    };
    assert_eq!(
        error.to_string(),
        "`stream_collection` expects a collection resource, but was given a null resource"
    );
}

#[test]
fn test_sink_error_stops_streaming() {
    let manager = Manager::with_serializer(PassThroughSerializer);
    let mut calls = 0;
    let result = manager
        .create_data(
            Resource::collection(vec![1, 2, 3], FailingTransformer { fail_on: 0 }),
            None,
            None,
        )
        .stream(|_| {
            calls += 1;
            if calls == 2 {
                return Err(FractalError::transformer("sink closed"));
            }
            Ok(())
        });

    assert_eq!(result.unwrap_err().to_string(), "sink closed");
    assert_eq!(calls, 2);
}
