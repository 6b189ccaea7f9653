use crate::error::{FractalError, Result};
use crate::param_bag::ParamBag;
use crate::resource::Resource;
use crate::scope::Scope;
use crate::Data;
use std::marker::PhantomData;
use std::rc::Rc;

/// Maps one domain value onto an output field mapping and declares the
/// related resources ("includes") it knows how to attach.
///
/// The lifetime `'a` is the lifetime of the data being transformed, which
/// lets an include hand out resources that borrow from its parent value:
///
/// ```
/// use fractal_core::{Data, Resource, Result, Scope, Transformer, ParamBag};
/// use serde_json::json;
///
/// struct Book { title: String, tags: Vec<String> }
///
/// struct BookTransformer;
///
/// impl<'a> Transformer<'a> for BookTransformer {
///     type Source = &'a Book;
///
///     fn transform(&self, book: &&'a Book, _scope: &Scope<'a>) -> Result<Data> {
///         let mut data = Data::new();
///         data.insert("title".into(), json!(book.title));
///         Ok(data)
///     }
///
///     fn default_includes(&self) -> &[&str] {
///         &["tags"]
///     }
///
///     fn include(
///         &self,
///         _name: &str,
///         book: &&'a Book,
///         _params: &ParamBag,
///         _scope: &Scope<'a>,
///     ) -> Result<Option<Resource<'a>>> {
///         Ok(Some(Resource::primitive(json!(book.tags))))
///     }
/// }
/// ```
///
/// The active [`Scope`] is passed to every call rather than stored on the
/// transformer, so one instance can be reused for any number of values.
pub trait Transformer<'a> {
    type Source;

    fn transform(&self, source: &Self::Source, scope: &Scope<'a>) -> Result<Data>;

    /// Includes that fire unless explicitly excluded.
    fn default_includes(&self) -> &[&str] {
        &[]
    }

    /// Includes that fire only when requested by dotted path.
    fn available_includes(&self) -> &[&str] {
        &[]
    }

    /// Resolves the include `name` for `source`. Returning `Ok(None)` omits
    /// the include for this value only.
    fn include(
        &self,
        name: &str,
        source: &Self::Source,
        params: &ParamBag,
        scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>> {
        let _ = (source, params, scope);
        Err(FractalError::MissingInclude {
            include: name.to_string(),
            transformer: std::any::type_name::<Self>(),
        })
    }
}

impl<'a, T> Transformer<'a> for Rc<T>
where
    T: Transformer<'a> + ?Sized,
{
    type Source = T::Source;

    fn transform(&self, source: &Self::Source, scope: &Scope<'a>) -> Result<Data> {
        (**self).transform(source, scope)
    }

    fn default_includes(&self) -> &[&str] {
        (**self).default_includes()
    }

    fn available_includes(&self) -> &[&str] {
        (**self).available_includes()
    }

    fn include(
        &self,
        name: &str,
        source: &Self::Source,
        params: &ParamBag,
        scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>> {
        (**self).include(name, source, params, scope)
    }
}

/// A transformer backed by a plain function. It declares no includes.
pub struct FnTransformer<T, F> {
    f: F,
    _source: PhantomData<fn(&T)>,
}

/// Builds a [`FnTransformer`] from a closure.
pub fn transformer_fn<T, F>(f: F) -> FnTransformer<T, F>
where
    F: Fn(&T) -> Result<Data>,
{
    FnTransformer {
        f,
        _source: PhantomData,
    }
}

impl<'a, T, F> Transformer<'a> for FnTransformer<T, F>
where
    F: Fn(&T) -> Result<Data>,
{
    type Source = T;

    fn transform(&self, source: &T, _scope: &Scope<'a>) -> Result<Data> {
        (self.f)(source)
    }
}

/// Object-safe view of one value bound to its transformer. Resources store
/// these so that a parent can attach includes of unrelated source types.
pub(crate) trait Bound<'a> {
    fn transform(&self, scope: &Scope<'a>) -> Result<Data>;

    fn default_includes(&self) -> &[&str];

    fn available_includes(&self) -> &[&str];

    fn include(
        &self,
        name: &str,
        params: &ParamBag,
        scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>>;
}

pub(crate) struct Binding<S, X> {
    pub(crate) source: S,
    pub(crate) transformer: Rc<X>,
}

impl<'a, X> Bound<'a> for Binding<X::Source, X>
where
    X: Transformer<'a>,
{
    fn transform(&self, scope: &Scope<'a>) -> Result<Data> {
        self.transformer.transform(&self.source, scope)
    }

    fn default_includes(&self) -> &[&str] {
        self.transformer.default_includes()
    }

    fn available_includes(&self) -> &[&str] {
        self.transformer.available_includes()
    }

    fn include(
        &self,
        name: &str,
        params: &ParamBag,
        scope: &Scope<'a>,
    ) -> Result<Option<Resource<'a>>> {
        self.transformer.include(name, &self.source, params, scope)
    }
}
