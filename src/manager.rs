use crate::param_bag::{parse_modifiers, ParamBag};
use crate::resource::Resource;
use crate::scope::Scope;
use crate::serializer::{DataArraySerializer, Serializer};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Default depth to which requested include paths are trimmed.
pub const DEFAULT_RECURSION_LIMIT: usize = 10;

/// Request-level options, in the shape a query string such as
/// `?include=author,comments:limit(5)&exclude=author.avatar&fields[books]=title`
/// decodes into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub fields: BTreeMap<String, String>,
    pub recursion_limit: Option<usize>,
}

/// Per-request configuration shared by every scope of one transformation:
/// the serializer, the requested and excluded include paths, include
/// parameters and per-resource-type fieldsets.
pub struct Manager {
    serializer: Box<dyn Serializer>,
    requested_includes: Vec<String>,
    requested_excludes: Vec<String>,
    include_params: HashMap<String, ParamBag>,
    requested_fieldsets: HashMap<String, Vec<String>>,
    recursion_limit: usize,
    param_delimiter: char,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    pub fn new() -> Self {
        Self::with_serializer(DataArraySerializer)
    }

    pub fn with_serializer(serializer: impl Serializer + 'static) -> Self {
        Manager {
            serializer: Box::new(serializer),
            requested_includes: Vec::new(),
            requested_excludes: Vec::new(),
            include_params: HashMap::new(),
            requested_fieldsets: HashMap::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            param_delimiter: '|',
        }
    }

    /// Applies decoded request options. Absent options leave the current
    /// configuration untouched.
    pub fn configure(&mut self, options: &ManagerOptions) -> &mut Self {
        if let Some(limit) = options.recursion_limit {
            self.set_recursion_limit(limit);
        }
        if let Some(include) = &options.include {
            self.parse_includes(include);
        }
        if let Some(exclude) = &options.exclude {
            self.parse_excludes(exclude);
        }
        if !options.fields.is_empty() {
            self.parse_fieldsets(&options.fields);
        }
        self
    }

    /// Builds a scope over `resource`. With a parent, the new scope is nested
    /// one segment below it.
    pub fn create_data<'a>(
        &'a self,
        resource: Resource<'a>,
        identifier: Option<&str>,
        parent: Option<&Scope<'a>>,
    ) -> Scope<'a> {
        let identifier = identifier.map(str::to_string);
        match parent {
            Some(parent) => {
                let mut parent_scopes = parent.parent_scopes().to_vec();
                parent_scopes.push(parent.scope_identifier().unwrap_or_default().to_string());
                Scope::new(self, resource, identifier, parent_scopes)
            }
            None => Scope::new(self, resource, identifier, Vec::new()),
        }
    }

    pub fn serializer(&self) -> &dyn Serializer {
        self.serializer.as_ref()
    }

    pub fn set_serializer(&mut self, serializer: impl Serializer + 'static) -> &mut Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Parses a comma separated include list such as
    /// `author,comments:limit(5|1).likes`. Replaces any earlier request.
    pub fn parse_includes(&mut self, includes: &str) -> &mut Self {
        self.parse_include_list(includes.split(','))
    }

    /// Same as [`Manager::parse_includes`] for already split entries.
    pub fn parse_include_list<I, S>(&mut self, includes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.requested_includes.clear();
        self.include_params.clear();

        for include in includes {
            let include = include.as_ref().trim();
            if include.is_empty() {
                continue;
            }

            let (name, modifiers) = match include.split_once(':') {
                Some((name, rest)) => (name, Some(rest)),
                None => (include, None),
            };
            let name = self.trim_to_recursion_limit(name);
            if self.requested_includes.contains(&name) {
                continue;
            }
            self.requested_includes.push(name.clone());

            let Some(modifiers) = modifiers else {
                continue;
            };
            let (modifiers, sub_relations) = match modifiers.split_once('.') {
                Some((modifiers, sub)) => (modifiers, Some(sub)),
                None => (modifiers, None),
            };

            let params = parse_modifiers(modifiers, self.param_delimiter);
            self.include_params.insert(name.clone(), params);

            if let Some(sub) = sub_relations.filter(|s| !s.is_empty()) {
                let nested = self.trim_to_recursion_limit(&format!("{name}.{sub}"));
                self.requested_includes.push(nested);
            }
        }

        self.auto_include_parents();
        log::debug!("requested includes: {:?}", self.requested_includes);
        self
    }

    pub fn requested_includes(&self) -> &[String] {
        &self.requested_includes
    }

    /// Parses a comma separated list of dotted paths that must never fire.
    /// Replaces any earlier exclusion.
    pub fn parse_excludes(&mut self, excludes: &str) -> &mut Self {
        self.parse_exclude_list(excludes.split(','))
    }

    pub fn parse_exclude_list<I, S>(&mut self, excludes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.requested_excludes.clear();

        for exclude in excludes {
            let exclude = exclude.as_ref().trim();
            if exclude.is_empty() {
                continue;
            }
            let exclude = self.trim_to_recursion_limit(exclude);
            if !self.requested_excludes.contains(&exclude) {
                self.requested_excludes.push(exclude);
            }
        }

        log::debug!("requested excludes: {:?}", self.requested_excludes);
        self
    }

    pub fn requested_excludes(&self) -> &[String] {
        &self.requested_excludes
    }

    /// Parses `{resource type: "field,field"}` pairs. Replaces any earlier
    /// fieldsets.
    pub fn parse_fieldsets<I, K, V>(&mut self, fieldsets: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.requested_fieldsets.clear();

        for (resource_type, fields) in fieldsets {
            let mut unique: Vec<String> = Vec::new();
            for field in fields.as_ref().split(',').map(str::trim) {
                if !field.is_empty() && !unique.iter().any(|f| f == field) {
                    unique.push(field.to_string());
                }
            }
            self.requested_fieldsets
                .insert(resource_type.as_ref().to_string(), unique);
        }
        self
    }

    /// Fields requested for a resource type, if a filter was configured.
    pub fn fieldset(&self, resource_type: &str) -> Option<&[String]> {
        self.requested_fieldsets
            .get(resource_type)
            .map(Vec::as_slice)
    }

    /// Parameters given to the include at the full dotted path `include`.
    pub fn include_params(&self, include: &str) -> ParamBag {
        self.include_params.get(include).cloned().unwrap_or_default()
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Limits how many dotted segments of a requested include are honoured.
    /// Applies to includes parsed afterwards.
    pub fn set_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    pub fn param_delimiter(&self) -> char {
        self.param_delimiter
    }

    pub fn set_param_delimiter(&mut self, delimiter: char) -> &mut Self {
        self.param_delimiter = delimiter;
        self
    }

    fn trim_to_recursion_limit(&self, include: &str) -> String {
        include
            .split('.')
            .take(self.recursion_limit)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `a.b.c` also requests `a` and `a.b`, otherwise the nested include
    /// could never be reached.
    fn auto_include_parents(&mut self) {
        let mut parsed: Vec<String> = Vec::new();
        for include in &self.requested_includes {
            let segments: Vec<&str> = include.split('.').collect();
            for depth in 1..=segments.len() {
                let path = segments[..depth].join(".");
                if !parsed.contains(&path) {
                    parsed.push(path);
                }
            }
        }
        self.requested_includes = parsed;
    }
}
