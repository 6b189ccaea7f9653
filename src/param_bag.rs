use std::collections::BTreeMap;

/// Modifiers attached to a requested include, e.g. the `limit(5|1)` and
/// `order(created_at|desc)` parts of `comments:limit(5|1):order(created_at|desc)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBag {
    params: BTreeMap<String, Vec<String>>,
}

impl ParamBag {
    pub fn new(params: BTreeMap<String, Vec<String>>) -> Self {
        Self { params }
    }

    /// Arguments of the modifier `key`, in the order they were written.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// First argument of the modifier `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)?.first().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Parses the modifier section of an include (everything after the first
/// `:`), such as `limit(5|1):order(created_at|desc)`.
///
/// Every run of word characters optionally followed by a parenthesised
/// argument list is a modifier. Anything else acts as a separator.
pub(crate) fn parse_modifiers(input: &str, delimiter: char) -> ParamBag {
    let mut params = BTreeMap::new();
    let chars: Vec<char> = input.chars().collect();
    let mut position = 0;

    while position < chars.len() {
        if !is_word(chars[position]) {
            position += 1;
            continue;
        }

        let start = position;
        while position < chars.len() && is_word(chars[position]) {
            position += 1;
        }
        let name: String = chars[start..position].iter().collect();

        let mut arguments = String::new();
        if position < chars.len() && chars[position] == '(' {
            // An argument list needs at least one character and a closing paren.
            if let Some(close) = chars[position + 1..].iter().position(|c| *c == ')') {
                if close > 0 {
                    arguments = chars[position + 1..position + 1 + close].iter().collect();
                    position += close + 2;
                }
            }
        }

        let values = arguments.split(delimiter).map(str::to_string).collect();
        params.insert(name, values);
    }

    ParamBag::new(params)
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
