//! Positional parameter collection

use serde::Serialize;

use super::value::FilterValue;

/// A value bound to a `$N` placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    /// Bound as a `text[]` / `uuid[]` array
    TextArray(Vec<String>),
    /// Serialized JSON document, bound as text and cast to `jsonb`
    Json(String),
}

impl SqlParam {
    /// Bind a scalar filter value as-is; lists and objects have no scalar form
    pub fn scalar(value: &FilterValue) -> Option<Self> {
        match value {
            FilterValue::Null => Some(Self::Null),
            FilterValue::Boolean(b) => Some(Self::Bool(*b)),
            FilterValue::Integer(n) => Some(Self::Integer(*n)),
            FilterValue::Unsigned(n) => Some(Self::Unsigned(*n)),
            FilterValue::Float(f) => Some(Self::Float(*f)),
            FilterValue::String(s) => Some(Self::Text(s.clone())),
            FilterValue::List(_) | FilterValue::Object(_) => None,
        }
    }
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for SqlParam {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u64> for SqlParam {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Self::Unsigned(n), Self::Integer)
    }
}

impl From<f64> for SqlParam {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for SqlParam {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Collects parameters during one compilation (maintains insertion order)
///
/// Placeholders continue numbering after any parameters the caller already
/// holds, so the compiled fragment can be appended to an existing query.
#[derive(Debug)]
pub struct ParamAccumulator {
    params: Vec<SqlParam>,
    next_index: usize,
}

impl ParamAccumulator {
    pub fn new(initial: Vec<SqlParam>) -> Self {
        let next_index = initial.len() + 1;
        Self {
            params: initial,
            next_index,
        }
    }

    /// Append a value and return its placeholder (`$N`)
    pub fn add(&mut self, value: impl Into<SqlParam>) -> String {
        self.params.push(value.into());
        let placeholder = format!("${}", self.next_index);
        self.next_index += 1;
        placeholder
    }

    /// Append every value, returning `"$N, $N+1, ..."`
    pub fn add_all<I, T>(&mut self, values: I) -> String
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlParam>,
    {
        values
            .into_iter()
            .map(|v| self.add(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}
