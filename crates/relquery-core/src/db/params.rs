use crate::value::Value;
use derive_more::Deref;
use serde::Serialize;
use std::fmt;

///
/// ParamScope
///
/// Placeholder name derived from a constraint's position in the tree.
/// Top-level constraint `i` (1-based) owns `<prefix><i>`; child `j` of a
/// combinator (0-based) owns `<parent>_<j>`. Two nodes never share a
/// position, so two bindings never share a name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParamScope(String);

impl ParamScope {
    #[must_use]
    pub fn top_level(prefix: &str, position: usize) -> Self {
        Self(format!("{prefix}{position}"))
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        Self(format!("{}_{index}", self.0))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// Binding
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

///
/// Params
/// Ordered named bindings handed to the execution layer with the SQL text.
///

#[derive(Clone, Debug, Default, Deref, PartialEq, Serialize)]
pub struct Params(Vec<Binding>);

impl Params {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Bind a value under the scope's name. Each scope binds at most once
    /// per statement.
    pub(crate) fn bind(&mut self, scope: &ParamScope, value: Value) {
        debug_assert!(
            self.get(scope.name()).is_none(),
            "parameter '{scope}' bound twice"
        );

        self.0.push(Binding {
            name: scope.name().to_string(),
            value,
        });
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find_map(|binding| (binding.name == name).then_some(&binding.value))
    }

    /// Iterate `(name, value)` pairs in binding order.
    pub fn iter_pairs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .map(|binding| (binding.name.as_str(), &binding.value))
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter_pairs().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}
