//! Module: query::path
//! Responsibility: dotted field path → qualified column, introducing joins.
//! Does not own: relation metadata (asks `EntityModel::resolve`).
//! Boundary: the only writer of the join clause and the alias table.


use crate::model::{CompileError, EntityModel, FieldModel};
use std::{collections::BTreeMap, fmt};

/// Alias of the queried entity's own table.
pub const BASE_ALIAS: &str = "t";

///
/// CompilationState
///
/// Join aliases and the join clause of one query. A relation path is joined
/// at most once; every later reference reuses its alias. State only grows,
/// so recompiling a clause against it never invalidates earlier output.
///

#[derive(Clone, Debug, Default)]
pub struct CompilationState {
    aliases: BTreeMap<String, String>,
    joins: String,
}

impl CompilationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `path` against `model` and return the column it names.
    pub fn compile(
        &mut self,
        model: &'static EntityModel,
        path: &str,
    ) -> Result<ColumnRef, CompileError> {
        let resolved = model.resolve(path)?;

        let mut alias = BASE_ALIAS.to_string();
        let mut key = String::new();

        for hop in &resolved.joins {
            key.push_str(&alias);
            key.push('.');
            key.push_str(hop.column);
            key.push('/');

            alias = if let Some(existing) = self.aliases.get(&key) {
                existing.clone()
            } else {
                let next = format!("{BASE_ALIAS}{}", self.aliases.len() + 1);
                self.joins.push_str(&format!(
                    " LEFT JOIN {} {next} ON {alias}.{}={next}.{}",
                    hop.table, hop.column, hop.target_pk
                ));
                tracing::trace!(
                    target: "relquery::sql",
                    path,
                    alias = %next,
                    table = hop.table,
                    "join introduced"
                );

                self.aliases.insert(key.clone(), next.clone());
                next
            };
        }

        Ok(ColumnRef {
            alias,
            column: resolved.property.column,
            field: resolved.property,
        })
    }

    /// Accumulated join clause; empty or starting with a space.
    #[must_use]
    pub fn joins(&self) -> &str {
        &self.joins
    }

    /// Number of joined aliases (the base alias excluded).
    #[must_use]
    pub fn join_count(&self) -> usize {
        self.aliases.len()
    }
}

///
/// ColumnRef
/// A leaf property qualified by the alias that reaches it.
///

#[derive(Clone, Debug)]
pub struct ColumnRef {
    pub alias: String,
    pub column: &'static str,
    pub field: &'static FieldModel,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}
