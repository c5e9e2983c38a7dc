use crate::model::{CompileError, FieldModel};

///
/// EntityModel
/// Static runtime model for one entity and the table backing it.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Entity name (for dispatch and diagnostics).
    pub path: &'static str,
    /// Base table; always aliased `t` in compiled statements.
    pub table: &'static str,
    /// Index of the primary key within `fields`.
    pub primary_key: usize,
    /// Ordered field list.
    pub fields: &'static [FieldModel],
}

impl EntityModel {
    /// Build a model, locating the primary key at compile time.
    ///
    /// Panics during const evaluation when `primary_key` names no field.
    #[must_use]
    pub const fn new(
        path: &'static str,
        table: &'static str,
        primary_key: &'static str,
        fields: &'static [FieldModel],
    ) -> Self {
        Self {
            path,
            table,
            primary_key: primary_key_index(fields, primary_key),
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        let fields: &'static [FieldModel] = self.fields;

        fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub const fn primary_key_field(&self) -> &'static FieldModel {
        let fields: &'static [FieldModel] = self.fields;

        &fields[self.primary_key]
    }

    /// Resolve a dotted field path into the joins that reach its leaf property.
    ///
    /// A leading `"<table>."` prefix is stripped. Every segment but the last
    /// must name a relation; the last names any field of the entity reached.
    pub fn resolve(&'static self, path: &str) -> Result<ResolvedPath, CompileError> {
        let stripped = path
            .strip_prefix(self.table)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(path);

        let segments: Vec<&str> = stripped.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(CompileError::EmptyPath { entity: self.path });
        }
        let Some((leaf, hops)) = segments.split_last() else {
            return Err(CompileError::EmptyPath { entity: self.path });
        };

        let mut current = self;
        let mut joins = Vec::with_capacity(hops.len());

        for segment in hops {
            let field = current.field(segment).ok_or_else(|| CompileError::UnknownField {
                entity: current.path,
                path: path.to_string(),
                segment: (*segment).to_string(),
            })?;
            let target = field
                .relation_target()
                .ok_or_else(|| CompileError::NotARelation {
                    entity: current.path,
                    path: path.to_string(),
                    segment: (*segment).to_string(),
                })?;

            joins.push(JoinHop {
                table: target.table,
                column: field.column,
                target_pk: target.primary_key_field().column,
            });
            current = target;
        }

        let property = current.field(leaf).ok_or_else(|| CompileError::UnknownField {
            entity: current.path,
            path: path.to_string(),
            segment: (*leaf).to_string(),
        })?;

        Ok(ResolvedPath {
            joins,
            owner: current,
            property,
        })
    }
}

///
/// JoinHop
/// One relation traversal: join `table` on `<prev>.column = <alias>.target_pk`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JoinHop {
    pub table: &'static str,
    pub column: &'static str,
    pub target_pk: &'static str,
}

///
/// ResolvedPath
///

#[derive(Debug)]
pub struct ResolvedPath {
    pub joins: Vec<JoinHop>,
    /// Entity that owns the leaf property.
    pub owner: &'static EntityModel,
    pub property: &'static FieldModel,
}

const fn primary_key_index(fields: &[FieldModel], primary_key: &str) -> usize {
    let pk = primary_key.as_bytes();

    let mut i = 0;
    while i < fields.len() {
        let name = fields[i].name.as_bytes();

        if name.len() == pk.len() {
            let mut j = 0;
            let mut eq = true;
            while j < pk.len() {
                if name[j] != pk[j] {
                    eq = false;
                    break;
                }
                j += 1;
            }
            if eq {
                return i;
            }
        }

        i += 1;
    }

    panic!("entity model: primary key field not found in fields list");
}
