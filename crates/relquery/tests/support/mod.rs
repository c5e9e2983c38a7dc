#![allow(dead_code)]

use relquery::{
    db::{ExecutorFailure, RowHandler, SqlExecutor, Statement},
    prelude::*,
    traits::HydrateError,
};
use std::{cell::RefCell, ops::ControlFlow};

//
// Schema
//
// book ──author──▶ author ──publisher──▶ publisher
//

pub static BOOK: EntityModel = EntityModel::new("Book", "book", "id", &BOOK_FIELDS);

static BOOK_FIELDS: [FieldModel; 5] = [
    FieldModel::scalar("id", FieldKind::Uint),
    FieldModel::scalar("title", FieldKind::Text),
    FieldModel::scalar("pages", FieldKind::Int),
    FieldModel::scalar("published", FieldKind::Timestamp).with_column("published_at"),
    FieldModel::relation("author", "author_id", &AUTHOR),
];

pub static AUTHOR: EntityModel = EntityModel::new("Author", "author", "id", &AUTHOR_FIELDS);

static AUTHOR_FIELDS: [FieldModel; 3] = [
    FieldModel::scalar("id", FieldKind::Uint),
    FieldModel::scalar("name", FieldKind::Text),
    FieldModel::relation("publisher", "publisher_id", &PUBLISHER),
];

pub static PUBLISHER: EntityModel =
    EntityModel::new("Publisher", "publisher", "id", &PUBLISHER_FIELDS);

static PUBLISHER_FIELDS: [FieldModel; 2] = [
    FieldModel::scalar("id", FieldKind::Uint),
    FieldModel::scalar("country", FieldKind::Text),
];

///
/// Book
///

#[derive(Clone, Debug, PartialEq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub pages: Option<i64>,
}

impl Book {
    pub fn row(id: u64, title: &str, pages: i64) -> Row {
        Row::default()
            .with("id", id)
            .with("title", title)
            .with("pages", pages)
    }
}

impl EntityKind for Book {
    fn model() -> &'static EntityModel {
        &BOOK
    }

    fn hydrate(row: &Row) -> Result<Self, HydrateError> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            pages: row.get("pages")?,
        })
    }
}

///
/// ShelfExecutor
///
/// Serves a fixed shelf of rows and keeps every statement it was given.
///

#[derive(Default)]
pub struct ShelfExecutor {
    pub rows: Vec<Row>,
    pub count: Option<u64>,
    pub log: RefCell<Vec<(Statement, Option<u64>)>>,
}

impl ShelfExecutor {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn sql(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .map(|(statement, _)| statement.sql.clone())
            .collect()
    }
}

impl SqlExecutor for ShelfExecutor {
    fn query_first(&self, statement: &Statement) -> Result<Option<Row>, ExecutorFailure> {
        self.log.borrow_mut().push((statement.clone(), None));

        Ok(self.count.map(|n| Row::default().with("COUNT(*)", n)))
    }

    fn execute_update(&self, statement: &Statement) -> Result<u64, ExecutorFailure> {
        self.log.borrow_mut().push((statement.clone(), None));

        Ok(1)
    }

    fn perform(
        &self,
        statement: &Statement,
        max_rows: Option<u64>,
        handler: &mut RowHandler<'_>,
    ) -> Result<(), ExecutorFailure> {
        self.log.borrow_mut().push((statement.clone(), max_rows));

        let cap = max_rows.map_or(usize::MAX, |max| usize::try_from(max).unwrap_or(usize::MAX));
        for row in self.rows.iter().take(cap) {
            if let ControlFlow::Break(()) = handler(row.clone()) {
                break;
            }
        }

        Ok(())
    }
}
