use crate::{
    model::{EntityModel, FieldKind, FieldModel},
    traits::{EntityKind, HydrateError, Row},
    value::Value,
};

///
/// Test schema
///
/// user ──department──▶ department ──company──▶ company
///   └──manager──▶ user      └──head──▶ user
///

pub(crate) static USER: EntityModel = EntityModel::new("User", "user", "id", &USER_FIELDS);

static USER_FIELDS: [FieldModel; 9] = [
    FieldModel::scalar("id", FieldKind::Uint),
    FieldModel::scalar("loginName", FieldKind::Text),
    FieldModel::scalar("email", FieldKind::Text),
    FieldModel::scalar("active", FieldKind::Bool),
    FieldModel::scalar("age", FieldKind::Int),
    FieldModel::scalar("score", FieldKind::Float),
    FieldModel::scalar("created", FieldKind::Timestamp),
    FieldModel::relation("department", "department_id", &DEPARTMENT),
    FieldModel::relation("manager", "manager_id", &USER),
];

pub(crate) static DEPARTMENT: EntityModel =
    EntityModel::new("Department", "department", "id", &DEPARTMENT_FIELDS);

static DEPARTMENT_FIELDS: [FieldModel; 4] = [
    FieldModel::scalar("id", FieldKind::Uint),
    FieldModel::scalar("name", FieldKind::Text),
    FieldModel::relation("company", "company_id", &COMPANY),
    FieldModel::relation("head", "head_id", &USER),
];

pub(crate) static COMPANY: EntityModel =
    EntityModel::new("Company", "company", "id", &COMPANY_FIELDS);

static COMPANY_FIELDS: [FieldModel; 3] = [
    FieldModel::scalar("id", FieldKind::Uint),
    FieldModel::scalar("name", FieldKind::Text),
    FieldModel::scalar("code", FieldKind::Text).with_convert(company_code),
];

// Company codes are stored upper-case and never longer than four characters.
fn company_code(value: &Value) -> Result<Value, String> {
    match value {
        Value::Text(code) if code.len() <= 4 => Ok(Value::Text(code.to_uppercase())),
        Value::Text(code) => Err(format!("code '{code}' longer than 4 characters")),
        other => Err(format!("expected text, found {}", other.kind_label())),
    }
}

///
/// TestUser
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestUser {
    pub id: u64,
    pub login_name: Option<String>,
    pub active: Option<bool>,
}

impl TestUser {
    pub(crate) fn row(id: u64, login_name: &str) -> Row {
        Row::default()
            .with("id", id)
            .with("loginName", login_name)
            .with("active", true)
    }
}

impl EntityKind for TestUser {
    fn model() -> &'static EntityModel {
        &USER
    }

    fn hydrate(row: &Row) -> Result<Self, HydrateError> {
        Ok(Self {
            id: row.get("id")?,
            login_name: row.get("loginName")?,
            active: row.get("active")?,
        })
    }
}
