#![allow(dead_code)]

use std::sync::Arc;

use api::auth::{CurrentUser, UserRole};
use api::schema::{build_schema, AppSchema, HrSchema};
use api::seed::{seed_hr_demo, SeededHrRecords};
use async_graphql::{Request, ServerError, Value as GqlValue, Variables};
use chrono::Utc;
use entity::{employee, user};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DatabaseBackend,
    DatabaseConnection, Statement,
};
use serde_json::Value;
use uuid::Uuid;

pub struct HrTestEnv {
    pub db: Arc<DatabaseConnection>,
    pub schema: HrSchema,
    pub seeded: SeededHrRecords,
}

impl HrTestEnv {
    pub async fn new_seeded() -> Self {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_sqlite(&conn).await;
        let seeded = seed_hr_demo(&conn).await.unwrap();
        let db = Arc::new(conn);
        let AppSchema(schema) = build_schema(db.clone());
        Self { db, schema, seeded }
    }

    pub fn employee_id(&self, email: &str) -> i32 {
        self.seeded
            .employee_email(email)
            .unwrap_or_else(|| panic!("missing seeded employee {email}"))
            .id
    }

    /// Session for a seeded account, roles and employee link as stored.
    pub fn viewer(&self, email: &str) -> CurrentUser {
        let model = self
            .seeded
            .user_email(email)
            .unwrap_or_else(|| panic!("missing seeded user {email}"));
        CurrentUser {
            user_id: model.id,
            roles: vec![UserRole::from(model.role)],
            employee_id: model.employee_id,
        }
    }

    pub async fn exec(
        &self,
        viewer: Option<CurrentUser>,
        query: &str,
        vars: Value,
    ) -> async_graphql::Response {
        let mut request = Request::new(query).variables(Variables::from_json(vars));
        if let Some(viewer) = viewer {
            request = request.data(viewer);
        }
        self.schema.execute(request).await
    }

    /// Runs the query and returns `data.hr`, failing on any GraphQL error.
    pub async fn hr_data(&self, viewer: CurrentUser, query: &str, vars: Value) -> Value {
        let resp = self.exec(Some(viewer), query, vars).await;
        assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
        resp.data.into_json().unwrap()["hr"].clone()
    }

    pub async fn insert_employee(
        &self,
        id: i32,
        first_name: &str,
        manager_id: Option<i32>,
    ) -> employee::Model {
        let now = Utc::now();
        employee::ActiveModel {
            id: Set(id),
            first_name: Set(first_name.to_string()),
            last_name: Set("Test".into()),
            email: Set(format!("{}.{}@hr.test", first_name.to_lowercase(), id)),
            phone: Set(None),
            position: Set(None),
            department_id: Set(None),
            manager_id: Set(manager_id),
            status: Set(employee::Status::Active),
            avatar_url: Set(None),
            hire_date: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.db.as_ref())
        .await
        .unwrap()
    }

    pub async fn insert_user(
        &self,
        email: &str,
        first_name: Option<&str>,
        employee_id: Option<i32>,
        is_active: bool,
    ) -> CurrentUser {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            first_name: Set(first_name.map(str::to_string)),
            last_name: Set(None),
            avatar_url: Set(None),
            role: Set(user::Role::Staff),
            employee_id: Set(employee_id),
            is_active: Set(is_active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.db.as_ref())
        .await
        .unwrap();
        CurrentUser {
            user_id: model.id,
            roles: vec![UserRole::Staff],
            employee_id,
        }
    }
}

pub fn has_error_code(errors: &[ServerError], code: &str) -> bool {
    errors
        .iter()
        .any(|e| matches_code(e.extensions.as_ref(), code))
}

fn matches_code(values: Option<&async_graphql::ErrorExtensionValues>, code: &str) -> bool {
    match values.and_then(|ext| ext.get("code")) {
        Some(GqlValue::String(s)) => s == code,
        Some(GqlValue::Enum(name)) => name.as_str() == code,
        _ => false,
    }
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    // manager_id carries no foreign key so tests can store cycles and
    // dangling references.
    let ddl = [
        r#"
        CREATE TABLE department (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE employee (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            position TEXT,
            department_id INTEGER REFERENCES department(id),
            manager_id INTEGER,
            status TEXT NOT NULL,
            avatar_url TEXT,
            hire_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE app_user (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT,
            last_name TEXT,
            avatar_url TEXT,
            role TEXT NOT NULL,
            employee_id INTEGER,
            is_active BOOLEAN NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE ticket (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            kind TEXT NOT NULL,
            status TEXT NOT NULL,
            assignee_id INTEGER,
            created_by TEXT,
            metadata TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ];
    for sql in ddl {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, sql))
            .await
            .unwrap();
    }
}
