//! sea-orm backed lookups for the HR core.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use entity::{department, employee, ticket, user};
use hr::{
    Employee, EmployeeDirectory, EmployeeId, EmployeeStatus, SessionSource, SessionUser, Ticket,
    TicketKind, TicketRequest, TicketSource, TicketStatus,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde_json::Value;

use crate::auth::CurrentUser;

#[derive(Clone)]
pub struct DbDirectory {
    db: Arc<DatabaseConnection>,
}

impl DbDirectory {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeDirectory for DbDirectory {
    async fn all_employees(&self) -> Result<Vec<Employee>> {
        let rows = employee::Entity::find()
            .find_also_related(department::Entity)
            .order_by_asc(employee::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|(model, department)| employee_from_model(model, department))
            .collect())
    }

    async fn employee_by_id(&self, id: EmployeeId) -> Result<Option<Employee>> {
        let row = employee::Entity::find_by_id(id)
            .find_also_related(department::Entity)
            .one(self.db.as_ref())
            .await?;
        Ok(row.map(|(model, department)| employee_from_model(model, department)))
    }
}

#[async_trait]
impl TicketSource for DbDirectory {
    async fn all_tickets(&self) -> Result<Vec<Ticket>> {
        let rows = ticket::Entity::find()
            .order_by_asc(ticket::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(ticket_from_model).collect())
    }
}

/// Session lookup for one request. An inactive or vanished account reads as
/// unauthenticated.
pub struct DbSession {
    db: Arc<DatabaseConnection>,
    viewer: Option<CurrentUser>,
}

impl DbSession {
    pub fn new(db: Arc<DatabaseConnection>, viewer: Option<CurrentUser>) -> Self {
        Self { db, viewer }
    }
}

#[async_trait]
impl SessionSource for DbSession {
    async fn current_user(&self) -> Result<Option<SessionUser>> {
        let Some(viewer) = &self.viewer else {
            return Ok(None);
        };
        let model = user::Entity::find_by_id(viewer.user_id)
            .one(self.db.as_ref())
            .await?;
        Ok(model
            .filter(|model| model.is_active)
            .map(session_user_from_model))
    }
}

pub fn employee_from_model(
    model: employee::Model,
    department: Option<department::Model>,
) -> Employee {
    Employee {
        id: model.id,
        first_name: Some(model.first_name),
        last_name: Some(model.last_name),
        email: Some(model.email),
        phone: model.phone,
        position: model.position,
        department_id: model.department_id,
        department: department.map(|d| d.name),
        manager_id: model.manager_id,
        status: Some(employee_status(model.status)),
        avatar: model.avatar_url,
        hire_date: model.hire_date,
    }
}

pub fn ticket_from_model(model: ticket::Model) -> Ticket {
    let kind = ticket_kind(model.kind);
    let metadata = model.metadata.unwrap_or(Value::Null);
    Ticket {
        id: model.id,
        title: model.title,
        status: ticket_status(model.status),
        assignee_id: model.assignee_id,
        created_by: model.created_by,
        request: TicketRequest::from_parts(kind, &metadata),
    }
}

pub fn session_user_from_model(model: user::Model) -> SessionUser {
    SessionUser {
        id: model.id,
        role: Some(crate::auth::UserRole::from(model.role).as_str().to_string()),
        employee_id: model.employee_id,
        email: Some(model.email),
        first_name: model.first_name,
        last_name: model.last_name,
        avatar: model.avatar_url,
        ..SessionUser::default()
    }
}

fn employee_status(value: employee::Status) -> EmployeeStatus {
    match value {
        employee::Status::Active => EmployeeStatus::Active,
        employee::Status::Inactive => EmployeeStatus::Inactive,
        employee::Status::Onboarding => EmployeeStatus::Onboarding,
        employee::Status::OnLeave => EmployeeStatus::OnLeave,
    }
}

pub(crate) fn employee_status_filter(value: EmployeeStatus) -> employee::Status {
    match value {
        EmployeeStatus::Active => employee::Status::Active,
        EmployeeStatus::Inactive => employee::Status::Inactive,
        EmployeeStatus::Onboarding => employee::Status::Onboarding,
        EmployeeStatus::OnLeave => employee::Status::OnLeave,
    }
}

fn ticket_kind(value: ticket::Kind) -> TicketKind {
    match value {
        ticket::Kind::NewStaffRequest => TicketKind::NewStaffRequest,
        ticket::Kind::SystemAccessRequest => TicketKind::SystemAccessRequest,
        ticket::Kind::ProfileChangeRequest => TicketKind::ProfileChangeRequest,
        ticket::Kind::General => TicketKind::General,
    }
}

fn ticket_status(value: ticket::Status) -> TicketStatus {
    match value {
        ticket::Status::Open => TicketStatus::Open,
        ticket::Status::InProgress => TicketStatus::InProgress,
        ticket::Status::Closed => TicketStatus::Closed,
    }
}
