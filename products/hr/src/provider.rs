//! Lookups the core consumes. Implementations own fetching and caching; the
//! core only sees snapshots.

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{Employee, EmployeeId, SessionUser, Ticket};

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn all_employees(&self) -> Result<Vec<Employee>>;

    async fn employee_by_id(&self, id: EmployeeId) -> Result<Option<Employee>>;
}

#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn all_tickets(&self) -> Result<Vec<Ticket>>;
}

#[async_trait]
pub trait SessionSource: Send + Sync {
    /// `None` means the request is unauthenticated.
    async fn current_user(&self) -> Result<Option<SessionUser>>;
}
