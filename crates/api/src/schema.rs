use crate::auth::CurrentUser;
use crate::directory::{employee_from_model, employee_status_filter, DbDirectory, DbSession};
use crate::error::ApiError;
use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, Enum, ErrorExtensions, Json, Object, Schema,
    SimpleObject, ID,
};
use chrono::NaiveDate;
use entity::{department, employee};
use hr::{
    service, ExpandState, ManagerNode, PendingIndex, ProfileData, Ticket, TicketSource,
    VisibleRow,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

pub type HrSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub struct AppSchema(pub HrSchema);

pub fn build_schema(db: Arc<DatabaseConnection>) -> AppSchema {
    let schema = Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(db)
        .finish();
    AppSchema(schema)
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn hr(&self) -> HrQuery {
        HrQuery
    }
}

#[derive(Default)]
pub struct HrQuery;

#[Object]
impl HrQuery {
    /// Profile of the signed-in user merged with their employee record.
    #[instrument(name = "graphql.hr.me", skip_all)]
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<ProfileNode> {
        let viewer = require_viewer(ctx)?;
        let db = database(ctx)?;
        let session = DbSession::new(db.clone(), Some(viewer));
        let directory = DbDirectory::new(db);
        service::load_profile(&session, &directory, None)
            .await
            .map_err(|err| ApiError::from(err).extend())?
            .map(ProfileNode::from)
            .ok_or_else(|| ApiError::Unauthenticated.extend())
    }

    /// Profile for `employeeId`, or for the caller when omitted. The caller's
    /// account fields are only used as defaults for their own record.
    #[instrument(name = "graphql.hr.profile", skip_all)]
    async fn profile(
        &self,
        ctx: &Context<'_>,
        employee_id: Option<i32>,
    ) -> async_graphql::Result<Option<ProfileNode>> {
        let viewer = require_viewer(ctx)?;
        let db = database(ctx)?;
        let own_record = employee_id.is_none() || employee_id == viewer.employee_id;
        let session = DbSession::new(db.clone(), own_record.then_some(viewer));
        let directory = DbDirectory::new(db);
        let profile = service::load_profile(&session, &directory, employee_id)
            .await
            .map_err(|err| ApiError::from(err).extend())?;
        Ok(profile.map(ProfileNode::from))
    }

    /// Manager tree for `managerId`, or the whole company when omitted.
    #[instrument(name = "graphql.hr.org_chart", skip_all)]
    async fn org_chart(
        &self,
        ctx: &Context<'_>,
        manager_id: Option<i32>,
    ) -> async_graphql::Result<Vec<OrgNode>> {
        let forest = load_chart(ctx, manager_id).await?;
        Ok(forest.into_iter().map(OrgNode::from).collect())
    }

    /// Flattened chart rows for rendering. Without `expanded`, only the
    /// requested root is open.
    #[instrument(name = "graphql.hr.org_rows", skip_all)]
    async fn org_rows(
        &self,
        ctx: &Context<'_>,
        manager_id: Option<i32>,
        expanded: Option<Vec<i32>>,
    ) -> async_graphql::Result<Vec<OrgRow>> {
        let forest = load_chart(ctx, manager_id).await?;
        let state = match (expanded, manager_id) {
            (Some(ids), _) => ids.into_iter().collect(),
            (None, Some(root)) => ExpandState::with_root_expanded(root),
            (None, None) => ExpandState::new(),
        };
        Ok(hr::visible_rows(&forest, &state)
            .into_iter()
            .map(OrgRow::from)
            .collect())
    }

    #[instrument(name = "graphql.hr.pending_new_staff_requests", skip_all)]
    async fn pending_new_staff_requests(
        &self,
        ctx: &Context<'_>,
        manager_id: i32,
    ) -> async_graphql::Result<Vec<TicketNode>> {
        let viewer = require_viewer(ctx)?;
        if !viewer.may_view_subtree(Some(manager_id)) {
            return Err(ApiError::Forbidden.extend());
        }
        let db = database(ctx)?;
        let tickets = DbDirectory::new(db)
            .all_tickets()
            .await
            .map_err(|err| ApiError::from(hr::HrError::TicketsUnavailable(err)).extend())?;
        let index = PendingIndex::build(&tickets);
        Ok(index
            .for_manager(manager_id)
            .iter()
            .map(|ticket| TicketNode::from(*ticket))
            .collect())
    }

    #[instrument(name = "graphql.hr.employees", skip_all)]
    async fn employees(
        &self,
        ctx: &Context<'_>,
        status: Option<EmployeeStatus>,
    ) -> async_graphql::Result<Vec<EmployeeNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let mut query = employee::Entity::find().find_also_related(department::Entity);
        if let Some(status) = status {
            query = query.filter(employee::Column::Status.eq(employee_status_filter(status.into())));
        }
        let rows = query
            .order_by_asc(employee::Column::LastName)
            .order_by_asc(employee::Column::FirstName)
            .all(db.as_ref())
            .await
            .map_err(|err| ApiError::from(err).extend())?;
        Ok(rows
            .into_iter()
            .map(|(model, department)| EmployeeNode::from(&employee_from_model(model, department)))
            .collect())
    }
}

async fn load_chart(
    ctx: &Context<'_>,
    manager_id: Option<i32>,
) -> async_graphql::Result<Vec<ManagerNode>> {
    let viewer = require_viewer(ctx)?;
    if !viewer.may_view_subtree(manager_id) {
        return Err(ApiError::Forbidden.extend());
    }
    let directory = DbDirectory::new(database(ctx)?);
    service::load_org_chart(&directory, &directory, manager_id)
        .await
        .map_err(|err| ApiError::from(err).extend())
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Onboarding,
    OnLeave,
}

impl From<hr::EmployeeStatus> for EmployeeStatus {
    fn from(value: hr::EmployeeStatus) -> Self {
        match value {
            hr::EmployeeStatus::Active => EmployeeStatus::Active,
            hr::EmployeeStatus::Inactive => EmployeeStatus::Inactive,
            hr::EmployeeStatus::Onboarding => EmployeeStatus::Onboarding,
            hr::EmployeeStatus::OnLeave => EmployeeStatus::OnLeave,
        }
    }
}

impl From<EmployeeStatus> for hr::EmployeeStatus {
    fn from(value: EmployeeStatus) -> Self {
        match value {
            EmployeeStatus::Active => hr::EmployeeStatus::Active,
            EmployeeStatus::Inactive => hr::EmployeeStatus::Inactive,
            EmployeeStatus::Onboarding => hr::EmployeeStatus::Onboarding,
            EmployeeStatus::OnLeave => hr::EmployeeStatus::OnLeave,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl From<hr::TicketStatus> for TicketStatus {
    fn from(value: hr::TicketStatus) -> Self {
        match value {
            hr::TicketStatus::Open => TicketStatus::Open,
            hr::TicketStatus::InProgress => TicketStatus::InProgress,
            hr::TicketStatus::Closed => TicketStatus::Closed,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum TicketKind {
    NewStaffRequest,
    SystemAccessRequest,
    ProfileChangeRequest,
    General,
}

impl From<hr::TicketKind> for TicketKind {
    fn from(value: hr::TicketKind) -> Self {
        match value {
            hr::TicketKind::NewStaffRequest => TicketKind::NewStaffRequest,
            hr::TicketKind::SystemAccessRequest => TicketKind::SystemAccessRequest,
            hr::TicketKind::ProfileChangeRequest => TicketKind::ProfileChangeRequest,
            hr::TicketKind::General => TicketKind::General,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Employee")]
pub struct EmployeeNode {
    pub id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<i32>,
    pub department: Option<String>,
    pub manager_id: Option<i32>,
    pub status: Option<EmployeeStatus>,
    pub avatar: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

impl From<&hr::Employee> for EmployeeNode {
    fn from(employee: &hr::Employee) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            full_name: employee.full_name(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            position: employee.position.clone(),
            department_id: employee.department_id,
            department: employee.department.clone(),
            manager_id: employee.manager_id,
            status: employee.status.map(Into::into),
            avatar: employee.avatar.clone(),
            hire_date: employee.hire_date,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Ticket")]
pub struct TicketNode {
    pub id: i32,
    pub title: String,
    pub kind: TicketKind,
    pub status: TicketStatus,
    pub assignee_id: Option<i32>,
    /// Manager the request is associated with, after lookup precedence.
    pub manager_id: Option<i32>,
    pub metadata: Json<serde_json::Value>,
}

impl From<&Ticket> for TicketNode {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title.clone(),
            kind: ticket.kind().into(),
            status: ticket.status.into(),
            assignee_id: ticket.assignee_id,
            manager_id: hr::associated_manager(ticket),
            metadata: Json(ticket.request.metadata()),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct OrgNode {
    pub employee: EmployeeNode,
    pub reports: Vec<OrgNode>,
    pub pending_requests: Vec<TicketNode>,
}

impl From<ManagerNode> for OrgNode {
    fn from(node: ManagerNode) -> Self {
        Self {
            employee: EmployeeNode::from(&node.employee),
            pending_requests: node.pending_requests.iter().map(TicketNode::from).collect(),
            reports: node.reports.into_iter().map(OrgNode::from).collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct OrgRow {
    pub depth: i32,
    pub employee_id: i32,
    pub name: String,
    pub has_reports: bool,
    pub expanded: bool,
    pub pending_count: i32,
}

impl From<VisibleRow> for OrgRow {
    fn from(row: VisibleRow) -> Self {
        Self {
            depth: i32::try_from(row.depth).unwrap_or(i32::MAX),
            employee_id: row.employee_id,
            name: row.name,
            has_reports: row.has_reports,
            expanded: row.expanded,
            pending_count: i32::try_from(row.pending_count).unwrap_or(i32::MAX),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Profile")]
pub struct ProfileNode {
    pub user_id: Option<ID>,
    pub employee_id: Option<i32>,
    pub role: Option<String>,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub hire_date: Option<NaiveDate>,
    pub department_id: Option<i32>,
    pub manager_id: Option<i32>,
    pub employee: Option<EmployeeNode>,
}

impl From<ProfileData> for ProfileNode {
    fn from(profile: ProfileData) -> Self {
        Self {
            display_name: profile.display_name(),
            user_id: profile.user_id.map(|id| ID::from(id.to_string())),
            employee_id: profile.employee_id,
            role: profile.role,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            position: profile.position,
            department: profile.department,
            phone: profile.phone,
            avatar: profile.avatar,
            status: profile.status.map(Into::into),
            hire_date: profile.hire_date,
            department_id: profile.department_id,
            manager_id: profile.manager_id,
            employee: profile.employee.as_ref().map(EmployeeNode::from),
        }
    }
}

fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| ApiError::internal(anyhow::anyhow!("missing database connection")).extend())
}

fn require_viewer(ctx: &Context<'_>) -> async_graphql::Result<CurrentUser> {
    ctx.data::<CurrentUser>()
        .cloned()
        .map_err(|_| ApiError::Unauthenticated.extend())
}
