//! Fetch-then-shape entry points used by the API layer.

use tracing::instrument;

use crate::error::{HrError, HrResult};
use crate::hierarchy::{build_forest, build_single_manager_tree, ManagerNode};
use crate::model::EmployeeId;
use crate::profile::{reconcile, resolve_employee_id, ProfileData};
use crate::provider::{EmployeeDirectory, SessionSource, TicketSource};

/// Profile for the session user, or for `explicit_id` when given. A failed
/// lookup is an error, never a partial profile; an employee id that matches
/// no record leaves the profile user-only.
#[instrument(name = "hr.load_profile", skip_all, fields(explicit_id = ?explicit_id))]
pub async fn load_profile(
    session: &dyn SessionSource,
    directory: &dyn EmployeeDirectory,
    explicit_id: Option<EmployeeId>,
) -> HrResult<Option<ProfileData>> {
    let user = session
        .current_user()
        .await
        .map_err(HrError::UserUnavailable)?;
    let employee = match resolve_employee_id(explicit_id, user.as_ref()) {
        Some(id) => directory
            .employee_by_id(id)
            .await
            .map_err(|source| HrError::EmployeeUnavailable { id, source })?,
        None => None,
    };
    Ok(reconcile(user.as_ref(), employee.as_ref()))
}

/// Whole forest, or the subtree of `manager_id`.
#[instrument(name = "hr.load_org_chart", skip_all, fields(manager_id = ?manager_id))]
pub async fn load_org_chart(
    directory: &dyn EmployeeDirectory,
    tickets: &dyn TicketSource,
    manager_id: Option<EmployeeId>,
) -> HrResult<Vec<ManagerNode>> {
    let employees = directory
        .all_employees()
        .await
        .map_err(HrError::EmployeesUnavailable)?;
    let tickets = tickets
        .all_tickets()
        .await
        .map_err(HrError::TicketsUnavailable)?;
    Ok(match manager_id {
        Some(id) => build_single_manager_tree(&employees, &tickets, id),
        None => build_forest(&employees, &tickets),
    })
}
