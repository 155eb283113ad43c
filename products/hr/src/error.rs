use thiserror::Error;

use crate::model::EmployeeId;

pub type HrResult<T> = Result<T, HrError>;

/// Collaborator failures. Dangling manager ids and cycles are not errors;
/// the builders recover from those locally.
#[derive(Debug, Error)]
pub enum HrError {
    #[error("session user unavailable")]
    UserUnavailable(#[source] anyhow::Error),
    #[error("employee {id} unavailable")]
    EmployeeUnavailable {
        id: EmployeeId,
        #[source]
        source: anyhow::Error,
    },
    #[error("employee directory unavailable")]
    EmployeesUnavailable(#[source] anyhow::Error),
    #[error("ticket list unavailable")]
    TicketsUnavailable(#[source] anyhow::Error),
}
