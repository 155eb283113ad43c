//! Records the HR core works on.
//!
//! Descriptive employee fields are optional so a missing value stays
//! distinguishable from an explicitly empty one.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

pub type EmployeeId = i32;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Onboarding,
    OnLeave,
}

impl EmployeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
            EmployeeStatus::Onboarding => "onboarding",
            EmployeeStatus::OnLeave => "on_leave",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "active" => Some(EmployeeStatus::Active),
            "inactive" => Some(EmployeeStatus::Inactive),
            "onboarding" => Some(EmployeeStatus::Onboarding),
            "on_leave" => Some(EmployeeStatus::OnLeave),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<i32>,
    pub department: Option<String>,
    pub manager_id: Option<EmployeeId>,
    pub status: Option<EmployeeStatus>,
    pub avatar: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

impl Employee {
    pub fn new(id: EmployeeId, first_name: &str, last_name: &str) -> Self {
        Self {
            id,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            status: Some(EmployeeStatus::Active),
            ..Self::default()
        }
    }

    pub fn reporting_to(mut self, manager_id: EmployeeId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        format!("{} {}", first, last).trim().to_string()
    }
}

/// The authenticated account behind a request. Every descriptive field is a
/// default that an employee record may override.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub role: Option<String>,
    pub employee_id: Option<EmployeeId>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub department_id: Option<i32>,
    pub manager_id: Option<EmployeeId>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    NewStaffRequest,
    SystemAccessRequest,
    ProfileChangeRequest,
    General,
}

impl TicketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketKind::NewStaffRequest => "new_staff_request",
            TicketKind::SystemAccessRequest => "system_access_request",
            TicketKind::ProfileChangeRequest => "profile_change_request",
            TicketKind::General => "general",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "new_staff_request" => Some(TicketKind::NewStaffRequest),
            "system_access_request" => Some(TicketKind::SystemAccessRequest),
            "profile_change_request" => Some(TicketKind::ProfileChangeRequest),
            "general" => Some(TicketKind::General),
            _ => None,
        }
    }
}

/// Metadata of a new-hire request. Several fields can name the manager; see
/// [`crate::overlay::MANAGER_LOOKUP_ORDER`] for which one counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub reporting_manager_id: Option<EmployeeId>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub manager_id: Option<EmployeeId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub department_id: Option<i32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAccessRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub access_level: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChangeRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub changes: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TicketRequest {
    NewStaff(NewStaffRequest),
    SystemAccess(SystemAccessRequest),
    ProfileChange(ProfileChangeRequest),
    General,
}

impl TicketRequest {
    /// Decode the persisted `(kind, metadata)` pair. Metadata that does not
    /// fit the kind's record degrades to an empty record.
    pub fn from_parts(kind: TicketKind, metadata: &Value) -> Self {
        match kind {
            TicketKind::NewStaffRequest => TicketRequest::NewStaff(decode_metadata(kind, metadata)),
            TicketKind::SystemAccessRequest => {
                TicketRequest::SystemAccess(decode_metadata(kind, metadata))
            }
            TicketKind::ProfileChangeRequest => {
                TicketRequest::ProfileChange(decode_metadata(kind, metadata))
            }
            TicketKind::General => TicketRequest::General,
        }
    }

    pub fn kind(&self) -> TicketKind {
        match self {
            TicketRequest::NewStaff(_) => TicketKind::NewStaffRequest,
            TicketRequest::SystemAccess(_) => TicketKind::SystemAccessRequest,
            TicketRequest::ProfileChange(_) => TicketKind::ProfileChangeRequest,
            TicketRequest::General => TicketKind::General,
        }
    }

    pub fn metadata(&self) -> Value {
        let encoded = match self {
            TicketRequest::NewStaff(record) => serde_json::to_value(record),
            TicketRequest::SystemAccess(record) => serde_json::to_value(record),
            TicketRequest::ProfileChange(record) => serde_json::to_value(record),
            TicketRequest::General => Ok(Value::Null),
        };
        encoded.unwrap_or(Value::Null)
    }
}

fn decode_metadata<T>(kind: TicketKind, metadata: &Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    if metadata.is_null() {
        return T::default();
    }
    match T::deserialize(metadata) {
        Ok(record) => record,
        Err(err) => {
            warn!(kind = kind.as_str(), error = %err, "ticket metadata not decodable");
            T::default()
        }
    }
}

/// Ids arrive from a loosely typed client as numbers or numeric strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(value)) => i32::try_from(value).ok(),
        Some(RawId::Text(value)) => value.trim().parse().ok(),
        Some(RawId::Other(_)) | None => None,
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ticket {
    pub id: i32,
    pub title: String,
    pub status: TicketStatus,
    pub assignee_id: Option<EmployeeId>,
    pub created_by: Option<Uuid>,
    pub request: TicketRequest,
}

impl Ticket {
    pub fn new(id: i32, title: &str, status: TicketStatus, request: TicketRequest) -> Self {
        Self {
            id,
            title: title.to_string(),
            status,
            assignee_id: None,
            created_by: None,
            request,
        }
    }

    pub fn kind(&self) -> TicketKind {
        self.request.kind()
    }

    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_staff_metadata_accepts_numeric_strings() {
        let request = TicketRequest::from_parts(
            TicketKind::NewStaffRequest,
            &json!({"reportingManagerId": "7", "managerId": 3, "position": "Nurse"}),
        );
        let TicketRequest::NewStaff(record) = request else {
            panic!("expected new staff request");
        };
        assert_eq!(record.reporting_manager_id, Some(7));
        assert_eq!(record.manager_id, Some(3));
        assert_eq!(record.position.as_deref(), Some("Nurse"));
    }

    #[test]
    fn malformed_ids_are_dropped_not_fatal() {
        let request = TicketRequest::from_parts(
            TicketKind::NewStaffRequest,
            &json!({"reportingManagerId": "seven", "managerId": true, "extra": [1, 2]}),
        );
        assert_eq!(request, TicketRequest::NewStaff(NewStaffRequest::default()));
    }

    #[test]
    fn metadata_of_wrong_shape_degrades_to_empty_record() {
        let request = TicketRequest::from_parts(TicketKind::SystemAccessRequest, &json!("vpn please"));
        assert_eq!(
            request,
            TicketRequest::SystemAccess(SystemAccessRequest::default())
        );
    }

    #[test]
    fn status_strings_round_through_as_str() {
        for status in [
            EmployeeStatus::Active,
            EmployeeStatus::Inactive,
            EmployeeStatus::Onboarding,
            EmployeeStatus::OnLeave,
        ] {
            assert_eq!(EmployeeStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::from_str("in_progress"), Some(TicketStatus::InProgress));
        assert_eq!(TicketKind::from_str("bogus"), None);
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let mut employee = Employee::new(1, "Ada", "");
        assert_eq!(employee.full_name(), "Ada");
        employee.first_name = None;
        assert_eq!(employee.full_name(), "");
    }
}
