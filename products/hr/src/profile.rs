//! Canonical profile view merged from the session user and the employee
//! record.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Employee, EmployeeId, EmployeeStatus, SessionUser};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileData {
    pub user_id: Option<Uuid>,
    pub employee_id: Option<EmployeeId>,
    pub role: Option<String>,
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
    pub manager_id: Option<EmployeeId>,
    pub employee: Option<Employee>,
}

impl ProfileData {
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        let full = format!("{} {}", first, last);
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => "Unknown".to_string(),
        }
    }
}

/// Merge `user` and `employee` into one profile. User values are defaults;
/// every employee field that is present replaces them, an explicitly empty
/// string included. `None` when both inputs are absent.
pub fn reconcile(user: Option<&SessionUser>, employee: Option<&Employee>) -> Option<ProfileData> {
    if user.is_none() && employee.is_none() {
        return None;
    }

    let defaults = user.cloned().unwrap_or_default();
    let mut profile = ProfileData {
        user_id: user.map(|u| u.id),
        employee_id: employee.map(|e| e.id).or(defaults.employee_id),
        role: defaults.role,
        first_name: defaults.first_name,
        last_name: defaults.last_name,
        email: defaults.email,
        position: defaults.position,
        department: defaults.department,
        phone: defaults.phone,
        avatar: defaults.avatar,
        status: defaults.status,
        hire_date: defaults.hire_date,
        department_id: defaults.department_id,
        manager_id: defaults.manager_id,
        employee: None,
    };

    if let Some(employee) = employee {
        overwrite(&mut profile.first_name, &employee.first_name);
        overwrite(&mut profile.last_name, &employee.last_name);
        overwrite(&mut profile.email, &employee.email);
        overwrite(&mut profile.position, &employee.position);
        overwrite(&mut profile.department, &employee.department);
        overwrite(&mut profile.phone, &employee.phone);
        overwrite(&mut profile.avatar, &employee.avatar);
        overwrite(&mut profile.status, &employee.status);
        overwrite(&mut profile.hire_date, &employee.hire_date);
        overwrite(&mut profile.department_id, &employee.department_id);
        overwrite(&mut profile.manager_id, &employee.manager_id);
        profile.employee = Some(employee.clone());
    }

    Some(profile)
}

/// Employee to look up for a profile: the explicit id, else the one linked
/// to the user. `None` skips the lookup.
pub fn resolve_employee_id(
    explicit: Option<EmployeeId>,
    user: Option<&SessionUser>,
) -> Option<EmployeeId> {
    explicit.or_else(|| user.and_then(|u| u.employee_id))
}

fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            role: Some("STAFF".into()),
            employee_id: Some(12),
            email: Some("ada@hr.test".into()),
            first_name: Some("Ada".into()),
            last_name: Some("Byron".into()),
            avatar: Some("https://cdn.test/ada.png".into()),
            ..SessionUser::default()
        }
    }

    #[test]
    fn both_absent_is_not_found() {
        assert_eq!(reconcile(None, None), None);
    }

    #[test]
    fn explicit_empty_string_overrides_user() {
        let mut employee = Employee::new(12, "", "Lovelace");
        employee.first_name = Some(String::new());
        let profile = reconcile(Some(&user()), Some(&employee)).unwrap();
        assert_eq!(profile.first_name.as_deref(), Some(""));
        assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));
    }

    #[test]
    fn absent_employee_field_keeps_user_value() {
        let employee = Employee {
            id: 12,
            position: Some("Analyst".into()),
            ..Employee::default()
        };
        let user = user();
        let profile = reconcile(Some(&user), Some(&employee)).unwrap();
        assert_eq!(profile.first_name, user.first_name);
        assert_eq!(profile.avatar, user.avatar);
        assert_eq!(profile.position.as_deref(), Some("Analyst"));
        assert_eq!(profile.user_id, Some(user.id));
        assert_eq!(profile.employee, Some(employee));
    }

    #[test]
    fn user_only_profile_keeps_linked_employee_id() {
        let profile = reconcile(Some(&user()), None).unwrap();
        assert_eq!(profile.employee_id, Some(12));
        assert!(profile.employee.is_none());
        assert_eq!(profile.display_name(), "Ada Byron");
    }

    #[test]
    fn employee_only_profile_has_no_user() {
        let employee = Employee::new(3, "Grace", "Hopper").reporting_to(1);
        let profile = reconcile(None, Some(&employee)).unwrap();
        assert_eq!(profile.user_id, None);
        assert_eq!(profile.employee_id, Some(3));
        assert_eq!(profile.manager_id, Some(1));
        assert_eq!(profile.status, Some(EmployeeStatus::Active));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let profile = ProfileData {
            email: Some("ops@hr.test".into()),
            first_name: Some(" ".into()),
            ..ProfileData::default()
        };
        assert_eq!(profile.display_name(), "ops@hr.test");
        assert_eq!(ProfileData::default().display_name(), "Unknown");
    }

    #[test]
    fn explicit_id_beats_linked_employee() {
        let user = user();
        assert_eq!(resolve_employee_id(Some(4), Some(&user)), Some(4));
        assert_eq!(resolve_employee_id(None, Some(&user)), Some(12));
        assert_eq!(resolve_employee_id(None, None), None);
    }
}
