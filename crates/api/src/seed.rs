//! Demo organisation used by `seed` and by the integration tests.

use chrono::{NaiveDate, Utc};
use entity::{department, employee, ticket, user};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DbErr};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SeededHrRecords {
    pub departments: Vec<department::Model>,
    pub employees: Vec<employee::Model>,
    pub users: Vec<user::Model>,
    pub tickets: Vec<ticket::Model>,
}

impl SeededHrRecords {
    pub fn user_email(&self, email: &str) -> Option<&user::Model> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn employee_email(&self, email: &str) -> Option<&employee::Model> {
        self.employees.iter().find(|e| e.email == email)
    }

    pub fn ticket_titled(&self, title: &str) -> Option<&ticket::Model> {
        self.tickets.iter().find(|t| t.title == title)
    }
}

pub async fn seed_hr_demo(db: &DatabaseConnection) -> Result<SeededHrRecords, DbErr> {
    let engineering = insert_department(db, "Engineering").await?;
    let people = insert_department(db, "People").await?;

    let ceo = insert_employee(
        db,
        NewEmployee {
            first_name: "Grace",
            last_name: "Hopper",
            email: "grace@hr.test",
            position: "Chief Executive",
            department_id: None,
            manager_id: None,
            status: employee::Status::Active,
            hire_date: NaiveDate::from_ymd_opt(2015, 3, 1),
        },
    )
    .await?;
    let cto = insert_employee(
        db,
        NewEmployee {
            first_name: "Alan",
            last_name: "Turing",
            email: "alan@hr.test",
            position: "Head of Engineering",
            department_id: Some(engineering.id),
            manager_id: Some(ceo.id),
            status: employee::Status::Active,
            hire_date: NaiveDate::from_ymd_opt(2017, 6, 12),
        },
    )
    .await?;
    let hr_lead = insert_employee(
        db,
        NewEmployee {
            first_name: "Frances",
            last_name: "Allen",
            email: "frances@hr.test",
            position: "People Partner",
            department_id: Some(people.id),
            manager_id: Some(ceo.id),
            status: employee::Status::OnLeave,
            hire_date: NaiveDate::from_ymd_opt(2018, 1, 8),
        },
    )
    .await?;
    let engineer = insert_employee(
        db,
        NewEmployee {
            first_name: "Ada",
            last_name: "Lovelace",
            email: "ada@hr.test",
            position: "Software Engineer",
            department_id: Some(engineering.id),
            manager_id: Some(cto.id),
            status: employee::Status::Onboarding,
            hire_date: None,
        },
    )
    .await?;

    let users = vec![
        insert_user(db, "admin@hr.test", user::Role::Admin, Some(ceo.id)).await?,
        insert_user(db, "people@hr.test", user::Role::Hr, Some(hr_lead.id)).await?,
        insert_user(db, "manager@hr.test", user::Role::Manager, Some(cto.id)).await?,
        insert_user(db, "staff@hr.test", user::Role::Staff, Some(engineer.id)).await?,
    ];
    let requester = users[2].id;

    let tickets = vec![
        insert_ticket(
            db,
            "Hire backend engineer",
            ticket::Kind::NewStaffRequest,
            ticket::Status::Open,
            Some(requester),
            json!({"reportingManagerId": cto.id, "position": "Backend Engineer"}),
        )
        .await?,
        insert_ticket(
            db,
            "Hire data engineer",
            ticket::Kind::NewStaffRequest,
            ticket::Status::Closed,
            Some(requester),
            json!({"reportingManagerId": cto.id, "position": "Data Engineer"}),
        )
        .await?,
        insert_ticket(
            db,
            "Hire recruiter",
            ticket::Kind::NewStaffRequest,
            ticket::Status::InProgress,
            None,
            json!({"managerId": ceo.id.to_string(), "departmentId": people.id}),
        )
        .await?,
        insert_ticket(
            db,
            "VPN access for Ada",
            ticket::Kind::SystemAccessRequest,
            ticket::Status::Open,
            Some(users[3].id),
            json!({"employeeId": engineer.id, "system": "vpn", "accessLevel": "user"}),
        )
        .await?,
    ];

    Ok(SeededHrRecords {
        departments: vec![engineering, people],
        employees: vec![ceo, cto, hr_lead, engineer],
        users,
        tickets,
    })
}

async fn insert_department(db: &DatabaseConnection, name: &str) -> Result<department::Model, DbErr> {
    department::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
}

struct NewEmployee<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    position: &'a str,
    department_id: Option<i32>,
    manager_id: Option<i32>,
    status: employee::Status,
    hire_date: Option<NaiveDate>,
}

async fn insert_employee(
    db: &DatabaseConnection,
    new: NewEmployee<'_>,
) -> Result<employee::Model, DbErr> {
    let now = Utc::now();
    employee::ActiveModel {
        first_name: Set(new.first_name.to_string()),
        last_name: Set(new.last_name.to_string()),
        email: Set(new.email.to_string()),
        phone: Set(None),
        position: Set(Some(new.position.to_string())),
        department_id: Set(new.department_id),
        manager_id: Set(new.manager_id),
        status: Set(new.status),
        avatar_url: Set(None),
        hire_date: Set(new.hire_date),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
}

async fn insert_user(
    db: &DatabaseConnection,
    email: &str,
    role: user::Role,
    employee_id: Option<i32>,
) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        first_name: Set(None),
        last_name: Set(None),
        avatar_url: Set(None),
        role: Set(role),
        employee_id: Set(employee_id),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
}

async fn insert_ticket(
    db: &DatabaseConnection,
    title: &str,
    kind: ticket::Kind,
    status: ticket::Status,
    created_by: Option<Uuid>,
    metadata: serde_json::Value,
) -> Result<ticket::Model, DbErr> {
    let now = Utc::now();
    ticket::ActiveModel {
        title: Set(title.to_string()),
        description: Set(None),
        kind: Set(kind),
        status: Set(status),
        assignee_id: Set(None),
        created_by: Set(created_by),
        metadata: Set(Some(metadata)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
}
