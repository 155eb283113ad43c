use chrono::{Duration, Utc};
use entity::user;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "hr_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum UserRole {
    Admin,
    Hr,
    Manager,
    Staff,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Hr => "HR",
            UserRole::Manager => "MANAGER",
            UserRole::Staff => "STAFF",
        }
    }

    pub fn level(self) -> u8 {
        match self {
            UserRole::Admin => 4,
            UserRole::Hr => 3,
            UserRole::Manager => 2,
            UserRole::Staff => 1,
        }
    }
}

impl From<user::Role> for UserRole {
    fn from(value: user::Role) -> Self {
        match value {
            user::Role::Admin => UserRole::Admin,
            user::Role::Hr => UserRole::Hr,
            user::Role::Manager => UserRole::Manager,
            user::Role::Staff => UserRole::Staff,
        }
    }
}

/// Authenticated caller attached to each GraphQL request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub roles: Vec<UserRole>,
    pub employee_id: Option<i32>,
}

impl CurrentUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.iter().any(|r| r.level() >= role.level())
    }

    /// HR and above see every subtree; everyone else only their own.
    pub fn may_view_subtree(&self, manager_id: Option<i32>) -> bool {
        if self.has_role(UserRole::Hr) {
            return true;
        }
        matches!((manager_id, self.employee_id), (Some(requested), Some(own)) if requested == own)
    }
}

pub fn issue_token(
    user_id: Uuid,
    roles: &[UserRole],
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}
