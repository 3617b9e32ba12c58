use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Recruiter,
    Mentor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::Mentor => "mentor",
            Role::Student => "student",
        }
    }

    pub fn can_manage_jobs(&self) -> bool {
        matches!(self, Role::Admin | Role::Recruiter)
    }

    pub fn can_evaluate(&self) -> bool {
        matches!(self, Role::Admin | Role::Recruiter | Role::Mentor)
    }

    pub fn can_run_batches(&self) -> bool {
        matches!(self, Role::Admin | Role::Recruiter)
    }

    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "recruiter" => Ok(Role::Recruiter),
            "mentor" => Ok(Role::Mentor),
            "student" => Ok(Role::Student),
            other => Err(format!(
                "role must be one of admin, recruiter, mentor, student (got '{other}')"
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserRow {
    /// Rows are CHECK-constrained; an unknown value means a schema drift, treated as least privilege.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Student)
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        let role = row.role();
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role,
            is_active: row.is_active,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.can_manage_jobs());
        assert!(Role::Recruiter.can_manage_jobs());
        assert!(!Role::Mentor.can_manage_jobs());
        assert!(Role::Mentor.can_evaluate());
        assert!(!Role::Student.can_evaluate());
        assert!(!Role::Mentor.can_run_batches());
        assert!(Role::Admin.can_manage_users());
        assert!(!Role::Recruiter.can_manage_users());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Recruiter".parse::<Role>().unwrap(), Role::Recruiter);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Mentor).unwrap(), r#""mentor""#);
    }

    #[test]
    fn test_profile_hides_hash() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "a@b.io".into(),
            full_name: "A B".into(),
            role: "recruiter".into(),
            password_hash: "$argon2id$secret".into(),
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        };
        let json = serde_json::to_string(&UserProfile::from(row)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains(r#""role":"recruiter""#));
    }
}
