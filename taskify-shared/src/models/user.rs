/// User model
///
/// Users are pre-provisioned (seeded) workspace accounts; the app has no
/// registration or login, the frontend just picks one of these on the
/// selection screen.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('PM', 'Engineer');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     role user_role NOT NULL DEFAULT 'Engineer',
///     avatar_url TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workspace role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    PM,
    Engineer,
}

impl UserRole {
    /// Converts role to its wire/database label
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::PM => "PM",
            UserRole::Engineer => "Engineer",
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (unique)
    pub email: String,

    /// Workspace role
    pub role: UserRole,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a new user
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, avatar_url, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.role)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users, alphabetically
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, avatar_url, created_at FROM users ORDER BY name ASC",
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_as_str() {
        assert_eq!(UserRole::PM.as_str(), "PM");
        assert_eq!(UserRole::Engineer.as_str(), "Engineer");
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: Uuid::nil(),
            name: "Sarah Johnson".to_string(),
            email: "sarah.johnson@taskify.dev".to_string(),
            role: UserRole::PM,
            avatar_url: Some("https://i.pravatar.cc/150?img=1".to_string()),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["role"], "PM");
        assert!(value.get("avatarUrl").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
