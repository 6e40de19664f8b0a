use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UnknownVariant;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Public shape of an account. The password hash lives only on [`UserEntity`].
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name shown next to the user's content; `full_name` unless it is blank.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

#[derive(sqlx::FromRow, Debug)]
pub struct UserEntity {
    #[sqlx(flatten)]
    pub user: User,
    pub password: Option<String>,
}

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub full_name: String,
    pub avatar: String,
    pub google_id: Option<String>,
}

#[derive(Default, Debug)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Identity asserted by an external provider after a successful sign-in.
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub provider_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

/// Identity carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on any account, everyone else only on their own.
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.is_admin() || self.id == user_id
    }
}

/// Username for accounts created through an external identity provider.
pub fn generate_username(email: &str, suffix: u32) -> String {
    let local_part = email.split('@').next().unwrap_or_default();
    let local_part = if local_part.is_empty() {
        "user"
    } else {
        local_part
    };

    format!("{}_{}", local_part, suffix)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{CurrentUser, Role, User, generate_username};

    #[test]
    fn username_is_derived_from_email_local_part() {
        assert_eq!(generate_username("jane.doe@gmail.com", 4821), "jane.doe_4821");
        assert_eq!(generate_username("@nowhere", 7), "user_7");
    }

    #[test]
    fn role_round_trips_through_its_column_value() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!(Role::Admin.as_str(), "admin");
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn only_admins_act_for_other_users() {
        let owner = Uuid::new_v4();
        let user = CurrentUser {
            id: owner,
            username: "reader".into(),
            email: "reader@localhost".into(),
            role: Role::User,
        };

        assert!(user.can_act_for(owner));
        assert!(!user.can_act_for(Uuid::new_v4()));

        let admin = CurrentUser {
            role: Role::Admin,
            ..user
        };
        assert!(admin.can_act_for(Uuid::new_v4()));
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            username: "night_reader".into(),
            email: "reader@localhost".into(),
            full_name: "  ".into(),
            avatar: String::new(),
            role: Role::User,
            is_active: true,
            google_id: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(user.display_name(), "night_reader");

        user.full_name = "Ada Reader".into();
        assert_eq!(user.display_name(), "Ada Reader");
    }
}
