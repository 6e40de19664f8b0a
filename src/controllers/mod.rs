use axum::body::Bytes;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{auth::error::AuthError, error::Error, model::CurrentUser};

pub mod auth;
pub mod chapters;
pub mod chatbot;
pub mod comments;
pub mod genres;
pub mod home;
pub mod me;
pub mod novels;
pub mod reading_history;
pub mod users;

/// Admins may act for anyone; other callers only for themselves.
pub fn ensure_can_act_for(user: &CurrentUser, user_id: Uuid) -> Result<(), Error> {
    if user.can_act_for(user_id) {
        Ok(())
    } else {
        Err(Error::Auth(AuthError::Forbidden))
    }
}

/// Parses a JSON body that clients may leave out entirely.
pub fn optional_json<T>(body: &Bytes) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| Error::BadRequest(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use uuid::Uuid;

    use crate::model::{CurrentUser, Role};

    use super::{ensure_can_act_for, optional_json};

    #[derive(serde::Deserialize, Default, Debug, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Target {
        user_id: Option<Uuid>,
    }

    fn caller(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn empty_body_yields_defaults() {
        let bodies: [&[u8]; 3] = [b"", b" \n", b"{}"];
        for body in bodies {
            let target: Target = optional_json(&Bytes::copy_from_slice(body)).unwrap();
            assert_eq!(target, Target::default());
        }
    }

    #[test]
    fn present_body_is_parsed_or_rejected() {
        let user_id = Uuid::new_v4();
        let body = Bytes::from(format!(r#"{{"userId":"{}"}}"#, user_id));

        assert_eq!(optional_json::<Target>(&body).unwrap().user_id, Some(user_id));
        assert!(optional_json::<Target>(&Bytes::from_static(b"{")).is_err());
    }

    #[test]
    fn only_admins_act_for_others() {
        let reader = caller(Role::User);
        let admin = caller(Role::Admin);

        assert!(ensure_can_act_for(&reader, reader.id).is_ok());
        assert!(ensure_can_act_for(&reader, admin.id).is_err());
        assert!(ensure_can_act_for(&admin, reader.id).is_ok());
    }
}
