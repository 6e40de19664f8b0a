use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use crate::{
    db::user::get_user_by_id,
    error::Error,
    model::{CurrentUser, User},
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] me", skip_all, fields(user_id = %user.id))]
pub async fn index(
    Extension(user): Extension<Arc<CurrentUser>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<User>, Error> {
    let user = get_user_by_id(&app_state.pool, user.id).await?;

    Ok(Json(user))
}
