//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::models::Item;
use crate::routes::PageContext;
use crate::services::ListingService;
use crate::state::AppState;

/// Listing index template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub items: Vec<Item>,
}

/// Display every listing, oldest first.
///
/// # Errors
///
/// Returns an error if the listings or the session cannot be read.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let items = ListingService::new(state.items()).list_all().await?;

    Ok(HomeTemplate {
        ctx: PageContext::build(&session).await?,
        title: "Home",
        items,
    })
}
