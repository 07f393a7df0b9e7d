//! Listing route handlers.
//!
//! Anyone may browse a listing; posting requires a login, and only the owner
//! may open the update form or delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use krishop_core::ItemId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::{FormErrors, PostForm};
use crate::middleware::{OptionalAuth, RequireAuth, push_flash};
use crate::models::{Flash, Item};
use crate::routes::PageContext;
use crate::services::ListingService;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// New/update listing form template.
#[derive(Template, WebTemplate)]
#[template(path = "create_post.html")]
pub struct CreatePostTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub legend: &'static str,
    pub form: PostForm,
    pub errors: FormErrors,
}

/// Listing detail template.
#[derive(Template, WebTemplate)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub item: Item,
    pub is_owner: bool,
}

async fn render_new_post(session: &Session, form: PostForm, errors: FormErrors) -> Result<Response> {
    Ok(CreatePostTemplate {
        ctx: PageContext::build(session).await?,
        title: "New Post",
        legend: "New Post",
        form,
        errors,
    }
    .into_response())
}

/// Parse the `{item_id}` path segment; anything non-numeric is a 404.
fn parse_item_id(raw: &str) -> Result<ItemId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("listing {raw}")))
}

// =============================================================================
// Create
// =============================================================================

/// Display the new listing form.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
#[instrument(skip_all)]
pub async fn new_post_page(session: Session, RequireAuth(_user): RequireAuth) -> Result<Response> {
    render_new_post(&session, PostForm::default(), FormErrors::new()).await
}

/// Handle the new listing form.
///
/// # Errors
///
/// Returns an error if the store or the session fails. Validation failures
/// re-render the form instead.
#[instrument(skip_all)]
pub async fn new_post(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let new_item = match form.validate() {
        Ok(item) => item,
        Err(errors) => return render_new_post(&session, form.trimmed(), errors).await,
    };

    let item = ListingService::new(state.items())
        .create(user.id, new_item)
        .await?;

    let item_id = item.id.to_string();
    add_breadcrumb("listing", "Listing posted", Some(&[("item_id", item_id.as_str())]));
    tracing::info!(item_id = %item.id, user_id = %user.id, "Listing posted");

    push_flash(&session, Flash::success("Your product has been posted!")).await?;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Read
// =============================================================================

/// Display a single listing.
///
/// # Errors
///
/// Returns `AppError::NotFound` for unknown or malformed IDs.
#[instrument(skip(state, session, user))]
pub async fn view_item(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(item_id): Path<String>,
) -> Result<Response> {
    let id = parse_item_id(&item_id)?;
    let item = ListingService::new(state.items()).get(id).await?;
    let is_owner = user.is_some_and(|u| item.is_owned_by(u.id));

    Ok(PostTemplate {
        ctx: PageContext::build(&session).await?,
        title: item.name.clone(),
        item,
        is_owner,
    }
    .into_response())
}

// =============================================================================
// Update / Delete
// =============================================================================

/// Display the update form for a listing the user owns.
///
/// The form starts blank and nothing is saved from here.
///
/// # Errors
///
/// Returns `AppError::NotFound` for unknown IDs and a forbidden error for
/// listings owned by someone else.
#[instrument(skip(state, session, user))]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<String>,
) -> Result<Response> {
    let id = parse_item_id(&item_id)?;
    ListingService::new(state.items())
        .get_owned(id, user.id)
        .await?;

    Ok(CreatePostTemplate {
        ctx: PageContext::build(&session).await?,
        title: "Update Post",
        legend: "Update Post",
        form: PostForm::default(),
        errors: FormErrors::new(),
    }
    .into_response())
}

/// Delete a listing the user owns.
///
/// # Errors
///
/// Returns `AppError::NotFound` for unknown IDs and a forbidden error for
/// listings owned by someone else.
#[instrument(skip(state, session, user))]
pub async fn delete_item(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<String>,
) -> Result<Response> {
    let id = parse_item_id(&item_id)?;
    let item = ListingService::new(state.items())
        .delete_owned(id, user.id)
        .await?;

    add_breadcrumb("listing", "Listing deleted", Some(&[("item_id", item_id.as_str())]));
    tracing::info!(item_id = %item.id, user_id = %user.id, "Listing deleted");

    push_flash(&session, Flash::success("Your product has been deleted!")).await?;
    Ok(Redirect::to("/").into_response())
}
