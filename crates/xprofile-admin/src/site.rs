//! Route table and axum router for the bulk option admin page.
//!
//! The [`AdminSite`] owns the option appender, the nonce issuer and the
//! authenticator, and turns them into an Axum router with two routes:
//!
//! - `GET {prefix}/tools.php?page={slug}` - the bulk-add page
//! - `POST {prefix}/admin-post.php` - form submissions, dispatched on `action`
//!
//! Every submission ends in a `303 See Other` back to the page carrying a
//! status flag, a message and a results nonce. Users without the required
//! capability get a blocking 403 page and nothing is attempted.

use std::sync::Arc;

use axum::extract::{Form, FromRequest, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::Instrument;
use xprofile_core::logging::{new_request_id, request_span};
use xprofile_core::settings::AdminSettings;
use xprofile_core::{Settings, XProfileError};
use xprofile_db::ProfileFieldStore;

use crate::appender::OptionAppender;
use crate::auth::{require_capability, AdminUser, Authenticator, SettingsAuthenticator};
use crate::form::{AddOptionsForm, ADD_OPTIONS_ACTION};
use crate::nonce::{NonceIssuer, FORM_ACTION, RESULTS_ACTION};
use crate::notice::{page_path, post_path, redirect_location, NoticePayload, PageQuery};
use crate::page::{escape_html, render_permission_denied, BulkAddPage};

/// One registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: Method,
    /// Full request path.
    pub path: String,
    /// Handler name.
    pub name: &'static str,
}

/// The admin site: route table plus the state its handlers share.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use xprofile_admin::site::AdminSite;
/// use xprofile_core::Settings;
/// use xprofile_db::InMemoryFieldStore;
///
/// let site = AdminSite::new(&Settings::default(), Arc::new(InMemoryFieldStore::new()));
/// assert_eq!(site.routes().len(), 2);
/// let router = site.into_axum_router();
/// ```
pub struct AdminSite {
    admin: AdminSettings,
    appender: Arc<OptionAppender>,
    nonces: NonceIssuer,
    authenticator: Arc<dyn Authenticator>,
}

impl AdminSite {
    /// Creates a site over `store`, configured from `settings`.
    ///
    /// Users come from `settings.users`. The nonce key is resolved once
    /// here, so an ephemeral debug key stays stable for the site's lifetime.
    pub fn new(settings: &Settings, store: Arc<dyn ProfileFieldStore>) -> Self {
        Self {
            admin: settings.admin.clone(),
            appender: Arc::new(OptionAppender::new(store, &settings.options)),
            nonces: NonceIssuer::new(
                settings.effective_secret_key(),
                settings.admin.nonce_lifetime_secs,
            ),
            authenticator: Arc::new(SettingsAuthenticator::new(settings.users.clone())),
        }
    }

    /// Replaces the authenticator.
    #[must_use]
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Returns the option appender.
    pub const fn appender(&self) -> &Arc<OptionAppender> {
        &self.appender
    }

    /// Returns the nonce issuer.
    pub const fn nonces(&self) -> &NonceIssuer {
        &self.nonces
    }

    /// Lists the routes [`into_axum_router`](Self::into_axum_router) registers.
    pub fn routes(&self) -> Vec<RouteInfo> {
        vec![
            RouteInfo {
                method: Method::GET,
                path: page_path(&self.admin.url_prefix),
                name: "bulk_add_page",
            },
            RouteInfo {
                method: Method::POST,
                path: post_path(&self.admin.url_prefix),
                name: "admin_post",
            },
        ]
    }

    /// Builds the Axum router.
    pub fn into_axum_router(self) -> Router {
        let page = page_path(&self.admin.url_prefix);
        let submit = post_path(&self.admin.url_prefix);

        let shared = Arc::new(SiteState {
            admin: self.admin,
            appender: self.appender,
            nonces: self.nonces,
            authenticator: self.authenticator,
        });

        Router::new()
            .route(&page, get(handle_bulk_add_page))
            .route(&submit, post(handle_admin_post))
            .with_state(shared)
    }
}

impl std::fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSite")
            .field("url_prefix", &self.admin.url_prefix)
            .field("page_slug", &self.admin.page_slug)
            .field("appender", &self.appender)
            .finish_non_exhaustive()
    }
}

/// Shared state for Axum handlers.
struct SiteState {
    admin: AdminSettings,
    appender: Arc<OptionAppender>,
    nonces: NonceIssuer,
    authenticator: Arc<dyn Authenticator>,
}

impl SiteState {
    /// Authenticates the request and checks the required capability.
    async fn authorize(&self, headers: &HeaderMap) -> Result<AdminUser, Response> {
        let user = self.authenticator.authenticate(headers).await;
        match require_capability(user.as_ref(), &self.admin.required_capability) {
            Ok(user) => Ok(user.clone()),
            Err(e) => {
                tracing::warn!(error = %e, "Admin request refused");
                Err(forbidden())
            }
        }
    }

    fn redirect_with(&self, user: &AdminUser, notice: &NoticePayload) -> Response {
        let nonce = self.nonces.create(RESULTS_ACTION, &user.username);
        let location = redirect_location(
            &self.admin.url_prefix,
            &self.admin.page_slug,
            notice,
            &nonce,
        );
        Redirect::to(&location).into_response()
    }
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Html(render_permission_denied())).into_response()
}

fn error_response(error: &XProfileError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = if error.is_client_error() {
        escape_html(&error.to_string())
    } else {
        "Internal server error".to_string()
    };
    (status, Html(format!("<p>{body}</p>"))).into_response()
}

// ── Page ───────────────────────────────────────────────────────────

/// Handler for `GET {prefix}/tools.php`.
async fn handle_bulk_add_page(
    State(state): State<Arc<SiteState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let span = request_span(&new_request_id(), "bulk_add_page");
    bulk_add_page(&state, &headers, query).instrument(span).await
}

async fn bulk_add_page(state: &SiteState, headers: &HeaderMap, query: PageQuery) -> Response {
    let user = match state.authorize(headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if query.page.as_deref() != Some(state.admin.page_slug.as_str()) {
        return error_response(&XProfileError::BadRequest(format!(
            "unknown tools page '{}'",
            query.page.as_deref().unwrap_or_default()
        )));
    }

    let groups = match state.appender.store().field_groups().await {
        Ok(groups) => groups,
        Err(e) => {
            tracing::error!(error = %e, "Could not list profile fields");
            return error_response(&e);
        }
    };

    let form_nonce = state.nonces.create(FORM_ACTION, &user.username);
    let notice = query.verified_notice(&state.nonces, &user.username);
    let page = BulkAddPage {
        admin_prefix: &state.admin.url_prefix,
        groups: &groups,
        form_nonce: &form_nonce,
        notice: notice.as_ref(),
    };
    tracing::debug!(user = %user.username, groups = groups.len(), "Rendering bulk add page");
    Html(page.render()).into_response()
}

// ── Submission ─────────────────────────────────────────────────────

/// Handler for `POST {prefix}/admin-post.php`.
///
/// The body is only parsed once the caller is authorized, so an anonymous
/// request gets the 403 page whatever it sends.
async fn handle_admin_post(State(state): State<Arc<SiteState>>, request: Request) -> Response {
    let span = request_span(&new_request_id(), "admin_post");
    admin_post(&state, request).instrument(span).await
}

async fn admin_post(state: &SiteState, request: Request) -> Response {
    let headers = request.headers().clone();
    let user = match state.authorize(&headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let form = match Form::<AddOptionsForm>::from_request(request, &()).await {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!(user = %user.username, error = %rejection, "Malformed admin-post body");
            return rejection.into_response();
        }
    };

    match form.action.as_deref() {
        Some(ADD_OPTIONS_ACTION) => {
            let notice = add_options(state, &user, &form).await;
            state.redirect_with(&user, &notice)
        }
        other => {
            let action = other.unwrap_or_default();
            tracing::warn!(action, "Unknown admin-post action");
            error_response(&XProfileError::BadRequest(format!(
                "unknown action '{action}'"
            )))
        }
    }
}

async fn add_options(state: &SiteState, user: &AdminUser, form: &AddOptionsForm) -> NoticePayload {
    let nonce = form.nonce.as_deref().unwrap_or_default();
    if !state.nonces.verify(nonce, FORM_ACTION, &user.username) {
        let e = XProfileError::CsrfInvalid("form nonce missing or invalid".to_string());
        tracing::warn!(user = %user.username, error = %e, "Bulk add rejected");
        return NoticePayload::from_error(&e);
    }

    let field_id = form.field_id();
    match state
        .appender
        .append_options(field_id, form.options_text())
        .await
    {
        Ok(outcome) => NoticePayload::from_outcome(&outcome),
        Err(e) => {
            tracing::warn!(user = %user.username, field_id, error = %e, "Bulk add rejected");
            NoticePayload::from_error(&e)
        }
    }
}
