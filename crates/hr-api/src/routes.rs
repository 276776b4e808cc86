//! API routes

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{
    action_reports, announcements, auth, budget_requests, complaints, integration, messages,
    suggestions, uploads,
};

/// Headroom on top of the file size for multipart framing
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the complete router: `/api` plus stored file downloads under `/uploads`
pub fn router(state: AppState) -> Router {
    let upload_limit = state.services.uploads.max_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .nest("/api", api_router(upload_limit))
        .route("/uploads/*key", get(uploads::download))
        .with_state(state)
}

fn api_router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_router())
        .nest("/authenticator", authenticator_router())
        .nest("/complaints", complaints_router())
        .nest("/suggestions", suggestions_router())
        .nest("/budget-requests", budget_requests_router())
        .nest("/messages", messages_router())
        .nest("/announcements", announcements_router())
        .route(
            "/action-reports",
            get(action_reports::list_action_reports).post(action_reports::create_action_report),
        )
        .route(
            "/uploads/:kind",
            post(uploads::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest("/integration", integration_router())
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/profile", put(auth::update_profile))
        .route("/users", get(auth::list_users))
        .route("/users/:id/role", patch(auth::set_role))
}

fn authenticator_router() -> Router<AppState> {
    Router::new()
        .route("/send-code", post(auth::send_code))
        .route("/verify-code", post(auth::verify_code))
}

fn complaints_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(complaints::list_complaints).post(complaints::create_complaint),
        )
        .route(
            "/:id",
            get(complaints::get_complaint).delete(complaints::delete_complaint),
        )
        .route("/:id/status", patch(complaints::update_complaint_status))
}

fn suggestions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(suggestions::list_suggestions).post(suggestions::create_suggestion),
        )
        .route("/:id", get(suggestions::get_suggestion))
        .route("/:id/review", patch(suggestions::review_suggestion))
}

fn budget_requests_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(budget_requests::list_budget_requests)
                .post(budget_requests::create_budget_request),
        )
        .route("/:id", get(budget_requests::get_budget_request))
        .route("/:id/submit", post(budget_requests::submit_budget_request))
        .route("/:id/decision", patch(budget_requests::decide_budget_request))
}

fn messages_router() -> Router<AppState> {
    Router::new()
        .route("/", post(messages::send_message))
        .route("/inbox", get(messages::inbox))
        .route("/unread-count", get(messages::unread_count))
        .route("/conversation/:user_id", get(messages::conversation))
        .route("/:id/read", patch(messages::mark_read))
}

fn announcements_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/:id",
            get(announcements::get_announcement).delete(announcements::delete_announcement),
        )
        .route("/:id/like", post(announcements::toggle_like))
        .route("/:id/comments", post(announcements::add_comment))
}

fn integration_router() -> Router<AppState> {
    Router::new()
        .route("/employees", get(integration::list_employees))
        .route("/top-employees", get(integration::top_employees))
        .route("/attendance/sync", post(integration::sync_attendance))
        .route("/training", get(integration::training_records))
        .route("/violations", get(integration::violations))
}
