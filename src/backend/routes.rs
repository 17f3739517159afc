use axum::{
    routing::{get, put},
    Router,
};
use crate::backend::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/api/expenses/:id",
            get(handlers::get_expense).delete(handlers::delete_expense),
        )
        .route("/api/expenses/:id/distribution", put(handlers::put_distribution))
        .route("/api/expenses/:id/status", put(handlers::put_status))
        .route(
            "/api/budgets",
            get(handlers::list_budgets).put(handlers::put_budget),
        )
        .route("/api/summary/month/:month", get(handlers::month_summary))
        .route("/api/summary/year/:year", get(handlers::year_summary))
}
