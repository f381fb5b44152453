// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_middleware};

/// Monta o app completo: rotas protegidas por JWT, health e Swagger públicos.
pub fn build_app(app_state: AppState) -> Router {
    let bill_routes = Router::new()
        .route("/estimate", get(handlers::billing::estimate_bill))
        .route(
            "/",
            post(handlers::billing::create_bill).get(handlers::billing::list_bills),
        )
        .route(
            "/{id}",
            get(handlers::billing::get_bill)
                .put(handlers::billing::update_bill)
                .delete(handlers::billing::delete_bill),
        )
        .route("/{id}/refresh", post(handlers::billing::refresh_bill))
        .route("/{id}/payments", get(handlers::billing::list_payments));

    let delivery_routes = Router::new()
        .route(
            "/daily",
            get(handlers::attendance::get_daily_deliveries)
                .put(handlers::attendance::update_daily_deliveries),
        )
        .route(
            "/month",
            get(handlers::attendance::get_month_deliveries)
                .put(handlers::attendance::update_month_deliveries),
        )
        .route("/addons", post(handlers::attendance::add_delivery_addon));

    let staff_routes = Router::new()
        .route(
            "/",
            post(handlers::staff::create_staff).get(handlers::staff::list_staff),
        )
        .route(
            "/attendance/daily",
            get(handlers::attendance::get_daily_attendance)
                .put(handlers::attendance::update_daily_attendance),
        )
        .route(
            "/attendance/month",
            get(handlers::attendance::get_month_attendance)
                .put(handlers::attendance::update_month_attendance),
        );

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route("/{id}", get(handlers::customers::get_customer))
        .route("/{id}/status", patch(handlers::customers::update_customer_status));

    // Tudo aqui exige "Authorization: Bearer <jwt>"
    let protected = Router::new()
        .nest("/bills", bill_routes)
        .nest("/deliveries", delivery_routes)
        .nest("/staff", staff_routes)
        .nest("/customers", customer_routes)
        .route(
            "/plans",
            post(handlers::customers::create_plan).get(handlers::customers::list_plans),
        )
        .route(
            "/expenses",
            post(handlers::staff::create_expense).get(handlers::staff::list_expenses),
        )
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
