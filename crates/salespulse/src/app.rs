use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        analytics::{
            categories, clear_cache, data, payment_methods, profit_margin, sales_by_category,
            sales_by_gender, summary, timeseries,
        },
        events::events_sse,
        forecast::predict,
        health::{healthz, livez, root},
        sales::create_sales,
        training::{train_forecast, training_status},
        ws::ws_handler,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // API routes with CORS
    let api_routes = Router::new()
        // Sales data
        .route("/data", get(data))
        .route("/sales", post(create_sales))
        // Aggregates
        .route("/summary", get(summary))
        .route("/sales_by_category", get(sales_by_category))
        .route("/sales_by_gender", get(sales_by_gender))
        .route("/payment_methods", get(payment_methods))
        .route("/profit_margin", get(profit_margin))
        .route("/categories", get(categories))
        .route("/timeseries", get(timeseries))
        // Forecasting
        .route("/train_forecast", post(train_forecast))
        .route("/training", get(training_status))
        .route("/predict", get(predict))
        // Cache
        .route("/clear_cache", post(clear_cache))
        .layer(cors);

    // Main application router
    Router::new()
        .route("/", get(root))
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .route("/events", get(events_sse))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
