use axum::{
    routing::{get, post},
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tracing::info;

use crate::board::{Board, LoadState};
use crate::error::AppError;
use crate::api::models::{InvoiceListResponse, RawJsonResponse, ReloadResponse, TravelResponse};
use crate::api::response;
use crate::normalizer::pretty_json;
use crate::pages::{render_invoices_page, render_travel_page};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/invoices") }))
        .route("/health", get(|| async { "ok" }))
        .route("/invoices", get(invoices_page))
        .route("/travel", get(travel_page))
        .route("/api/invoices", get(invoices_handler))
        .route("/api/invoices/reload", post(reload_invoices))
        .route("/api/invoices/:index/json", get(invoice_json_handler))
        .route("/api/travel", get(travel_handler))
        .route("/api/travel/reload", post(reload_travel))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn invoices_page(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.invoices.snapshot().await;
    Html(render_invoices_page(&snapshot, &state.config))
}

async fn travel_page(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.travel.snapshot().await;
    Html(render_travel_page(&snapshot, &state.config))
}

async fn invoices_handler(State(state): State<AppState>) -> Response {
    match state.invoices.snapshot().await {
        LoadState::Loading => response::loading::<InvoiceListResponse>().into_response(),
        LoadState::Failed { message } => {
            response::error::<InvoiceListResponse>(StatusCode::BAD_GATEWAY, message).into_response()
        }
        LoadState::Ready { data, fetched_at } => response::success(InvoiceListResponse {
            count: data.len(),
            invoices: data,
            fetched_at,
        })
        .into_response(),
    }
}

async fn travel_handler(State(state): State<AppState>) -> Response {
    match state.travel.snapshot().await {
        LoadState::Loading => response::loading::<TravelResponse>().into_response(),
        LoadState::Failed { message } => {
            response::error::<TravelResponse>(StatusCode::BAD_GATEWAY, message).into_response()
        }
        LoadState::Ready { data, fetched_at } => response::success(TravelResponse {
            voyages: data.voyages,
            country_info: data.country_info,
            fetched_at,
        })
        .into_response(),
    }
}

async fn invoice_json_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Response {
    let LoadState::Ready { data, .. } = state.invoices.snapshot().await else {
        return AppError::NotFound("invoices are not loaded".to_string()).into_response();
    };

    match data.get(index) {
        Some(invoice) => response::success(RawJsonResponse {
            index,
            number: invoice.parsed.number.clone(),
            json: pretty_json(&invoice.original_json),
        })
        .into_response(),
        None => AppError::NotFound(format!("no invoice at index {}", index)).into_response(),
    }
}

async fn reload_invoices(State(state): State<AppState>) -> Response {
    reload(&state.invoices)
}

async fn reload_travel(State(state): State<AppState>) -> Response {
    reload(&state.travel)
}

fn reload<T>(board: &Board<T>) -> Response
where
    T: Clone + Send + Sync + 'static,
{
    let started = board.spawn_refresh();
    info!(board = board.name(), started, "reload requested");

    if started {
        response::accepted(ReloadResponse {
            board: board.name().to_string(),
            started,
        })
        .into_response()
    } else {
        response::error::<ReloadResponse>(
            StatusCode::CONFLICT,
            format!("a fetch of the {} webhook is already in flight", board.name()),
        )
        .into_response()
    }
}
