use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use skyfare_core::search::SearchParams;
use skyfare_core::{Flight, FlightSearchQuery, NewFlight, Session};

use crate::{error::AppError, state::AppState};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/flights/search", get(search_flights))
        .route("/flights/{id}", get(get_flight))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/flights", post(create_flight))
}

async fn search_flights(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, AppError>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let query = FlightSearchQuery::from_params(&params)?;
    Ok(Json(state.flights.search_flights(&query).await?))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(state.flights.get_flight_by_id(&id).await?))
}

async fn create_flight(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    WithRejection(Json(record), _): WithRejection<Json<NewFlight>, AppError>,
) -> Result<(StatusCode, Json<Flight>), AppError> {
    let flight = state.flights.create_flight(&session, record).await?;
    Ok((StatusCode::CREATED, Json(flight)))
}
