use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::Session;
use crate::repository::FlightRepository;
use crate::search::FlightSearchQuery;
use crate::{CoreError, CoreResult};

// ============================================================================
// Currency
// ============================================================================

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    INR,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CAD,
        Currency::AUD,
        Currency::INR,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::INR => "INR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unsupported currency '{}', expected one of USD, EUR, GBP, JPY, CAD, AUD, INR",
                    s
                ))
            })
    }
}

// ============================================================================
// Flight
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: Uuid,
    pub airline: String,
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
    pub currency: Currency,
    pub duration: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Renders the block time between two instants as `"Xh Ym"`.
///
/// Whole hours first, then the remaining whole minutes; seconds are dropped.
pub fn format_duration(departure: DateTime<Utc>, arrival: DateTime<Utc>) -> String {
    let minutes = (arrival - departure).num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Body of a flight write. Every field is optional on the wire so that a
/// missing one comes back as a 400 with a readable message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlight {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub currency: Option<String>,
}

fn required_text(value: Option<String>, label: &str) -> CoreResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CoreError::Validation(format!("{} is required", label))),
    }
}

impl NewFlight {
    /// Validates the record and builds a [`Flight`] with a fresh id and a
    /// duration derived from the two timestamps.
    pub fn into_flight(self, now: DateTime<Utc>) -> CoreResult<Flight> {
        let airline = required_text(self.airline, "Airline name")?;
        let flight_number = required_text(self.flight_number, "Flight number")?;
        let departure_airport = required_text(self.departure_airport, "Departure airport")?;
        let arrival_airport = required_text(self.arrival_airport, "Arrival airport")?;
        let departure_time = self
            .departure_time
            .ok_or_else(|| CoreError::Validation("Departure time is required".to_string()))?;
        let arrival_time = self
            .arrival_time
            .ok_or_else(|| CoreError::Validation("Arrival time is required".to_string()))?;
        let price = self
            .price
            .ok_or_else(|| CoreError::Validation("Price is required".to_string()))?;

        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::Validation("Price cannot be negative".to_string()));
        }
        if arrival_time < departure_time {
            return Err(CoreError::Validation(
                "Arrival time cannot be before departure time".to_string(),
            ));
        }

        let currency = match self.currency.as_deref() {
            Some(code) => code.parse()?,
            None => Currency::default(),
        };

        Ok(Flight {
            id: Uuid::new_v4(),
            airline,
            flight_number,
            departure_airport,
            arrival_airport,
            departure_time,
            arrival_time,
            price,
            currency,
            duration: format_duration(departure_time, arrival_time),
            created_at: now,
            updated_at: now,
        })
    }
}

// ============================================================================
// Flight Service
// ============================================================================

#[derive(Clone)]
pub struct FlightService {
    flights: Arc<dyn FlightRepository>,
}

impl FlightService {
    pub fn new(flights: Arc<dyn FlightRepository>) -> Self {
        Self { flights }
    }

    /// Prefix match on both airports, departure inside the UTC day, cheapest
    /// first. `passengers` rides along but filters nothing.
    pub async fn search_flights(&self, query: &FlightSearchQuery) -> CoreResult<Vec<Flight>> {
        let flights = self.flights.search(query).await?;
        info!(
            "Search {} -> {} on {} ({} pax): {} flights",
            query.from,
            query.to,
            query.date,
            query.passengers,
            flights.len()
        );
        Ok(flights)
    }

    pub async fn get_flight_by_id(&self, id: &str) -> CoreResult<Flight> {
        let not_found = || CoreError::NotFound("Flight not found".to_string());
        let id = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;
        self.flights.find_by_id(id).await?.ok_or_else(not_found)
    }

    pub async fn create_flight(&self, session: &Session, record: NewFlight) -> CoreResult<Flight> {
        let flight = record.into_flight(Utc::now())?;
        self.flights.insert(&flight).await?;
        info!(
            "Flight {} {} created by user {}",
            flight.airline, flight.flight_number, session.user_id
        );
        Ok(flight)
    }
}
