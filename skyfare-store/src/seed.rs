//! Sample flight schedule for local development.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use skyfare_core::{CoreError, CoreResult, Flight, NewFlight};

pub struct SeedAirline {
    pub name: &'static str,
    pub code: &'static str,
}

pub struct SeedRoute {
    pub from: &'static str,
    pub to: &'static str,
    pub base_price: f64,
    pub block_minutes: i64,
}

pub const AIRLINES: [SeedAirline; 5] = [
    SeedAirline { name: "Indigo", code: "6E" },
    SeedAirline { name: "Air Asia", code: "I5" },
    SeedAirline { name: "Vistara", code: "UK" },
    SeedAirline { name: "Air India", code: "AI" },
    SeedAirline { name: "SpiceJet", code: "SG" },
];

pub const ROUTES: [SeedRoute; 3] = [
    SeedRoute { from: "Delhi", to: "Jaipur", base_price: 1500.0, block_minutes: 55 },
    SeedRoute { from: "Mumbai", to: "Delhi", base_price: 2500.0, block_minutes: 120 },
    SeedRoute { from: "Bangalore", to: "Mumbai", base_price: 2200.0, block_minutes: 105 },
];

fn flight_number<R: Rng>(rng: &mut R, code: &str) -> String {
    format!("{}{}", code, rng.gen_range(1000..10000))
}

/// Base price give or take 15%, rounded to whole units.
fn vary_price<R: Rng>(rng: &mut R, base: f64) -> f64 {
    let spread = base * 0.3;
    (base + rng.gen_range(-spread / 2.0..=spread / 2.0)).round()
}

/// Two or three departures per airline and route on `date`, between 06:00
/// and 20:59 UTC.
pub fn flights_for_date<R: Rng>(rng: &mut R, date: NaiveDate, now: DateTime<Utc>) -> CoreResult<Vec<Flight>> {
    // arrivals may spill into the next day
    if date.succ_opt().is_none() {
        return Err(out_of_range());
    }
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let mut flights = Vec::new();

    for route in &ROUTES {
        for airline in &AIRLINES {
            let count = rng.gen_range(2..=3);
            for _ in 0..count {
                let departure = midnight
                    + Duration::hours(rng.gen_range(6..21))
                    + Duration::minutes(rng.gen_range(0..60));
                let record = NewFlight {
                    airline: Some(airline.name.to_string()),
                    flight_number: Some(flight_number(rng, airline.code)),
                    departure_airport: Some(route.from.to_string()),
                    arrival_airport: Some(route.to.to_string()),
                    departure_time: Some(departure),
                    arrival_time: Some(departure + Duration::minutes(route.block_minutes)),
                    price: Some(vary_price(rng, route.base_price)),
                    currency: Some("INR".to_string()),
                };
                flights.push(record.into_flight(now)?);
            }
        }
    }

    Ok(flights)
}

/// Schedule for `start` and the following `days - 1` days.
fn out_of_range() -> CoreError {
    CoreError::Validation("Seed dates run past the supported calendar range".to_string())
}

pub fn generate<R: Rng>(rng: &mut R, start: NaiveDate, days: u32) -> CoreResult<Vec<Flight>> {
    let now = Utc::now();
    let mut flights = Vec::new();
    for offset in 0..days {
        let date = start
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(out_of_range)?;
        flights.extend(flights_for_date(rng, date, now)?);
    }
    Ok(flights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use chrono::Timelike;

    #[test]
    fn test_generated_flights_are_consistent() {
        let mut rng = StdRng::seed_from_u64(7);
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let flights = flights_for_date(&mut rng, date, Utc::now()).unwrap();

        // 3 routes x 5 airlines x 2..=3 departures
        assert!(flights.len() >= 30 && flights.len() <= 45);
        for f in &flights {
            assert_eq!(f.departure_time.date_naive(), date);
            assert!((6..=20).contains(&f.departure_time.hour()));
            assert_eq!(f.currency, skyfare_core::Currency::INR);
            assert_eq!(f.flight_number.len(), 6);
        }
    }

    #[test]
    fn test_durations_follow_route_block_time() {
        let mut rng = StdRng::seed_from_u64(11);
        let flights = flights_for_date(&mut rng, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), Utc::now()).unwrap();
        for f in &flights {
            let expected = match f.departure_airport.as_str() {
                "Delhi" => "0h 55m",
                "Mumbai" => "2h 0m",
                "Bangalore" => "1h 45m",
                other => panic!("unexpected route origin {other}"),
            };
            assert_eq!(f.duration, expected);
        }
    }

    #[test]
    fn test_prices_stay_within_spread() {
        let mut rng = StdRng::seed_from_u64(3);
        let flights = generate(&mut rng, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 3).unwrap();
        for f in &flights {
            let base = ROUTES.iter().find(|r| r.from == f.departure_airport).unwrap().base_price;
            assert!(f.price >= (base * 0.85).floor() && f.price <= (base * 1.15).ceil());
        }
        let days: std::collections::HashSet<_> = flights.iter().map(|f| f.departure_time.date_naive()).collect();
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn test_generate_rejects_days_past_calendar_end() {
        let mut rng = StdRng::seed_from_u64(5);
        let start = NaiveDate::MAX.pred_opt().unwrap();
        let err = generate(&mut rng, start, u32::MAX).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = flights_for_date(&mut rng, NaiveDate::MAX, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
