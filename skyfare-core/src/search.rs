use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, Flight};

/// Raw query-string parameters of `GET /flights/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub passengers: Option<String>,
}

/// A validated search. Day boundaries are UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightSearchQuery {
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub passengers: u32,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Searchable years. Keeps day arithmetic and the store's timestamp range safe.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

fn parse_date(raw: &str) -> CoreResult<NaiveDate> {
    let invalid = || CoreError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw));
    let date = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc).date_naive())
            .map_err(|_| invalid())?,
    };
    if !YEAR_RANGE.contains(&date.year()) {
        return Err(invalid());
    }
    Ok(date)
}

impl FlightSearchQuery {
    pub fn new(from: &str, to: &str, date: NaiveDate, passengers: u32) -> Self {
        Self {
            from: from.trim().to_string(),
            to: to.trim().to_string(),
            date,
            passengers,
        }
    }

    pub fn from_params(params: &SearchParams) -> CoreResult<Self> {
        let (from, to, date) = match (
            non_blank(params.from.as_deref()),
            non_blank(params.to.as_deref()),
            non_blank(params.date.as_deref()),
        ) {
            (Some(from), Some(to), Some(date)) => (from, to, date),
            _ => {
                return Err(CoreError::Validation(
                    "From, to, and date are required parameters".to_string(),
                ))
            }
        };

        let passengers = match non_blank(params.passengers.as_deref()) {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(CoreError::Validation(
                        "Passengers must be a positive integer".to_string(),
                    ))
                }
            },
        };

        Ok(Self::new(from, to, parse_date(date)?, passengers))
    }

    /// First and last millisecond of the search day, both inclusive.
    pub fn day_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.date.and_time(chrono::NaiveTime::MIN).and_utc();
        // stays inside the day, so it cannot leave chrono's range
        let end = start + (Duration::days(1) - Duration::milliseconds(1));
        (start, end)
    }

    /// Whether `flight` satisfies this query. Store backends that cannot push
    /// the filter down use this directly.
    pub fn matches(&self, flight: &Flight) -> bool {
        let (start, end) = self.day_bounds();
        starts_with_ignore_case(&flight.departure_airport, &self.from)
            && starts_with_ignore_case(&flight.arrival_airport, &self.to)
            && flight.departure_time >= start
            && flight.departure_time <= end
    }
}

pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewFlight;
    use chrono::TimeZone;

    fn params(from: &str, to: &str, date: &str) -> SearchParams {
        SearchParams {
            from: Some(from.into()),
            to: Some(to.into()),
            date: Some(date.into()),
            passengers: None,
        }
    }

    fn flight(from: &str, to: &str, departure: DateTime<Utc>) -> Flight {
        NewFlight {
            airline: Some("Vistara".into()),
            flight_number: Some("UK1001".into()),
            departure_airport: Some(from.into()),
            arrival_airport: Some(to.into()),
            departure_time: Some(departure),
            arrival_time: Some(departure + Duration::minutes(55)),
            price: Some(1500.0),
            currency: Some("INR".into()),
        }
        .into_flight(Utc::now())
        .unwrap()
    }

    #[test]
    fn test_missing_parameters_are_rejected() {
        let mut p = params("Del", "Jai", "2025-03-14");
        p.to = None;
        let err = FlightSearchQuery::from_params(&p).unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg == "From, to, and date are required parameters"));

        let p = params("  ", "Jai", "2025-03-14");
        assert!(FlightSearchQuery::from_params(&p).is_err());
    }

    #[test]
    fn test_passengers_default_and_validation() {
        let q = FlightSearchQuery::from_params(&params("Del", "Jai", "2025-03-14")).unwrap();
        assert_eq!(q.passengers, 1);

        let mut p = params("Del", "Jai", "2025-03-14");
        p.passengers = Some("3".into());
        assert_eq!(FlightSearchQuery::from_params(&p).unwrap().passengers, 3);

        p.passengers = Some("0".into());
        assert!(FlightSearchQuery::from_params(&p).is_err());
        p.passengers = Some("two".into());
        assert!(FlightSearchQuery::from_params(&p).is_err());
    }

    #[test]
    fn test_date_formats() {
        let q = FlightSearchQuery::from_params(&params("Del", "Jai", "2025-03-14")).unwrap();
        assert_eq!(q.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());

        let q = FlightSearchQuery::from_params(&params("Del", "Jai", "2025-03-14T22:30:00Z")).unwrap();
        assert_eq!(q.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());

        assert!(FlightSearchQuery::from_params(&params("Del", "Jai", "14/03/2025")).is_err());
    }

    #[test]
    fn test_out_of_range_years_are_rejected() {
        for raw in ["+262142-12-31", "+10000-01-01", "0000-06-01", "-0044-03-15"] {
            let err = FlightSearchQuery::from_params(&params("Del", "Jai", raw)).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)), "{raw}");
        }
        assert!(FlightSearchQuery::from_params(&params("Del", "Jai", "9999-12-31")).is_ok());
    }

    #[test]
    fn test_day_bounds_on_last_representable_day() {
        let q = FlightSearchQuery::new("Del", "Jai", NaiveDate::MAX, 1);
        let (start, end) = q.day_bounds();
        assert_eq!(start.date_naive(), NaiveDate::MAX);
        assert_eq!(end.date_naive(), NaiveDate::MAX);
        assert!(!q.matches(&flight("Delhi", "Jaipur", Utc.with_ymd_and_hms(2025, 3, 14, 6, 0, 0).unwrap())));
    }

    #[test]
    fn test_day_bounds_cover_whole_utc_day() {
        let q = FlightSearchQuery::new("Del", "Jai", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), 1);
        let (start, end) = q.day_bounds();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap() - Duration::milliseconds(1));
    }

    #[test]
    fn test_matches_prefix_case_insensitively() {
        let q = FlightSearchQuery::new("del", "JAI", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), 2);
        let at = |h, m| Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap();

        assert!(q.matches(&flight("Delhi", "Jaipur", at(6, 0))));
        assert!(q.matches(&flight("Delhi", "Jaipur", at(23, 59))));
        assert!(q.matches(&flight("Delhi", "Jaipur", at(0, 0))));
        // substring, not prefix
        assert!(!q.matches(&flight("New Delhi", "Jaipur", at(6, 0))));
        assert!(!q.matches(&flight("Delhi", "Udaipur", at(6, 0))));
        // next day
        assert!(!q.matches(&flight(
            "Delhi",
            "Jaipur",
            Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap()
        )));
    }
}
