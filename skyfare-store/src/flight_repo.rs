use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skyfare_core::repository::{FlightRepository, RepoError, RepoResult};
use skyfare_core::{Currency, Flight, FlightSearchQuery};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    airline: String,
    flight_number: String,
    departure_airport: String,
    arrival_airport: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    price: f64,
    currency: String,
    duration: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FlightRow> for Flight {
    type Error = RepoError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        let currency: Currency = row
            .currency
            .parse()
            .map_err(|e: skyfare_core::CoreError| RepoError::backend(e.to_string()))?;
        Ok(Flight {
            id: row.id,
            airline: row.airline,
            flight_number: row.flight_number,
            departure_airport: row.departure_airport,
            arrival_airport: row.arrival_airport,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            price: row.price,
            currency,
            duration: row.duration,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_FLIGHT: &str = r#"
    SELECT id, airline, flight_number, departure_airport, arrival_airport,
           departure_time, arrival_time, price, currency, duration,
           created_at, updated_at
    FROM flights
"#;

const INSERT_FLIGHT: &str = r#"
    INSERT INTO flights (
        id, airline, flight_number, departure_airport, arrival_airport,
        departure_time, arrival_time, price, currency, duration,
        created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
"#;

/// `LIKE` pattern matching values that begin with `prefix`, taken literally.
pub fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn bind_insert<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    flight: &'q Flight,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(flight.id)
        .bind(&flight.airline)
        .bind(&flight.flight_number)
        .bind(&flight.departure_airport)
        .bind(&flight.arrival_airport)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .bind(flight.price)
        .bind(flight.currency.code())
        .bind(&flight.duration)
        .bind(flight.created_at)
        .bind(flight.updated_at)
}

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn insert(&self, flight: &Flight) -> RepoResult<()> {
        bind_insert(sqlx::query(INSERT_FLIGHT), flight)
            .execute(&self.pool)
            .await
            .map_err(RepoError::backend)?;
        Ok(())
    }

    async fn insert_many(&self, flights: &[Flight]) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(RepoError::backend)?;
        for flight in flights {
            bind_insert(sqlx::query(INSERT_FLIGHT), flight)
                .execute(&mut *tx)
                .await
                .map_err(RepoError::backend)?;
        }
        tx.commit().await.map_err(RepoError::backend)?;
        Ok(flights.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Flight>> {
        let sql = format!("{SELECT_FLIGHT} WHERE id = $1");
        let row = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::backend)?;
        row.map(Flight::try_from).transpose()
    }

    async fn search(&self, query: &FlightSearchQuery) -> RepoResult<Vec<Flight>> {
        let (start, end) = query.day_bounds();
        let sql = format!(
            r#"{SELECT_FLIGHT}
            WHERE departure_airport ILIKE $1 ESCAPE '\'
              AND arrival_airport ILIKE $2 ESCAPE '\'
              AND departure_time >= $3
              AND departure_time <= $4
            ORDER BY price ASC"#
        );

        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(prefix_pattern(&query.from))
            .bind(prefix_pattern(&query.to))
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(RepoError::backend)?;

        rows.into_iter().map(Flight::try_from).collect()
    }

    async fn delete_all(&self) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM flights")
            .execute(&self.pool)
            .await
            .map_err(RepoError::backend)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("Del"), "Del%");
        assert_eq!(prefix_pattern("50%_off"), "50\\%\\_off%");
        assert_eq!(prefix_pattern("a\\b"), "a\\\\b%");
        assert_eq!(prefix_pattern(""), "%");
    }
}
