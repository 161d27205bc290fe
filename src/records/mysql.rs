//! MySQL record store implementation

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::{error, instrument};

use super::{
    generate_flight_code, Airline, AirlineDraft, Airport, AirportDraft, Flight, FlightDraft,
    FlightStore, StoreError,
};

/// MySQL implementation of FlightStore
#[derive(Debug, Clone)]
pub struct MySqlFlightStore {
    pool: MySqlPool,
}

impl MySqlFlightStore {
    /// Create a store with the given connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Connect a pool of up to ten connections
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    async fn soft_delete(&self, sql: &str, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, id, "Soft delete failed");
                StoreError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FlightStore for MySqlFlightStore {
    fn name(&self) -> &'static str {
        "mysql"
    }

    #[instrument(skip(self))]
    async fn active_flights(&self) -> Result<Vec<Flight>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id_vuelo, codigo_vuelo, id_aerolinea, id_aeropuerto_origen,
                   id_aeropuerto_destino, fecha_salida, hora_salida,
                   fecha_llegada, hora_llegada, estado_vuelo
            FROM vuelos
            WHERE activo = TRUE
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load flights");
            StoreError::from(e)
        })?;

        rows.iter().map(row_to_flight).collect()
    }

    #[instrument(skip(self))]
    async fn flight(&self, id: i64) -> Result<Option<Flight>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id_vuelo, codigo_vuelo, id_aerolinea, id_aeropuerto_origen,
                   id_aeropuerto_destino, fecha_salida, hora_salida,
                   fecha_llegada, hora_llegada, estado_vuelo
            FROM vuelos
            WHERE id_vuelo = ? AND activo = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to load flight");
            StoreError::from(e)
        })?;

        row.as_ref().map(row_to_flight).transpose()
    }

    #[instrument(skip(self, draft))]
    async fn create_flight(&self, draft: FlightDraft) -> Result<Flight, StoreError> {
        let code = generate_flight_code();
        let result = sqlx::query(
            r#"
            INSERT INTO vuelos (codigo_vuelo, id_aerolinea, id_aeropuerto_origen,
                                id_aeropuerto_destino, fecha_salida, hora_salida,
                                fecha_llegada, hora_llegada, estado_vuelo, activo)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(&code)
        .bind(draft.airline_id)
        .bind(draft.origin_airport_id)
        .bind(draft.destination_airport_id)
        .bind(draft.departure_date)
        .bind(draft.departure_time)
        .bind(draft.arrival_date)
        .bind(draft.arrival_time)
        .bind(&draft.status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create flight");
            StoreError::from(e)
        })?;

        Ok(draft.into_flight(result.last_insert_id() as i64, code))
    }

    #[instrument(skip(self, draft))]
    async fn update_flight(&self, id: i64, draft: FlightDraft) -> Result<Option<Flight>, StoreError> {
        sqlx::query(
            r#"
            UPDATE vuelos
            SET id_aerolinea = ?, id_aeropuerto_origen = ?, id_aeropuerto_destino = ?,
                fecha_salida = ?, hora_salida = ?, fecha_llegada = ?, hora_llegada = ?,
                estado_vuelo = ?
            WHERE id_vuelo = ? AND activo = TRUE
            "#,
        )
        .bind(draft.airline_id)
        .bind(draft.origin_airport_id)
        .bind(draft.destination_airport_id)
        .bind(draft.departure_date)
        .bind(draft.departure_time)
        .bind(draft.arrival_date)
        .bind(draft.arrival_time)
        .bind(&draft.status)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to update flight");
            StoreError::from(e)
        })?;

        // rows_affected is 0 for an unchanged row, so re-read instead
        self.flight(id).await
    }

    #[instrument(skip(self, draft))]
    async fn create_airline(&self, draft: AirlineDraft) -> Result<Airline, StoreError> {
        let result = sqlx::query(
            "INSERT INTO aerolineas (nombre_aerolinea, codigo_aerolinea, activo) VALUES (?, ?, TRUE)",
        )
        .bind(&draft.name)
        .bind(&draft.code)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create airline");
            StoreError::from(e)
        })?;

        Ok(Airline {
            id: result.last_insert_id() as i64,
            name: draft.name,
            code: draft.code,
        })
    }

    #[instrument(skip(self, draft))]
    async fn create_airport(&self, draft: AirportDraft) -> Result<Airport, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO aeropuertos (nombre_aeropuerto, codigo_iata, ciudad, pais, activo)
            VALUES (?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.iata_code)
        .bind(&draft.city)
        .bind(&draft.country)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create airport");
            StoreError::from(e)
        })?;

        Ok(Airport {
            id: result.last_insert_id() as i64,
            name: draft.name,
            iata_code: draft.iata_code,
            city: draft.city,
            country: draft.country,
        })
    }

    #[instrument(skip(self))]
    async fn active_airlines(&self) -> Result<Vec<Airline>, StoreError> {
        let rows = sqlx::query(
            "SELECT id_aerolinea, nombre_aerolinea, codigo_aerolinea FROM aerolineas WHERE activo = TRUE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load airlines");
            StoreError::from(e)
        })?;

        rows.iter().map(row_to_airline).collect()
    }

    #[instrument(skip(self))]
    async fn active_airports(&self) -> Result<Vec<Airport>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id_aeropuerto, nombre_aeropuerto, codigo_iata, ciudad, pais
            FROM aeropuertos
            WHERE activo = TRUE
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load airports");
            StoreError::from(e)
        })?;

        rows.iter().map(row_to_airport).collect()
    }

    #[instrument(skip(self))]
    async fn deactivate_flight(&self, id: i64) -> Result<bool, StoreError> {
        self.soft_delete(
            "UPDATE vuelos SET activo = FALSE WHERE id_vuelo = ? AND activo = TRUE",
            id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn deactivate_airline(&self, id: i64) -> Result<bool, StoreError> {
        self.soft_delete(
            "UPDATE aerolineas SET activo = FALSE WHERE id_aerolinea = ? AND activo = TRUE",
            id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn deactivate_airport(&self, id: i64) -> Result<bool, StoreError> {
        self.soft_delete(
            "UPDATE aeropuertos SET activo = FALSE WHERE id_aeropuerto = ? AND activo = TRUE",
            id,
        )
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_flight(row: &MySqlRow) -> Result<Flight, StoreError> {
    Ok(Flight {
        id: row.try_get("id_vuelo")?,
        code: row.try_get("codigo_vuelo")?,
        airline_id: row.try_get("id_aerolinea")?,
        origin_airport_id: row.try_get("id_aeropuerto_origen")?,
        destination_airport_id: row.try_get("id_aeropuerto_destino")?,
        departure_date: row.try_get("fecha_salida")?,
        departure_time: row.try_get("hora_salida")?,
        arrival_date: row.try_get("fecha_llegada")?,
        arrival_time: row.try_get("hora_llegada")?,
        status: row.try_get("estado_vuelo")?,
    })
}

fn row_to_airline(row: &MySqlRow) -> Result<Airline, StoreError> {
    Ok(Airline {
        id: row.try_get("id_aerolinea")?,
        name: row.try_get("nombre_aerolinea")?,
        code: row.try_get("codigo_aerolinea")?,
    })
}

fn row_to_airport(row: &MySqlRow) -> Result<Airport, StoreError> {
    Ok(Airport {
        id: row.try_get("id_aeropuerto")?,
        name: row.try_get("nombre_aeropuerto")?,
        iata_code: row.try_get("codigo_iata")?,
        city: row.try_get("ciudad")?,
        country: row.try_get("pais")?,
    })
}
