//! Appointments repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::AppointmentStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::AppointmentRow, Appointment, AppointmentStatus, NewAppointment,
    },
};

/// Appointment joined with its display names
const SELECT_APPOINTMENTS: &str = r#"
    SELECT a.id,
           a.client_id, c.name AS client_name, c.phone AS client_phone,
           a.barber_id, b.name AS barber_name,
           a.service_id, s.name AS service_name,
           a.package_id, p.name AS package_name,
           a.appointment_date, a.appointment_time,
           a.duration_minutes, a.price, a.status, a.notes
    FROM appointments a
    LEFT JOIN clients c ON c.id = a.client_id
    LEFT JOIN barbers b ON b.id = a.barber_id
    LEFT JOIN services s ON s.id = a.service_id
    LEFT JOIN packages p ON p.id = a.package_id
"#;

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get appointment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Appointment> {
        let query = format!("{} WHERE a.id = $1", SELECT_APPOINTMENTS);
        let row = sqlx::query_as::<_, AppointmentRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;
        Appointment::try_from(row)
    }
}

#[async_trait]
impl AppointmentStore for AppointmentsRepository {
    /// List all appointments; rows that cannot be normalized are skipped
    async fn list(&self) -> AppResult<Vec<Appointment>> {
        let query = format!(
            "{} ORDER BY a.appointment_date, a.appointment_time, a.id",
            SELECT_APPOINTMENTS
        );
        let rows = sqlx::query_as::<_, AppointmentRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        let appointments = rows
            .into_iter()
            .filter_map(|row| match Appointment::try_from(row) {
                Ok(a) => Some(a),
                Err(e) => {
                    tracing::warn!("Skipping malformed appointment row: {}", e);
                    None
                }
            })
            .collect();
        Ok(appointments)
    }

    async fn create(&self, data: &NewAppointment) -> AppResult<Appointment> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO appointments (
                client_id, barber_id, service_id, package_id,
                appointment_date, appointment_time, duration_minutes,
                price, status, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(data.client_id)
        .bind(data.barber_id)
        .bind(data.offering.service_id())
        .bind(data.offering.package_id())
        .bind(data.date)
        .bind(data.time)
        .bind(data.duration_minutes)
        .bind(data.price)
        .bind(data.status.as_str())
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    async fn update(&self, id: i32, data: &NewAppointment) -> AppResult<Appointment> {
        let result = sqlx::query(
            r#"
            UPDATE appointments SET
                client_id = $1, barber_id = $2, service_id = $3, package_id = $4,
                appointment_date = $5, appointment_time = $6, duration_minutes = $7,
                price = $8, status = $9, notes = $10, modif_date = $11
            WHERE id = $12
            "#,
        )
        .bind(data.client_id)
        .bind(data.barber_id)
        .bind(data.offering.service_id())
        .bind(data.offering.package_id())
        .bind(data.date)
        .bind(data.time)
        .bind(data.duration_minutes)
        .bind(data.price)
        .bind(data.status.as_str())
        .bind(&data.notes)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    async fn set_status(&self, id: i32, status: AppointmentStatus) -> AppResult<Appointment> {
        let result = sqlx::query(
            "UPDATE appointments SET status = $1, modif_date = $2 WHERE id = $3",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        self.get_by_id(id).await
    }
}
