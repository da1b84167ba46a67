//! Barber schedule blocks repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::ScheduleBlockStore;
use crate::{
    error::{AppError, AppResult},
    models::{schedule_block::ScheduleBlockRow, ScheduleBlock},
};

#[derive(Clone)]
pub struct ScheduleBlocksRepository {
    pool: Pool<Postgres>,
}

impl ScheduleBlocksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, barber_id: Option<i32>) -> AppResult<Vec<ScheduleBlock>> {
        let rows = match barber_id {
            Some(barber_id) => {
                sqlx::query_as::<_, ScheduleBlockRow>(
                    r#"
                    SELECT id, barber_id, day_of_week, start_time, end_time, active
                    FROM barber_schedules
                    WHERE barber_id = $1
                    ORDER BY day_of_week, start_time
                    "#,
                )
                .bind(barber_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ScheduleBlockRow>(
                    r#"
                    SELECT id, barber_id, day_of_week, start_time, end_time, active
                    FROM barber_schedules
                    ORDER BY barber_id, day_of_week, start_time
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| match ScheduleBlock::try_from(row) {
                Ok(block) => Some(block),
                Err(e) => {
                    tracing::warn!("Skipping malformed schedule block row: {}", e);
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl ScheduleBlockStore for ScheduleBlocksRepository {
    async fn list(&self) -> AppResult<Vec<ScheduleBlock>> {
        self.fetch_rows(None).await
    }

    async fn list_by_barber(&self, barber_id: i32) -> AppResult<Vec<ScheduleBlock>> {
        self.fetch_rows(Some(barber_id)).await
    }

    async fn create(&self, block: &ScheduleBlock) -> AppResult<ScheduleBlock> {
        let row = sqlx::query_as::<_, ScheduleBlockRow>(
            r#"
            INSERT INTO barber_schedules (barber_id, day_of_week, start_time, end_time, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, barber_id, day_of_week, start_time, end_time, active
            "#,
        )
        .bind(block.barber_id)
        .bind(i16::from(block.weekday))
        .bind(block.start_time)
        .bind(block.end_time)
        .bind(block.active)
        .fetch_one(&self.pool)
        .await?;
        ScheduleBlock::try_from(row)
    }

    async fn update(&self, id: i32, block: &ScheduleBlock) -> AppResult<ScheduleBlock> {
        sqlx::query_as::<_, ScheduleBlockRow>(
            r#"
            UPDATE barber_schedules SET
                barber_id = $1, day_of_week = $2, start_time = $3, end_time = $4,
                active = $5, modif_date = $6
            WHERE id = $7
            RETURNING id, barber_id, day_of_week, start_time, end_time, active
            "#,
        )
        .bind(block.barber_id)
        .bind(i16::from(block.weekday))
        .bind(block.start_time)
        .bind(block.end_time)
        .bind(block.active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Schedule block {} not found", id)))
        .and_then(ScheduleBlock::try_from)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM barber_schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule block {} not found", id)));
        }
        Ok(())
    }

    async fn set_active(&self, id: i32, active: bool) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE barber_schedules SET active = $1, modif_date = $2 WHERE id = $3",
        )
        .bind(active)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule block {} not found", id)));
        }
        Ok(())
    }
}
