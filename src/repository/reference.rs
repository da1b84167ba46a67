//! Reference data repository (active barbers, services, packages, clients)

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::ReferenceData;
use crate::{
    error::AppResult,
    models::{Barber, Client, Package, Service},
};

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: Pool<Postgres>,
}

impl ReferenceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceData for ReferenceRepository {
    async fn barbers(&self) -> AppResult<Vec<Barber>> {
        let rows = sqlx::query_as::<_, Barber>(
            "SELECT id, name, active FROM barbers WHERE active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn services(&self) -> AppResult<Vec<Service>> {
        let rows = sqlx::query_as::<_, Service>(
            "SELECT id, name, price, duration_minutes, active FROM services WHERE active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn packages(&self) -> AppResult<Vec<Package>> {
        let rows = sqlx::query_as::<_, Package>(
            "SELECT id, name, price, duration_minutes, active FROM packages WHERE active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn clients(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, Client>(
            "SELECT id, name, COALESCE(phone, '') AS phone, active FROM clients WHERE active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
