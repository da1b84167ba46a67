//! Persistence collaborators.
//!
//! The services only see the `AppointmentStore`, `ScheduleBlockStore` and
//! `ReferenceData` traits. `Repository` bundles the PostgreSQL
//! implementations used by the server binary.

pub mod appointments;
pub mod reference;
pub mod schedule_blocks;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        Appointment, AppointmentStatus, Barber, Client, NewAppointment, Package, ScheduleBlock,
        Service,
    },
};

/// Appointment records owned by the persistence layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Appointment>>;

    /// Insert and return the stored record with its assigned id
    async fn create(&self, data: &NewAppointment) -> AppResult<Appointment>;

    async fn update(&self, id: i32, data: &NewAppointment) -> AppResult<Appointment>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Set the status and return the stored record
    async fn set_status(&self, id: i32, status: AppointmentStatus) -> AppResult<Appointment>;
}

/// Barber weekly availability blocks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleBlockStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<ScheduleBlock>>;

    async fn list_by_barber(&self, barber_id: i32) -> AppResult<Vec<ScheduleBlock>>;

    /// Insert a draft block and return it with its assigned id
    async fn create(&self, block: &ScheduleBlock) -> AppResult<ScheduleBlock>;

    async fn update(&self, id: i32, block: &ScheduleBlock) -> AppResult<ScheduleBlock>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn set_active(&self, id: i32, active: bool) -> AppResult<()>;
}

/// Active reference lists
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceData: Send + Sync {
    async fn barbers(&self) -> AppResult<Vec<Barber>>;
    async fn services(&self) -> AppResult<Vec<Service>>;
    async fn packages(&self) -> AppResult<Vec<Package>>;
    async fn clients(&self) -> AppResult<Vec<Client>>;
}

/// PostgreSQL-backed collaborators sharing one pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub appointments: appointments::AppointmentsRepository,
    pub schedule_blocks: schedule_blocks::ScheduleBlocksRepository,
    pub reference: reference::ReferenceRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            appointments: appointments::AppointmentsRepository::new(pool.clone()),
            schedule_blocks: schedule_blocks::ScheduleBlocksRepository::new(pool.clone()),
            reference: reference::ReferenceRepository::new(pool.clone()),
            pool,
        }
    }
}
