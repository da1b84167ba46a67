//! Business logic services

pub mod appointments;
pub mod schedule_blocks;

use std::sync::Arc;

use crate::{
    config::SchedulingConfig,
    error::AppResult,
    models::ReferenceSnapshot,
    repository::{ReferenceData, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub appointments: Arc<appointments::AppointmentsService>,
    pub schedule_blocks: Arc<schedule_blocks::ScheduleBlocksService>,
    pub reference: Arc<dyn ReferenceData>,
}

impl Services {
    /// Create all services over the given repository and warm their caches
    pub async fn new(repository: Repository, scheduling: &SchedulingConfig) -> AppResult<Self> {
        let reference: Arc<dyn ReferenceData> = Arc::new(repository.reference.clone());

        let appointments = appointments::AppointmentsService::new(
            Arc::new(repository.appointments.clone()),
            reference.clone(),
        );
        let schedule_blocks = schedule_blocks::ScheduleBlocksService::new(
            Arc::new(repository.schedule_blocks.clone()),
            reference.clone(),
            scheduling.reject_overlapping_blocks,
        );

        let loaded = appointments.refresh().await?.len();
        let blocks = schedule_blocks.refresh().await?.len();
        tracing::info!("Loaded {} appointments and {} schedule blocks", loaded, blocks);

        Ok(Self {
            appointments: Arc::new(appointments),
            schedule_blocks: Arc::new(schedule_blocks),
            reference,
        })
    }
}

/// Load every active reference list concurrently
pub async fn load_reference(reference: &dyn ReferenceData) -> AppResult<ReferenceSnapshot> {
    let (barbers, services, packages, clients) = tokio::try_join!(
        reference.barbers(),
        reference.services(),
        reference.packages(),
        reference.clients(),
    )?;

    Ok(ReferenceSnapshot {
        barbers,
        services,
        packages,
        clients,
    })
}
