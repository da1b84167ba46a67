//! Appointment lifecycle service.
//!
//! Keeps an in-memory copy of the appointment collection. Every successful
//! mutation is followed by a full reload from the store. Only when that
//! reload fails is the record returned by the mutation written into the
//! cache directly.

use std::ops::Range;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::load_reference;
use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::CheckedDraft, Appointment, AppointmentDraft, AppointmentStatus,
        NewAppointment, Offering, ReferenceSnapshot, Weekday,
    },
    repository::{AppointmentStore, ReferenceData},
    scheduling::{GridFilter, SlotOccupancy, WeekGrid, WeekWindow},
};

pub struct AppointmentsService {
    store: Arc<dyn AppointmentStore>,
    reference: Arc<dyn ReferenceData>,
    cache: RwLock<Vec<Appointment>>,
}

impl AppointmentsService {
    pub fn new(store: Arc<dyn AppointmentStore>, reference: Arc<dyn ReferenceData>) -> Self {
        Self {
            store,
            reference,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Reload the whole collection. On failure the cache is left as it was.
    pub async fn refresh(&self) -> AppResult<Vec<Appointment>> {
        let appointments = self.store.list().await?;
        *self.cache.write().await = appointments.clone();
        Ok(appointments)
    }

    pub async fn list(&self) -> Vec<Appointment> {
        self.cache.read().await.clone()
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn get(&self, id: i32) -> AppResult<Appointment> {
        self.cache
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Weekly grid for `window`, filtered
    pub async fn week_grid(&self, window: &WeekWindow, filter: GridFilter, hours: Range<u32>) -> WeekGrid {
        tracing::debug!(
            "Building week grid {:?}..{:?} ({:?})",
            window.first_date(),
            window.last_date(),
            filter
        );
        let cache = self.cache.read().await;
        SlotOccupancy::new(window, &cache).with_filter(filter).grid(hours)
    }

    /// Filtered occupants of one (weekday, hour) cell
    pub async fn slot_occupants(
        &self,
        window: &WeekWindow,
        weekday: Weekday,
        hour: u32,
        filter: GridFilter,
    ) -> Vec<Appointment> {
        let cache = self.cache.read().await;
        SlotOccupancy::new(window, &cache)
            .with_filter(filter)
            .occupants_of(weekday, hour)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Book a new appointment.
    ///
    /// Price and duration are copied from the chosen service or package at
    /// this moment; later changes to the offering do not touch the booking.
    pub async fn create(&self, draft: &AppointmentDraft) -> AppResult<Appointment> {
        let checked = self.check(draft)?;
        let reference = load_reference(self.reference.as_ref()).await?;
        let (price, duration_minutes) = resolve_references(&checked, &reference)?;

        if let Some(status) = checked.status.filter(|s| *s != AppointmentStatus::Pendiente) {
            tracing::debug!("New appointments start as Pendiente, ignoring submitted {}", status);
        }

        let data = NewAppointment {
            client_id: checked.client_id,
            barber_id: checked.barber_id,
            offering: checked.offering,
            date: checked.date,
            time: checked.time,
            duration_minutes,
            price,
            status: AppointmentStatus::Pendiente,
            notes: checked.notes,
        };

        let created = self.store.create(&data).await.map_err(|e| {
            tracing::error!("Failed to create appointment: {}", e);
            e
        })?;
        tracing::info!(
            "Created appointment {} for client {} with barber {} on {} {}",
            created.id,
            created.client_id,
            created.barber_id,
            created.date,
            created.time
        );

        Ok(self.reload_with(created).await)
    }

    /// Replace an appointment's fields.
    ///
    /// The stored price/duration snapshot is kept while the service or
    /// package stays the same and is re-derived when it changes. A draft
    /// without a status keeps the current one.
    pub async fn edit(&self, id: i32, draft: &AppointmentDraft) -> AppResult<Appointment> {
        let checked = self.check(draft)?;
        let existing = match self.get(id).await {
            Ok(existing) => existing,
            Err(_) => {
                self.refresh().await?;
                self.get(id).await?
            }
        };

        let reference = load_reference(self.reference.as_ref()).await?;
        let (price, duration_minutes) = if checked.offering == existing.offering {
            resolve_references(&checked, &reference)?;
            (existing.price, existing.duration_minutes)
        } else {
            resolve_references(&checked, &reference)?
        };

        let data = NewAppointment {
            client_id: checked.client_id,
            barber_id: checked.barber_id,
            offering: checked.offering,
            date: checked.date,
            time: checked.time,
            duration_minutes,
            price,
            status: checked.status.unwrap_or(existing.status),
            notes: checked.notes,
        };

        let updated = self.store.update(id, &data).await.map_err(|e| {
            tracing::error!("Failed to update appointment {}: {}", id, e);
            e
        })?;
        tracing::info!("Updated appointment {}", id);

        Ok(self.reload_with(updated).await)
    }

    /// Set the status only; the other fields are not revalidated
    pub async fn change_status(&self, id: i32, status: AppointmentStatus) -> AppResult<Appointment> {
        let stored = self.store.set_status(id, status).await.map_err(|e| {
            tracing::error!("Failed to set status of appointment {}: {}", id, e);
            e
        })?;
        if status.is_terminal() {
            tracing::info!("Appointment {} completed", id);
        } else {
            tracing::info!("Appointment {} is now {}", id, status);
        }

        Ok(self.reload_with(stored).await)
    }

    /// Delete an appointment. Requires explicit confirmation; the cache only
    /// changes once the store has deleted the record.
    pub async fn delete(&self, id: i32, confirmed: bool) -> AppResult<()> {
        if !confirmed {
            tracing::warn!("Refused to delete appointment {} without confirmation", id);
            return Err(AppError::Validation(
                "Deleting an appointment must be confirmed".to_string(),
            ));
        }

        self.store.delete(id).await.map_err(|e| {
            tracing::error!("Failed to delete appointment {}: {}", id, e);
            e
        })?;
        tracing::info!("Deleted appointment {}", id);

        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after deleting appointment {} failed: {}", id, e);
            self.cache.write().await.retain(|a| a.id != id);
        }
        Ok(())
    }

    fn check(&self, draft: &AppointmentDraft) -> AppResult<CheckedDraft> {
        draft.check().map_err(|e| {
            tracing::warn!("Rejected appointment: {}", e);
            e
        })
    }

    /// Reload after a successful mutation and return the fresh copy of
    /// `record`. If the reload fails, `record` replaces its cached entry.
    async fn reload_with(&self, record: Appointment) -> Appointment {
        match self.refresh().await {
            Ok(all) => all.into_iter().find(|a| a.id == record.id).unwrap_or(record),
            Err(e) => {
                tracing::warn!("Reload after changing appointment {} failed: {}", record.id, e);
                let mut cache = self.cache.write().await;
                match cache.iter_mut().find(|a| a.id == record.id) {
                    Some(cached) => *cached = record.clone(),
                    None => cache.push(record.clone()),
                }
                record
            }
        }
    }
}

/// Check that every reference is still active and return the offering's
/// current price and duration.
fn resolve_references(
    checked: &CheckedDraft,
    reference: &ReferenceSnapshot,
) -> AppResult<(Decimal, i32)> {
    if reference.client(checked.client_id).is_none() {
        return Err(stale("client", checked.client_id));
    }
    if reference.barber(checked.barber_id).is_none() {
        return Err(stale("barber", checked.barber_id));
    }

    match checked.offering {
        Offering::Service(id) => reference
            .service(id)
            .map(|s| (s.price, s.duration_minutes))
            .ok_or_else(|| stale("service", id)),
        Offering::Package(id) => reference
            .package(id)
            .map(|p| (p.price, p.duration_minutes))
            .ok_or_else(|| stale("package", id)),
    }
}

fn stale(kind: &str, id: i32) -> AppError {
    tracing::warn!("Rejected appointment: {} {} is no longer available", kind, id);
    AppError::StaleReference(format!("The selected {} is no longer available", kind))
}
