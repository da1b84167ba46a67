//! Barber weekly schedule service

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{schedule_block::BarberSchedule, ScheduleBlock, ScheduleBlockDraft, Weekday},
    repository::{ReferenceData, ScheduleBlockStore},
    scheduling::{find_overlaps, reconcile, summarize_weekdays},
};

/// Store operation issued while saving a week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlockOperation {
    Create,
    Update,
    Delete,
}

/// One store call of a reconciliation pass that was rejected
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BlockFailure {
    pub operation: BlockOperation,
    /// Absent for blocks that were being created
    pub block_id: Option<i32>,
    pub weekday: Weekday,
    pub message: String,
}

/// Outcome of a save-week pass. Successful calls are not rolled back when
/// others fail; `blocks` is what storage holds afterwards.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReconcileReport {
    pub created: Vec<ScheduleBlock>,
    pub updated: Vec<ScheduleBlock>,
    pub deleted: Vec<i32>,
    pub failures: Vec<BlockFailure>,
    pub blocks: Vec<ScheduleBlock>,
}

impl ReconcileReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ScheduleBlocksService {
    store: Arc<dyn ScheduleBlockStore>,
    reference: Arc<dyn ReferenceData>,
    reject_overlaps: bool,
    cache: RwLock<Vec<ScheduleBlock>>,
}

impl ScheduleBlocksService {
    pub fn new(
        store: Arc<dyn ScheduleBlockStore>,
        reference: Arc<dyn ReferenceData>,
        reject_overlaps: bool,
    ) -> Self {
        Self {
            store,
            reference,
            reject_overlaps,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Reload every barber's blocks
    pub async fn refresh(&self) -> AppResult<Vec<ScheduleBlock>> {
        let blocks = self.store.list().await?;
        *self.cache.write().await = blocks.clone();
        Ok(blocks)
    }

    /// Reload one barber's blocks, leaving the others untouched
    pub async fn refresh_barber(&self, barber_id: i32) -> AppResult<Vec<ScheduleBlock>> {
        let blocks = self.store.list_by_barber(barber_id).await?;
        let mut cache = self.cache.write().await;
        cache.retain(|b| b.barber_id != barber_id);
        cache.extend(blocks.iter().cloned());
        Ok(blocks)
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn list_by_barber(&self, barber_id: i32) -> Vec<ScheduleBlock> {
        let mut blocks: Vec<ScheduleBlock> = self
            .cache
            .read()
            .await
            .iter()
            .filter(|b| b.barber_id == barber_id)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| (b.weekday, b.start_time));
        blocks
    }

    /// Every active barber with their blocks and weekday summary
    pub async fn overview(&self) -> AppResult<Vec<BarberSchedule>> {
        let barbers = self.reference.barbers().await?;
        let mut overview = Vec::with_capacity(barbers.len());
        for barber in barbers {
            let blocks = self.list_by_barber(barber.id).await;
            let summary = summarize_weekdays(&blocks);
            overview.push(BarberSchedule {
                barber,
                blocks,
                summary,
            });
        }
        Ok(overview)
    }

    /// Converge a barber's stored blocks to `drafts`.
    ///
    /// The whole set is validated first; a single invalid row rejects the
    /// save before anything is written.
    pub async fn save_week(
        &self,
        barber_id: i32,
        drafts: &[ScheduleBlockDraft],
    ) -> AppResult<ReconcileReport> {
        let desired = self.check_drafts(barber_id, drafts)?;

        let barbers = self.reference.barbers().await?;
        if !barbers.iter().any(|b| b.id == barber_id) {
            tracing::warn!("Rejected schedule save: barber {} is not active", barber_id);
            return Err(AppError::StaleReference(
                "The selected barber is no longer available".to_string(),
            ));
        }

        let persisted = self.store.list_by_barber(barber_id).await?;
        let owned: HashSet<i32> = persisted.iter().filter_map(|b| b.id).collect();
        if let Some(id) = desired.iter().filter_map(|b| b.id).find(|id| !owned.contains(id)) {
            tracing::warn!("Rejected schedule save: block {} is not owned by barber {}", id, barber_id);
            return Err(AppError::Validation(format!(
                "Schedule block {} does not belong to this barber",
                id
            )));
        }

        self.apply(barber_id, &persisted, &desired).await
    }

    /// Remove every block of a barber
    pub async fn delete_week(&self, barber_id: i32) -> AppResult<ReconcileReport> {
        let persisted = self.store.list_by_barber(barber_id).await?;
        self.apply(barber_id, &persisted, &[]).await
    }

    /// Flip a block's active flag.
    ///
    /// The cached flag changes before the store call and is put back if the
    /// call fails.
    pub async fn toggle_active(&self, id: i32) -> AppResult<ScheduleBlock> {
        let toggled = {
            let mut cache = self.cache.write().await;
            let block = cache
                .iter_mut()
                .find(|b| b.id == Some(id))
                .ok_or_else(|| AppError::NotFound(format!("Schedule block {} not found", id)))?;
            block.active = !block.active;
            block.clone()
        };

        if let Err(e) = self.store.set_active(id, toggled.active).await {
            tracing::error!("Failed to set active={} on schedule block {}: {}", toggled.active, id, e);
            if let Some(block) = self.cache.write().await.iter_mut().find(|b| b.id == Some(id)) {
                block.active = !toggled.active;
            }
            return Err(e);
        }
        tracing::info!("Schedule block {} active={}", id, toggled.active);

        if let Err(e) = self.refresh_barber(toggled.barber_id).await {
            tracing::warn!("Reload after toggling schedule block {} failed: {}", id, e);
        }
        Ok(toggled)
    }

    fn check_drafts(&self, barber_id: i32, drafts: &[ScheduleBlockDraft]) -> AppResult<Vec<ScheduleBlock>> {
        let desired = drafts
            .iter()
            .map(|d| d.check(barber_id))
            .collect::<AppResult<Vec<_>>>()
            .map_err(|e| {
                tracing::warn!("Rejected schedule save for barber {}: {}", barber_id, e);
                e
            })?;

        let mut seen = HashSet::new();
        if let Some(id) = desired.iter().filter_map(|b| b.id).find(|id| !seen.insert(*id)) {
            tracing::warn!("Rejected schedule save: block {} listed twice", id);
            return Err(AppError::Validation(format!(
                "Schedule block {} appears more than once",
                id
            )));
        }

        if self.reject_overlaps {
            if let Some((i, j)) = find_overlaps(&desired).into_iter().next() {
                tracing::warn!("Rejected schedule save: rows {} and {} overlap", i, j);
                return Err(AppError::Validation(format!(
                    "Blocks on {} overlap ({}-{} and {}-{})",
                    desired[i].weekday,
                    desired[i].start_time.format("%H:%M"),
                    desired[i].end_time.format("%H:%M"),
                    desired[j].start_time.format("%H:%M"),
                    desired[j].end_time.format("%H:%M"),
                )));
            }
        }

        Ok(desired)
    }

    /// Dispatch every operation of the plan concurrently, wait for all of
    /// them, then reload the barber's blocks.
    async fn apply(
        &self,
        barber_id: i32,
        persisted: &[ScheduleBlock],
        desired: &[ScheduleBlock],
    ) -> AppResult<ReconcileReport> {
        let plan = reconcile(persisted, desired);
        tracing::debug!(
            "Barber {}: {} to create, {} to update, {} to delete",
            barber_id,
            plan.to_create.len(),
            plan.to_update.len(),
            plan.to_delete.len()
        );

        let store = self.store.as_ref();
        let deletes = join_all(
            plan.to_delete
                .iter()
                .filter_map(|b| b.id.map(|id| (id, b)))
                .map(|(id, block)| async move { (id, block, store.delete(id).await) }),
        );
        let creates = join_all(
            plan.to_create
                .iter()
                .map(|block| async move { (block, store.create(block).await) }),
        );
        let updates = join_all(
            plan.to_update
                .iter()
                .filter_map(|b| b.id.map(|id| (id, b)))
                .map(|(id, block)| async move { (id, block, store.update(id, block).await) }),
        );
        let (deleted, created, updated) = futures::join!(deletes, creates, updates);

        let mut report = ReconcileReport::default();
        for (id, block, result) in deleted {
            match result {
                Ok(()) => report.deleted.push(id),
                Err(e) => report.failures.push(failure(BlockOperation::Delete, Some(id), block, e)),
            }
        }
        for (block, result) in created {
            match result {
                Ok(stored) => report.created.push(stored),
                Err(e) => report.failures.push(failure(BlockOperation::Create, None, block, e)),
            }
        }
        for (id, block, result) in updated {
            match result {
                Ok(stored) => report.updated.push(stored),
                Err(e) => report.failures.push(failure(BlockOperation::Update, Some(id), block, e)),
            }
        }

        if report.is_complete() {
            tracing::info!(
                "Saved schedule of barber {}: {} created, {} updated, {} deleted",
                barber_id,
                report.created.len(),
                report.updated.len(),
                report.deleted.len()
            );
        } else {
            tracing::warn!(
                "Schedule of barber {} partially saved: {} of {} operations failed",
                barber_id,
                report.failures.len(),
                plan.operation_count()
            );
        }

        match self.refresh_barber(barber_id).await {
            Ok(blocks) => report.blocks = blocks,
            Err(e) => {
                tracing::warn!("Reload of barber {} schedule failed: {}", barber_id, e);
                report.blocks = self.list_by_barber(barber_id).await;
            }
        }
        Ok(report)
    }
}

fn failure(operation: BlockOperation, block_id: Option<i32>, block: &ScheduleBlock, err: AppError) -> BlockFailure {
    tracing::error!("Schedule block {:?} {:?} failed: {}", operation, block_id, err);
    BlockFailure {
        operation,
        block_id,
        weekday: block.weekday,
        message: err.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveTime;
    use mockall::predicate::eq;

    use super::*;
    use crate::models::Barber;
    use crate::repository::{MockReferenceData, MockScheduleBlockStore};

    fn block(id: Option<i32>, weekday: Weekday, start: u32, end: u32) -> ScheduleBlock {
        ScheduleBlock {
            id,
            barber_id: 2,
            weekday,
            start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            active: true,
        }
    }

    fn row(id: Option<i32>, weekday: Weekday, start: &str, end: &str) -> ScheduleBlockDraft {
        ScheduleBlockDraft {
            id,
            weekday: Some(weekday),
            start_time: Some(start.into()),
            end_time: Some(end.into()),
            active: None,
        }
    }

    fn barbers() -> MockReferenceData {
        let mut reference = MockReferenceData::new();
        reference.expect_barbers().returning(|| {
            Ok(vec![
                Barber { id: 2, name: "Luis".into(), active: true },
                Barber { id: 4, name: "Marta".into(), active: true },
            ])
        });
        reference
    }

    fn untouched_store() -> MockScheduleBlockStore {
        let mut store = MockScheduleBlockStore::new();
        store.expect_list_by_barber().times(0);
        store.expect_create().times(0);
        store.expect_update().times(0);
        store.expect_delete().times(0);
        store
    }

    #[tokio::test]
    async fn test_invalid_row_rejects_whole_save() {
        let service = ScheduleBlocksService::new(Arc::new(untouched_store()), Arc::new(barbers()), false);

        let drafts = vec![
            row(None, Weekday::Lunes, "09:00", "13:00"),
            row(Some(1), Weekday::Martes, "14:00", "14:00"),
        ];
        let err = service.save_week(2, &drafts).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Start time must be before end time"));

        let mut missing_day = row(None, Weekday::Lunes, "09:00", "13:00");
        missing_day.weekday = None;
        let err = service.save_week(2, &[missing_day]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "A weekday must be selected"));
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let service = ScheduleBlocksService::new(Arc::new(untouched_store()), Arc::new(barbers()), false);
        let drafts = vec![
            row(Some(1), Weekday::Lunes, "09:00", "13:00"),
            row(Some(1), Weekday::Martes, "09:00", "13:00"),
        ];
        assert!(service.save_week(2, &drafts).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_overlap_policy() {
        let drafts = vec![
            row(None, Weekday::Lunes, "09:00", "13:00"),
            row(None, Weekday::Lunes, "12:00", "15:00"),
        ];
        let strict = ScheduleBlocksService::new(Arc::new(untouched_store()), Arc::new(barbers()), true);
        assert!(strict.save_week(2, &drafts).await.unwrap_err().is_validation());

        let mut store = MockScheduleBlockStore::new();
        store.expect_list_by_barber().returning(|_| Ok(Vec::new()));
        store
            .expect_create()
            .times(2)
            .returning(|b| Ok(ScheduleBlock { id: Some(10), ..b.clone() }));
        let lenient = ScheduleBlocksService::new(Arc::new(store), Arc::new(barbers()), false);
        let report = lenient.save_week(2, &drafts).await.unwrap();
        assert_eq!(report.created.len(), 2);
    }

    #[tokio::test]
    async fn test_inactive_barber_is_stale() {
        let service = ScheduleBlocksService::new(Arc::new(untouched_store()), Arc::new(barbers()), false);
        let err = service
            .save_week(9, &[row(None, Weekday::Lunes, "09:00", "13:00")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StaleReference(_)));
    }

    #[tokio::test]
    async fn test_foreign_block_id_rejected() {
        let mut store = MockScheduleBlockStore::new();
        store
            .expect_list_by_barber()
            .with(eq(2))
            .returning(|_| Ok(vec![block(Some(1), Weekday::Lunes, 9, 13)]));
        store.expect_update().times(0);
        store.expect_delete().times(0);
        let service = ScheduleBlocksService::new(Arc::new(store), Arc::new(barbers()), false);

        let err = service
            .save_week(2, &[row(Some(77), Weekday::Lunes, "09:00", "13:00")])
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_not_rolled_back() {
        let persisted = vec![
            block(Some(1), Weekday::Lunes, 9, 13),
            block(Some(2), Weekday::Martes, 9, 13),
        ];
        let after = vec![
            block(Some(1), Weekday::Lunes, 10, 14),
            block(Some(2), Weekday::Martes, 9, 13),
            block(Some(3), Weekday::Miercoles, 8, 12),
        ];
        let reads = Arc::new(Mutex::new(vec![after.clone(), persisted.clone()]));

        let mut store = MockScheduleBlockStore::new();
        let pending = reads.clone();
        store
            .expect_list_by_barber()
            .times(2)
            .returning(move |_| Ok(pending.lock().unwrap().pop().unwrap_or_default()));
        store
            .expect_delete()
            .with(eq(2))
            .times(1)
            .returning(|_| Err(AppError::Remote("timeout".into())));
        store
            .expect_create()
            .times(1)
            .returning(|b| Ok(ScheduleBlock { id: Some(3), ..b.clone() }));
        store
            .expect_update()
            .with(eq(1), mockall::predicate::always())
            .times(1)
            .returning(|_, b| Ok(b.clone()));
        let service = ScheduleBlocksService::new(Arc::new(store), Arc::new(barbers()), false);

        let drafts = vec![
            row(Some(1), Weekday::Lunes, "10:00", "14:00"),
            row(None, Weekday::Miercoles, "08:00", "12:00"),
        ];
        let report = service.save_week(2, &drafts).await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.updated, vec![block(Some(1), Weekday::Lunes, 10, 14)]);
        assert_eq!(report.created[0].id, Some(3));
        assert!(report.deleted.is_empty());
        assert_eq!(
            report.failures,
            vec![BlockFailure {
                operation: BlockOperation::Delete,
                block_id: Some(2),
                weekday: Weekday::Martes,
                message: "The operation could not be completed. Please try again.".into(),
            }]
        );
        assert_eq!(report.blocks, after);
        assert_eq!(service.list_by_barber(2).await, after);
    }

    #[tokio::test]
    async fn test_unchanged_blocks_are_still_updated() {
        let persisted = vec![block(Some(1), Weekday::Lunes, 9, 13)];
        let mut store = MockScheduleBlockStore::new();
        let rows = persisted.clone();
        store.expect_list_by_barber().returning(move |_| Ok(rows.clone()));
        store.expect_update().times(1).returning(|_, b| Ok(b.clone()));
        store.expect_create().times(0);
        store.expect_delete().times(0);
        let service = ScheduleBlocksService::new(Arc::new(store), Arc::new(barbers()), false);

        let drafts: Vec<_> = persisted.iter().map(ScheduleBlockDraft::from_block).collect();
        let report = service.save_week(2, &drafts).await.unwrap();
        assert_eq!(report.updated.len(), 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_delete_week_removes_every_block() {
        let mut store = MockScheduleBlockStore::new();
        let reads = Arc::new(Mutex::new(vec![
            Vec::new(),
            vec![
                block(Some(1), Weekday::Lunes, 9, 13),
                block(Some(2), Weekday::Martes, 9, 13),
            ],
        ]));
        store
            .expect_list_by_barber()
            .returning(move |_| Ok(reads.lock().unwrap().pop().unwrap_or_default()));
        store.expect_delete().times(2).returning(|_| Ok(()));
        let service = ScheduleBlocksService::new(Arc::new(store), Arc::new(MockReferenceData::new()), false);

        let report = service.delete_week(2).await.unwrap();
        let mut deleted = report.deleted.clone();
        deleted.sort();
        assert_eq!(deleted, vec![1, 2]);
        assert!(report.blocks.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_reverts_on_failure() {
        let mut store = MockScheduleBlockStore::new();
        store
            .expect_list()
            .returning(|| Ok(vec![block(Some(1), Weekday::Lunes, 9, 13)]));
        store
            .expect_set_active()
            .with(eq(1), eq(false))
            .returning(|_, _| Err(AppError::Remote("connection reset".into())));
        store.expect_list_by_barber().times(0);
        let service = ScheduleBlocksService::new(Arc::new(store), Arc::new(MockReferenceData::new()), false);
        service.refresh().await.unwrap();

        assert!(service.toggle_active(1).await.is_err());
        assert!(service.list_by_barber(2).await[0].active);
    }

    #[tokio::test]
    async fn test_toggle_flips_flag() {
        let mut store = MockScheduleBlockStore::new();
        store
            .expect_list()
            .returning(|| Ok(vec![block(Some(1), Weekday::Lunes, 9, 13)]));
        store.expect_set_active().with(eq(1), eq(false)).returning(|_, _| Ok(()));
        store.expect_list_by_barber().returning(|_| {
            Ok(vec![ScheduleBlock { active: false, ..block(Some(1), Weekday::Lunes, 9, 13) }])
        });
        let service = ScheduleBlocksService::new(Arc::new(store), Arc::new(MockReferenceData::new()), false);
        service.refresh().await.unwrap();

        let toggled = service.toggle_active(1).await.unwrap();
        assert!(!toggled.active);
        assert!(!service.list_by_barber(2).await[0].active);
        assert!(matches!(service.toggle_active(42).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_overview_summaries() {
        let mut store = MockScheduleBlockStore::new();
        store.expect_list().returning(|| {
            Ok(vec![
                block(Some(1), Weekday::Lunes, 9, 13),
                block(Some(2), Weekday::Martes, 9, 13),
                block(Some(3), Weekday::Jueves, 9, 13),
                block(Some(4), Weekday::Viernes, 9, 13),
            ])
        });
        let service = ScheduleBlocksService::new(Arc::new(store), Arc::new(barbers()), false);
        service.refresh().await.unwrap();

        assert_eq!(service.cached_count().await, 4);

        let overview = service.overview().await.unwrap();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].summary, "Lunes, Martes +2 más");
        assert_eq!(overview[1].summary, "Sin horario");
        assert!(overview[1].blocks.is_empty());
    }
}
