//! AuditTrail — central orchestrator over the record store and entity registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use chronicle_core::config::ChronicleConfig;
use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{AuditFilter, AuditRecord, EntityRef, Mutation, RecordDraft};
use chronicle_core::traits::{Clock, IAuditStorage, SystemClock};
use chronicle_storage::StorageEngine;

use crate::context;
use crate::recorder;
use crate::registry::EntityRegistry;
use crate::revision::{self, Revision};
use crate::search::{self, SearchParams};

/// The audit trail engine.
///
/// Writes go through the storage engine's single writer; reconstruction and
/// search only read.
pub struct AuditTrail {
    storage: Arc<StorageEngine>,
    registry: Arc<EntityRegistry>,
    config: ChronicleConfig,
    clock: Arc<dyn Clock>,
}

impl AuditTrail {
    pub fn new(
        storage: Arc<StorageEngine>,
        registry: Arc<EntityRegistry>,
        config: ChronicleConfig,
    ) -> Self {
        Self {
            storage,
            registry,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Open the store at `config.storage.path` (in memory when unset)
    /// against the global registry.
    pub fn open(config: ChronicleConfig) -> ChronicleResult<Self> {
        Self::open_with_registry(config, EntityRegistry::global())
    }

    pub fn open_with_registry(
        config: ChronicleConfig,
        registry: Arc<EntityRegistry>,
    ) -> ChronicleResult<Self> {
        let storage = Arc::new(StorageEngine::open_with_config(&config)?);
        tracing::info!(
            path = ?config.storage.path,
            types = registry.registered_types().len(),
            "audit trail ready"
        );
        Ok(Self::new(storage, registry, config))
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ChronicleConfig {
        &self.config
    }

    // --- Write ---

    /// Record one create, update, or delete.
    ///
    /// Returns `None` for an update that changed no audited attribute.
    /// Waits on the writer lock and sleeps the thread between contended
    /// attempts; async callers prefer [`Self::record_mutation_async`].
    pub fn record_mutation(&self, mutation: Mutation) -> ChronicleResult<Option<AuditRecord>> {
        match self.prepare(mutation)? {
            Some(draft) => recorder::record(self.storage.as_ref(), &draft).map(Some),
            None => Ok(None),
        }
    }

    /// Async variant of [`Self::record_mutation`]. Actors bound with
    /// [`context::scope`] are visible only to the future they wrap.
    pub async fn record_mutation_async(
        &self,
        mutation: Mutation,
    ) -> ChronicleResult<Option<AuditRecord>> {
        let Some(draft) = self.prepare(mutation)? else {
            return Ok(None);
        };
        let record = self.storage.append_async(&draft).await?;
        recorder::log_recorded(&record);
        Ok(Some(record))
    }

    fn prepare(&self, mutation: Mutation) -> ChronicleResult<Option<RecordDraft>> {
        recorder::prepare(
            mutation,
            &self.config.diff.ignored_attributes,
            context::current_actor(),
            self.clock.now(),
        )
    }

    // --- Read ---

    pub fn search(&self, params: &SearchParams) -> ChronicleResult<Vec<AuditRecord>> {
        let filter = search::build_filter(params, &self.registry)?;
        self.storage.query_filtered(&filter)
    }

    pub fn filter(&self, filter: &AuditFilter) -> ChronicleResult<Vec<AuditRecord>> {
        self.storage.query_filtered(filter)
    }

    /// Every record of `entity`, ascending by version.
    pub fn history(&self, entity: &EntityRef) -> ChronicleResult<Vec<AuditRecord>> {
        self.storage.query_by_entity(entity, None)
    }

    pub fn next_version(&self, entity: &EntityRef) -> ChronicleResult<u64> {
        self.storage.next_version(entity)
    }

    pub fn reconstruct(
        &self,
        entity_type: &str,
        entity_id: &str,
        version: u64,
    ) -> ChronicleResult<Option<Revision>> {
        revision::reconstruct(
            self.storage.as_ref(),
            &self.registry,
            entity_type,
            entity_id,
            version,
        )
    }

    pub fn reconstruct_at_time(
        &self,
        entity_type: &str,
        entity_id: &str,
        as_of: DateTime<Utc>,
    ) -> ChronicleResult<Option<Revision>> {
        revision::reconstruct_at_time(
            self.storage.as_ref(),
            &self.registry,
            entity_type,
            entity_id,
            as_of,
        )
    }

    pub fn revisions(&self, entity_type: &str, entity_id: &str) -> ChronicleResult<Vec<Revision>> {
        revision::revisions(self.storage.as_ref(), &self.registry, entity_type, entity_id)
    }
}
