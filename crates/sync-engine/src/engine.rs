//! SyncEngine implementation
//!
//! The SyncEngine coordinates a source and a target object store: it runs
//! read-only compares, and apply runs that push NEW and resolver-approved
//! MODIFIED changes into the target. Strategy and resolver registries are
//! instance state, so multiple engines can run side by side in one process
//! without sharing anything.

use std::collections::HashMap;

use sync_model::{ObjectStore, TypeTag};

use crate::conflict::{ConflictResolver, SourceWins, TargetWins, Winner};
use crate::diff::{ChangeKind, DiffEngine, DiffResult, ObjectFilter};
use crate::error::{Error, Result};
use crate::matching::{GuidMatch, MatchStrategy};
use crate::merge::MergeOperations;
use crate::progress::{self, Phase, ProgressFn};
use crate::result::SyncResult;

/// Options for a read-only compare run
#[derive(Default)]
pub struct CompareOptions<'a> {
    /// Registered strategy name; the engine default when absent
    pub strategy: Option<&'a str>,
    /// Predicate restricting which source objects participate
    pub filter: Option<ObjectFilter<'a>>,
}

/// Options for an apply run
#[derive(Default)]
pub struct SyncOptions<'a> {
    /// Registered strategy name; the engine default when absent
    pub strategy: Option<&'a str>,
    /// Registered resolver name; "source-wins" when absent
    pub resolver: Option<&'a str>,
    /// Predicate restricting which source objects participate
    pub filter: Option<ObjectFilter<'a>>,
    /// Simulate without issuing any mutating call to the target
    pub dry_run: bool,
}

/// Engine orchestrating compare and apply runs between two stores
pub struct SyncEngine {
    source: Box<dyn ObjectStore>,
    target: Box<dyn ObjectStore>,
    read_only: bool,
    default_strategy: String,
    default_resolver: String,
    strategies: HashMap<String, Box<dyn MatchStrategy>>,
    resolvers: HashMap<String, Box<dyn ConflictResolver>>,
}

impl SyncEngine {
    /// Create an engine over two stores
    ///
    /// The engine starts in read-only mode when the target does not report
    /// itself writable. The identifier strategy and the two fixed conflict
    /// policies come pre-registered.
    pub fn new(source: Box<dyn ObjectStore>, target: Box<dyn ObjectStore>) -> Self {
        let read_only = !target.is_writable();
        let mut engine = Self {
            source,
            target,
            read_only,
            default_strategy: "guid".to_string(),
            default_resolver: "source-wins".to_string(),
            strategies: HashMap::new(),
            resolvers: HashMap::new(),
        };
        engine.register_strategy(Box::new(GuidMatch));
        engine.register_resolver(Box::new(SourceWins));
        engine.register_resolver(Box::new(TargetWins));
        engine
    }

    /// Override the writability-derived mode
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Register a strategy under its own name
    pub fn register_strategy(&mut self, strategy: Box<dyn MatchStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    /// Register a resolver under its own name
    pub fn register_resolver(&mut self, resolver: Box<dyn ConflictResolver>) {
        self.resolvers.insert(resolver.name().to_string(), resolver);
    }

    pub fn source(&self) -> &dyn ObjectStore {
        self.source.as_ref()
    }

    pub fn target(&self) -> &dyn ObjectStore {
        self.target.as_ref()
    }

    fn strategy(&self, name: Option<&str>) -> Result<&dyn MatchStrategy> {
        let name = name.unwrap_or(&self.default_strategy);
        self.strategies
            .get(name)
            .map(|s| s.as_ref())
            .ok_or_else(|| Error::UnknownStrategy {
                name: name.to_string(),
            })
    }

    /// Compare all objects of `ty`; always read-only
    pub fn compare(&self, ty: &TypeTag) -> Result<DiffResult> {
        self.compare_with(ty, &CompareOptions::default(), None)
    }

    /// Compare with explicit options
    pub fn compare_with(
        &self,
        ty: &TypeTag,
        options: &CompareOptions<'_>,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<DiffResult> {
        let strategy = self.strategy(options.strategy)?;
        DiffEngine.compare(
            self.source.as_ref(),
            self.target.as_ref(),
            ty,
            strategy,
            options.filter,
            progress,
        )
    }

    /// Apply source changes of `ty` to the target
    ///
    /// Refuses to run against a read-only target. Every per-object failure
    /// is isolated into the result's error log; one bad object never aborts
    /// the batch. DELETED changes are never auto-applied, they are counted
    /// as skipped for operator review.
    pub fn sync(
        &mut self,
        ty: &TypeTag,
        options: &SyncOptions<'_>,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<SyncResult> {
        if self.read_only || !self.target.is_writable() {
            return Err(Error::ReadOnlyTarget {
                store: self.target.name().to_string(),
            });
        }

        let diff = self.compare_with(
            ty,
            &CompareOptions {
                strategy: options.strategy,
                filter: options.filter,
            },
            None,
        )?;
        // Field-level lookup so the resolver borrow stays disjoint from the
        // mutable target borrow inside the loop.
        let resolver_name = options.resolver.unwrap_or(&self.default_resolver);
        let resolver = self
            .resolvers
            .get(resolver_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| Error::UnknownResolver {
                name: resolver_name.to_string(),
            })?;

        tracing::info!(
            ty = %ty,
            total = diff.total(),
            dry_run = options.dry_run,
            "applying changes"
        );

        let mut result = SyncResult::new(options.dry_run);
        let total = diff.changes().len();

        for (index, change) in diff.changes().iter().enumerate() {
            match change.kind {
                ChangeKind::New => {
                    let Some(source_id) = change.source_id else {
                        continue;
                    };
                    if options.dry_run {
                        result.record_created(ty.clone(), source_id);
                    } else {
                        match self.source.get_object(ty, source_id) {
                            Ok(Some(source_object)) => {
                                match MergeOperations.create_object(
                                    self.target.as_mut(),
                                    &source_object,
                                    self.source.as_ref(),
                                    None,
                                ) {
                                    Ok(_) => result.record_created(ty.clone(), source_id),
                                    Err(error) => result.record_error(
                                        ty.clone(),
                                        Some(source_id),
                                        error.to_string(),
                                    ),
                                }
                            }
                            Ok(None) => result.record_error(
                                ty.clone(),
                                Some(source_id),
                                "source object vanished during run",
                            ),
                            Err(error) => result.record_error(
                                ty.clone(),
                                Some(source_id),
                                error.to_string(),
                            ),
                        }
                    }
                }

                ChangeKind::Modified | ChangeKind::Conflict => {
                    let (Some(source_id), Some(target_id)) = (change.source_id, change.target_id)
                    else {
                        continue;
                    };
                    match arbitrate(
                        self.source.as_ref(),
                        self.target.as_mut(),
                        ty,
                        source_id,
                        target_id,
                        resolver,
                        options.dry_run,
                    ) {
                        Ok(Some(Winner::Source)) => result.record_updated(ty.clone(), source_id),
                        Ok(Some(Winner::Target)) => result.record_skipped(
                            ty.clone(),
                            Some(target_id),
                            "target values kept by resolver",
                        ),
                        Ok(None) => result.record_skipped(
                            ty.clone(),
                            Some(target_id),
                            "already up to date",
                        ),
                        Err(error) => {
                            result.record_error(ty.clone(), Some(source_id), error.to_string())
                        }
                    }
                }

                // Deleting data the target added independently is a
                // destructive, human-reviewable decision.
                ChangeKind::Deleted => result.record_skipped(
                    ty.clone(),
                    change.target_id,
                    "deletes are never auto-applied",
                ),

                ChangeKind::Unchanged => {}
            }

            progress::emit(&mut progress, Phase::Apply, index + 1, total);
        }

        Ok(result)
    }
}

/// Resolve one diverged pair and apply the outcome
///
/// `Ok(Some(winner))` reports which side was applied, `Ok(None)` that the
/// update turned out to be a no-op.
fn arbitrate(
    source: &dyn ObjectStore,
    target: &mut dyn ObjectStore,
    ty: &TypeTag,
    source_id: sync_model::PersistentId,
    target_id: sync_model::PersistentId,
    resolver: &dyn ConflictResolver,
    dry_run: bool,
) -> Result<Option<Winner>> {
    let source_object =
        source
            .get_object(ty, source_id)?
            .ok_or(sync_model::Error::ObjectMissing {
                ty: ty.to_string(),
                id: source_id.to_string(),
            })?;
    let target_object =
        target
            .get_object(ty, target_id)?
            .ok_or(sync_model::Error::ObjectMissing {
                ty: ty.to_string(),
                id: target_id.to_string(),
            })?;

    let winner = resolver.resolve(&source_object, &target_object, source, &*target)?;

    match winner {
        Winner::Target => Ok(Some(Winner::Target)),
        Winner::Source if dry_run => Ok(Some(Winner::Source)),
        Winner::Source => {
            let changed =
                MergeOperations.update_object(target, &target_object, source, &source_object)?;
            Ok(changed.then_some(Winner::Source))
        }
    }
}
