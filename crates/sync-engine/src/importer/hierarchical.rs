//! Dependency-ordered batch import
//!
//! The importer expands every requested object through its
//! [`DependencyResolver`], folds the results into one graph, and creates
//! objects in topological order so that owners and referenced objects exist
//! before anything that needs them. Failures on individual objects are
//! isolated into the run's [`SyncResult`]; only cycles the configuration
//! does not tolerate and critical validation issues abort the whole batch.

use sync_graph::{DependencyGraph, DependencyKind};
use sync_model::{ObjectStore, PersistentId, TypeTag, ValidationResult, Validator};

use crate::error::{Error, Result};
use crate::merge::MergeOperations;
use crate::progress::{emit, Phase, ProgressFn};
use crate::result::SyncResult;

use super::config::ImportConfig;
use super::resolver::DependencyResolver;

/// Per-run switches, as opposed to the reusable [`ImportConfig`]
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Run the attached validator over every node before creating anything
    pub validate_references: bool,
    /// Count and log what would be created without touching the target
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            validate_references: true,
            dry_run: false,
        }
    }
}

/// Imports objects with their dependency closures
pub struct HierarchicalImporter<'a> {
    source: &'a dyn ObjectStore,
    target: &'a mut dyn ObjectStore,
    resolver: &'a dyn DependencyResolver,
    validator: Option<&'a dyn Validator>,
}

impl<'a> HierarchicalImporter<'a> {
    pub fn new(
        source: &'a dyn ObjectStore,
        target: &'a mut dyn ObjectStore,
        resolver: &'a dyn DependencyResolver,
    ) -> Self {
        Self {
            source,
            target,
            resolver,
            validator: None,
        }
    }

    /// Attach a validator consulted before each create
    pub fn with_validator(mut self, validator: &'a dyn Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Import `ids` of type `ty` together with everything they own or
    /// reference
    ///
    /// Objects are created in dependency order. A root that cannot be
    /// resolved is logged into the result and the rest of the batch
    /// proceeds.
    ///
    /// # Errors
    ///
    /// Fails as a whole on an intolerable cycle ([`Error::Cycle`]) or, for
    /// non-dry runs, on critical validation issues ([`Error::Validation`]).
    pub fn import_with_dependencies(
        &mut self,
        ty: &TypeTag,
        ids: &[PersistentId],
        config: &ImportConfig,
        options: &ImportOptions,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<SyncResult> {
        let roots: Vec<(TypeTag, PersistentId)> =
            ids.iter().map(|id| (ty.clone(), *id)).collect();
        self.import_roots(&roots, config, options, progress)
    }

    /// Import one object plus every object of the given types that refers
    /// to it
    ///
    /// Referrers are found by scanning `referring_types` in the source and
    /// asking the resolver what each object points at.
    pub fn import_related(
        &mut self,
        ty: &TypeTag,
        id: PersistentId,
        referring_types: &[TypeTag],
        config: &ImportConfig,
        options: &ImportOptions,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<SyncResult> {
        let mut roots = vec![(ty.clone(), id)];
        for referring_ty in referring_types {
            for handle in self.source.all_objects(referring_ty, None)? {
                let references =
                    self.resolver
                        .get_referenced_objects(&handle, referring_ty, self.source)?;
                let points_here = references.iter().any(|(referenced, referenced_ty)| {
                    referenced_ty == ty
                        && self
                            .source
                            .guid_of(referenced)
                            .is_ok_and(|guid| guid == id)
                });
                if points_here {
                    roots.push((referring_ty.clone(), self.source.guid_of(&handle)?));
                }
            }
        }
        self.import_roots(&roots, config, options, progress)
    }

    fn import_roots(
        &mut self,
        roots: &[(TypeTag, PersistentId)],
        config: &ImportConfig,
        options: &ImportOptions,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<SyncResult> {
        let mut result = SyncResult::new(options.dry_run);

        let mut graph = DependencyGraph::new();
        let total = roots.len();
        for (index, (ty, id)) in roots.iter().enumerate() {
            match self.source.get_object(ty, *id) {
                Ok(Some(handle)) => {
                    match self
                        .resolver
                        .resolve_dependencies(&handle, ty, self.source, config)
                    {
                        Ok(expanded) => graph.merge(&expanded),
                        Err(error) => result.record_error(ty.clone(), Some(*id), error.to_string()),
                    }
                }
                Ok(None) => {
                    result.record_error(ty.clone(), Some(*id), "not found in source store")
                }
                Err(error) => result.record_error(ty.clone(), Some(*id), error.to_string()),
            }
            emit(&mut progress, Phase::Resolve, index + 1, total);
        }

        let mut cycles = graph.detect_cycles();
        if !cycles.is_empty() && !config.allow_cycles {
            return Err(Error::Cycle(sync_graph::CircularDependencyError {
                cycle: cycles.remove(0),
            }));
        }
        while let Some(cycle) = cycles.first() {
            break_weakest_edge(&mut graph, cycle);
            cycles = graph.detect_cycles();
        }

        let order = graph.get_import_order()?;

        if options.validate_references
            && let Some(validator) = self.validator
        {
            let mut validation = ValidationResult::ok();
            let total = order.len();
            for (index, (id, ty)) in order.iter().enumerate() {
                if let Some(node) = graph.node(*id)
                    && let Some(payload) = &node.payload
                {
                    validation.merge(validator.validate_before_create(payload, self.source, ty));
                }
                emit(&mut progress, Phase::Validate, index + 1, total);
            }
            // Dry runs report critical issues through logging only, so the
            // rest of the preview still happens.
            if validation.has_critical() && !options.dry_run {
                return Err(Error::Validation { result: validation });
            }
        }

        let total = order.len();
        for (index, (id, ty)) in order.iter().enumerate() {
            self.import_node(&graph, *id, ty, config, options, &mut result);
            emit(&mut progress, Phase::Import, index + 1, total);
        }

        tracing::info!(
            created = result.num_created,
            skipped = result.num_skipped,
            errors = result.num_errors(),
            dry_run = options.dry_run,
            "import finished"
        );
        Ok(result)
    }

    fn import_node(
        &mut self,
        graph: &DependencyGraph,
        id: PersistentId,
        ty: &TypeTag,
        config: &ImportConfig,
        options: &ImportOptions,
        result: &mut SyncResult,
    ) {
        let Some(node) = graph.node(id) else {
            return;
        };
        let Some(payload) = &node.payload else {
            // Resolved by identifier only; presumed to already exist.
            result.record_skipped(ty.clone(), Some(id), "known only by identifier");
            return;
        };

        if config.skip_existing && self.target.contains(ty, id) {
            result.record_skipped(ty.clone(), Some(id), "already present in target");
            return;
        }

        if options.dry_run {
            result.record_created(ty.clone(), id);
            return;
        }

        // The owner, if any, was created earlier in the order; its
        // target-side handle becomes the creation parent.
        let owner = node
            .edge_kinds
            .iter()
            .find(|(_, kind)| **kind == DependencyKind::Ownership)
            .map(|(owner_id, _)| *owner_id);
        let parent = match owner {
            Some(owner_id) => {
                let Some(owner_ty) = graph.node(owner_id).map(|n| n.ty.clone()) else {
                    result.record_error(ty.clone(), Some(id), "owner missing from graph");
                    return;
                };
                match self.target.get_object(&owner_ty, owner_id) {
                    Ok(handle) => handle,
                    Err(error) => {
                        result.record_error(ty.clone(), Some(id), error.to_string());
                        return;
                    }
                }
            }
            None => None,
        };

        match MergeOperations.create_object(self.target, payload, self.source, parent.as_ref()) {
            Ok(_) => result.record_created(ty.clone(), id),
            Err(error) => result.record_error(ty.clone(), Some(id), error.to_string()),
        }
    }
}

/// Sever the weakest edge of `cycle`: cross-references first, ownership
/// only as a last resort
fn break_weakest_edge(graph: &mut DependencyGraph, cycle: &[PersistentId]) {
    for rank in 0..=DependencyKind::Ownership.break_rank() {
        for pair in cycle.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if let Some(kind) = graph.edge_kind(from, to)
                && kind.break_rank() == rank
            {
                tracing::warn!(%from, %to, %kind, "severing edge to break dependency cycle");
                graph.remove_dependency(from, to);
                return;
            }
        }
    }
}
