//! Ingestion orchestrator.
//!
//! Drives a run over an input graph in two phases. The materialize phase
//! establishes a canonical location for every subject, resolving against
//! the search index first and creating a repository object only on a
//! miss. The link phase then patches relation-valued properties using the
//! mapping frozen at the phase boundary and refreshes the search index.
//!
//! Per-subject failures are contained: they are recorded in the run
//! report and never abort the run. Only index bootstrap failure and
//! pre-run cancellation are fatal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::IngestError;
use crate::indexer::GraphIndexer;
use crate::resolver::Resolver;
use crate::statement::StatementBuilder;
use bibgraph_repository::ObjectRepository;
use bibgraph_shared::profile::normalize_identifier;
use bibgraph_shared::{
    Candidate, Graph, Location, Phase, RunReport, RunState, SubjectFailure, Term, VocabProfile,
};

/// Tunables for an ingestion run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum subjects processed concurrently within a phase.
    pub concurrency: usize,
    /// Assert `owl:sameAs` back to the original subject identity in every
    /// patch statement.
    pub provenance: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            provenance: false,
        }
    }
}

/// Serializes materialization of subjects that share an identifying
/// value. The first holder of a slot establishes the location and
/// publishes it; later holders reuse it instead of issuing their own
/// create.
struct DedupGate {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<Option<Location>>>>>,
}

impl DedupGate {
    fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Arc<AsyncMutex<Option<Location>>> {
        self.slots
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}

/// Mutable state shared by the workers of one run.
struct RunContext {
    /// Subject identity to canonical location. Written during the
    /// materialize phase only; the link phase reads a frozen clone.
    mapping: Mutex<HashMap<Term, Location>>,
    /// Location to search document id, filled as subjects are indexed.
    ids: Mutex<HashMap<String, String>>,
    gate: DedupGate,
    created: AtomicUsize,
    resolved: AtomicUsize,
    linked: AtomicUsize,
    failures: Mutex<Vec<SubjectFailure>>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            mapping: Mutex::new(HashMap::new()),
            ids: Mutex::new(HashMap::new()),
            gate: DedupGate::new(),
            created: AtomicUsize::new(0),
            resolved: AtomicUsize::new(0),
            linked: AtomicUsize::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, subject: &Term, location: &Location) {
        self.mapping
            .lock()
            .unwrap()
            .insert(subject.clone(), location.clone());
    }

    fn fail(
        &self,
        subject: &Term,
        phase: Phase,
        location: Option<&Location>,
        error: &impl ToString,
    ) {
        self.failures.lock().unwrap().push(SubjectFailure {
            subject: subject.lexical().to_string(),
            phase,
            location: location.map(|l| l.as_str().to_string()),
            error: error.to_string(),
        });
    }

    fn into_report(
        self,
        subjects_total: usize,
        cancelled: bool,
        started_at: DateTime<Utc>,
    ) -> RunReport {
        RunReport {
            state: RunState::Done,
            subjects_total,
            created: self.created.into_inner(),
            resolved: self.resolved.into_inner(),
            linked: self.linked.into_inner(),
            failures: self.failures.into_inner().unwrap(),
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Runs two-phase graph ingestion against a repository and search index.
pub struct IngestOrchestrator {
    repository: Arc<dyn ObjectRepository>,
    resolver: Arc<dyn Resolver>,
    indexer: Arc<GraphIndexer>,
    builder: StatementBuilder,
    profile: Arc<VocabProfile>,
    config: OrchestratorConfig,
    state: RwLock<RunState>,
    cancel: watch::Sender<bool>,
}

impl IngestOrchestrator {
    pub fn new(
        repository: Arc<dyn ObjectRepository>,
        resolver: Arc<dyn Resolver>,
        indexer: Arc<GraphIndexer>,
        profile: Arc<VocabProfile>,
        config: OrchestratorConfig,
    ) -> Self {
        let builder = if config.provenance {
            StatementBuilder::new(profile.clone()).with_provenance()
        } else {
            StatementBuilder::new(profile.clone())
        };
        let (cancel, _) = watch::channel(false);
        Self {
            repository,
            resolver,
            indexer,
            builder,
            profile,
            config,
            state: RwLock::new(RunState::Idle),
            cancel,
        }
    }

    /// Current run state, for observers.
    pub fn state(&self) -> RunState {
        *self.state.read().unwrap()
    }

    /// Request cancellation. A run that has not started fails with
    /// `Cancelled`; a running one stops scheduling new subjects and
    /// reports `cancelled`.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Ingest one graph. Always returns a report unless the index cannot
    /// be bootstrapped or the run was cancelled before it started.
    #[instrument(skip(self, graph), fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self, graph: &Graph) -> Result<RunReport, IngestError> {
        let started_at = Utc::now();
        if *self.cancel.borrow() {
            return Err(IngestError::Cancelled);
        }

        if let Err(e) = self.indexer.ensure_index().await {
            *self.state.write().unwrap() = RunState::Failed;
            return Err(e);
        }

        let subjects = graph.subjects();
        info!(
            subjects = subjects.len(),
            concurrency = self.config.concurrency,
            "Starting ingestion run"
        );

        let ctx = RunContext::new();

        *self.state.write().unwrap() = RunState::MaterializingSubjects;
        let phase_start = Instant::now();
        stream::iter(subjects.iter())
            .for_each_concurrent(Some(self.config.concurrency), |subject| {
                self.materialize(subject, graph, &ctx)
            })
            .await;
        info!(
            elapsed_ms = phase_start.elapsed().as_millis() as u64,
            "Materialize phase finished"
        );

        // The mapping is frozen at this boundary; linking reads the
        // snapshot only, so late writes can never skew relation targets.
        let mapping = ctx.mapping.lock().unwrap().clone();

        *self.state.write().unwrap() = RunState::LinkingSubjects;
        let phase_start = Instant::now();
        stream::iter(subjects.iter())
            .for_each_concurrent(Some(self.config.concurrency), |subject| {
                self.link(subject, graph, &mapping, &ctx)
            })
            .await;
        info!(
            elapsed_ms = phase_start.elapsed().as_millis() as u64,
            "Link phase finished"
        );

        *self.state.write().unwrap() = RunState::Done;
        let cancelled = *self.cancel.borrow();
        let report = ctx.into_report(subjects.len(), cancelled, started_at);
        info!(
            created = report.created,
            resolved = report.resolved,
            linked = report.linked,
            failures = report.failures.len(),
            cancelled = report.cancelled,
            "Ingestion run finished"
        );
        Ok(report)
    }

    /// Phase one: establish a canonical location for one subject.
    async fn materialize(&self, subject: &Term, graph: &Graph, ctx: &RunContext) {
        if *self.cancel.borrow() {
            return;
        }
        if ctx.mapping.lock().unwrap().contains_key(subject) {
            return;
        }

        let candidates = self.profile.candidates(graph, subject);
        match candidates.first().map(|c| normalize_identifier(&c.value)) {
            Some(key) => {
                let slot = ctx.gate.slot(&key);
                let mut claim = slot.lock().await;
                if let Some(location) = claim.clone() {
                    debug!(
                        subject = %subject.lexical(),
                        location = %location,
                        "Reusing location established for an identical identity"
                    );
                    ctx.record(subject, &location);
                    ctx.resolved.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                if let Some(location) = self.establish(subject, graph, &candidates, ctx).await {
                    *claim = Some(location);
                }
            }
            // No identifying value means nothing to deduplicate on.
            None => {
                self.establish(subject, graph, &candidates, ctx).await;
            }
        }
    }

    /// Resolve-or-create for one subject. Returns the established
    /// location when one exists afterwards.
    async fn establish(
        &self,
        subject: &Term,
        graph: &Graph,
        candidates: &[Candidate],
        ctx: &RunContext,
    ) -> Option<Location> {
        match self.resolver.resolve(candidates).await {
            Ok(Some(location)) => {
                debug!(subject = %subject.lexical(), location = %location, "Resolved subject");
                ctx.record(subject, &location);
                ctx.resolved.fetch_add(1, Ordering::SeqCst);
                Some(location)
            }
            Ok(None) => self.create(subject, graph, ctx).await,
            // With resolution unavailable a create could duplicate an
            // already materialized entity, so the subject is skipped.
            Err(e) => {
                warn!(subject = %subject.lexical(), error = %e, "Resolution failed, skipping subject");
                ctx.fail(subject, Phase::Materialize, None, &e);
                None
            }
        }
    }

    async fn create(&self, subject: &Term, graph: &Graph, ctx: &RunContext) -> Option<Location> {
        let statement = self.builder.build_create(subject, graph);
        match self.repository.create(&statement).await {
            Ok(location) => {
                debug!(subject = %subject.lexical(), location = %location, "Created subject");
                ctx.record(subject, &location);
                ctx.created.fetch_add(1, Ordering::SeqCst);
                Some(location)
            }
            Err(e) => {
                warn!(
                    subject = %subject.lexical(),
                    error = %e,
                    "Create failed, materializing a placeholder"
                );
                let placeholder = self.builder.build_placeholder(subject);
                match self.repository.create(&placeholder).await {
                    Ok(location) => {
                        ctx.record(subject, &location);
                        ctx.fail(subject, Phase::Materialize, Some(&location), &e);
                        Some(location)
                    }
                    Err(second) => {
                        error!(
                            subject = %subject.lexical(),
                            error = %second,
                            "Placeholder create failed, subject left unmaterialized"
                        );
                        ctx.fail(subject, Phase::Materialize, None, &second);
                        None
                    }
                }
            }
        }
    }

    /// Phase two: patch one subject's relations and refresh its index
    /// entry. Subjects without an established location were already
    /// reported in phase one and are skipped here.
    async fn link(
        &self,
        subject: &Term,
        graph: &Graph,
        mapping: &HashMap<Term, Location>,
        ctx: &RunContext,
    ) {
        if *self.cancel.borrow() {
            return;
        }
        let Some(location) = mapping.get(subject) else {
            return;
        };

        let statement = self.builder.build_patch(subject, graph, mapping);
        if let Err(e) = self.repository.patch(location, &statement).await {
            error!(
                subject = %subject.lexical(),
                location = %location,
                statement = %statement.text,
                error = %e,
                "Patch failed"
            );
            ctx.fail(subject, Phase::Link, Some(location), &e);
            return;
        }

        let ids = ctx.ids.lock().unwrap().clone();
        match self.indexer.index(location, &ids).await {
            Ok(doc_id) => {
                ctx.ids
                    .lock()
                    .unwrap()
                    .insert(location.as_str().to_string(), doc_id);
                ctx.linked.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                error!(
                    subject = %subject.lexical(),
                    location = %location,
                    error = %e,
                    "Index refresh failed"
                );
                ctx.fail(subject, Phase::Link, Some(location), &e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;

    use crate::resolver::IndexResolver;
    use bibgraph_repository::{
        RepositoryError, SearchError, SearchHit, SearchIndex,
    };
    use bibgraph_shared::profile::ns;
    use bibgraph_shared::{
        DocumentKind, RepositoryObject, SearchDocument, Statement,
    };

    fn expand(profile: &VocabProfile, name: &str) -> String {
        if let Some((prefix, local)) = name.split_once(':') {
            for (p, namespace) in &profile.prefixes {
                if p == prefix {
                    return format!("{}{}", namespace, local);
                }
            }
        }
        name.to_string()
    }

    /// Parse the `<> predicate object .` rows out of a statement body,
    /// expanding prefixed predicates back to absolute IRIs.
    fn parse_rows(profile: &VocabProfile, text: &str) -> Vec<(String, Term)> {
        let mut rows = Vec::new();
        for line in text.lines() {
            let Some(rest) = line.trim().strip_prefix("<> ") else {
                continue;
            };
            let rest = rest.strip_suffix(" .").unwrap_or(rest);
            let Some((pred_raw, obj_raw)) = rest.split_once(' ') else {
                continue;
            };
            let predicate = match pred_raw.strip_prefix('<') {
                Some(iri) => iri.trim_end_matches('>').to_string(),
                None => expand(profile, pred_raw),
            };
            let object = match obj_raw.strip_prefix('<') {
                Some(iri) => Term::iri(iri.trim_end_matches('>')),
                None => Term::literal(obj_raw.trim_matches('"').trim_matches('\'')),
            };
            rows.push((predicate, object));
        }
        rows
    }

    /// Failure injection for `FakeRepository`, matched against the
    /// statement text of the failing request (or the stored document id
    /// for fetches).
    #[derive(Default)]
    struct RepositoryFaults {
        create_containing: Option<String>,
        patch_containing: Option<String>,
        fetch_id: Option<String>,
    }

    impl RepositoryFaults {
        fn create_containing(needle: &str) -> Self {
            Self {
                create_containing: Some(needle.to_string()),
                ..Self::default()
            }
        }

        fn patch_containing(needle: &str) -> Self {
            Self {
                patch_containing: Some(needle.to_string()),
                ..Self::default()
            }
        }

        fn fetch_id(id: &str) -> Self {
            Self {
                fetch_id: Some(id.to_string()),
                ..Self::default()
            }
        }
    }

    /// In-memory repository that stores statements row by row, the way
    /// the real one persists them.
    struct FakeRepository {
        profile: Arc<VocabProfile>,
        counter: AtomicUsize,
        creates: AtomicUsize,
        objects: Mutex<HashMap<String, RepositoryObject>>,
        faults: RepositoryFaults,
        create_hook: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
    }

    impl FakeRepository {
        fn new(profile: Arc<VocabProfile>, faults: RepositoryFaults) -> Self {
            Self {
                profile,
                counter: AtomicUsize::new(0),
                creates: AtomicUsize::new(0),
                objects: Mutex::new(HashMap::new()),
                faults,
                create_hook: Mutex::new(None),
            }
        }

        fn seed(&self, object: RepositoryObject) {
            self.objects
                .lock()
                .unwrap()
                .insert(object.location.as_str().to_string(), object);
        }

        /// Run a closure after every successful create.
        fn set_create_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
            *self.create_hook.lock().unwrap() = Some(Box::new(hook));
        }
    }

    #[async_trait]
    impl ObjectRepository for FakeRepository {
        async fn create(&self, statement: &Statement) -> Result<Location, RepositoryError> {
            if let Some(needle) = &self.faults.create_containing {
                if statement.text.contains(needle.as_str()) {
                    return Err(RepositoryError::transport("simulated connection reset"));
                }
            }
            self.creates.fetch_add(1, Ordering::SeqCst);
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            let location = Location::new(format!("http://repo.test/rest/{}", n));
            let mut properties: BTreeMap<String, Vec<Term>> = BTreeMap::new();
            for (predicate, object) in parse_rows(&self.profile, &statement.text) {
                properties.entry(predicate).or_default().push(object);
            }
            self.seed(RepositoryObject {
                location: location.clone(),
                id: format!("doc-{}", n),
                created: Utc::now(),
                modified: Utc::now(),
                properties,
            });
            if let Some(hook) = self.create_hook.lock().unwrap().as_ref() {
                hook();
            }
            Ok(location)
        }

        async fn patch(
            &self,
            location: &Location,
            statement: &Statement,
        ) -> Result<(), RepositoryError> {
            if let Some(needle) = &self.faults.patch_containing {
                if statement.text.contains(needle.as_str()) {
                    return Err(RepositoryError::transport("simulated connection reset"));
                }
            }
            let mut objects = self.objects.lock().unwrap();
            let object = objects
                .get_mut(location.as_str())
                .ok_or_else(|| RepositoryError::not_found(location.as_str()))?;
            for (predicate, value) in parse_rows(&self.profile, &statement.text) {
                object.properties.entry(predicate).or_default().push(value);
            }
            Ok(())
        }

        async fn fetch(&self, location: &Location) -> Result<RepositoryObject, RepositoryError> {
            let object = self
                .objects
                .lock()
                .unwrap()
                .get(location.as_str())
                .cloned()
                .ok_or_else(|| RepositoryError::not_found(location.as_str()))?;
            if self.faults.fetch_id.as_deref() == Some(object.id.as_str()) {
                return Err(RepositoryError::transport("simulated connection reset"));
            }
            Ok(object)
        }
    }

    /// In-memory search index keyed by document id, matching exactly on
    /// stored body values and returning hits in ascending id order.
    struct FakeSearchIndex {
        docs: Mutex<BTreeMap<String, SearchDocument>>,
        fail_bootstrap: bool,
    }

    impl FakeSearchIndex {
        fn new(fail_bootstrap: bool) -> Self {
            Self {
                docs: Mutex::new(BTreeMap::new()),
                fail_bootstrap,
            }
        }

        fn seed(&self, document: SearchDocument) {
            self.docs
                .lock()
                .unwrap()
                .insert(document.id.clone(), document);
        }
    }

    #[async_trait]
    impl SearchIndex for FakeSearchIndex {
        async fn ensure_index(&self) -> Result<(), SearchError> {
            if self.fail_bootstrap {
                return Err(SearchError::index_creation("simulated refusal"));
            }
            Ok(())
        }

        async fn find_exact(&self, field: &str, value: &str) -> Result<Vec<SearchHit>, SearchError> {
            let docs = self.docs.lock().unwrap();
            let mut hits = Vec::new();
            for (id, doc) in docs.iter() {
                let matched = doc
                    .body
                    .get(field)
                    .map(|values| values.iter().any(|v| v.as_str() == Some(value)))
                    .unwrap_or(false);
                if matched {
                    hits.push(SearchHit::from_source(id.clone(), doc.to_index_body()));
                }
            }
            Ok(hits)
        }

        async fn upsert(&self, document: &SearchDocument) -> Result<(), SearchError> {
            self.seed(document.clone());
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    struct Harness {
        repository: Arc<FakeRepository>,
        index: Arc<FakeSearchIndex>,
        orchestrator: Arc<IngestOrchestrator>,
    }

    fn harness(
        config: OrchestratorConfig,
        faults: RepositoryFaults,
        fail_bootstrap: bool,
    ) -> Harness {
        let profile = Arc::new(VocabProfile::default());
        let repository = Arc::new(FakeRepository::new(profile.clone(), faults));
        let index = Arc::new(FakeSearchIndex::new(fail_bootstrap));
        let resolver = Arc::new(IndexResolver::new(index.clone()));
        let indexer = Arc::new(GraphIndexer::new(
            repository.clone(),
            index.clone(),
            profile.clone(),
        ));
        let orchestrator = Arc::new(IngestOrchestrator::new(
            repository.clone(),
            resolver,
            indexer,
            profile,
            config,
        ));
        Harness {
            repository,
            index,
            orchestrator,
        }
    }

    fn serial() -> OrchestratorConfig {
        OrchestratorConfig {
            concurrency: 1,
            ..OrchestratorConfig::default()
        }
    }

    fn work(n: u32) -> Term {
        Term::iri(format!("http://example.org/work/{}", n))
    }

    /// A work and an instance derived from it.
    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        graph.insert(work(0), ns::RDF_TYPE, Term::iri(format!("{}Work", ns::BF)));
        graph.insert(
            work(0),
            format!("{}authorizedAccessPoint", ns::BF),
            Term::literal("Melville, Herman. Moby Dick"),
        );
        graph.insert(
            work(1),
            ns::RDF_TYPE,
            Term::iri(format!("{}Instance", ns::BF)),
        );
        graph.insert(
            work(1),
            format!("{}titleValue", ns::BF),
            Term::literal("Moby Dick"),
        );
        graph.insert(work(1), format!("{}derivedFrom", ns::BF), work(0));
        graph
    }

    #[tokio::test]
    async fn test_run_materializes_then_links() {
        let h = harness(serial(), RepositoryFaults::default(), false);
        let report = h.orchestrator.run(&sample_graph()).await.unwrap();

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.subjects_total, 2);
        assert_eq!(report.created, 2);
        assert_eq!(report.resolved, 0);
        assert_eq!(report.linked, 2);
        assert!(report.failures.is_empty());
        assert!(!report.cancelled);

        // the relation was patched to the work's repository location
        let objects = h.repository.objects.lock().unwrap();
        let instance = objects
            .values()
            .find(|o| o.properties.contains_key(&format!("{}derivedFrom", ns::BF)))
            .unwrap();
        let target = instance.values(&format!("{}derivedFrom", ns::BF))[0]
            .as_iri()
            .unwrap();
        assert!(target.starts_with("http://repo.test/rest/"));
    }

    #[tokio::test]
    async fn test_index_entry_rewrites_linked_reference_to_doc_id() {
        let h = harness(serial(), RepositoryFaults::default(), false);
        h.orchestrator.run(&sample_graph()).await.unwrap();

        // serial order indexes the work first, so the instance's entry
        // sees its document id
        let docs = h.index.docs.lock().unwrap();
        let instance = docs
            .values()
            .find(|d| d.kind == DocumentKind::Instance)
            .unwrap();
        assert_eq!(instance.body["bf:derivedFrom"], vec![json!("doc-0")]);
    }

    #[tokio::test]
    async fn test_resolution_reuses_prior_location() {
        let h = harness(serial(), RepositoryFaults::default(), false);

        // an entity left behind by an earlier run
        h.repository.seed(RepositoryObject {
            location: Location::new("http://repo.test/rest/prior"),
            id: "doc-prior".to_string(),
            created: Utc::now(),
            modified: Utc::now(),
            properties: BTreeMap::new(),
        });
        let mut doc = SearchDocument::new("doc-prior", DocumentKind::Work);
        doc.locations.push(Location::new("http://repo.test/rest/prior"));
        doc.push(
            "bf:authorizedAccessPoint",
            json!("Melville, Herman. Moby Dick"),
        );
        h.index.seed(doc);

        let report = h.orchestrator.run(&sample_graph()).await.unwrap();
        assert_eq!(report.resolved, 1);
        assert_eq!(report.created, 1);
        assert_eq!(h.repository.creates.load(Ordering::SeqCst), 1);

        // the instance's relation points at the prior location
        let objects = h.repository.objects.lock().unwrap();
        let instance = objects
            .values()
            .find(|o| o.properties.contains_key(&format!("{}derivedFrom", ns::BF)))
            .unwrap();
        assert_eq!(
            instance.values(&format!("{}derivedFrom", ns::BF))[0].as_iri(),
            Some("http://repo.test/rest/prior")
        );
    }

    #[tokio::test]
    async fn test_second_run_creates_nothing() {
        let h = harness(serial(), RepositoryFaults::default(), false);
        let first = h.orchestrator.run(&sample_graph()).await.unwrap();
        assert_eq!(first.created, 2);

        let second = h.orchestrator.run(&sample_graph()).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.resolved, 2);
        assert_eq!(h.repository.creates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_failure_falls_back_to_placeholder() {
        let h = harness(serial(), RepositoryFaults::create_containing("Faulty Book"), false);
        let mut graph = sample_graph();
        graph.insert(
            work(2),
            format!("{}titleValue", ns::BF),
            Term::literal("Faulty Book"),
        );

        let report = h.orchestrator.run(&graph).await.unwrap();
        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.created, 2);
        assert_eq!(report.failed_in(Phase::Materialize), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.subject, "http://example.org/work/2");
        assert!(failure.location.is_some());
        // the placeholder still participates in linking
        assert_eq!(report.linked, 3);

        let objects = h.repository.objects.lock().unwrap();
        let placeholder = objects
            .get(failure.location.as_deref().unwrap())
            .unwrap();
        assert_eq!(
            placeholder.values(ns::OWL_SAME_AS)[0].lexical(),
            "http://example.org/work/2"
        );
    }

    #[tokio::test]
    async fn test_identical_identities_create_once() {
        let h = harness(OrchestratorConfig::default(), RepositoryFaults::default(), false);
        let mut graph = Graph::new();
        graph.insert(
            work(0),
            format!("{}label", ns::BF),
            Term::literal("Same Entity"),
        );
        graph.insert(
            work(1),
            format!("{}label", ns::BF),
            Term::literal("Same  Entity"),
        );

        let report = h.orchestrator.run(&graph).await.unwrap();
        assert_eq!(h.repository.creates.load(Ordering::SeqCst), 1);
        assert_eq!(report.created, 1);
        assert_eq!(report.resolved, 1);
        assert_eq!(report.linked, 2);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_fatal() {
        let h = harness(serial(), RepositoryFaults::default(), true);
        let err = h.orchestrator.run(&sample_graph()).await.unwrap_err();
        assert!(matches!(err, IngestError::IndexBootstrap(_)));
        assert_eq!(h.orchestrator.state(), RunState::Failed);
        assert_eq!(h.repository.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_before_run() {
        let h = harness(serial(), RepositoryFaults::default(), false);
        h.orchestrator.cancel();
        let err = h.orchestrator.run(&sample_graph()).await.unwrap_err();
        assert!(matches!(err, IngestError::Cancelled));
        assert_eq!(h.repository.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_patch_failure_is_contained_to_one_subject() {
        // only the instance's patch carries the relation, so the fault
        // hits work/1 and leaves work/0 alone
        let h = harness(serial(), RepositoryFaults::patch_containing("derivedFrom"), false);
        let report = h.orchestrator.run(&sample_graph()).await.unwrap();

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.created, 2);
        assert_eq!(report.linked, 1);
        assert_eq!(report.failed_in(Phase::Link), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.subject, "http://example.org/work/1");
        assert!(failure.location.is_some());

        // the healthy subject still made it into the index
        assert_eq!(h.index.docs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_index_refresh_failure_is_contained_to_one_subject() {
        // serial order assigns doc-0 to the work and doc-1 to the
        // instance, so the fetch fault fires during the instance's
        // index refresh after its patch already landed
        let h = harness(serial(), RepositoryFaults::fetch_id("doc-1"), false);
        let report = h.orchestrator.run(&sample_graph()).await.unwrap();

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.linked, 1);
        assert_eq!(report.failed_in(Phase::Link), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.subject, "http://example.org/work/1");
        assert!(failure.location.is_some());
    }

    #[tokio::test]
    async fn test_cancel_mid_run_stops_scheduling() {
        let h = harness(serial(), RepositoryFaults::default(), false);
        let orchestrator = h.orchestrator.clone();
        h.repository
            .set_create_hook(move || orchestrator.cancel());

        let mut graph = Graph::new();
        for n in 0..4 {
            graph.insert(
                work(n),
                format!("{}titleValue", ns::BF),
                Term::literal(format!("Title {}", n)),
            );
        }

        let report = h.orchestrator.run(&graph).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.created, 1);
        assert_eq!(report.linked, 0);
        assert!(report.failures.is_empty());
        // nothing was created after the cancellation landed
        assert_eq!(h.repository.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_multi_valued_properties_survive_indexing() {
        let h = harness(serial(), RepositoryFaults::default(), false);
        let mut graph = Graph::new();
        graph.insert(
            work(0),
            format!("{}label", ns::BF),
            Term::literal("Moby Dick"),
        );
        graph.insert(
            work(0),
            format!("{}label", ns::BF),
            Term::literal("The Whale"),
        );
        h.orchestrator.run(&graph).await.unwrap();

        let docs = h.index.docs.lock().unwrap();
        let doc = docs.values().next().unwrap();
        assert_eq!(
            doc.body["bf:label"],
            vec![json!("Moby Dick"), json!("The Whale")]
        );
    }
}
