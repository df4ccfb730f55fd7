use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use autometrics::autometrics;
use bytes::Bytes;
use dashmap::DashMap;
use prost::Message;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use super::matcher::Matcher;
use super::matcher::OnMatch;
use super::matcher::QueuedEntry;
use super::operations::CompletedOperations;
use super::operations::OperationsMap;
use super::operations::OutstandingOperations;
use super::paging;
use super::stream::OperationStreamWrite;
use super::stream::StreamReader;
use super::stream::StreamRegistry;
use super::tree;
use super::watchdog::Watchdog;
use super::watcher::Watcher;
use super::watcher::WatcherDecision;
use super::watcher::WatcherRegistry;
use crate::cas::create_action_cache;
use crate::cas::ActionCache;
use crate::cas::Blob;
use crate::cas::ContentAddressableStorage;
use crate::cas::MemoryCas;
use crate::config::CasConfig;
use crate::config::InstanceConfig;
use crate::config::SchedulerConfig;
use crate::constants::OPERATIONS_SEGMENT;
use crate::constants::STDERR_STREAM_SUFFIX;
use crate::constants::STDOUT_STREAM_SUFFIX;
use crate::constants::TIMEOUT_OUT_OF_BOUNDS;
use crate::constants::VIOLATION_TYPE_INVALID;
use crate::digest::DigestUtil;
use crate::proto::code;
use crate::proto::operation;
use crate::proto::pack_any;
use crate::proto::precondition_failure::Violation;
use crate::proto::unpack_any;
use crate::proto::Action;
use crate::proto::Command;
use crate::proto::Digest;
use crate::proto::Directory;
use crate::proto::ExecuteOperationMetadata;
use crate::proto::ExecuteResponse;
use crate::proto::ExecutionStage;
use crate::proto::Operation;
use crate::proto::Platform;
use crate::proto::PreconditionFailure;
use crate::proto::Status;
use crate::proto::EXECUTE_OPERATION_METADATA_TYPE_URL;
use crate::proto::EXECUTE_RESPONSE_TYPE_URL;
use crate::utils::duration_add;
use crate::utils::duration_cmp;
use crate::utils::duration_format;
use crate::utils::duration_from_millis;
use crate::utils::duration_to_std;
use crate::ExecutionError;
use crate::Result;
use crate::API_SLO;

/// Decodes the `ExecuteOperationMetadata` carried by an operation.
pub fn operation_metadata(operation: &Operation) -> Option<ExecuteOperationMetadata> {
    operation
        .metadata
        .as_ref()
        .and_then(|any| unpack_any(any).ok())
}

pub fn operation_stage(operation: &Operation) -> ExecutionStage {
    operation_metadata(operation)
        .and_then(|metadata| ExecutionStage::try_from(metadata.stage).ok())
        .unwrap_or(ExecutionStage::Unknown)
}

/// Clones an operation with its metadata stage replaced.
pub fn with_stage(
    operation: &Operation,
    stage: ExecutionStage,
) -> Operation {
    let mut metadata = operation_metadata(operation).unwrap_or_default();
    metadata.stage = stage as i32;
    let mut updated = operation.clone();
    updated.metadata = Some(pack_any(EXECUTE_OPERATION_METADATA_TYPE_URL, &metadata));
    updated
}

pub fn is_executing(operation: &Operation) -> bool {
    !operation.done && operation_stage(operation) == ExecutionStage::Executing
}

fn terminal_operation(
    operation: &Operation,
    response: ExecuteResponse,
) -> Operation {
    let mut done = with_stage(operation, ExecutionStage::Completed);
    done.done = true;
    done.result = Some(operation::Result::Response(pack_any(
        EXECUTE_RESPONSE_TYPE_URL,
        &response,
    )));
    done
}

/// The in-memory operation lifecycle engine.
///
/// Owns every operation record between acceptance and terminal write:
/// assigns names, arbitrates the queue/worker rendezvous, arms and disarms
/// the per-operation watchdogs, and fans updates out to watchers. Nothing
/// here survives a restart; only blobs and archived results live in the
/// CAS.
pub struct MemoryInstance {
    name: String,
    config: InstanceConfig,
    digest_util: DigestUtil,
    cas: Arc<dyn ContentAddressableStorage>,
    action_cache: Arc<dyn ActionCache>,
    outstanding: Arc<OutstandingOperations>,
    completed: Arc<dyn OperationsMap>,
    watchers: Arc<WatcherRegistry>,
    matcher: Matcher,
    streams: StreamRegistry,
    /// Requeue guards, petted by worker polls.
    requeuers: DashMap<String, Watchdog>,
    /// Absolute completion deadlines, never petted.
    completion_fuses: DashMap<String, Watchdog>,
    /// Name-interned locks serialising higher-level transitions.
    op_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl MemoryInstance {
    /// Builds an instance with the bindings selected by `config`.
    pub fn new(
        name: impl Into<String>,
        config: SchedulerConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let digest_util = DigestUtil;
        let cas: Arc<dyn ContentAddressableStorage> = match &config.cas {
            CasConfig::Memory { max_size_bytes } => Arc::new(MemoryCas::new(*max_size_bytes)),
        };
        let action_cache = create_action_cache(&config.action_cache, Arc::clone(&cas), digest_util)?;
        Ok(Self::with_components(
            name,
            config.instance,
            cas,
            action_cache,
        ))
    }

    /// Assembles an instance from explicit collaborators. Primarily for
    /// tests injecting mocks.
    pub fn with_components(
        name: impl Into<String>,
        config: InstanceConfig,
        cas: Arc<dyn ContentAddressableStorage>,
        action_cache: Arc<dyn ActionCache>,
    ) -> Arc<Self> {
        let digest_util = DigestUtil;
        let completed = Arc::new(CompletedOperations::new(Arc::clone(&cas), digest_util));
        Arc::new(Self {
            name: name.into(),
            config,
            digest_util,
            cas,
            action_cache,
            outstanding: Arc::new(OutstandingOperations::new()),
            completed,
            watchers: Arc::new(WatcherRegistry::new()),
            matcher: Matcher::new(),
            streams: StreamRegistry::new(),
            requeuers: DashMap::new(),
            completion_fuses: DashMap::new(),
            op_locks: DashMap::new(),
        })
    }

    pub fn instance_name(&self) -> &str {
        &self.name
    }

    // ---- client surface ----------------------------------------------

    /// Accepts an action for execution and returns the operation tracking
    /// it. Unless `skip_cache_lookup` is set, a cached result completes the
    /// operation immediately without queueing.
    pub async fn execute(
        self: &Arc<Self>,
        action: Action,
        skip_cache_lookup: bool,
    ) -> Result<Operation> {
        self.validate_action(&action)?;

        let action_blob = Blob::new(Bytes::from(action.encode_to_vec()), &self.digest_util);
        let action_digest = action_blob.digest().clone();
        let name = format!("{}/{}/{}", self.name, OPERATIONS_SEGMENT, Uuid::new_v4());
        debug!(operation = %name, action = %action_digest.hash, "accepting action");

        let metadata = ExecuteOperationMetadata {
            stage: ExecutionStage::CacheCheck as i32,
            action_digest: Some(action_digest),
            stdout_stream_name: format!("{name}/{STDOUT_STREAM_SUFFIX}"),
            stderr_stream_name: format!("{name}/{STDERR_STREAM_SUFFIX}"),
        };
        let operation = Operation {
            name: name.clone(),
            metadata: Some(pack_any(EXECUTE_OPERATION_METADATA_TYPE_URL, &metadata)),
            done: false,
            result: None,
        };

        let lock = self.lock_for(&name);
        let _guard = lock.lock().await;
        self.outstanding.put(&name, operation.clone()).await?;

        if !skip_cache_lookup {
            let key = self.digest_util.action_key(&action);
            match self.action_cache.get(&key).await {
                Ok(Some(result)) => {
                    info!(operation = %name, "action cache hit");
                    let response = ExecuteResponse {
                        result: Some(result),
                        cached_result: true,
                        status: Some(Status {
                            code: code::OK,
                            ..Default::default()
                        }),
                    };
                    let done = terminal_operation(&operation, response);
                    self.transition_terminal_locked(done.clone()).await?;
                    return Ok(done);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(operation = %name, error = %e, "action cache probe failed; queueing")
                }
            }
        }

        // the action must be resolvable for the rest of the lifecycle
        self.cas.put(action_blob).await?;
        let Some(requirements) = self.resolve_requirements(&operation).await? else {
            self.outstanding.remove(&name).await?;
            let missing = action.command_digest.clone().unwrap_or_default();
            return Err(ExecutionError::MissingBlob(missing).into());
        };

        let queued = with_stage(&operation, ExecutionStage::Queued);
        self.put_queued_locked(queued.clone(), requirements).await?;
        Ok(queued)
    }

    /// Registers a watcher with at-least-once delivery of the terminal
    /// snapshot. Returns `false` when the operation is unknown or already
    /// terminal and the watcher declined to process that state.
    #[autometrics(objective = API_SLO)]
    pub async fn watch_operation(
        &self,
        name: &str,
        watcher: Watcher,
    ) -> Result<bool> {
        let operation = self.get_operation(name).await?;
        if (watcher.as_ref())(operation.as_ref()) == WatcherDecision::Done {
            // watcher processed the current (possibly terminal) state
            return Ok(true);
        }
        match &operation {
            None => return Ok(false),
            Some(op) if op.done => return Ok(false),
            Some(_) => {}
        }

        let id = self.watchers.put(name, Arc::clone(&watcher));

        // close the race with a completion between the read and the
        // registration: re-read and deliver the terminal state ourselves
        let operation = self.get_operation(name).await?;
        if operation.is_none() || operation.as_ref().is_some_and(|op| op.done) {
            self.watchers.remove(name, id);
            return Ok((watcher.as_ref())(operation.as_ref()) == WatcherDecision::Done);
        }
        Ok(true)
    }

    #[autometrics(objective = API_SLO)]
    pub async fn get_operation(
        &self,
        name: &str,
    ) -> Result<Option<Operation>> {
        if let Some(operation) = self.outstanding.get(name).await? {
            return Ok(Some(operation));
        }
        self.completed.get(name).await
    }

    /// Pages over the in-flight operation set in key order.
    #[autometrics(objective = API_SLO)]
    pub async fn list_operations(
        &self,
        page_size: u32,
        page_token: &str,
    ) -> Result<(Vec<Operation>, String)> {
        paging::list_operations(
            &self.outstanding,
            page_size,
            page_token,
            self.config.list_operations_default_page_size,
            self.config.list_operations_max_page_size,
        )
    }

    /// Pages over the directory tree rooted at `root_digest`.
    pub async fn get_tree(
        &self,
        root_digest: &Digest,
        page_size: u32,
        page_token: &str,
    ) -> Result<(Vec<Directory>, String)> {
        tree::get_tree(
            &self.cas,
            root_digest,
            page_size,
            page_token,
            self.config.tree_default_page_size,
            self.config.tree_max_page_size,
        )
        .await
    }

    // ---- worker surface ----------------------------------------------

    /// Worker entry point: offers `platform` against the queue. Either an
    /// operation is dispatched through `on_match`, or the offer parks until
    /// a compatible enqueue consumes it.
    pub async fn match_worker(
        self: &Arc<Self>,
        platform: Platform,
        on_match: OnMatch,
    ) -> Result<()> {
        let outcome = self.matcher.offer(platform, on_match).await?;
        if let Some(dispatched) = outcome.dispatched {
            let lock = self.lock_for(&dispatched.name);
            let _guard = lock.lock().await;
            // dispatch against the live snapshot; the queue copy may lag
            if let Some(current) = self.outstanding.get(&dispatched.name).await? {
                if !current.done {
                    self.on_dispatched_locked(&current).await?;
                }
            }
        }
        for entry in outcome.set_aside {
            self.requeue_entry(entry).await?;
        }
        Ok(())
    }

    /// Worker liveness signal. Pets the requeue watchdog when `stage` is
    /// compatible with the operation's current stage.
    pub async fn poll_operation(
        &self,
        name: &str,
        stage: ExecutionStage,
    ) -> bool {
        if !matches!(stage, ExecutionStage::Queued | ExecutionStage::Executing) {
            return false;
        }
        let Ok(Some(operation)) = self.outstanding.get(name).await else {
            return false;
        };
        if !is_executing(&operation) {
            return false;
        }
        let Some(requeuer) = self.requeuers.get(name) else {
            return false;
        };
        requeuer.pet();
        true
    }

    /// Applies a worker-reported operation update.
    ///
    /// Returns `false` — leaving all state unchanged — when the operation
    /// is unknown, its stage is not one a worker may report, or the action
    /// needed to arm the completion deadline is unresolvable.
    pub async fn put_operation(
        self: &Arc<Self>,
        operation: Operation,
    ) -> Result<bool> {
        let name = operation.name.clone();
        if name.is_empty() {
            return Ok(false);
        }
        let lock = self.lock_for(&name);
        let _guard = lock.lock().await;

        if operation.done {
            if !self.outstanding.contains(&name).await {
                debug!(operation = %name, "terminal put for unknown operation");
                return Ok(false);
            }
            let mut terminal = with_stage(&operation, ExecutionStage::Completed);
            terminal.done = true;
            self.transition_terminal_locked(terminal.clone()).await?;
            self.maybe_cache_result(&terminal).await;
            return Ok(true);
        }

        match operation_stage(&operation) {
            ExecutionStage::Executing => {
                if !self.outstanding.contains(&name).await {
                    return Ok(false);
                }
                // without the action the completion deadline is unknowable
                let Some(action) = self.expect_action(&operation).await? else {
                    debug!(operation = %name, "action content missing; rejecting put");
                    return Ok(false);
                };
                self.outstanding.put(&name, operation.clone()).await?;
                if let Some(requeuer) = self.requeuers.get(&name) {
                    requeuer.pet();
                } else {
                    // a worker asserting ownership restores the guard
                    self.install_requeuer(&name);
                }
                self.install_completion_fuse(&name, &action);
                self.watchers.fan_out(&operation);
                Ok(true)
            }
            ExecutionStage::Queued => {
                if !self.outstanding.contains(&name).await {
                    return Ok(false);
                }
                let Some(requirements) = self.resolve_requirements(&operation).await? else {
                    return Ok(false);
                };
                self.put_queued_locked(operation, requirements).await
            }
            _ => Ok(false),
        }
    }

    // ---- streams -----------------------------------------------------

    pub fn get_operation_stream_write(
        &self,
        name: &str,
    ) -> OperationStreamWrite<'_> {
        self.streams.write(name)
    }

    pub fn new_operation_stream_input(
        &self,
        name: &str,
        offset: u64,
    ) -> StreamReader {
        self.streams.source(name).open(offset)
    }

    // ---- introspection -----------------------------------------------

    pub async fn is_outstanding(
        &self,
        name: &str,
    ) -> bool {
        self.outstanding.contains(name).await
    }

    /// True when any watchdog is registered under `name`.
    pub fn has_watchdogs(
        &self,
        name: &str,
    ) -> bool {
        self.requeuers.contains_key(name) || self.completion_fuses.contains_key(name)
    }

    pub async fn queued_operation_count(&self) -> usize {
        self.matcher.queued_len().await
    }

    pub async fn parked_worker_count(&self) -> usize {
        self.matcher.parked_len().await
    }

    // ---- lifecycle internals -----------------------------------------

    fn lock_for(
        &self,
        name: &str,
    ) -> Arc<Mutex<()>> {
        self.op_locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn validate_action(
        &self,
        action: &Action,
    ) -> Result<()> {
        if let Some(timeout) = &action.timeout {
            if self.config.maximum_action_timeout_ms != 0 {
                let maximum = duration_from_millis(self.config.maximum_action_timeout_ms);
                if duration_cmp(timeout, &maximum) == Ordering::Greater {
                    let failure = PreconditionFailure {
                        violations: vec![Violation {
                            r#type: VIOLATION_TYPE_INVALID.to_string(),
                            subject: TIMEOUT_OUT_OF_BOUNDS.to_string(),
                            description: format!(
                                "{} > {}",
                                duration_format(timeout),
                                duration_format(&maximum)
                            ),
                        }],
                    };
                    return Err(ExecutionError::FailedPrecondition(failure).into());
                }
            }
        }
        Ok(())
    }

    async fn expect_action(
        &self,
        operation: &Operation,
    ) -> Result<Option<Action>> {
        let Some(digest) = operation_metadata(operation).and_then(|m| m.action_digest) else {
            return Ok(None);
        };
        match self.cas.get(&digest).await? {
            Some(bytes) => Ok(Some(Action::decode(bytes.as_ref())?)),
            None => Ok(None),
        }
    }

    async fn expect_command(
        &self,
        action: &Action,
    ) -> Result<Option<Command>> {
        let Some(digest) = &action.command_digest else {
            return Ok(None);
        };
        match self.cas.get(digest).await? {
            Some(bytes) => Ok(Some(Command::decode(bytes.as_ref())?)),
            None => Ok(None),
        }
    }

    /// Resolves the platform requirements of an operation's command.
    /// `None` when the action or command blob is missing.
    async fn resolve_requirements(
        &self,
        operation: &Operation,
    ) -> Result<Option<Platform>> {
        let Some(action) = self.expect_action(operation).await? else {
            return Ok(None);
        };
        let Some(command) = self.expect_command(&action).await? else {
            return Ok(None);
        };
        Ok(Some(command.platform.unwrap_or_default()))
    }

    /// Publishes a queued snapshot and runs the enqueue protocol. Assumes
    /// the operation-name lock is held.
    async fn put_queued_locked(
        self: &Arc<Self>,
        operation: Operation,
        requirements: Platform,
    ) -> Result<bool> {
        self.outstanding
            .put(&operation.name, operation.clone())
            .await?;
        self.watchers.fan_out(&operation);
        let entry = QueuedEntry {
            operation: operation.clone(),
            requirements,
        };
        if self.matcher.enqueue(entry).await? {
            self.on_dispatched_locked(&operation).await?;
        }
        Ok(true)
    }

    /// A worker accepted the operation: move it to `EXECUTING`, arm both
    /// watchdogs, fan out. Assumes the operation-name lock is held.
    async fn on_dispatched_locked(
        self: &Arc<Self>,
        operation: &Operation,
    ) -> Result<()> {
        let executing = with_stage(operation, ExecutionStage::Executing);
        debug!(operation = %executing.name, "dispatched");
        self.outstanding
            .put(&executing.name, executing.clone())
            .await?;
        self.install_requeuer(&executing.name);
        match self.expect_action(&executing).await? {
            Some(action) => self.install_completion_fuse(&executing.name, &action),
            None => warn!(
                operation = %executing.name,
                "action unresolvable at dispatch; no completion deadline armed"
            ),
        }
        self.watchers.fan_out(&executing);
        Ok(())
    }

    fn install_requeuer(
        self: &Arc<Self>,
        name: &str,
    ) {
        let timeout = Duration::from_millis(self.config.operation_poll_timeout_ms);
        let instance = Arc::clone(self);
        let operation_name = name.to_string();
        let requeuer = Watchdog::start(timeout, move || async move {
            if let Err(e) = instance.requeue_operation(&operation_name).await {
                warn!(operation = %operation_name, error = %e, "requeue failed");
            }
        });
        if let Some(previous) = self.requeuers.insert(name.to_string(), requeuer) {
            previous.stop();
        }
    }

    /// Arms the absolute completion deadline
    /// (`action timeout + operation_completed_delay`), explicitly stopping
    /// any predecessor so a fuse never fires twice for one dispatch.
    /// Without an action timeout or configured default, no fuse is armed.
    fn install_completion_fuse(
        self: &Arc<Self>,
        name: &str,
        action: &Action,
    ) {
        if let Some((_, previous)) = self.completion_fuses.remove(name) {
            previous.stop();
        }
        let action_timeout = action.timeout.clone().or_else(|| {
            (self.config.default_action_timeout_ms != 0)
                .then(|| duration_from_millis(self.config.default_action_timeout_ms))
        });
        let Some(action_timeout) = action_timeout else {
            return;
        };
        let delay = duration_from_millis(self.config.operation_completed_delay_ms);
        let timeout = duration_to_std(&duration_add(&action_timeout, &delay));
        let instance = Arc::clone(self);
        let operation_name = name.to_string();
        let fuse = Watchdog::start(timeout, move || async move {
            if let Err(e) = instance.expire_operation(&operation_name).await {
                warn!(operation = %operation_name, error = %e, "expire failed");
            }
        });
        self.completion_fuses.insert(name.to_string(), fuse);
    }

    /// Poll watchdog fired: the worker is considered lost and the operation
    /// returns to the queue. Idempotent against concurrent terminal puts.
    async fn requeue_operation(
        self: &Arc<Self>,
        name: &str,
    ) -> Result<()> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;
        self.requeuers.remove(name);
        if let Some((_, fuse)) = self.completion_fuses.remove(name) {
            fuse.stop();
        }
        let Some(current) = self.outstanding.get(name).await? else {
            return Ok(());
        };
        if current.done {
            return Ok(());
        }
        warn!(operation = %name, "poll deadline missed; returning operation to the queue");
        let Some(requirements) = self.resolve_requirements(&current).await? else {
            warn!(operation = %name, "action no longer resolvable; dropping requeue");
            return Ok(());
        };
        let queued = with_stage(&current, ExecutionStage::Queued);
        self.put_queued_locked(queued, requirements).await?;
        Ok(())
    }

    /// Re-enqueues an entry a match attempt set aside, through the same
    /// path a watchdog requeue takes so watcher delivery is preserved.
    async fn requeue_entry(
        self: &Arc<Self>,
        entry: QueuedEntry,
    ) -> Result<()> {
        let name = entry.operation.name.clone();
        let lock = self.lock_for(&name);
        let _guard = lock.lock().await;
        let Some(current) = self.outstanding.get(&name).await? else {
            return Ok(());
        };
        if current.done {
            return Ok(());
        }
        let queued = with_stage(&current, ExecutionStage::Queued);
        self.put_queued_locked(queued, entry.requirements).await?;
        Ok(())
    }

    /// Completion fuse fired: synthesise a deadline failure and complete
    /// the operation with it.
    async fn expire_operation(
        self: &Arc<Self>,
        name: &str,
    ) -> Result<()> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;
        self.completion_fuses.remove(name);
        let Some(current) = self.outstanding.get(name).await? else {
            return Ok(());
        };
        if current.done {
            return Ok(());
        }
        warn!(operation = %name, "action deadline exceeded; expiring");
        let response = ExecuteResponse {
            result: None,
            cached_result: false,
            status: Some(Status {
                code: code::DEADLINE_EXCEEDED,
                message: format!("execution of {name} did not complete within its deadline"),
                details: Vec::new(),
            }),
        };
        let expired = terminal_operation(&current, response);
        self.transition_terminal_locked(expired).await
    }

    /// The single terminal path: disarm both watchdogs, move the record
    /// from the in-flight map to the completed archive, fan out the final
    /// snapshot (which also clears the watcher registrations).
    async fn transition_terminal_locked(
        self: &Arc<Self>,
        operation: Operation,
    ) -> Result<()> {
        let name = operation.name.clone();
        if let Some((_, requeuer)) = self.requeuers.remove(&name) {
            requeuer.stop();
        }
        if let Some((_, fuse)) = self.completion_fuses.remove(&name) {
            fuse.stop();
        }
        self.outstanding.remove(&name).await?;
        self.completed.put(&name, operation.clone()).await?;
        self.watchers.fan_out(&operation);
        self.op_locks.remove(&name);
        info!(operation = %name, "completed");
        Ok(())
    }

    /// Best-effort upload of a successful, cacheable result to the action
    /// cache.
    async fn maybe_cache_result(
        &self,
        operation: &Operation,
    ) {
        let Some(operation::Result::Response(any)) = &operation.result else {
            return;
        };
        let Ok(response) = unpack_any::<ExecuteResponse>(any) else {
            return;
        };
        if response.cached_result {
            return;
        }
        if response.status.as_ref().is_some_and(|s| s.code != code::OK) {
            return;
        }
        let Some(result) = response.result else {
            return;
        };
        let Ok(Some(action)) = self.expect_action(operation).await else {
            return;
        };
        if action.do_not_cache {
            return;
        }
        let key = self.digest_util.action_key(&action);
        if let Err(e) = self.action_cache.put(&key, result).await {
            debug!(operation = %operation.name, error = %e, "action cache update failed");
        }
    }
}
