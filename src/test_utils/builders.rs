use std::sync::Arc;

use bytes::Bytes;
use prost::Message;
use tokio::sync::mpsc;

use crate::cas::Blob;
use crate::cas::ContentAddressableStorage;
use crate::cas::DelegateCasActionCache;
use crate::cas::MemoryCas;
use crate::config::InstanceConfig;
use crate::digest::DigestUtil;
use crate::execution::MemoryInstance;
use crate::execution::Watcher;
use crate::execution::WatcherDecision;
use crate::proto::Action;
use crate::proto::Command;
use crate::proto::Digest;
use crate::proto::Operation;
use crate::proto::Platform;
use crate::proto::Property;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// Scenario configuration: 60s default action timeout, 10s completion
/// grace, 5s poll window.
pub fn scenario_config() -> InstanceConfig {
    InstanceConfig {
        maximum_action_timeout_ms: 600_000,
        default_action_timeout_ms: 60_000,
        operation_poll_timeout_ms: 5_000,
        operation_completed_delay_ms: 10_000,
        ..Default::default()
    }
}

pub struct TestContext {
    pub instance: Arc<MemoryInstance>,
    pub cas: Arc<MemoryCas>,
    pub digest_util: DigestUtil,
}

/// An instance wired to an in-memory CAS and a delegate-CAS action cache.
pub fn setup_instance(config: InstanceConfig) -> TestContext {
    enable_logger();
    let cas = Arc::new(MemoryCas::new(1 << 30));
    let cas_dyn: Arc<dyn ContentAddressableStorage> = cas.clone();
    let action_cache = Arc::new(DelegateCasActionCache::new(cas_dyn.clone(), DigestUtil));
    let instance = MemoryInstance::with_components("test", config, cas_dyn, action_cache);
    TestContext {
        instance,
        cas,
        digest_util: DigestUtil,
    }
}

pub fn platform(pairs: &[(&str, &str)]) -> Platform {
    Platform {
        properties: pairs
            .iter()
            .map(|(name, value)| Property {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

/// Uploads a command with the given platform requirements and returns an
/// action referencing it.
pub async fn prepare_action(
    cas: &Arc<MemoryCas>,
    requirements: Platform,
    timeout_ms: Option<u64>,
) -> Action {
    let command = Command {
        arguments: vec!["/bin/true".to_string()],
        platform: Some(requirements),
    };
    let command_digest = upload_message(cas, &command).await;
    Action {
        command_digest: Some(command_digest),
        input_root_digest: None,
        timeout: timeout_ms.map(crate::utils::duration_from_millis),
        do_not_cache: false,
    }
}

pub async fn upload_message<M: Message>(
    cas: &Arc<MemoryCas>,
    message: &M,
) -> Digest {
    let blob = Blob::new(Bytes::from(message.encode_to_vec()), &DigestUtil);
    cas.put(blob).await.expect("should succeed")
}

/// A watcher that records every observed snapshot and keeps watching until
/// the terminal one.
pub fn recording_watcher() -> (Watcher, mpsc::UnboundedReceiver<Option<Operation>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher: Watcher = Arc::new(move |operation: Option<&Operation>| {
        let _ = tx.send(operation.cloned());
        WatcherDecision::Continue
    });
    (watcher, rx)
}

/// A watcher that deregisters after the first observation.
pub fn one_shot_watcher() -> (Watcher, mpsc::UnboundedReceiver<Option<Operation>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher: Watcher = Arc::new(move |operation: Option<&Operation>| {
        let _ = tx.send(operation.cloned());
        WatcherDecision::Done
    });
    (watcher, rx)
}
