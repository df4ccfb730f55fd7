use std::sync::Arc;

use bytes::Bytes;
use bytes::BytesMut;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

/// Registry of named operation byte streams (stdout/stderr of executing
/// actions). `source()` is get-or-create; a source removes itself from the
/// registry when its writer closes, so a later open starts fresh.
#[derive(Default)]
pub struct StreamRegistry {
    streams: Arc<DashMap<String, Arc<StreamSource>>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(
        &self,
        name: &str,
    ) -> Arc<StreamSource> {
        let streams = Arc::clone(&self.streams);
        self.streams
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(%name, "creating stream source");
                let name = name.to_string();
                Arc::new(StreamSource::new(move || {
                    streams.remove(&name);
                }))
            })
            .clone()
    }

    /// Drops the named entry without closing its source; readers holding
    /// the old source drain it independently.
    pub fn reset(
        &self,
        name: &str,
    ) {
        self.streams.remove(name);
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.streams.contains_key(name)
    }

    /// A write handle over the named stream. Each call resolves the source
    /// afresh, so a handle survives a `reset` and simply starts a new
    /// stream.
    pub fn write(
        &self,
        name: &str,
    ) -> OperationStreamWrite<'_> {
        OperationStreamWrite {
            registry: self,
            name: name.to_string(),
        }
    }
}

/// Write-side view of one named operation stream.
pub struct OperationStreamWrite<'a> {
    registry: &'a StreamRegistry,
    name: String,
}

impl OperationStreamWrite<'_> {
    pub fn committed_size(&self) -> u64 {
        self.registry.source(&self.name).committed_size()
    }

    pub fn is_complete(&self) -> bool {
        self.registry.source(&self.name).is_closed()
    }

    pub fn append(
        &self,
        data: &[u8],
    ) {
        self.registry.source(&self.name).append(data);
    }

    pub fn close(&self) {
        self.registry.source(&self.name).close();
    }

    pub fn reset(&self) {
        self.registry.reset(&self.name);
    }

    /// Resolves once the stream closes.
    pub async fn closed(&self) {
        let source = self.registry.source(&self.name);
        source.closed().await;
    }
}

/// An append-only byte sink with committed-size/closed observation.
pub struct StreamSource {
    state: Mutex<SourceState>,
    closed_tx: watch::Sender<bool>,
    on_close: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

struct SourceState {
    buffer: BytesMut,
    closed: bool,
}

impl StreamSource {
    fn new(on_close: impl FnOnce() + Send + 'static) -> Self {
        let (closed_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(SourceState {
                buffer: BytesMut::new(),
                closed: false,
            }),
            closed_tx,
            on_close: Mutex::new(Some(Box::new(on_close))),
        }
    }

    pub fn committed_size(&self) -> u64 {
        self.state.lock().buffer.len() as u64
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Appends to the stream. Writes after close are discarded.
    pub fn append(
        &self,
        data: &[u8],
    ) {
        {
            let mut state = self.state.lock();
            if state.closed {
                debug!("dropping write to closed stream");
                return;
            }
            state.buffer.extend_from_slice(data);
        }
        // wake readers parked on the closed channel
        self.closed_tx.send_modify(|_| {});
    }

    /// Closes the sink, resolves the closed-future and runs the removal
    /// hook. Idempotent.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        let _ = self.closed_tx.send(true);
        if let Some(hook) = self.on_close.lock().take() {
            hook();
        }
    }

    /// Resolves once the writer closes the stream.
    pub async fn closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Opens a cursor over the stream starting at `offset`.
    pub fn open(
        self: &Arc<Self>,
        offset: u64,
    ) -> StreamReader {
        StreamReader {
            source: Arc::clone(self),
            position: offset,
        }
    }

    fn read_from(
        &self,
        position: u64,
    ) -> Option<Bytes> {
        let state = self.state.lock();
        let len = state.buffer.len() as u64;
        if position < len {
            Some(Bytes::copy_from_slice(&state.buffer[position as usize..]))
        } else if state.closed {
            Some(Bytes::new())
        } else {
            None
        }
    }
}

/// A read cursor over one stream source. Chunks are yielded as the writer
/// commits them; `None` marks end-of-stream after close.
pub struct StreamReader {
    source: Arc<StreamSource>,
    position: u64,
}

impl StreamReader {
    /// Waits for bytes past the cursor. Returns `None` once the stream is
    /// closed and drained.
    pub async fn next_chunk(&mut self) -> Option<Bytes> {
        let mut rx = self.source.closed_tx.subscribe();
        loop {
            match self.source.read_from(self.position) {
                Some(chunk) if chunk.is_empty() => return None,
                Some(chunk) => {
                    self.position += chunk.len() as u64;
                    return Some(chunk);
                }
                None => {
                    // nothing new yet; wait for an append or close
                    if rx.changed().await.is_err() {
                        return None;
                    }
                }
            }
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}
