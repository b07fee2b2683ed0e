//! In-memory socket provider.
//!
//! Every clone of a [`MemorySocketProvider`] shares the same state, so a test
//! can hand one clone to a handler and inspect the sink, counters and handle
//! liveness through another.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    io,
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;

use super::{
    connection_string::ConnectionString,
    provider::{SocketProvider, StreamMetadata},
};

/// Scripted outcome for one call to [`SocketProvider::write`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptedWrite {
    /// Accept up to `n` bytes and report `n`.
    Accept(usize),
    /// Fail with an error of the given kind.
    Fail(io::ErrorKind),
    /// Accept up to `n` bytes, report `n`, then close the handle as a peer
    /// hanging up would.
    AcceptThenClose(usize),
}

/// Number of times each primitive was invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub connects: usize,
    pub persistent_connects: usize,
    pub timeout_applies: usize,
    pub writes: usize,
    pub metadata_queries: usize,
    pub closes: usize,
    pub releases: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    sink: Vec<u8>,
    script: VecDeque<ScriptedWrite>,
    connect_error: Option<io::ErrorKind>,
    timeout_error: Option<io::ErrorKind>,
    timed_out: bool,
    calls: CallCounts,
    write_args: Vec<Vec<u8>>,
    applied_timeouts: Vec<Option<Duration>>,
    next_id: u64,
    last_handle: Option<u64>,
    open: HashSet<u64>,
    idle: HashMap<String, Vec<u64>>,
}

/// Handle returned by [`MemorySocketProvider`].
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryHandle {
    id: u64,
    pool_key: Option<String>,
}

impl MemoryHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Provider that writes into a shared in-memory buffer.
///
/// Without a script every write accepts the whole buffer, so the sink holds
/// the concatenation of every payload.
#[derive(Clone, Debug, Default)]
pub struct MemorySocketProvider {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySocketProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the next writes; later writes accept everything.
    pub fn script_writes(&self, steps: impl IntoIterator<Item = ScriptedWrite>) {
        self.state.lock().script.extend(steps);
    }

    /// Make connect attempts fail with `kind`, or succeed again with `None`.
    pub fn fail_connect(&self, kind: Option<io::ErrorKind>) {
        self.state.lock().connect_error = kind;
    }

    /// Make applying the write timeout fail with `kind`.
    pub fn fail_timeout_apply(&self, kind: Option<io::ErrorKind>) {
        self.state.lock().timeout_error = kind;
    }

    /// Set the timed-out indicator reported by metadata queries.
    pub fn report_timed_out(&self, timed_out: bool) {
        self.state.lock().timed_out = timed_out;
    }

    /// Bytes accepted so far.
    pub fn sink(&self) -> Vec<u8> {
        self.state.lock().sink.clone()
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// The buffer passed to each write call, in order.
    pub fn write_args(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_args.clone()
    }

    /// Timeouts applied to handles, in order.
    pub fn applied_timeouts(&self) -> Vec<Option<Duration>> {
        self.state.lock().applied_timeouts.clone()
    }

    /// Whether the most recently issued handle is still open.
    pub fn last_handle_open(&self) -> bool {
        let state = self.state.lock();
        state.last_handle.is_some_and(|id| state.open.contains(&id))
    }

    /// Number of handles that are open.
    pub fn open_handles(&self) -> usize {
        self.state.lock().open.len()
    }

    /// Number of open persistent handles waiting to be reused.
    pub fn idle_handles(&self) -> usize {
        self.state.lock().idle.values().map(Vec::len).sum()
    }
}

impl SocketProvider for MemorySocketProvider {
    type Handle = MemoryHandle;

    fn connect(
        &mut self,
        target: &ConnectionString,
        _timeout: Duration,
        persistent: bool,
    ) -> io::Result<MemoryHandle> {
        let mut state = self.state.lock();
        state.calls.connects += 1;
        if persistent {
            state.calls.persistent_connects += 1;
        }
        if let Some(kind) = state.connect_error {
            return Err(io::Error::new(kind, format!("cannot connect to {target}")));
        }
        let pool_key = persistent.then(|| target.as_str().to_owned());
        if let Some(key) = &pool_key
            && let Some(id) = state.idle.get_mut(key).and_then(Vec::pop)
        {
            state.last_handle = Some(id);
            return Ok(MemoryHandle { id, pool_key });
        }
        state.next_id += 1;
        let id = state.next_id;
        state.open.insert(id);
        state.last_handle = Some(id);
        Ok(MemoryHandle { id, pool_key })
    }

    fn apply_write_timeout(
        &mut self,
        _handle: &mut MemoryHandle,
        timeout: Option<Duration>,
    ) -> io::Result<()> {
        let mut state = self.state.lock();
        state.calls.timeout_applies += 1;
        if let Some(kind) = state.timeout_error {
            return Err(io::Error::new(kind, "cannot set write timeout"));
        }
        state.applied_timeouts.push(timeout);
        Ok(())
    }

    fn write(&mut self, handle: &mut MemoryHandle, bytes: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.calls.writes += 1;
        state.write_args.push(bytes.to_vec());
        if !state.open.contains(&handle.id) {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "handle is closed"));
        }
        match state.script.pop_front() {
            None => {
                state.sink.extend_from_slice(bytes);
                Ok(bytes.len())
            }
            Some(ScriptedWrite::Accept(count)) => {
                state.sink.extend_from_slice(&bytes[..count.min(bytes.len())]);
                Ok(count)
            }
            Some(ScriptedWrite::AcceptThenClose(count)) => {
                state.sink.extend_from_slice(&bytes[..count.min(bytes.len())]);
                state.open.remove(&handle.id);
                Ok(count)
            }
            Some(ScriptedWrite::Fail(kind)) => Err(io::Error::new(kind, "scripted write failure")),
        }
    }

    fn metadata(&mut self, handle: &MemoryHandle) -> StreamMetadata {
        let mut state = self.state.lock();
        state.calls.metadata_queries += 1;
        StreamMetadata {
            timed_out: state.timed_out,
            eof: !state.open.contains(&handle.id),
        }
    }

    fn close(&mut self, handle: MemoryHandle) {
        let mut state = self.state.lock();
        state.calls.closes += 1;
        state.open.remove(&handle.id);
    }

    fn release(&mut self, handle: MemoryHandle) {
        let mut state = self.state.lock();
        state.calls.releases += 1;
        match handle.pool_key {
            Some(key) if state.open.contains(&handle.id) => {
                state.idle.entry(key).or_default().push(handle.id);
            }
            _ => {
                state.open.remove(&handle.id);
            }
        }
    }
}
