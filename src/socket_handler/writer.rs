//! Delivery of one payload over an established connection.

use std::io;

use log::trace;

use crate::handler::HandlerError;

use super::provider::SocketProvider;

/// Write `payload` in full, retrying the unsent suffix after partial writes.
///
/// After every partial write the handle's metadata is checked: a stalled
/// stream aborts with [`HandlerError::WriteTimeout`] and a closed one with
/// [`HandlerError::ConnectionLost`]. The write timeout is therefore the only
/// bound on the number of retries.
pub(crate) fn write_payload<P: SocketProvider>(
    provider: &mut P,
    handle: &mut P::Handle,
    payload: &[u8],
) -> Result<(), HandlerError> {
    let total = payload.len();
    let mut sent = 0;
    while sent < total {
        let remaining = &payload[sent..];
        let count = provider
            .write(handle, remaining)
            .map_err(|source| HandlerError::Write { sent, total, source })?;
        if count == remaining.len() {
            return Ok(());
        }
        if count > remaining.len() {
            return Err(HandlerError::Write {
                sent,
                total,
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "socket reported {count} bytes written for a {} byte buffer",
                        remaining.len()
                    ),
                ),
            });
        }

        sent += count;
        let metadata = provider.metadata(handle);
        if metadata.timed_out {
            return Err(HandlerError::WriteTimeout { sent, total });
        }
        if metadata.eof {
            return Err(HandlerError::ConnectionLost { sent, total });
        }
        trace!("partial socket write: {sent} of {total} bytes sent, retrying");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::socket_handler::{
        connection_string::ConnectionString,
        memory::{MemoryHandle, MemorySocketProvider, ScriptedWrite},
    };

    fn open_connection() -> (MemorySocketProvider, MemoryHandle) {
        let mut provider = MemorySocketProvider::new();
        let target = ConnectionString::parse("localhost:1234").expect("valid target");
        let handle = provider
            .connect(&target, Duration::from_secs(1), false)
            .expect("connect");
        (provider, handle)
    }

    #[fixture]
    fn connected() -> (MemorySocketProvider, MemoryHandle) {
        open_connection()
    }

    #[rstest]
    fn full_write_needs_one_call(connected: (MemorySocketProvider, MemoryHandle)) {
        let (mut provider, mut handle) = connected;
        write_payload(&mut provider, &mut handle, b"Hello world").expect("write succeeds");
        assert_eq!(provider.calls().writes, 1);
        assert_eq!(provider.calls().metadata_queries, 0);
    }

    #[rstest]
    fn empty_payload_performs_no_write(connected: (MemorySocketProvider, MemoryHandle)) {
        let (mut provider, mut handle) = connected;
        write_payload(&mut provider, &mut handle, b"").expect("write succeeds");
        assert_eq!(provider.calls().writes, 0);
    }

    #[rstest]
    fn retries_unsent_suffix(connected: (MemorySocketProvider, MemoryHandle)) {
        let (mut provider, mut handle) = connected;
        provider.script_writes([ScriptedWrite::Accept(6), ScriptedWrite::Accept(5)]);
        write_payload(&mut provider, &mut handle, b"Hello world").expect("write succeeds");
        assert_eq!(
            provider.write_args(),
            vec![b"Hello world".to_vec(), b"world".to_vec()]
        );
        assert_eq!(provider.sink(), b"Hello world".to_vec());
    }

    #[rstest]
    fn zero_byte_writes_are_retried(connected: (MemorySocketProvider, MemoryHandle)) {
        let (mut provider, mut handle) = connected;
        provider.script_writes([ScriptedWrite::Accept(0), ScriptedWrite::Accept(0)]);
        write_payload(&mut provider, &mut handle, b"abc").expect("write succeeds");
        assert_eq!(provider.calls().writes, 3);
        assert_eq!(provider.calls().metadata_queries, 2);
    }

    #[rstest]
    fn failure_after_partial_write_reports_progress(
        connected: (MemorySocketProvider, MemoryHandle),
    ) {
        let (mut provider, mut handle) = connected;
        provider.script_writes([
            ScriptedWrite::Accept(6),
            ScriptedWrite::Fail(io::ErrorKind::BrokenPipe),
        ]);
        let err = write_payload(&mut provider, &mut handle, b"Hello world")
            .expect_err("second write fails");
        assert!(matches!(err, HandlerError::Write { sent: 6, total: 11, .. }));
        assert_eq!(provider.calls().writes, 2);
    }

    #[rstest]
    fn timed_out_partial_write_stops_immediately(
        connected: (MemorySocketProvider, MemoryHandle),
    ) {
        let (mut provider, mut handle) = connected;
        provider.script_writes([ScriptedWrite::Accept(5)]);
        provider.report_timed_out(true);
        let err = write_payload(&mut provider, &mut handle, b"Hello world")
            .expect_err("write times out");
        assert!(matches!(err, HandlerError::WriteTimeout { sent: 5, total: 11 }));
        assert_eq!(provider.calls().writes, 1);
        assert_eq!(provider.calls().metadata_queries, 1);
    }

    #[rstest]
    fn peer_close_after_partial_write_is_reported(
        connected: (MemorySocketProvider, MemoryHandle),
    ) {
        let (mut provider, mut handle) = connected;
        provider.script_writes([ScriptedWrite::AcceptThenClose(5)]);
        let err = write_payload(&mut provider, &mut handle, b"Hello world")
            .expect_err("peer closed");
        assert!(matches!(err, HandlerError::ConnectionLost { sent: 5, total: 11 }));
        assert_eq!(provider.calls().writes, 1);
    }

    #[rstest]
    fn over_reported_count_is_rejected(connected: (MemorySocketProvider, MemoryHandle)) {
        let (mut provider, mut handle) = connected;
        provider.script_writes([ScriptedWrite::Accept(12)]);
        let err = write_payload(&mut provider, &mut handle, b"Hello world")
            .expect_err("count exceeds buffer");
        assert!(matches!(err, HandlerError::Write { sent: 0, .. }));
    }

    proptest! {
        #[test]
        fn partial_writes_deliver_every_byte_once(
            payload in proptest::collection::vec(any::<u8>(), 1..256),
            chunks in proptest::collection::vec(0usize..16, 0..32),
        ) {
            let (mut provider, mut handle) = open_connection();
            let mut left = payload.len();
            let mut script = Vec::new();
            for chunk in chunks {
                if left <= 1 {
                    break;
                }
                let accepted = chunk.min(left - 1);
                script.push(ScriptedWrite::Accept(accepted));
                left -= accepted;
            }
            provider.script_writes(script.iter().copied());

            prop_assert!(write_payload(&mut provider, &mut handle, &payload).is_ok());
            prop_assert_eq!(provider.sink(), payload);
            prop_assert_eq!(provider.calls().writes, script.len() + 1);
        }
    }
}
