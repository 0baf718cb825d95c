// * out-of-order arrivals written in sequence order
// * completions arriving before chunks do not end the run early
// * duplicates and gaps are fatal, with the committed prefix reported
// * worker failures abort the destination

#[cfg(test)]
mod tests {
    use std::io;

    use crossbeam::channel::unbounded;

    use chunkpipe_core::stream::sink::ReorderingSink;
    use chunkpipe_core::stream::types::{Chunk, SinkMessage, WorkerId};
    use chunkpipe_core::stream::Destination;
    use chunkpipe_core::telemetry::Outcome;
    use chunkpipe_core::types::StreamError;

    fn chunk(seq: u64, payload: &str) -> SinkMessage {
        SinkMessage::Chunk(Chunk::new(seq, payload.as_bytes().to_vec()))
    }

    fn done(worker: usize) -> SinkMessage {
        SinkMessage::Completed { worker: WorkerId(worker), cancelled: false }
    }

    fn run(workers: usize, msgs: Vec<SinkMessage>) -> (Result<Outcome, StreamError>, Vec<u8>) {
        let (tx, rx) = unbounded();
        for m in msgs {
            tx.send(m).unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        let res = ReorderingSink::new(Destination::writer(&mut out), workers)
            .run(rx)
            .map(|summary| summary.outcome);
        (res, out)
    }

    #[test]
    fn writes_in_sequence_order_regardless_of_arrival() {
        let (res, out) = run(2, vec![chunk(2, "cc"), chunk(0, "aa"), done(0), chunk(3, "dd"), chunk(1, "bb"), done(1)]);
        assert_eq!(res.unwrap(), Outcome::Complete);
        assert_eq!(out, b"aabbccdd");
    }

    #[test]
    fn all_completions_before_last_chunk_still_waits_for_it() {
        // Completions are queued ahead of chunk 0 in the same drain batch.
        let (res, out) = run(2, vec![chunk(1, "y"), done(0), done(1), chunk(0, "x")]);
        assert_eq!(res.unwrap(), Outcome::Complete);
        assert_eq!(out, b"xy");
    }

    #[test]
    fn no_chunks_and_all_completions_is_an_empty_success() {
        let (res, out) = run(3, vec![done(0), done(1), done(2)]);
        assert_eq!(res.unwrap(), Outcome::Complete);
        assert!(out.is_empty());
    }

    #[test]
    fn cancelled_completion_marks_outcome() {
        let msgs = vec![
            chunk(0, "a"),
            SinkMessage::Completed { worker: WorkerId(0), cancelled: true },
        ];
        let (res, out) = run(1, msgs);
        assert_eq!(res.unwrap(), Outcome::Cancelled);
        assert_eq!(out, b"a");
    }

    #[test]
    fn duplicate_sequence_is_fatal() {
        let (res, out) = run(1, vec![chunk(0, "a"), chunk(1, "b"), chunk(1, "b"), done(0)]);
        let err = res.unwrap_err();
        assert!(matches!(err.root(), StreamError::Pipeline(_)), "{err}");
        // 0 and 1 may or may not be written depending on batch boundaries, never more.
        assert!(out.len() <= 2);
    }

    #[test]
    fn gap_at_completion_is_fatal_with_prefix_reported() {
        let (res, out) = run(1, vec![chunk(0, "a"), chunk(2, "c"), done(0)]);
        let err = res.unwrap_err();
        assert!(matches!(err.root(), StreamError::Pipeline(_)), "{err}");
        assert_eq!(err.last_committed(), Some(0));
        assert_eq!(out, b"a");
    }

    #[test]
    fn disconnect_without_completion_is_fatal() {
        let (res, _) = run(2, vec![chunk(0, "a"), done(0)]);
        let err = res.unwrap_err();
        assert!(matches!(err, StreamError::Aborted { .. }));
        assert_eq!(err.last_committed(), Some(0));
    }

    #[test]
    fn worker_failure_aborts_with_cause() {
        let failure = SinkMessage::Failed {
            worker: WorkerId(0),
            error: StreamError::SourceRead(std::sync::Arc::new(io::Error::new(io::ErrorKind::Other, "disk gone"))),
        };
        let (res, _) = run(2, vec![failure, done(1)]);
        let err = res.unwrap_err();
        assert!(matches!(err.root(), StreamError::SourceRead(_)), "{err}");
        assert_eq!(err.last_committed(), None);
        assert!(err.to_string().contains("disk gone"));
    }

    struct BrokenPipe;

    impl io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_reports_sink_error() {
        let (tx, rx) = unbounded();
        tx.send(chunk(0, "a")).unwrap();
        tx.send(done(0)).unwrap();
        drop(tx);

        let err = ReorderingSink::new(Destination::writer(BrokenPipe), 1).run(rx).unwrap_err();
        assert!(matches!(err.root(), StreamError::SinkWrite(_)), "{err}");
        assert_eq!(err.last_committed(), None);
    }

    /// Accepts every write, fails the final flush.
    struct FlushFails;

    impl io::Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn failed_flush_at_commit_counts_nothing_as_committed() {
        for cancelled in [false, true] {
            let (tx, rx) = unbounded();
            tx.send(chunk(0, "a")).unwrap();
            tx.send(chunk(1, "b")).unwrap();
            tx.send(SinkMessage::Completed { worker: WorkerId(0), cancelled }).unwrap();
            drop(tx);

            let err = ReorderingSink::new(Destination::writer(FlushFails), 1).run(rx).unwrap_err();
            assert!(matches!(err.root(), StreamError::SinkWrite(_)), "{err}");
            assert_eq!(err.last_committed(), None, "cancelled={cancelled}");
        }
    }

    #[test]
    fn memory_destination_captures_output() {
        let (tx, rx) = unbounded();
        tx.send(chunk(1, "2")).unwrap();
        tx.send(chunk(0, "1")).unwrap();
        tx.send(done(0)).unwrap();
        drop(tx);

        let summary = ReorderingSink::new(Destination::Memory(Vec::new()), 1).run(rx).unwrap();
        assert_eq!(summary.finalized.output.as_deref(), Some(&b"12"[..]));
        assert_eq!(summary.counters.chunks_written, 2);
        assert_eq!(summary.counters.bytes_out, 2);
    }
}
