#[cfg(test)]
mod telemetry_report_tests {
    use std::thread;
    use std::time::Duration;

    use chunkpipe_core::telemetry::{
        InFlightGauge, Outcome, PipelineReport, Stage, StageTimes, TelemetryCounters, TelemetryTimer,
    };

    fn make_counters() -> TelemetryCounters {
        let mut c = TelemetryCounters::default();
        for _ in 0..3 {
            c.add_read(100);
        }
        c.add_written(136);
        c.add_written(136);
        c
    }

    fn make_timer() -> TelemetryTimer {
        let mut timer = TelemetryTimer::new();
        thread::sleep(Duration::from_millis(10));
        timer.finish();
        timer
    }

    fn make_stage_times() -> StageTimes {
        let mut st = StageTimes::default();
        st.add(Stage::Read, Duration::from_millis(5));
        st.add(Stage::Write, Duration::from_millis(10));
        st
    }

    #[test]
    fn counters_merge_and_add_assign_agree() {
        let mut a = make_counters();
        let mut b = make_counters();
        a.merge(&make_counters());
        b += make_counters();

        assert_eq!(a, b);
        assert_eq!(a.chunks_read, 6);
        assert_eq!(a.bytes_in, 600);
        assert_eq!(a.chunks_written, 4);
        assert_eq!(a.bytes_out, 544);
    }

    #[test]
    fn stage_times_accumulate_per_stage() {
        let mut st = make_stage_times();
        st.add(Stage::Read, Duration::from_millis(5));

        assert_eq!(st.get(Stage::Read), Duration::from_millis(10));
        assert_eq!(st.get(Stage::Transform), Duration::ZERO);
        assert_eq!(st.total(), Duration::from_millis(20));

        let mut other = StageTimes::default();
        other.add(Stage::Transform, Duration::from_millis(1));
        st.merge(&other);
        assert_eq!(st.get(Stage::Transform), Duration::from_millis(1));
    }

    #[test]
    fn measure_returns_closure_value() {
        let mut st = StageTimes::default();
        let v = st.measure(Stage::Transform, || {
            thread::sleep(Duration::from_millis(2));
            42
        });
        assert_eq!(v, 42);
        assert!(st.get(Stage::Transform) >= Duration::from_millis(2));
    }

    #[test]
    fn summary_lists_stages_in_pipeline_order() {
        let s = make_stage_times().summary();
        let read = s.find("read=").unwrap();
        let transform = s.find("transform=").unwrap();
        let write = s.find("write=").unwrap();
        assert!(read < transform && transform < write, "{s}");
    }

    #[test]
    fn report_is_built_from_counters() {
        let report = PipelineReport::from(Outcome::Complete, 4, &make_counters(), make_stage_times(), 3, &make_timer());

        assert!(report.is_complete());
        assert_eq!(report.workers, 4);
        assert_eq!(report.chunks_read, 3);
        assert_eq!(report.chunks_committed, 2);
        assert_eq!(report.last_committed, Some(1));
        assert_eq!(report.peak_in_flight, 3);
        assert!(report.elapsed >= Duration::from_millis(10));
        assert!(report.throughput_bytes_per_sec > 0.0);
        assert!(report.output.is_none());
    }

    #[test]
    fn nothing_committed_means_no_last_sequence() {
        let report = PipelineReport::from(
            Outcome::Cancelled,
            1,
            &TelemetryCounters::default(),
            StageTimes::default(),
            0,
            &make_timer(),
        );
        assert!(!report.is_complete());
        assert_eq!(report.last_committed, None);
        assert_eq!(report.throughput_bytes_per_sec, 0.0);
    }

    #[test]
    fn json_report_skips_captured_output() {
        let mut report =
            PipelineReport::from(Outcome::Cancelled, 2, &make_counters(), make_stage_times(), 2, &make_timer());
        report.attach_output(vec![1, 2, 3]);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"outcome\": \"cancelled\""), "{json}");
        assert!(json.contains("\"chunks_committed\": 2"));
        assert!(!json.contains("\"output\""));

        let back: PipelineReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.outcome, Outcome::Cancelled);
        assert_eq!(back.stage_times, report.stage_times);
        assert!(back.output.is_none());
    }

    #[test]
    fn gauge_tracks_peak() {
        let g = InFlightGauge::new();
        g.acquire();
        g.acquire();
        g.release();
        g.acquire();
        g.acquire();
        assert_eq!(g.current(), 3);
        assert_eq!(g.peak(), 3);

        for _ in 0..5 {
            g.release();
        }
        assert_eq!(g.current(), 0);
        assert_eq!(g.peak(), 3);
    }

    #[test]
    fn gauge_is_shared_across_threads() {
        let g = InFlightGauge::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let g = g.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        g.acquire();
                        g.release();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(g.current(), 0);
        assert!((1..=4).contains(&g.peak()));
    }
}
