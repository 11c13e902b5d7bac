//! # Integration Tests
//!
//! Cross-crate scenario, invariant, and end-to-end tests.
//!
//! Responsibilities:
//! - Policy scenarios exercised through the full captor + synchronizer stack
//! - Universal capture invariants (retention, dry/wet agreement, atomicity)
//! - Simulated e2e pipelines (mock sources, no real transport)

#[cfg(test)]
mod scenario_tests {
    use capture_engine::drivers::{Batch, Next, Throttled};
    use capture_engine::followers::{AnyBefore, Before, CountBefore, Latched, MatchedStamp, Ranged};
    use capture_engine::{Captor, CaptureRange, CaptureState, PollingCaptor, Synchronizer};
    use contracts::{Dispatch, Stamped};

    type TestDispatch = Stamped<i64, u32>;
    type Sink = Vec<TestDispatch>;

    fn make(stamp: i64) -> TestDispatch {
        Stamped::new(stamp, stamp as u32)
    }

    fn emitted(sink: &Sink) -> Vec<i64> {
        sink.iter().map(Dispatch::stamp).collect()
    }

    #[test]
    fn test_latched_re_emits_across_ranges() {
        let driver: PollingCaptor<Next<TestDispatch>> = Captor::new(Next::new());
        let follower: PollingCaptor<Latched<TestDispatch>> = Captor::new(Latched::new(1));

        driver.inject_range([make(10), make(11)]);
        follower.inject_range([make(5), make(9)]);

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(),);

        // First range [10, 10]: latch the newest element old enough (9).
        let result = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        assert_eq!(result.state, CaptureState::Primed);
        assert_eq!(emitted(&sinks.0), vec![9]);

        // Second range [11, 11]: no newer candidate, the latch re-emits.
        sinks.0.clear();
        let result = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        assert_eq!(result.state, CaptureState::Primed);
        assert_eq!(emitted(&sinks.0), vec![9]);
    }

    #[test]
    fn test_throttled_driver_paces_group() {
        let driver: PollingCaptor<Throttled<TestDispatch>> = Captor::new(Throttled::new(10));
        let follower: PollingCaptor<AnyBefore<TestDispatch>> = Captor::new(AnyBefore::new(0));

        driver.inject_range([make(0), make(5)]);
        follower.inject_range([make(1), make(6)]);

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(),);

        let result = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        assert_eq!(result.state, CaptureState::Primed);
        assert_eq!(result.range, Some(CaptureRange::at(0)));

        // 5 < 0 + 10: rate-limited, the group retries with queues intact.
        let before = driver.buffered_stamps();
        let result = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        assert_eq!(result.state, CaptureState::Retry);
        assert_eq!(driver.buffered_stamps(), before);

        // 12 clears the gate and also retires the rate-limited 5.
        driver.inject(make(12));
        let result = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        assert_eq!(result.state, CaptureState::Primed);
        assert_eq!(result.range, Some(CaptureRange::at(12)));
        assert!(driver.is_empty());
    }

    #[test]
    fn test_ranged_follower_brackets_batch_window() {
        let driver: PollingCaptor<Batch<TestDispatch>> = Captor::new(Batch::new(2));
        let follower: PollingCaptor<Ranged<TestDispatch>> = Captor::new(Ranged::new(0));

        driver.inject_range([make(5), make(7)]);
        follower.inject_range([make(3), make(5), make(6), make(9)]);

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(),);

        let result = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        assert_eq!(result.state, CaptureState::Primed);
        assert_eq!(result.range, Some(CaptureRange::new(5, 7)));
        assert_eq!(emitted(&sinks.0), vec![3, 5, 6, 9]);
        assert_eq!(follower.buffered_stamps(), vec![9]);
    }

    #[test]
    fn test_count_before_aborts_after_bounded_drop() {
        let driver: PollingCaptor<Next<TestDispatch>> = Captor::new(Next::new());
        // Capacity 2: older elements fall out as newer ones arrive.
        let follower: PollingCaptor<CountBefore<TestDispatch>> =
            Captor::bounded(CountBefore::new(3, 0), 2);

        driver.inject(make(10));
        follower.inject_range([5, 6, 7, 8, 12].map(make));
        assert_eq!(follower.buffered_stamps(), vec![8, 12]);

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(),);

        // Only one element below 10 survived the eviction; the witness at 12
        // proves no more will come.
        let result = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        assert_eq!(result.state, CaptureState::Abort);
        assert!(sinks.0.is_empty());
    }

    #[test]
    fn test_order_preserved_across_captures() {
        let driver: PollingCaptor<Next<TestDispatch>> = Captor::new(Next::new());
        let follower: PollingCaptor<Before<TestDispatch>> = Captor::new(Before::new(0));

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(),);

        // Out-of-order injects between captures; emissions stay sorted.
        driver.inject_range([make(10), make(20)]);
        follower.inject_range([make(8), make(3), make(25)]);
        Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);

        follower.inject(make(18));
        driver.inject(make(15));
        Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);
        Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);

        let driver_stamps = emitted(&driver_sink);
        let follower_stamps = emitted(&sinks.0);
        assert!(driver_stamps.windows(2).all(|w| w[0] <= w[1]));
        assert!(follower_stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_dry_wet_agreement() {
        let driver: PollingCaptor<Next<TestDispatch>> = Captor::new(Next::new());
        let follower: PollingCaptor<MatchedStamp<TestDispatch>> =
            Captor::new(MatchedStamp::new());

        driver.inject(make(10));
        follower.inject_range([make(10), make(11)]);

        let dry = Synchronizer::dry_capture(&driver, &(&follower,));

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(),);
        let wet = Synchronizer::capture(&driver, &mut driver_sink, &(&follower,), &mut sinks);

        assert_eq!(dry.state, wet.state);
        assert_eq!(dry.range, wet.range);
    }

    #[test]
    fn test_non_primed_group_leaves_state_identical() {
        let driver: PollingCaptor<Next<TestDispatch>> = Captor::new(Next::new());
        let ready: PollingCaptor<AnyBefore<TestDispatch>> = Captor::new(AnyBefore::new(0));
        let lagging: PollingCaptor<MatchedStamp<TestDispatch>> =
            Captor::new(MatchedStamp::new());

        driver.inject(make(10));
        ready.inject_range([make(1), make(2)]);
        lagging.inject(make(9));

        let driver_before = driver.buffered_stamps();
        let ready_before = ready.buffered_stamps();
        let lagging_before = lagging.buffered_stamps();

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(), Sink::new());
        let result =
            Synchronizer::capture(&driver, &mut driver_sink, &(&ready, &lagging), &mut sinks);

        // One follower lags: nothing may move, not even the ready ones.
        assert_eq!(result.state, CaptureState::Retry);
        assert!(driver_sink.is_empty());
        assert!(sinks.0.is_empty());
        assert!(sinks.1.is_empty());
        assert_eq!(driver.buffered_stamps(), driver_before);
        assert_eq!(ready.buffered_stamps(), ready_before);
        assert_eq!(lagging.buffered_stamps(), lagging_before);
    }
}

#[cfg(test)]
mod concurrency_tests {
    use capture_engine::drivers::Next;
    use capture_engine::followers::Before;
    use capture_engine::{
        BlockingCaptor, Captor, CaptureState, GroupNotifier, Synchronizer,
    };
    use contracts::{Dispatch, Stamped};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    type TestDispatch = Stamped<i64, u32>;
    type Sink = Vec<TestDispatch>;

    fn make(stamp: i64) -> TestDispatch {
        Stamped::new(stamp, stamp as u32)
    }

    #[test]
    fn test_concurrent_injects_linearize() {
        let captor: Arc<BlockingCaptor<Next<TestDispatch>>> = Arc::new(Captor::new(Next::new()));

        let mut producers = Vec::new();
        for base in [0i64, 1000] {
            let captor = Arc::clone(&captor);
            producers.push(thread::spawn(move || {
                for i in 0..100 {
                    captor.inject(make(base + i));
                }
            }));
        }
        for producer in producers {
            producer.join().unwrap();
        }

        assert_eq!(captor.len(), 200);
        let stamps = captor.buffered_stamps();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_group_capture_until_wakes_on_any_stream() {
        let notifier = Arc::new(GroupNotifier::new());
        let driver: Arc<BlockingCaptor<Next<TestDispatch>>> =
            Arc::new(Captor::new(Next::new()).with_notifier(Arc::clone(&notifier)));
        let follower: Arc<BlockingCaptor<Before<TestDispatch>>> =
            Arc::new(Captor::new(Before::new(0)).with_notifier(Arc::clone(&notifier)));

        let driver_producer = Arc::clone(&driver);
        let follower_producer = Arc::clone(&follower);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            driver_producer.inject(make(10));
            thread::sleep(Duration::from_millis(10));
            follower_producer.inject(make(5));
            follower_producer.inject(make(11));
        });

        let mut driver_sink = Sink::new();
        let mut sinks = (Sink::new(),);
        let deadline = Instant::now() + Duration::from_secs(5);
        let result = Synchronizer::capture_until(
            &driver,
            &mut driver_sink,
            &(Arc::clone(&follower),),
            &mut sinks,
            deadline,
            &notifier,
        );

        assert_eq!(result.state, CaptureState::Primed);
        assert_eq!(driver_sink[0].stamp(), 10);
        assert_eq!(sinks.0[0].stamp(), 5);
        handle.join().unwrap();
    }

    #[test]
    fn test_abort_wakes_group_waiter() {
        let notifier = Arc::new(GroupNotifier::new());
        let driver: Arc<BlockingCaptor<Next<TestDispatch>>> =
            Arc::new(Captor::new(Next::new()).with_notifier(Arc::clone(&notifier)));

        let canceller = Arc::clone(&driver);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            canceller.abort(100);
        });

        let mut driver_sink = Sink::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        let result = Synchronizer::capture_until(
            &driver,
            &mut driver_sink,
            &(),
            &mut (),
            deadline,
            &notifier,
        );
        assert_eq!(result.state, CaptureState::Abort);
        handle.join().unwrap();
    }
}

#[cfg(test)]
mod e2e_tests {
    use capture_engine::drivers::Next;
    use capture_engine::followers::ClosestBefore;
    use capture_engine::{
        BlockingCaptor, Captor, CaptureState, ChannelSink, GroupNotifier, Synchronizer,
    };
    use contracts::Dispatch;
    use ingestion::{CaptorFeed, MockStreamSource, StreamDispatch};
    use observability::CaptureMetricsAggregator;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// End-to-end: MockStreamSource -> CaptorFeed -> Synchronizer -> sinks.
    ///
    /// Two timed streams drive a Next/ClosestBefore group until five frames
    /// have been produced. Early attempts may abort while the streams align;
    /// only steady-state frames are asserted on.
    #[test]
    fn test_e2e_mock_pipeline() {
        let _ = observability::init();

        let notifier = Arc::new(GroupNotifier::new());
        let driver: Arc<BlockingCaptor<Next<StreamDispatch>>> =
            Arc::new(Captor::new(Next::new()).with_notifier(Arc::clone(&notifier)));
        let follower: Arc<BlockingCaptor<ClosestBefore<StreamDispatch>>> = Arc::new(
            // 100ms lookback in microsecond stamps.
            Captor::new(ClosestBefore::new(0, 100_000)).with_notifier(Arc::clone(&notifier)),
        );

        let driver_source = MockStreamSource::with_rate("cam", 100.0);
        let follower_source = MockStreamSource::with_rate("lidar", 200.0);
        let driver_feed =
            CaptorFeed::spawn("cam", driver_source.start(64, None), Arc::clone(&driver));
        let follower_feed = CaptorFeed::spawn(
            "lidar",
            follower_source.start(64, None),
            Arc::clone(&follower),
        );

        let (mut driver_sink, driver_rx) = ChannelSink::bounded("cam_frames", 64);
        let (mut follower_sink, follower_rx) = ChannelSink::bounded("lidar_frames", 64);

        let mut aggregator = CaptureMetricsAggregator::new();
        let target_frames = 5u64;
        let give_up = Instant::now() + Duration::from_secs(10);

        while aggregator.frames() < target_frames {
            assert!(Instant::now() < give_up, "pipeline made no progress");

            let result = Synchronizer::capture_until(
                &driver,
                &mut driver_sink,
                &(Arc::clone(&follower),),
                &mut (&mut follower_sink,),
                Instant::now() + Duration::from_millis(500),
                &notifier,
            );
            assert_ne!(result.state, CaptureState::Timeout, "streams stalled");
            aggregator.record(&result);
        }

        driver_source.stop();
        follower_source.stop();
        driver_feed.join();
        follower_feed.join();

        let summary = aggregator.summary();
        assert!(summary.frames >= target_frames);

        // Each frame pairs one driving dispatch with one follower dispatch,
        // and the follower selection never outruns its driver.
        let mut pairs = 0;
        while let (Ok(drove), Ok(followed)) =
            (driver_rx.try_recv(), follower_rx.try_recv())
        {
            assert!(followed.stamp() < drove.stamp() + 100_000);
            pairs += 1;
        }
        assert!(pairs >= target_frames as usize);
    }
}
