    use super::*;
    use crate::boundary::ReplyHandle;
    use crate::event::RecordingSink;
    use ac_core::ImageNumber;

    /// Drive a fixture's image number to `Done` through the legal sequence
    /// rather than writing it directly — `set_status` rejects an
    /// out-of-order jump straight from `Unprocessed`.
    fn mark_done(store: &mut InMemoryStore, n: ImageNumber) {
        store.set_status(n, ProcessingStatus::InProcess);
        store.set_status(n, ProcessingStatus::FinishedWaiting);
        store.set_status(n, ProcessingStatus::Done);
    }

    #[test]
    fn histogram_counts_every_status_bucket() {
        let mut store = InMemoryStore::new(vec![ImageNumber::new(1), ImageNumber::new(2)]);
        mark_done(&mut store, ImageNumber::new(1));
        let counts = histogram(&store, &[ImageNumber::new(1), ImageNumber::new(2)]);
        assert_eq!(counts.get("Done"), Some(&1));
        assert_eq!(counts.get("Unprocessed"), Some(&1));
    }

    struct TwoModulePipeline;
    impl Pipeline for TwoModulePipeline {
        fn module_count(&self) -> usize {
            2
        }
        fn requires_aggregation(&self) -> bool {
            false
        }
        fn serialize(&self) -> Vec<u8> {
            vec![]
        }
    }

    fn test_loop(cancel: CancellationToken, sink: Arc<dyn EventSink>) -> InterfaceLoop {
        InterfaceLoop {
            analysis_id: AnalysisId::new(),
            scratch_dir: std::env::temp_dir(),
            cancel,
            sink,
            pool: Arc::new(WorkerPool::new()),
        }
    }

    fn test_server() -> (Arc<JobServer>, InterfaceChannels) {
        let (server, channels) = crate::server::new_job_server(
            AnalysisId::new(),
            vec![],
            BTreeMap::new(),
            vec![],
            Default::default(),
            CancellationToken::new(),
            Arc::new(RecordingSink::new()),
            10,
        );
        (Arc::new(server), channels)
    }

    fn reply_pair() -> (ReplyHandle, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (crate::boundary::test_support::handle_with_sender(tx), rx)
    }

    #[tokio::test]
    async fn plain_success_acks_and_marks_finished_waiting() {
        let mut store = InMemoryStore::new(vec![ImageNumber::new(1)]);
        // In the real run the in-process queue marks this InProcess before
        // a success report can arrive; set_status rejects a direct
        // Unprocessed -> FinishedWaiting jump.
        store.set_status(ImageNumber::new(1), ProcessingStatus::InProcess);
        let (server, _channels) = test_server();
        let sink = Arc::new(RecordingSink::new());
        let interface_loop = test_loop(CancellationToken::new(), Arc::clone(&sink) as Arc<dyn EventSink>);
        let pipeline = TwoModulePipeline;
        let mut bootstrap = Bootstrap::Done;

        let (reply, rx) = reply_pair();
        let finished = crate::server::FinishedEntry {
            image_set_number: ImageNumber::new(1),
            dictionaries: None,
            reply,
        };
        interface_loop.handle_finished(&mut store, &pipeline, &server, finished, &mut bootstrap);

        assert_eq!(rx.await.unwrap(), Response::Ack);
        assert_eq!(store.status(ImageNumber::new(1)), Some(ProcessingStatus::FinishedWaiting));
    }

    #[tokio::test]
    async fn bootstrap_success_installs_dictionaries_and_releases_pending_jobs() {
        let mut store = InMemoryStore::new(vec![ImageNumber::new(1), ImageNumber::new(2)]);
        let (server, _channels) = test_server();
        let sink = Arc::new(RecordingSink::new());
        let interface_loop = test_loop(CancellationToken::new(), Arc::clone(&sink) as Arc<dyn EventSink>);
        let pipeline = TwoModulePipeline;
        let pending = vec![Job::new(vec![ImageNumber::new(2)], false, false)];
        let mut bootstrap = Bootstrap::Pending(pending);

        let dictionaries = vec![serde_json::json!({"a": 1}), serde_json::json!({"b": 2})];
        let (reply, rx) = reply_pair();
        let finished = crate::server::FinishedEntry {
            image_set_number: ImageNumber::new(1),
            dictionaries: Some(dictionaries.clone()),
            reply,
        };
        interface_loop.handle_finished(&mut store, &pipeline, &server, finished, &mut bootstrap);

        assert!(matches!(rx.await.unwrap(), Response::AckWithDictionary { dictionaries: d } if d == dictionaries));
        assert_eq!(*server.shared_dictionaries().lock(), Some(dictionaries));
        assert!(matches!(bootstrap, Bootstrap::Done));
    }

    #[tokio::test]
    async fn mismatched_dictionary_length_is_rejected() {
        let mut store = InMemoryStore::new(vec![ImageNumber::new(1)]);
        let (server, _channels) = test_server();
        let sink = Arc::new(RecordingSink::new());
        let interface_loop = test_loop(CancellationToken::new(), Arc::clone(&sink) as Arc<dyn EventSink>);
        let pipeline = TwoModulePipeline;
        let mut bootstrap = Bootstrap::Done;

        let (reply, rx) = reply_pair();
        let finished = crate::server::FinishedEntry {
            image_set_number: ImageNumber::new(1),
            dictionaries: Some(vec![serde_json::json!({})]),
            reply,
        };
        interface_loop.handle_finished(&mut store, &pipeline, &server, finished, &mut bootstrap);

        assert!(matches!(rx.await.unwrap(), Response::Error { .. }));
        assert!(server.shared_dictionaries().lock().is_none());
    }

    #[tokio::test]
    async fn merge_one_applies_the_received_blob() {
        use ac_store::MeasurementValue;

        let interface_loop =
            test_loop(CancellationToken::new(), Arc::new(RecordingSink::new()) as Arc<dyn EventSink>);
        let mut main = InMemoryStore::new(vec![ImageNumber::new(1)]);

        let mut received = InMemoryStore::new(vec![ImageNumber::new(1)]);
        received.set("Image", "Count_Nuclei", ImageNumber::new(1), MeasurementValue::Scalar(3.0));
        let blob = received.to_blob().unwrap();

        interface_loop.merge_one(&mut main, &[ImageNumber::new(1)], &blob).unwrap();

        assert_eq!(
            main.get("Image", "Count_Nuclei", ImageNumber::new(1)),
            Some(MeasurementValue::Scalar(3.0))
        );
        assert_eq!(main.status(ImageNumber::new(1)), Some(ProcessingStatus::Done));
    }

    struct PostRunPipeline;
    impl Pipeline for PostRunPipeline {
        fn module_count(&self) -> usize {
            0
        }
        fn requires_aggregation(&self) -> bool {
            false
        }
        fn serialize(&self) -> Vec<u8> {
            vec![]
        }
        fn post_run(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({"done": true}))
        }
    }

    #[tokio::test]
    async fn fully_done_resume_still_posts_progress_and_runs_post_run() {
        let mut store = InMemoryStore::new(vec![ImageNumber::new(1)]);
        mark_done(&mut store, ImageNumber::new(1));
        let (server, channels) = test_server();
        let sink = Arc::new(RecordingSink::new());
        let interface_loop = test_loop(CancellationToken::new(), Arc::clone(&sink) as Arc<dyn EventSink>);
        let pipeline = PostRunPipeline;
        let (start_tx, _start_rx) = oneshot::channel();

        interface_loop.run(store, &pipeline, None, false, server, channels, start_tx).await;

        let labels = sink.labels();
        assert!(labels.iter().any(|l| l == "Started"));
        assert!(labels.iter().any(|l| l.starts_with("Progress")));
        assert!(labels.iter().any(|l| l.starts_with("DisplayPostRun")));
        assert!(labels.iter().any(|l| l == "Finished(cancelled=false)"));
    }
