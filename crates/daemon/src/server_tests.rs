    use super::*;
    use crate::event::RecordingSink;

    fn test_server(jobs: VecDeque<Job>) -> (JobServer, InterfaceChannels) {
        new_job_server(
            AnalysisId::new(),
            b"<pipeline>".to_vec(),
            BTreeMap::new(),
            b"<initial>".to_vec(),
            jobs,
            CancellationToken::new(),
            Arc::new(RecordingSink::new()),
            10,
        )
    }

    #[tokio::test]
    async fn work_request_pops_the_queue_and_marks_in_process() {
        let jobs = VecDeque::from([Job::new(vec![ImageNumber::new(1)], false, true)]);
        let (server, mut channels) = test_server(jobs);

        let (tx, rx) = tokio::sync::oneshot::channel();
        server
            .handle(Inbound {
                worker: WorkerIndex(0),
                request: Request::Work,
                reply: test_reply(tx),
            })
            .await;

        let response = rx.await.unwrap();
        assert!(matches!(response, Response::Work { wants_dictionary: true, .. }));
        assert_eq!(channels.in_process_rx.try_recv().unwrap(), ImageNumber::new(1));
    }

    #[tokio::test]
    async fn work_request_on_empty_queue_replies_no_work() {
        let (server, _channels) = test_server(VecDeque::new());
        let (tx, rx) = tokio::sync::oneshot::channel();
        server
            .handle(Inbound { worker: WorkerIndex(0), request: Request::Work, reply: test_reply(tx) })
            .await;
        assert_eq!(rx.await.unwrap(), Response::NoWork);
    }

    #[tokio::test]
    async fn image_set_success_does_not_reply_immediately() {
        let (server, mut channels) = test_server(VecDeque::new());
        let (tx, rx) = tokio::sync::oneshot::channel();
        server
            .handle(Inbound {
                worker: WorkerIndex(0),
                request: Request::ImageSetSuccess { image_set_number: ImageNumber::new(1) },
                reply: test_reply(tx),
            })
            .await;

        // No reply yet — it is up to the interface loop to drain the
        // finished queue and answer.
        assert!(rx.try_recv().is_err());
        let entry = channels.finished_rx.try_recv().unwrap();
        assert_eq!(entry.image_set_number, ImageNumber::new(1));
        assert!(entry.dictionaries.is_none());
    }

    #[tokio::test]
    async fn analysis_cancel_sets_the_token_and_acks() {
        let (server, _channels) = test_server(VecDeque::new());
        let (tx, rx) = tokio::sync::oneshot::channel();
        server
            .handle(Inbound {
                worker: WorkerIndex(0),
                request: Request::AnalysisCancel,
                reply: test_reply(tx),
            })
            .await;

        assert_eq!(rx.await.unwrap(), Response::Ack);
        assert!(server.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn interactive_requests_are_forwarded_to_the_sink() {
        let sink = Arc::new(RecordingSink::new());
        let (server, _channels) = new_job_server(
            AnalysisId::new(),
            vec![],
            BTreeMap::new(),
            vec![],
            VecDeque::new(),
            CancellationToken::new(),
            Arc::clone(&sink) as Arc<dyn EventSink>,
            10,
        );

        let (tx, _rx) = tokio::sync::oneshot::channel();
        server
            .handle(Inbound {
                worker: WorkerIndex(0),
                request: Request::Display { payload: serde_json::Value::Null },
                reply: test_reply(tx),
            })
            .await;

        assert_eq!(sink.labels().len(), 1);
    }

    fn test_reply(tx: tokio::sync::oneshot::Sender<Response>) -> ReplyHandle {
        crate::boundary::test_support::handle_with_sender(tx)
    }
