//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - config file -> messengers -> dispatcher against mocked HTTP backends
//! - deadline and cancellation propagation through the requester
//! - worker pool driving the dispatcher

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        let _ = contracts::SendContext::background();
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{NofyError, SendContext};
    use dispatcher::{create_dispatcher, Dispatcher};
    use requester::{HttpRequester, Requester};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn requester() -> Arc<dyn Requester> {
        Arc::new(HttpRequester::new())
    }

    fn config_toml(server: &MockServer) -> String {
        format!(
            r#"
[dispatch]
timeout_ms = 5000

[[messengers]]
name = "ops-slack"
type = "slack"
token = "xoxb-test"
channel = "C0123"
blocks = [ {{ type = "section", text = {{ type = "mrkdwn", text = "deploy done" }} }} ]
url = "{uri}/api/chat.postMessage"

[[messengers]]
name = "ops-mail"
type = "resend"
token = "re_test"
from = "bot@example.com"
to = ["ops@example.com"]
subject = "deploy done"
text = "done"
url = "{uri}/emails"

[[messengers]]
name = "audit"
type = "log"
message = "deploy done"
"#,
            uri = server.uri()
        )
    }

    fn dispatcher_for(server: &MockServer) -> Dispatcher {
        let config = ConfigLoader::load_from_str(&config_toml(server), ConfigFormat::Toml)
            .expect("config should load");
        create_dispatcher(&config.messengers, requester()).expect("messengers should build")
    }

    /// config -> messengers -> Dispatcher -> mocked Slack and Resend
    #[tokio::test]
    async fn test_e2e_all_backends_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat.postMessage"))
            .and(header("authorization", "Bearer xoxb-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = dispatcher_for(&server);
        assert_eq!(dispatcher.len(), 3);

        let report = dispatcher
            .send_all_detailed(&SendContext::background())
            .await;
        assert!(report.is_success(), "report: {report:?}");
        assert_eq!(report.len(), 3);
        assert_eq!(dispatcher.metrics().send_success, 3);
    }

    #[tokio::test]
    async fn test_e2e_partial_failure_is_aggregated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;

        let dispatcher = dispatcher_for(&server);
        let report = dispatcher
            .send_all_detailed(&SendContext::background())
            .await;

        let failed: Vec<_> = report.failed().map(|o| o.messenger.as_str()).collect();
        assert_eq!(failed.len(), 2);
        assert!(failed.contains(&"ops-slack"));
        assert!(failed.contains(&"ops-mail"));
        assert!(report.succeeded().any(|o| o.messenger == "audit"));

        let err = report.into_result().unwrap_err().to_string();
        assert!(err.starts_with("errors: "), "got: {err}");
        assert!(err.contains("error sending message: channel_not_found"), "got: {err}");
        assert!(
            err.contains("error sending message: status-code: 422 body: invalid from"),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn test_e2e_deadline_cancels_slow_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": true }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "e" })))
            .mount(&server)
            .await;

        let dispatcher = dispatcher_for(&server);
        let ctx = SendContext::with_timeout(Duration::from_millis(200));

        let report = dispatcher.send_all_detailed(&ctx).await;
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].messenger, "ops-slack");
        assert!(matches!(
            failed[0].result.as_ref().unwrap_err(),
            NofyError::Cancelled
        ));
        assert!(failed[0].elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_e2e_removed_messenger_not_called() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat.postMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "e" })))
            .expect(1)
            .mount(&server)
            .await;

        let mut dispatcher = dispatcher_for(&server);
        let slack = dispatcher
            .messengers()
            .iter()
            .find(|m| m.name() == "ops-slack")
            .cloned()
            .unwrap();
        assert!(dispatcher.remove_messenger(&slack));

        dispatcher
            .send_all(&SendContext::background())
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod pool_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use contracts::{async_trait, Messenger, NofyError, SendContext};
    use dispatcher::Dispatcher;
    use wpool::{Job, Pool};

    struct CountingMessenger {
        name: String,
        sent: AtomicUsize,
    }

    #[async_trait]
    impl Messenger for CountingMessenger {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send(&self, _ctx: &SendContext) -> Result<(), NofyError> {
            if self.name == "flaky" && self.sent.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
                return Err(NofyError::other("flaky backend"));
            }
            if self.name != "flaky" {
                self.sent.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    /// Each job is one notification fanned out by a shared dispatcher
    #[tokio::test]
    async fn test_pool_drives_dispatcher() {
        const NOTIFICATIONS: usize = 20;

        let steady = Arc::new(CountingMessenger {
            name: "steady".to_string(),
            sent: AtomicUsize::new(0),
        });
        let flaky = Arc::new(CountingMessenger {
            name: "flaky".to_string(),
            sent: AtomicUsize::new(0),
        });
        let dispatcher = Arc::new(Dispatcher::with_messengers([
            Arc::clone(&steady) as Arc<dyn Messenger>,
            Arc::clone(&flaky) as Arc<dyn Messenger>,
        ]));

        let pool = Pool::new(4, move |subject: String| {
            let dispatcher = Arc::clone(&dispatcher);
            async move {
                dispatcher
                    .send_all(&SendContext::background())
                    .await
                    .map(|()| subject)
            }
        });
        pool.start();

        let results = pool.results();
        let errors = pool.errors();
        let results = tokio::spawn(async move {
            let mut out = Vec::new();
            while let Ok(job) = results.recv().await {
                out.push(job);
            }
            out
        });
        let errors = tokio::spawn(async move {
            let mut out = Vec::new();
            while let Ok(job) = errors.recv().await {
                out.push(job);
            }
            out
        });

        for i in 0..NOTIFICATIONS {
            pool.submit(Job::new(format!("deploy #{i}"))).await.unwrap();
        }
        pool.stop().await;

        let results = results.await.unwrap();
        let errors = errors.await.unwrap();
        assert_eq!(results.len() + errors.len(), NOTIFICATIONS);
        assert_eq!(errors.len(), NOTIFICATIONS / 2);
        assert_eq!(steady.sent.load(Ordering::SeqCst), NOTIFICATIONS);
        for job in &errors {
            assert_eq!(job.error.as_ref().unwrap().message, "errors: flaky backend");
        }
        for job in &results {
            assert_eq!(job.result.as_deref(), Some(job.input.as_str()));
        }
    }
}
