//! Task runs where a site call or the run bookkeeping fails.

use async_trait::async_trait;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use anycheckin_domain::shared::{DomainError, TaskId};
use anycheckin_domain::task::{Task, TaskRepository};
use anycheckin_infrastructure::config::AppConfig;
use anycheckin_infrastructure::http::SiteClient;
use anycheckin_lib::application::services::{CheckInExecutor, Clock, TaskInput, TaskRunner};

mod test_helpers;
use test_helpers::{
    quiet_notifier, session_for, spawn_app, spawn_app_with_site, MockNotifier, SIGN_IN_BODY,
};

fn has_session(session: String) -> impl Fn(&Request) -> bool + Send + Sync + 'static {
    let expected = format!("session={}", session);
    move |request: &Request| {
        request
            .headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .map(|cookies| cookies.split("; ").any(|c| c == expected))
            .unwrap_or(false)
    }
}

/// Task repository whose `save` always fails.
struct RejectingSaves {
    inner: Arc<dyn TaskRepository>,
}

#[async_trait]
impl TaskRepository for RejectingSaves {
    async fn create(&self, task: &Task) -> Result<Task, DomainError> {
        self.inner.create(task).await
    }

    async fn save(&self, _task: &Task) -> Result<(), DomainError> {
        Err(DomainError::Repository("database is locked".to_string()))
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn list(&self) -> Result<Vec<Task>, DomainError> {
        self.inner.list().await
    }

    async fn list_enabled(&self) -> Result<Vec<Task>, DomainError> {
        self.inner.list_enabled().await
    }

    async fn delete(&self, id: TaskId) -> Result<(), DomainError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn test_failed_account_is_logged_and_notified() {
    let bob_session = session_for(43, "bob");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .and(has_session(bob_session.clone()))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SIGN_IN_BODY))
        .mount(&server)
        .await;

    let mut notifier = MockNotifier::new();
    notifier
        .expect_notify()
        .withf(|name, success, message| name == "alice" && *success && message == SIGN_IN_BODY)
        .times(1)
        .returning(|_, _, _| Ok(()));
    notifier
        .expect_notify()
        .withf(|name, success, message| name == "bob" && !*success && message.contains("500"))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let app = spawn_app_with_site(server, Arc::new(notifier)).await;
    let alice = app.add_account("alice", 42).await;
    let bob = app
        .state
        .services
        .account
        .create("bob".to_string(), bob_session)
        .await
        .unwrap();

    let task = app
        .state
        .services
        .task
        .create(TaskInput {
            name: "both".to_string(),
            cron_expr: "0 8 * * *".to_string(),
            account_ids: vec![alice.id(), bob.id()],
            enabled: true,
        })
        .await
        .unwrap();

    let report = app.state.services.task.run_now(task.id()).await.unwrap();
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.success_count(), 1);
    assert!(report.persist_error.is_none());

    let failed = report
        .outcomes
        .iter()
        .find(|o| o.account_id == bob.id())
        .unwrap();
    assert!(!failed.success);
    assert!(failed.message.contains("500"));
    assert!(failed.message.contains("upstream down"));

    let logs = &app.state.repositories.check_in_log;
    let alice_logs = logs.list_by_account(alice.id(), 10).await.unwrap();
    assert_eq!(alice_logs.len(), 1);
    assert!(alice_logs[0].is_success());

    let bob_logs = logs.list_by_account(bob.id(), 10).await.unwrap();
    assert_eq!(bob_logs.len(), 1);
    assert!(!bob_logs[0].is_success());
    assert!(bob_logs[0].message().contains("500"));
}

#[tokio::test]
async fn test_bookkeeping_failure_is_reported_and_logs_kept() {
    let app = spawn_app(quiet_notifier()).await;
    let alice = app.add_account("alice", 42).await;

    let task = Task::new("morning".to_string(), "0 8 * * *".to_string(), vec![alice.id()])
        .unwrap();
    let task = app.state.repositories.task.create(&task).await.unwrap();

    let site_config = AppConfig::default().site.with_base_url(app.server.uri());
    let clock = app.clock.clone() as Arc<dyn Clock>;
    let executor = Arc::new(CheckInExecutor::new(
        app.state.repositories.account.clone(),
        app.state.repositories.check_in_log.clone(),
        Arc::new(SiteClient::new(site_config).unwrap()),
        quiet_notifier(),
        clock.clone(),
    ));
    let runner = TaskRunner::new(
        Arc::new(RejectingSaves {
            inner: app.state.repositories.task.clone(),
        }),
        app.state.repositories.account.clone(),
        executor,
        clock,
    );

    let report = runner.run(task.id()).await.unwrap();
    assert_eq!(report.success_count(), 1);
    assert!(report
        .persist_error
        .as_deref()
        .is_some_and(|e| e.contains("database is locked")));

    let logs = app
        .state
        .repositories
        .check_in_log
        .list_by_account(alice.id(), 10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].is_success());

    let stored = app.state.services.task.get(task.id()).await.unwrap();
    assert_eq!(stored.last_run(), None);
}
