#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anycheckin_domain::account::Account;
use anycheckin_domain::notification::CheckInNotifier;
use anycheckin_domain::session::{encode_session, SessionInfo};
use anycheckin_domain::shared::DomainError;
use anycheckin_infrastructure::config::AppConfig;
use anycheckin_infrastructure::http::SiteClient;
use anycheckin_infrastructure::persistence::Database;
use anycheckin_lib::application::services::{Clock, ManualClock};
use anycheckin_lib::presentation::bootstrap::build_with_parts;
use anycheckin_lib::presentation::state::AppState;

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const SIGN_IN_BODY: &str = r#"{"success":true,"message":"签到成功"}"#;

mock! {
    pub Notifier {}

    #[async_trait]
    impl CheckInNotifier for Notifier {
        async fn notify(
            &self,
            display_name: &str,
            success: bool,
            message: &str,
        ) -> Result<(), DomainError>;
    }
}

/// Notifier that accepts any number of deliveries.
pub fn quiet_notifier() -> Arc<dyn CheckInNotifier> {
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().returning(|_, _, _| Ok(()));
    Arc::new(notifier)
}

pub fn offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

/// `2025-06-<day> hh:mm:00 +08:00`
pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    offset()
        .with_ymd_and_hms(2025, 6, day, hour, minute, 0)
        .unwrap()
}

pub fn session_for(user_id: i64, username: &str) -> String {
    let info = SessionInfo {
        user_id,
        username: username.to_string(),
        role: 1,
        status: 1,
        group: "default".to_string(),
    };
    encode_session(&info, 1_700_000_000)
}

pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub server: MockServer,
}

impl TestApp {
    pub async fn add_account(&self, name: &str, user_id: i64) -> Account {
        self.state
            .services
            .account
            .create(name.to_string(), session_for(user_id, name))
            .await
            .expect("Account should be created")
    }

    /// Waits (bounded) until the pool has finished `count` runs in total.
    pub async fn wait_for_runs(&self, count: u64) {
        tokio::time::timeout(
            Duration::from_secs(10),
            self.state.services.scheduler.pool().wait_for_completed(count),
        )
        .await
        .expect("Runs should complete in time");
    }
}

/// Site stub answering the home page without a challenge and every
/// sign-in with [`SIGN_IN_BODY`].
pub async fn stub_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/sign_in"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SIGN_IN_BODY))
        .mount(&server)
        .await;
    server
}

/// Fully wired app on an in-memory database, a stub site and a manual
/// clock starting at 2025-06-01 07:59 +08:00.
pub async fn spawn_app(notifier: Arc<dyn CheckInNotifier>) -> TestApp {
    spawn_app_with_site(stub_site().await, notifier).await
}

pub async fn spawn_app_with_site(server: MockServer, notifier: Arc<dyn CheckInNotifier>) -> TestApp {
    let mut config = AppConfig::default();
    config.security.secret = TEST_SECRET.to_string();
    config.scheduler.utc_offset = Some("+08:00".to_string());
    config.scheduler.max_concurrent_runs = 4;
    config.site = config.site.with_base_url(server.uri());

    let clock = Arc::new(ManualClock::new(at(1, 7, 59)));
    let site = Arc::new(SiteClient::new(config.site.clone()).expect("Valid base url"));
    let database = Database::in_memory()
        .await
        .expect("In-memory database should open");

    let state = build_with_parts(
        &config,
        database,
        site,
        notifier,
        clock.clone() as Arc<dyn Clock>,
    )
    .await
    .expect("App should build");

    TestApp {
        state,
        clock,
        server,
    }
}
