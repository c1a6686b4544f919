use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::services::{
    AccountService, CheckInExecutor, CheckInLogService, Clock, RunPool, SystemClock,
    TaskRunner, TaskScheduler, TaskService,
};
use crate::presentation::state::{AppState, Repositories, Services};
use anycheckin_domain::account::AccountRepository;
use anycheckin_domain::check_in::CheckInLogRepository;
use anycheckin_domain::notification::CheckInNotifier;
use anycheckin_domain::task::TaskRepository;
use anycheckin_infrastructure::config::AppConfig;
use anycheckin_infrastructure::http::SiteClient;
use anycheckin_infrastructure::notification::TelegramNotifier;
use anycheckin_infrastructure::persistence::{
    repositories::{SqliteAccountRepository, SqliteCheckInLogRepository, SqliteTaskRepository},
    Database,
};
use anycheckin_infrastructure::security::EncryptionService;

/// Opens the configured database and wires every service.
pub async fn build_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    info!("🔌 Connecting to database {}...", config.database.path.display());
    let started_at = Instant::now();
    let database = Database::new(&config.database.path).await?;
    info!(
        "✓ Database connection established ({}ms)",
        started_at.elapsed().as_millis()
    );

    build_with_database(config, database).await
}

/// Wires the services on top of an already opened database.
pub async fn build_with_database(config: &AppConfig, database: Database) -> anyhow::Result<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.scheduler.offset()?));
    let site = Arc::new(SiteClient::new(config.site.clone())?);
    let notifier =
        Arc::new(TelegramNotifier::new(config.telegram.clone())) as Arc<dyn CheckInNotifier>;
    build_with_parts(config, database, site, notifier, clock).await
}

/// Wires the services around explicitly supplied collaborators.
pub async fn build_with_parts(
    config: &AppConfig,
    database: Database,
    site: Arc<SiteClient>,
    notifier: Arc<dyn CheckInNotifier>,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<AppState> {
    info!("🔄 Running migrations...");
    let started_at = Instant::now();
    database.run_migrations().await?;
    info!("✓ Migrations completed ({}ms)", started_at.elapsed().as_millis());

    info!("🔐 Initializing encryption...");
    let encryption = Arc::new(EncryptionService::from_secret(&config.security.secret)?);

    let pool = Arc::new(database.pool().clone());
    let account_repo = Arc::new(SqliteAccountRepository::new(pool.clone(), encryption))
        as Arc<dyn AccountRepository>;
    let task_repo = Arc::new(SqliteTaskRepository::new(pool.clone())) as Arc<dyn TaskRepository>;
    let log_repo =
        Arc::new(SqliteCheckInLogRepository::new(pool.clone())) as Arc<dyn CheckInLogRepository>;

    let executor = Arc::new(CheckInExecutor::new(
        account_repo.clone(),
        log_repo.clone(),
        site.clone(),
        notifier.clone(),
        clock.clone(),
    ));
    let runner = Arc::new(TaskRunner::new(
        task_repo.clone(),
        account_repo.clone(),
        executor.clone(),
        clock.clone(),
    ));
    let scheduler = Arc::new(TaskScheduler::new(
        task_repo.clone(),
        runner,
        clock.clone(),
        RunPool::new(config.scheduler.max_concurrent_runs),
    ));

    let services = Services {
        account: Arc::new(AccountService::new(account_repo.clone(), site, executor)),
        task: Arc::new(TaskService::new(
            task_repo.clone(),
            account_repo.clone(),
            scheduler.clone(),
        )),
        check_in_log: Arc::new(CheckInLogService::new(
            log_repo.clone(),
            account_repo.clone(),
            notifier,
            clock,
        )),
        scheduler,
    };
    info!("✓ Services ready");

    Ok(AppState {
        db: Arc::new(database),
        repositories: Repositories {
            account: account_repo,
            task: task_repo,
            check_in_log: log_repo,
        },
        services,
    })
}
