use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use merch_console::net::types::{AlgoParams, FileType, NotificationKind, RunRequest, TaskStatus};
use merch_console::services::reports::{self, ReportKind};
use merch_console::services::{algo, dashboard, files, notifications, runs, tasks};
use merch_console::state::notifications::NotificationKey;
use merch_console::state::{FileStorage, KeyValueStorage, NotificationStore, SidebarStore, ThemeMode, ThemeStore};
use merch_console::upload::{PollProfile, ProgressEvent, UploadBoard, UploadEngine, UploadFile, validate_upload, wait_for_completion};
use merch_console::{ApiClient, ApiError, ConsoleConfig};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{file_type} upload blocked: {message}")]
    Blocked { file_type: FileType, message: String },
    #[error("refusing to clear all data without --yes")]
    ConfirmationRequired,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "merch-console", about = "NOOS merchandising backend operator console")]
struct Cli {
    /// Overrides `NOOS_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `NOOS_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dataset status and upload gates.
    Status,
    Upload {
        file_type: FileType,
        path: PathBuf,
        /// Skip the dependency gate.
        #[arg(long, default_value_t = false)]
        force: bool,
        /// Use the legacy blocking endpoint.
        #[arg(long, default_value_t = false)]
        sync: bool,
    },
    Download {
        file_type: FileType,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    Tasks(TasksCommand),
    Params(ParamsCommand),
    Run {
        #[arg(long)]
        params: Option<i64>,
        /// Use the legacy blocking endpoint.
        #[arg(long, default_value_t = false)]
        sync: bool,
    },
    Runs,
    Results {
        #[arg(long)]
        run: Option<i64>,
    },
    DeleteRun {
        run_id: i64,
    },
    Report {
        kind: ReportKind,
    },
    Export(ExportCommand),
    Errors {
        task_id: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        size: u32,
    },
    Dashboard,
    ClearAll {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Notifications(NotificationsCommand),
    Prefs(PrefsCommand),
}

#[derive(Args, Debug)]
struct TasksCommand {
    #[command(subcommand)]
    command: TasksSubcommand,
}

#[derive(Subcommand, Debug)]
enum TasksSubcommand {
    List,
    Get { task_id: String },
    Stats,
    ByStatus { status: String },
    Cancel { task_id: String },
    Watch { task_id: String },
}

#[derive(Args, Debug)]
struct ParamsCommand {
    #[command(subcommand)]
    command: ParamsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ParamsSubcommand {
    List,
    Active,
    Show { id: i64 },
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    Activate { id: i64 },
    Delete { id: i64 },
}

#[derive(Args, Debug)]
struct ExportCommand {
    #[arg(long, default_value = ".")]
    out: PathBuf,

    #[command(subcommand)]
    target: ExportTarget,
}

#[derive(Subcommand, Debug)]
enum ExportTarget {
    Report { kind: ReportKind },
    Run { run_id: i64 },
    Errors { task_id: String },
}

#[derive(Args, Debug)]
struct NotificationsCommand {
    #[command(subcommand)]
    command: NotificationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum NotificationsSubcommand {
    List,
    /// Mark one notification read: a server id or a local UUID.
    Read { id: String },
    ReadAll,
    ClearLocal,
}

#[derive(Args, Debug)]
struct PrefsCommand {
    #[command(subcommand)]
    command: PrefsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PrefsSubcommand {
    /// Show the theme, or set it to light, dark, system or toggle.
    Theme { value: Option<String> },
    /// Show the sidebar, or `toggle`, or set the active section.
    Sidebar {
        action: Option<String>,
        #[arg(long)]
        section: Option<String>,
    },
}

struct Console {
    config: ConsoleConfig,
    client: Arc<ApiClient>,
    engine: UploadEngine<ApiClient>,
    storage: Arc<dyn KeyValueStorage>,
    notices: NotificationStore<ApiClient>,
}

impl Console {
    fn new(config: ConsoleConfig) -> Result<Self, CliError> {
        let client = Arc::new(ApiClient::new(&config)?);
        let engine = UploadEngine::new(Arc::clone(&client)).with_max_upload_bytes(config.max_upload_bytes);
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(config.state_dir.clone()));
        let notices = NotificationStore::new(Arc::clone(&client), Arc::clone(&storage));
        Ok(Self { config, client, engine, storage, notices })
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    if dotenvy::dotenv().is_err() {
        tracing::debug!("no .env file loaded");
    }

    let cli = Cli::parse();
    let mut config = ConsoleConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_owned();
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }
    tracing::info!(base_url = %config.base_url, "merch-console starting");

    let console = Console::new(config)?;
    let client = console.client.as_ref();

    match cli.command {
        Command::Status => {
            let board = UploadBoard::new(files::status(client).await);
            for view in board.views() {
                let gate = if view.can_upload { "ready" } else { "locked" };
                println!(
                    "{:<8} {:<10} {:<6} rows={:<10} {}",
                    view.file_type.as_str(),
                    view.state.as_str(),
                    gate,
                    view.record.count,
                    view.message
                );
            }
            Ok(())
        }
        Command::Upload { file_type, path, force, sync } => run_upload(&console, file_type, &path, force, sync).await,
        Command::Download { file_type, out } => run_download(&console, file_type, &out).await,
        Command::Tasks(cmd) => run_tasks(&console, cmd).await,
        Command::Params(cmd) => run_params(client, cmd).await,
        Command::Run { params, sync } => run_noos(&console, RunRequest { params_id: params }, sync).await,
        Command::Runs => print_json(&runs::updates(client).await),
        Command::Results { run } => print_json(&runs::results(client, run).await),
        Command::DeleteRun { run_id } => {
            runs::delete_run(client, run_id).await?;
            println!("deleted run {run_id}");
            Ok(())
        }
        Command::Report { kind } => {
            print!("{}", reports::report(client, kind).await.to_tsv());
            Ok(())
        }
        Command::Export(cmd) => run_export(client, cmd).await,
        Command::Errors { task_id, page, size } => {
            let report = files::validation_report(client, &task_id).await;
            println!(
                "rows={} valid={} errors={} skipped={}",
                report.total_rows, report.valid_rows, report.error_rows, report.skipped_rows
            );
            print_json(&files::upload_errors(client, &task_id, page, size).await)?;
            print_json(&files::skipped_rows(client, &task_id, page, size).await)
        }
        Command::Dashboard => {
            let summary = dashboard::load(client).await;
            println!("records: {}", summary.total_records());
            println!("ready to run: {}", summary.ready_to_run());
            println!(
                "tasks: total={} running={} failed={}",
                summary.tasks.total, summary.tasks.running, summary.tasks.failed
            );
            println!(
                "noos: core={} bestseller={} fashion={}",
                summary.noos.core, summary.noos.bestseller, summary.noos.fashion
            );
            if let Some(run) = summary.latest_run {
                println!("latest run: #{} {} {}", run.id, run.status, run.run_date.unwrap_or_default());
            }
            Ok(())
        }
        Command::ClearAll { yes } => {
            if !yes {
                return Err(CliError::ConfirmationRequired);
            }
            files::clear_all(client).await?;
            println!("all data cleared");
            Ok(())
        }
        Command::Notifications(cmd) => run_notifications(&console, cmd).await,
        Command::Prefs(cmd) => run_prefs(&console, cmd),
    }
}

async fn run_upload(console: &Console, file_type: FileType, path: &Path, force: bool, sync: bool) -> Result<(), CliError> {
    let board = UploadBoard::new(files::status(&console.client).await);
    let view = board.view(file_type);
    if !view.can_upload && !force {
        let message = if view.message.is_empty() { "an upload is already processing".to_owned() } else { view.message };
        return Err(CliError::Blocked { file_type, message });
    }

    let file = UploadFile::from_path(path).await?;
    if sync {
        validate_upload(Some(&file), console.engine.max_upload_bytes())?;
        #[allow(deprecated)]
        let result = files::upload_sync(&console.client, file_type, &file).await?;
        return print_json(&result);
    }
    let stream = console.engine.observe_upload(file_type, Some(file));
    let outcome = wait_for_completion(stream, |event| {
        board.apply_progress(file_type, event);
        print_progress(file_type.as_str(), event);
    })
    .await;

    match outcome {
        Ok(event) => {
            let task_id = event.task.map(|t| t.id).unwrap_or_default();
            console.notices.push(
                NotificationKind::Success,
                format!("{file_type} uploaded"),
                format!("task {task_id} completed"),
            );
            println!("{file_type}: upload complete");
            Ok(())
        }
        Err(e) => {
            board.apply_failure(file_type, &e);
            console.notices.push(NotificationKind::Error, format!("{file_type} upload failed"), e.to_string());
            if let Some(task) = e.task() {
                println!("see `merch-console errors {}` for rejected rows", task.id);
            }
            Err(e.into())
        }
    }
}

async fn run_download(console: &Console, file_type: FileType, out: &Path) -> Result<(), CliError> {
    let stream = console.engine.observe_download(file_type);
    let event = wait_for_completion(stream, |event| print_progress(file_type.as_str(), event)).await?;
    let bytes = event.result.unwrap_or_default();
    let path = reports::save_blob(out, &reports::export_filename(file_type.as_str()), &bytes).await?;
    println!("saved {}", path.display());
    Ok(())
}

async fn run_tasks(console: &Console, cmd: TasksCommand) -> Result<(), CliError> {
    let client = console.client.as_ref();
    match cmd.command {
        TasksSubcommand::List => print_json(&tasks::list(client).await),
        TasksSubcommand::Get { task_id } => match tasks::find(client, &task_id).await {
            Some(task) => print_json(&task),
            None => Err(CliError::InvalidArgument(format!("task {task_id} not found"))),
        },
        TasksSubcommand::Stats => print_json(&tasks::stats(client).await),
        TasksSubcommand::ByStatus { status } => {
            let status = TaskStatus::from(status.to_ascii_uppercase());
            if let TaskStatus::Unknown(raw) = &status {
                return Err(CliError::InvalidArgument(format!("unknown task status: {raw}")));
            }
            print_json(&tasks::by_status(client, &status).await)
        }
        TasksSubcommand::Cancel { task_id } => print_json(&tasks::cancel(client, &task_id).await?),
        TasksSubcommand::Watch { task_id } => {
            let stream = console.engine.observe_task(task_id.clone(), PollProfile::UPLOAD);
            let event = wait_for_completion(stream, |event| print_progress(&task_id, event)).await?;
            println!("task {task_id} completed");
            print_json(&event.task)
        }
    }
}

async fn run_params(client: &ApiClient, cmd: ParamsCommand) -> Result<(), CliError> {
    match cmd.command {
        ParamsSubcommand::List => print_json(&algo::list(client).await),
        ParamsSubcommand::Active => print_json(&algo::active(client).await),
        ParamsSubcommand::Show { id } => print_json(&algo::get(client, id).await),
        ParamsSubcommand::Create { file } => {
            let params = read_params(&file).await?;
            print_json(&algo::create(client, &params).await?)
        }
        ParamsSubcommand::Update { id, file } => {
            let params = read_params(&file).await?;
            print_json(&algo::update(client, id, &params).await?)
        }
        ParamsSubcommand::Activate { id } => {
            algo::activate(client, id).await?;
            println!("parameter set {id} is active");
            Ok(())
        }
        ParamsSubcommand::Delete { id } => {
            algo::delete(client, id).await?;
            println!("parameter set {id} deleted");
            Ok(())
        }
    }
}

async fn read_params(path: &Path) -> Result<AlgoParams, CliError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ApiError::Io(format!("cannot read {}: {e}", path.display())))?;
    Ok(serde_json::from_str(&raw)?)
}

async fn run_noos(console: &Console, request: RunRequest, sync: bool) -> Result<(), CliError> {
    if sync {
        #[allow(deprecated)]
        let update = runs::run_sync(&console.client, &request).await?;
        return print_json(&update);
    }
    let stream = console.engine.observe_run(request);
    match wait_for_completion(stream, |event| print_progress("noos", event)).await {
        Ok(_) => {
            console.notices.push(NotificationKind::Success, "NOOS run finished", "results are ready");
            print_json(&runs::summary(&console.client).await)
        }
        Err(e) => {
            console.notices.push(NotificationKind::Error, "NOOS run failed", e.to_string());
            Err(e.into())
        }
    }
}

async fn run_export(client: &ApiClient, cmd: ExportCommand) -> Result<(), CliError> {
    let (stem, bytes) = match cmd.target {
        ExportTarget::Report { kind } => (kind.as_str().to_owned(), reports::download(client, kind).await?),
        ExportTarget::Run { run_id } => (format!("noos_run_{run_id}"), runs::download_run(client, run_id).await?),
        ExportTarget::Errors { task_id } => (format!("upload_errors_{task_id}"), files::download_errors(client, &task_id).await?),
    };
    let path = reports::save_blob(&cmd.out, &reports::export_filename(&stem), &bytes).await?;
    println!("saved {}", path.display());
    Ok(())
}

async fn run_notifications(console: &Console, cmd: NotificationsCommand) -> Result<(), CliError> {
    let store = &console.notices;
    match cmd.command {
        NotificationsSubcommand::List => {
            store.refresh().await;
            let unread_on_server = notifications::unread_count(&console.client).await;
            println!("unread: {} (server: {unread_on_server})", store.unread_count());
            for n in store.notifications() {
                let mark = if n.read { " " } else { "*" };
                let id = match n.key {
                    NotificationKey::Server(id) => id.to_string(),
                    NotificationKey::Local(id) => id.to_string(),
                };
                println!("{mark} {id} [{:?}] {} - {} ({})", n.kind, n.title, n.message, n.created_at);
            }
            Ok(())
        }
        NotificationsSubcommand::Read { id } => {
            let key = parse_notification_key(&id)?;
            store.mark_read(key).await?;
            println!("marked {id} read");
            Ok(())
        }
        NotificationsSubcommand::ReadAll => {
            store.refresh().await;
            store.mark_all_read().await?;
            println!("all notifications marked read");
            Ok(())
        }
        NotificationsSubcommand::ClearLocal => {
            store.clear_local();
            println!("local notifications cleared");
            Ok(())
        }
    }
}

fn parse_notification_key(raw: &str) -> Result<NotificationKey, CliError> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(NotificationKey::Server(id));
    }
    Uuid::parse_str(raw)
        .map(NotificationKey::Local)
        .map_err(|_| CliError::InvalidArgument(format!("not a notification id: {raw}")))
}

fn run_prefs(console: &Console, cmd: PrefsCommand) -> Result<(), CliError> {
    match cmd.command {
        PrefsSubcommand::Theme { value } => {
            let (_os_signal, system) = watch::channel(console.config.system_dark);
            let store = ThemeStore::start(Arc::clone(&console.storage), system);
            match value.as_deref() {
                None => {}
                Some("toggle") => {
                    store.toggle();
                }
                Some(raw) => store.set_mode(parse_theme_mode(raw)?),
            }
            println!("theme: {} (mode {:?})", store.theme().as_str(), store.mode());
            store.shutdown();
            Ok(())
        }
        PrefsSubcommand::Sidebar { action, section } => {
            let store = SidebarStore::new(Arc::clone(&console.storage));
            match action.as_deref() {
                None => {}
                Some("toggle") => {
                    store.toggle();
                }
                Some(other) => return Err(CliError::InvalidArgument(format!("unknown sidebar action: {other}"))),
            }
            if section.is_some() {
                store.set_active_section(section);
            }
            print_json(&store.state())
        }
    }
}

fn parse_theme_mode(raw: &str) -> Result<ThemeMode, CliError> {
    match raw {
        "light" => Ok(ThemeMode::Light),
        "dark" => Ok(ThemeMode::Dark),
        "system" => Ok(ThemeMode::System),
        other => Err(CliError::InvalidArgument(format!("unknown theme: {other}"))),
    }
}

fn print_progress(label: &str, event: &ProgressEvent) {
    let message = event
        .task
        .as_ref()
        .and_then(|t| t.progress_message.as_deref())
        .unwrap_or("");
    println!("{label}: {:>3}% {message}", event.progress);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
