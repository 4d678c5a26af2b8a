use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use colfilter::filter::FilterView;
use colfilter::tracking::tracker::ENTER_ROUTE;
use colfilter::tracking::{LogTrackingApi, StaticRoles, Tracker, TrackingConfiguration};
use colfilter::{
    ActionBus, AppConfig, CFError, ColumnConfiguration, ColumnFilter, Controller, Direction, FileSettings, SyncTrigger,
    TableKey,
};

#[derive(Parser, Debug)]
#[command(name = "colfilter", version, about = "Show and change which columns a table displays")]
struct Cli {
    #[command(flatten)]
    app: AppConfig,

    /// Column configuration of the table (JSON).
    #[arg(long)]
    config: PathBuf,

    #[arg(long)]
    table_name: String,

    #[arg(long, default_value = "default")]
    table_id: String,

    /// Granted requirement. Without any, columns are not filtered by requirements.
    #[arg(long = "requirement")]
    requirements: Vec<String>,

    /// Role reported to tracking.
    #[arg(long = "role")]
    roles: Vec<String>,

    /// Tracking configuration (JSON). Column actions are tracked when omitted.
    #[arg(long)]
    tracking: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current columns.
    Show,
    Enable { column_id: String },
    Disable { column_id: String },
    Move {
        column_id: String,
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Go back to the default columns.
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .init();
}

fn run(cli: Cli) -> Result<(), CFError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let view = runtime.block_on(execute(cli))?;
    print_view(&view);
    Ok(())
}

async fn execute(cli: Cli) -> Result<FilterView, CFError> {
    let configuration = Arc::new(ColumnConfiguration::load(&cli.config)?);
    let tracking = match &cli.tracking {
        Some(path) => TrackingConfiguration::load(path)?,
        None => TrackingConfiguration::builtin(),
    };
    let settings_file = cli.app.settings_file()?;
    info!("Using settings from {}", settings_file.display());

    let (sync, mut failures) = SyncTrigger::new(Arc::new(FileSettings::new(settings_file))).with_failure_channel();
    let bus = ActionBus::new(cli.app.action_buffer);

    let tracking_api = LogTrackingApi::new(cli.app.tracking_url.clone(), cli.app.tracking_site_id.clone());
    let tracker = Tracker::new(Arc::new(tracking_api), Arc::new(tracking));
    let tracking_task = tokio::spawn(tracker.run(StaticRoles(cli.roles), bus.subscribe()));

    let (controller, handle) = Controller::new(&cli.app, sync.clone(), bus.clone());
    let controller_task = tokio::spawn(controller.run());

    let table = TableKey::new(cli.table_name, cli.table_id);
    bus.publish(&json!({
        "type": ENTER_ROUTE,
        "pathname": format!("/tables/{}", table.table_name),
        "title": table.to_string(),
    }));

    let requirements = (!cli.requirements.is_empty()).then_some(cli.requirements);
    let filter = ColumnFilter::new(table, configuration, requirements);
    filter.mount(&handle, &sync).await?;

    let message = match cli.command.unwrap_or(Command::Show) {
        Command::Show => None,
        Command::Enable { column_id } => filter.enable(&column_id),
        Command::Disable { column_id } => filter.disable(&column_id),
        Command::Move { column_id, direction } => filter.move_column(&column_id, direction),
        Command::Reset => Some(filter.reset()),
    };
    if let Some(message) = message {
        handle.dispatch(message).await?;
    }
    handle.flush().await?;
    let preference = handle.columns(filter.table()).await?;

    handle.quit().await?;
    if let Err(e) = controller_task.await {
        warn!("Controller task failed: {e}");
    }
    drop(bus);
    if let Err(e) = tracking_task.await {
        warn!("Tracking task failed: {e}");
    }

    if let Ok(failure) = failures.try_recv() {
        return Err(CFError::Settings(format!(
            "columns were not saved under {}: {}",
            failure.key, failure.reason
        )));
    }
    Ok(filter.view(&preference))
}

fn print_view(view: &FilterView) {
    println!("Enabled:");
    for column in &view.enabled {
        println!("  {} ({})", column.id, column.label_msg);
    }
    println!("Disabled:");
    if view.disabled.is_empty() {
        println!("  -");
    }
    for column in &view.disabled {
        println!("  {} ({})", column.id, column.label_msg);
    }
}
