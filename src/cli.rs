use crate::engine::{IngestControl, PlanEngine, PlannerClient};
use crate::model::{PlanEvent, RunConfig, SavedPlan, TravelRequest};
use crate::render;
use crate::storage::{self, JsonFileStore, PlanStore};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Output line routing for the stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr so async tasks never block
/// on terminal I/O.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "travel-planner",
    version,
    about = "Streamed AI travel itineraries with saved-plan history"
)]
pub struct Cli {
    /// Base URL of the plan-generation backend
    #[arg(
        long,
        env = "TRAVEL_PLANNER_API_URL",
        default_value = "http://localhost:8000"
    )]
    pub base_url: String,

    /// Base URL of the geocoding service (Nominatim wire format)
    #[arg(long, default_value = "https://nominatim.openstreetmap.org")]
    pub geocode_url: String,

    /// Connect timeout for backend requests
    #[arg(long, default_value = "10s")]
    pub connect_timeout: humantime::Duration,

    /// Override the saved-plans file location
    #[arg(long)]
    pub plans_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a travel plan, streaming it as it is produced
    Plan(PlanArgs),
    /// Inspect and manage saved plans
    #[command(subcommand)]
    Plans(PlansCommand),
}

#[derive(Debug, Args, Clone)]
pub struct PlanArgs {
    /// Origin city
    #[arg(long)]
    pub origin: String,

    /// Destination city
    #[arg(long)]
    pub destination: String,

    /// Departure date (YYYY-MM-DD, today or later)
    #[arg(long)]
    pub departure_date: NaiveDate,

    /// Return date (optional, on or after the departure date)
    #[arg(long)]
    pub return_date: Option<NaiveDate>,

    /// Total trip budget
    #[arg(long)]
    pub total_budget: f64,

    /// Maximum hotel budget per night
    #[arg(long)]
    pub nightly_budget: f64,

    /// Free-text preferences and interests (at least 10 characters)
    #[arg(long)]
    pub preferences: String,

    /// Print the final plan record as JSON instead of the formatted summary
    #[arg(long)]
    pub json: bool,

    /// Use --auto-save true or --auto-save false to override
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub auto_save: bool,

    /// Look up destination coordinates for the map line
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub map: bool,

    /// Export the plan record as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export the plan as a PDF fetched from the backend
    #[arg(long)]
    pub export_pdf: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum PlansCommand {
    /// List saved plans, newest first
    List,
    /// Render one saved plan
    Show { id: String },
    /// Delete one saved plan
    Delete { id: String },
    /// Fetch a PDF for one saved plan
    ExportPdf {
        id: String,
        /// Output path (default: Trip-<destination>.pdf)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        base_url: args.base_url.clone(),
        geocode_url: args.geocode_url.clone(),
        user_agent: format!("travel-planner-cli/{}", env!("CARGO_PKG_VERSION")),
        connect_timeout: Duration::from(args.connect_timeout),
    }
}

fn open_store(args: &Cli) -> Result<JsonFileStore> {
    match &args.plans_file {
        Some(path) => Ok(JsonFileStore::new(path.clone())),
        None => JsonFileStore::default_location(),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let store = open_store(&args)?;

    match args.command {
        Command::Plan(plan_args) => run_plan(cfg, plan_args, &store).await,
        Command::Plans(cmd) => run_plans(cfg, cmd, &store).await,
    }
}

async fn run_plan(cfg: RunConfig, args: PlanArgs, store: &JsonFileStore) -> Result<()> {
    let request = TravelRequest {
        origin: args.origin.clone(),
        destination: args.destination.clone(),
        departure_date: args.departure_date,
        return_date: args.return_date,
        total_budget: args.total_budget,
        nightly_budget: args.nightly_budget,
        preferences: args.preferences.clone(),
    };
    let today = chrono::Local::now().date_naive();

    let (out_tx, out_handle) = spawn_output_writer();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PlanEvent>();
    let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel::<IngestControl>();

    // Ctrl-C cancels the in-flight stream instead of killing the process.
    let ctrl_tx2 = ctrl_tx.clone();
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_tx2.send(IngestControl::Cancel);
        }
    });

    let engine = PlanEngine::new(cfg.clone());
    let engine_request = request.clone();
    let handle =
        tokio::spawn(async move { engine.run(engine_request, today, event_tx, ctrl_rx).await });

    // Echo completed lines to stderr as the plan streams in; the final
    // formatted summary goes to stdout once the stream ends.
    let mut emitted = 0usize;
    while let Some(ev) = event_rx.recv().await {
        match ev {
            PlanEvent::RequestSent => {
                if !args.json {
                    let _ = out_tx.send(OutputLine::Stderr("Generating plan...".to_string()));
                }
            }
            PlanEvent::Snapshot { text } => {
                if !args.json {
                    if let Some(nl) = text[emitted..].rfind('\n') {
                        let upto = emitted + nl;
                        for line in text[emitted..upto].lines() {
                            let _ = out_tx.send(OutputLine::Stderr(line.to_string()));
                        }
                        emitted = upto + 1;
                    }
                }
            }
            PlanEvent::Info(msg) => {
                let _ = out_tx.send(OutputLine::Stderr(msg));
            }
        }
    }

    let run_result = handle.await.context("plan engine task failed")?;
    signal_handle.abort();

    let plan_text = match run_result {
        Ok(text) => text,
        Err(err) if err.is_cancelled() => {
            let _ = out_tx.send(OutputLine::Stderr("Cancelled.".to_string()));
            drop(out_tx);
            let _ = out_handle.await;
            return Ok(());
        }
        Err(err) => {
            drop(out_tx);
            let _ = out_handle.await;
            return Err(anyhow::Error::new(err).context("plan generation failed"));
        }
    };

    let client = PlannerClient::new(&cfg)?;
    let map = if args.map {
        lookup_map(&client, &cfg, &request.destination).await
    } else {
        None
    };

    let saved = SavedPlan::new(request, plan_text);

    handle_exports(&client, &args, &saved, &out_tx).await?;

    if args.json {
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&saved)?));
    } else {
        let summary = render::build_plan_summary(&saved.request, &saved.plan_text, map);
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    // Storage failures are reported but never fail the run.
    if args.auto_save {
        match store.append_newest(saved) {
            Ok(()) => {
                let _ = out_tx.send(OutputLine::Stderr(format!(
                    "Saved: {}",
                    store.path().display()
                )));
            }
            Err(e) => {
                warn!(error = %e, "could not save plan");
                let _ = out_tx.send(OutputLine::Stderr(format!("Save failed: {e:#}")));
            }
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Map lookup is best-effort: no hit or any error just omits the map.
async fn lookup_map(
    client: &PlannerClient,
    cfg: &RunConfig,
    destination: &str,
) -> Option<crate::model::GeoPoint> {
    match crate::geocode::lookup(&client.http, &cfg.geocode_url, destination).await {
        Ok(point) => point,
        Err(e) => {
            warn!(error = %e, %destination, "geocoding failed");
            None
        }
    }
}

async fn handle_exports(
    client: &PlannerClient,
    args: &PlanArgs,
    saved: &SavedPlan,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        storage::export_json(p, saved)?;
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported: {}", p.display())));
    }
    if let Some(p) = args.export_pdf.as_deref() {
        let bytes = client
            .download_pdf(&saved.plan_text)
            .await
            .map_err(anyhow::Error::new)
            .context("could not fetch the PDF")?;
        storage::export_pdf(p, &bytes)?;
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported: {}", p.display())));
    }
    Ok(())
}

async fn run_plans(cfg: RunConfig, cmd: PlansCommand, store: &JsonFileStore) -> Result<()> {
    match cmd {
        PlansCommand::List => {
            let plans = store.load();
            if plans.is_empty() {
                println!("No saved plans yet.");
                return Ok(());
            }
            for plan in &plans {
                println!("{}", render::list_entry(plan));
                println!();
            }
            Ok(())
        }
        PlansCommand::Show { id } => {
            let plan = store
                .find(&id)
                .with_context(|| format!("no saved plan with id {id}"))?;
            let summary = render::build_plan_summary(&plan.request, &plan.plan_text, None);
            for line in summary.lines {
                println!("{}", line);
            }
            Ok(())
        }
        PlansCommand::Delete { id } => {
            if store.delete(&id)? {
                println!("Deleted {id}");
                Ok(())
            } else {
                anyhow::bail!("no saved plan with id {id}")
            }
        }
        PlansCommand::ExportPdf { id, out } => {
            let plan = store
                .find(&id)
                .with_context(|| format!("no saved plan with id {id}"))?;
            let client = PlannerClient::new(&cfg)?;
            let bytes = client
                .download_pdf(&plan.plan_text)
                .await
                .map_err(anyhow::Error::new)
                .context("could not fetch the PDF")?;
            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!("Trip-{}.pdf", plan.request.destination))
            });
            storage::export_pdf(&path, &bytes)?;
            println!("Exported: {}", path.display());
            Ok(())
        }
    }
}
