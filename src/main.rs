use clap::{Parser, Subcommand};
use jobsift::filter::toggle_facet_value;
use jobsift::infrastructure::expand_tilde;
use jobsift::observability::init_tracing;
use jobsift::{connect, ApplicationState, Config, FacetName, FacetSelection, JobBoard, Result, SearchPhase};

#[derive(Parser)]
#[command(name = "jobsift")]
#[command(about = "Search job listings, bookmark them and track applications")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search listings
    Search {
        /// Free text matched against titles, companies and skills
        text: Option<String>,

        /// Contract type (FULL_TIME, PART_TIME, CONTRACT, INTERNSHIP, FREELANCE, TEMPORARY)
        #[arg(long = "contract")]
        contract_types: Vec<String>,

        /// Work modality (ON_SITE, REMOTE, HYBRID)
        #[arg(long = "modality")]
        work_modalities: Vec<String>,

        /// Experience level (ENTRY, JUNIOR, MID, SENIOR, LEAD)
        #[arg(long = "level")]
        experience_levels: Vec<String>,

        #[arg(long = "location")]
        locations: Vec<String>,

        #[arg(long = "sector")]
        sectors: Vec<String>,

        #[arg(long)]
        salary_min: Option<u32>,

        #[arg(long)]
        salary_max: Option<u32>,

        /// Only listings published in the last N days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Show whether you applied to a job
    Status {
        job_id: String,
    },

    /// Toggle the bookmark of a job
    Bookmark {
        job_id: String,
    },

    /// Withdraw an application
    Cancel {
        application_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config.as_deref() {
        Some(path) => Config::from_file(expand_tilde(path))?,
        None => Config::default(),
    };
    if let Some(trace_file) = init_tracing(&config) {
        tracing::debug!(trace_file = %trace_file.display(), "tracing initialized");
    }

    let board = connect(&config)?;
    let outcome = match cli.command {
        Commands::Search {
            text,
            contract_types,
            work_modalities,
            experience_levels,
            locations,
            sectors,
            salary_min,
            salary_max,
            days,
        } => {
            let mut facets = FacetSelection::default();
            for (name, values) in [
                (FacetName::ContractType, contract_types),
                (FacetName::WorkModality, work_modalities),
                (FacetName::ExperienceLevel, experience_levels),
                (FacetName::Location, locations),
                (FacetName::Sector, sectors),
            ] {
                for value in values {
                    facets = toggle_facet_value(&facets, name.as_str(), &value)?;
                }
            }
            facets.set_salary_range(salary_min, salary_max);
            facets.set_published_within(days);
            search(&board, text.unwrap_or_default(), facets).await
        }
        Commands::Status { job_id } => status(&board, &job_id).await,
        Commands::Bookmark { job_id } => bookmark(&board, &job_id).await,
        Commands::Cancel { application_id } => board.cancel_application(&application_id).await.map(|()| {
            println!("Application {application_id} withdrawn");
        }),
    };

    board.dispose();
    outcome
}

async fn search(board: &JobBoard, text: String, facets: FacetSelection) -> Result<()> {
    if let Err(e) = board.bookmarks().load().await {
        tracing::debug!(error = %e, "bookmarks unavailable");
    }

    let session = board.search();
    session.submit_search(text, facets);
    if !session.is_searching() {
        session.refresh();
    }
    let state = session.settled().await;

    if state.phase() == SearchPhase::Failed {
        if let Some(error) = state.error() {
            eprintln!("search failed: {}", error.message);
        }
    }

    let filter = state.results().filter.clone();
    for chip in filter.chips() {
        print!("[{}] ", chip.label);
    }
    if !filter.is_unfiltered() {
        println!();
    }

    let rows = board.present();
    if rows.is_empty() {
        println!("No listings found");
    }
    for row in rows.iter() {
        let listing = &row.listing;
        println!(
            "{} {:<12} {} · {}{}",
            if row.is_favorite { "★" } else { " " },
            listing.id,
            listing.title,
            listing.company,
            listing.location.as_deref().map(|l| format!(" · {l}")).unwrap_or_default(),
        );
    }
    Ok(())
}

async fn status(board: &JobBoard, job_id: &str) -> Result<()> {
    let mut changes = board.statuses().subscribe();
    let mount = board.mount_status(job_id);
    while mount.entry().is_loading() {
        if changes.changed().await.is_err() {
            break;
        }
    }

    let entry = mount.entry();
    match (entry.state, entry.application) {
        (ApplicationState::Resolved, Some(application)) if entry.has_applied => println!(
            "Applied on {} ({:?}), application {}",
            application.applied_at.format("%Y-%m-%d"),
            application.status,
            application.id
        ),
        (ApplicationState::Resolved, _) => println!("Not applied"),
        (ApplicationState::Error, _) => {
            let message = entry.error.map(|e| e.message).unwrap_or_default();
            println!("Couldn't verify application status: {message}");
        }
        (ApplicationState::Idle | ApplicationState::Loading, _) => println!("Status unavailable"),
    }
    Ok(())
}

async fn bookmark(board: &JobBoard, job_id: &str) -> Result<()> {
    if let Err(e) = board.bookmarks().load().await {
        tracing::debug!(error = %e, "bookmarks unavailable, toggling blind");
    }
    let confirmed = board.toggle_bookmark(job_id).await;
    let now = board.bookmarks().is_bookmarked(job_id);
    match (confirmed, now) {
        (true, true) => println!("Bookmarked {job_id}"),
        (true, false) => println!("Removed bookmark {job_id}"),
        (false, _) => println!("Bookmark change for {job_id} failed and was undone"),
    }
    Ok(())
}
