use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tram_planner::PlannerContext;
use tram_planner::domain::{StationId, TimetableFeed, TramTime, TransportData};
use tram_planner::graph::GraphFilter;
use tram_planner::planner::{
    Endpoint, JourneyRequest, PlannerConfig, SystemClock, rank_journeys, remove_dominated,
};

/// Most journeys to print.
const MAX_RESULTS: usize = 5;

fn load_feed(path: &Path) -> Result<TimetableFeed, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read timetable {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let timetable = std::env::var("TRAM_TIMETABLE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("timetable.json"));
    let config = match std::env::var("TRAM_CONFIG") {
        Ok(path) => PlannerConfig::load(Path::new(&path))?,
        Err(_) => {
            warn!("TRAM_CONFIG not set, using default configuration");
            PlannerConfig::default()
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [from, to, rest @ ..] = args.as_slice() else {
        return Err("usage: tram-planner FROM TO [HH:MM] [YYYY-MM-DD] [--arrive-by]".into());
    };

    let data = TransportData::from_feed(load_feed(&timetable)?)?;
    let context = PlannerContext::start(data, config, GraphFilter::all())?;

    let mut request = JourneyRequest::departing_now(&SystemClock, context.config());
    for arg in rest {
        if arg == "--arrive-by" {
            request = request.arriving_by();
        } else if let Ok(time) = TramTime::parse_hhmm(arg) {
            request.time = time;
        } else {
            request.date = NaiveDate::parse_from_str(arg, "%Y-%m-%d")?;
        }
    }

    let start = Endpoint::Station(StationId::new(from));
    let dest = Endpoint::Station(StationId::new(to));
    let journeys: Vec<_> = context
        .route_calculator()
        .calculate_route(&start, &dest, &request)?
        .collect();
    info!(found = journeys.len(), "search complete");

    let journeys = rank_journeys(remove_dominated(journeys));
    if journeys.is_empty() {
        println!("No journeys found from {from} to {to}");
    }
    for journey in journeys.iter().take(MAX_RESULTS) {
        println!(
            "{} -> {} ({} mins, {} changes)",
            journey.departure_time(),
            journey.arrival_time(),
            journey.duration_mins(),
            journey.change_count()
        );
        println!("  {journey}");
    }
    Ok(())
}
