//! # CLI Command Implementations
//!
//! Every command runs against one [`Shell`]: the loaded configuration and
//! the single engine it owns. The caller flushes the engine after each
//! command.

use crate::config::AppConfig;
use flightpath_core::{
    AssessmentResponse, AssessmentType, Clock, Engine, FlightpathError, RouteId, ScenarioStatus,
    StorageBackend, TechStackEntry, TierTable, UnlockState, UserProfile,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE INPUT
// =============================================================================

/// Maximum size of an input file (1 MB).
const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

/// Canonicalize `path` and check it is a regular file of acceptable size.
fn validate_input_file(path: &Path) -> Result<PathBuf, FlightpathError> {
    let canonical = path.canonicalize().map_err(|e| {
        FlightpathError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FlightpathError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| FlightpathError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(FlightpathError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }

    Ok(canonical)
}

/// Read a JSON document of type `T` from `path`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, FlightpathError> {
    let validated = validate_input_file(path)?;
    let contents = std::fs::read(&validated)
        .map_err(|e| FlightpathError::IoError(format!("Read file: {}", e)))?;
    serde_json::from_slice(&contents).map_err(|e| {
        FlightpathError::InvalidInput(format!("'{}': {}", path.display(), e))
    })
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SHELL
// =============================================================================

/// Loaded configuration plus the engine it configures.
#[derive(Debug)]
pub struct Shell {
    pub config: AppConfig,
    pub data_path: PathBuf,
    pub engine: Engine,
}

impl Shell {
    /// Load `config_path` and open the engine over a redb store.
    ///
    /// `data_override` takes precedence over the configured data path.
    pub fn open(config_path: &Path, data_override: Option<&Path>) -> Result<Self, FlightpathError> {
        let config = AppConfig::load(config_path)?;
        let data_path = data_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.data_path.clone());

        let network = config.load_network()?;
        let backend = StorageBackend::open_redb(&data_path)?;
        let engine = Engine::open(
            backend,
            Clock::System,
            config.engine,
            TierTable::default(),
            network,
        )?;

        tracing::debug!(data = %data_path.display(), "shell ready");
        Ok(Self {
            config,
            data_path,
            engine,
        })
    }
}

// =============================================================================
// SUBMISSION COMMANDS
// =============================================================================

/// Submit an assessment read from `file`.
pub fn cmd_submit(
    shell: &mut Shell,
    json_mode: bool,
    kind: &str,
    file: &Path,
) -> Result<(), FlightpathError> {
    let kind: AssessmentType = kind.parse()?;
    let responses: Vec<AssessmentResponse> = read_json_file(file)?;

    tracing::info!(%kind, responses = responses.len(), "submitting assessment");

    let entry = match kind {
        AssessmentType::Quick => shell.engine.submit_quick_assessment(&responses),
        AssessmentType::Deep => shell.engine.submit_deep_assessment(&responses),
    }
    .ok_or_else(|| FlightpathError::InvalidInput("no responses to submit".to_string()))?;

    if json_mode {
        print_json(&entry);
        return Ok(());
    }

    println!("Assessment submitted ({})", entry.assessment_type);
    println!("  Combined Score:  {}", entry.combined_score);
    println!("  Plane Level:     {}", entry.plane_level);
    println!("  Flight Miles:    {}", entry.flight_miles);
    println!("  Unlocked Routes: {}", entry.unlocked_routes.len());
    Ok(())
}

/// Replace the tech stack with the entries in `file`.
pub fn cmd_tech_stack(
    shell: &mut Shell,
    json_mode: bool,
    file: &Path,
) -> Result<(), FlightpathError> {
    let entries: Vec<TechStackEntry> = read_json_file(file)?;
    shell.engine.set_tech_stack(&entries);

    let score = shell.engine.score();
    if json_mode {
        print_json(&score);
        return Ok(());
    }

    println!("Tech stack updated: {} tools", entries.len());
    match score.tech_stack_score {
        Some(tech) => println!("  Tech Stack Score: {}", tech),
        None => println!("  Tech Stack Score: n/a (assessment carries full weight)"),
    }
    println!("  Combined Score:   {}", score.combined_score);
    Ok(())
}

// =============================================================================
// READ COMMANDS
// =============================================================================

/// Show the live progression state.
pub fn cmd_status(shell: &Shell, json_mode: bool, detailed: bool) -> Result<(), FlightpathError> {
    let snapshot = shell.engine.snapshot();
    let progress = shell.engine.tier_progress();

    if json_mode {
        let output = serde_json::json!({
            "data": shell.data_path.to_string_lossy(),
            "hasAssessment": shell.engine.has_assessment(),
            "assessmentType": shell.engine.assessment_type(),
            "snapshot": snapshot,
            "tierProgress": progress,
        });
        print_json(&output);
        return Ok(());
    }

    println!("Flightpath Status");
    println!("=================");
    println!("Data: {}", shell.data_path.display());
    println!();

    if !shell.engine.has_assessment() {
        println!("No assessment submitted yet.");
        return Ok(());
    }

    println!("Combined Score: {}", snapshot.combined_score);
    println!("  Assessment:   {}", snapshot.score.assessment_score);
    if let Some(tech) = snapshot.score.tech_stack_score {
        println!("  Tech Stack:   {}", tech);
    }
    println!(
        "Plane Level:    {} {}",
        snapshot.plane_level.icon, snapshot.plane_level.name
    );
    match &progress.next {
        Some(next) => println!(
            "  Next Level:   {} ({}%, {} points to go)",
            next.name, progress.percent, progress.points_to_next
        ),
        None => println!("  Top level reached"),
    }
    println!("Flight Miles:   {}", snapshot.flight_miles);
    println!(
        "Routes:         {} of {} unlocked",
        snapshot.unlocked_routes.len(),
        snapshot.route_statuses.len()
    );
    println!();
    println!("REAO:");
    println!("  Readiness:    {}", snapshot.reao.readiness);
    println!("  Efficiency:   {}", snapshot.reao.efficiency);
    println!("  Alignment:    {}", snapshot.reao.alignment);
    println!("  Opportunity:  {}", snapshot.reao.opportunity);

    if detailed {
        println!();
        println!("Routes:");
        for (id, status) in &snapshot.route_statuses {
            println!("  {:<28} {:<9} {:>3}%", id, status.status, status.current_progress);
        }
        println!();
        println!("Cities:");
        for (id, state) in &snapshot.city_states {
            println!("  {:<28} {}", id, state);
        }
    }

    Ok(())
}

/// Show one route.
pub fn cmd_route(shell: &Shell, json_mode: bool, id: &str) -> Result<(), FlightpathError> {
    let route_id = RouteId::new(id);
    let route = shell
        .engine
        .network()
        .route(&route_id)
        .ok_or_else(|| FlightpathError::UnknownRoute(id.to_string()))?;
    let status = shell.engine.get_route_status(&route_id);

    if json_mode {
        let output = serde_json::json!({
            "route": route,
            "status": status,
        });
        print_json(&output);
        return Ok(());
    }

    println!("Route {} ({} -> {})", route.id, route.from, route.to);
    println!("  Required Score: {}", route.required_score);
    println!("  Required Miles: {}", route.required_miles);
    println!("  Status:         {}", status.status);
    println!("  Progress:       {}%", status.current_progress);
    Ok(())
}

/// Show every city's unlock state.
pub fn cmd_cities(shell: &Shell, json_mode: bool) -> Result<(), FlightpathError> {
    let states = shell.engine.city_states();

    if json_mode {
        print_json(&states);
        return Ok(());
    }

    for city in shell.engine.network().cities() {
        let state = states.get(&city.id).copied().unwrap_or(UnlockState::Locked);
        println!("  {:<20} {:<24} {}", city.id, city.name, state);
    }
    Ok(())
}

// =============================================================================
// HISTORY COMMANDS
// =============================================================================

/// Show the flight log, oldest first.
pub fn cmd_history(shell: &mut Shell, json_mode: bool) -> Result<(), FlightpathError> {
    let history = shell.engine.get_assessment_history();

    if json_mode {
        print_json(&history);
        return Ok(());
    }

    if history.is_empty() {
        println!("No assessments recorded.");
        return Ok(());
    }

    println!("{:<15} {:<6} {:>5} {:<16} {:>7} {:>7}", "Timestamp", "Type", "Score", "Plane", "Miles", "Routes");
    for entry in &history {
        println!(
            "{:<15} {:<6} {:>5} {:<16} {:>7} {:>7}",
            entry.timestamp,
            entry.assessment_type,
            entry.combined_score,
            entry.plane_level,
            entry.flight_miles,
            entry.unlocked_routes.len()
        );
    }
    Ok(())
}

/// Delete the flight log.
pub fn cmd_clear_history(shell: &mut Shell, json_mode: bool) -> Result<(), FlightpathError> {
    let removed = shell.engine.get_assessment_history().len();
    shell.engine.clear_history();

    if json_mode {
        print_json(&serde_json::json!({ "removed": removed }));
    } else {
        println!("Cleared {} history entries", removed);
    }
    Ok(())
}

/// Show first-vs-last change across the flight log.
pub fn cmd_trend(shell: &mut Shell, json_mode: bool) -> Result<(), FlightpathError> {
    let trend = shell.engine.history_trend();

    if json_mode {
        print_json(&trend);
        return Ok(());
    }

    let Some(trend) = trend else {
        println!("No assessments recorded.");
        return Ok(());
    };

    println!("Submissions:  {}", trend.submissions);
    println!(
        "Plane Level:  {} -> {}",
        trend.first_plane_level, trend.last_plane_level
    );
    println!("Score:        {:+}", trend.score_delta);
    println!("Flight Miles: {:+}", trend.miles_delta);
    println!("New Routes:   {}", trend.routes_gained.len());
    Ok(())
}

// =============================================================================
// PROJECTION COMMAND
// =============================================================================

/// Run a what-if projection. Stored state is never read for inputs nor
/// written.
pub fn cmd_project(
    shell: &Shell,
    json_mode: bool,
    responses: Option<&Path>,
    tech_stack: Option<&Path>,
    score: Option<u8>,
) -> Result<(), FlightpathError> {
    let result = match score {
        Some(score) => shell.engine.project_score(score),
        None => {
            let responses: Vec<AssessmentResponse> = match responses {
                Some(path) => read_json_file(path)?,
                None => Vec::new(),
            };
            let stack: Vec<TechStackEntry> = match tech_stack {
                Some(path) => read_json_file(path)?,
                None => Vec::new(),
            };
            shell.engine.project(&responses, &stack)
        }
    };

    if json_mode {
        print_json(&result);
        return Ok(());
    }

    println!("Projection");
    println!("==========");
    println!("Combined Score: {}", result.combined_score);
    println!("Plane Level:    {}", result.plane_level.name);
    println!("Flight Miles:   {}", result.flight_miles);
    println!("Unlocked:       {} routes", result.unlocked_routes.len());
    for id in &result.unlocked_routes {
        println!("  {}", id);
    }
    Ok(())
}

// =============================================================================
// PROFILE & SCENARIO COMMANDS
// =============================================================================

/// Show the profile, replacing it first when `file` is given.
pub fn cmd_profile(
    shell: &mut Shell,
    json_mode: bool,
    file: Option<&Path>,
) -> Result<(), FlightpathError> {
    if let Some(path) = file {
        let profile: UserProfile = read_json_file(path)?;
        shell.engine.set_user_profile(&profile);
    }

    let profile = shell.engine.user_profile();
    if json_mode {
        print_json(&profile);
        return Ok(());
    }

    let show = |label: &str, value: &Option<String>| {
        println!("{:<14} {}", label, value.as_deref().unwrap_or("-"));
    };
    show("Role:", &profile.role);
    show("Industry:", &profile.industry);
    show("Company Size:", &profile.company_size);
    show("Company Type:", &profile.company_type);
    show("Revenue:", &profile.revenue);
    println!("{:<14} {}", "Goals:", profile.goals.join(", "));
    Ok(())
}

/// Show scenario statuses, setting `id` to `status` first when both are given.
pub fn cmd_scenario(
    shell: &mut Shell,
    json_mode: bool,
    id: Option<&str>,
    status: Option<ScenarioStatus>,
) -> Result<(), FlightpathError> {
    if let (Some(id), Some(status)) = (id, status) {
        shell.engine.set_scenario_status(id, status);
    }

    let mut statuses = shell.engine.scenario_statuses();
    if let Some(id) = id {
        statuses.retain(|key, _| key == id);
    }

    if json_mode {
        print_json(&statuses);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No scenario statuses recorded.");
    }
    for (id, status) in &statuses {
        println!("  {:<28} {:?}", id, status);
    }
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write a default configuration file to `config_path`.
pub fn cmd_init(config_path: &Path, force: bool) -> Result<(), FlightpathError> {
    if config_path.exists() && !force {
        return Err(FlightpathError::InvalidInput(format!(
            "'{}' already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    let rendered = AppConfig::default().to_toml()?;
    std::fs::write(config_path, rendered)
        .map_err(|e| FlightpathError::IoError(format!("Write config: {}", e)))?;

    tracing::info!(path = %config_path.display(), "default configuration written");
    println!("Configuration written to {}", config_path.display());
    Ok(())
}
