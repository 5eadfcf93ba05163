//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command loads the data file, acts on a [`Network`] and, if it
//! changed anything, writes the file back. A missing data file is an empty
//! network.
//!
//! Audit events are held in a [`MemoryAudit`] while a command runs and are
//! forwarded to the audit log only once the write they describe succeeded.

use super::Context;
use crate::logging::TracingAudit;
use gasnet_core::primitives::{MIN_PIPE_DIAMETER_MM, MIN_PIPE_LENGTH_KM, MIN_TOTAL_WORKSHOPS};
use gasnet_core::{
    AuditSink, BatchReport, GasnetError, MemoryAudit, Network, Pipe, PipeEdit, PipeFilter,
    RecordId, RecordKind, Snapshot, Station, StationEdit, StationFilter, read_snapshot,
    write_snapshot,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Network type used by every command.
pub type CliNetwork = Network<MemoryAudit>;

// =============================================================================
// STATUS AND LIST COMMANDS
// =============================================================================

/// Show record counts and the ids the next records will get.
pub fn cmd_status(ctx: &Context) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;

    if ctx.json {
        print_json(&json!({
            "data_file": ctx.data_file.to_string_lossy(),
            "pipes": network.pipes().count(),
            "stations": network.stations().count(),
            "next_pipe_id": network.pipes().next_id(),
            "next_station_id": network.stations().next_id(),
        }));
        return Ok(());
    }

    println!("Gas Network Status");
    println!("==================");
    println!("Data file: {:?}", ctx.data_file);
    println!();
    println!("Pipes:           {}", network.pipes().count());
    println!("Stations:        {}", network.stations().count());
    println!("Next pipe id:    {}", next_id_label(network.pipes().next_id()));
    println!(
        "Next station id: {}",
        next_id_label(network.stations().next_id())
    );

    Ok(())
}

/// Show every pipe and station.
pub fn cmd_list(ctx: &Context) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;

    if ctx.json {
        print_json(&json!({
            "pipes": pipe_entries(&network, &network.pipes().ids()),
            "stations": station_entries(&network, &network.stations().ids()),
        }));
        return Ok(());
    }

    print_pipes(&network, &network.pipes().ids());
    println!();
    print_stations(&network, &network.stations().ids());
    Ok(())
}

// =============================================================================
// PIPE COMMANDS
// =============================================================================

/// Add a pipe.
pub fn cmd_pipe_add(
    ctx: &Context,
    name: &str,
    length_km: f64,
    diameter_mm: u32,
    under_repair: bool,
) -> Result<(), GasnetError> {
    if !length_km.is_finite() || length_km < MIN_PIPE_LENGTH_KM {
        return Err(GasnetError::InvalidArgument(format!(
            "pipe length must be at least {} km",
            MIN_PIPE_LENGTH_KM
        )));
    }
    if diameter_mm < MIN_PIPE_DIAMETER_MM {
        return Err(GasnetError::InvalidArgument(format!(
            "pipe diameter must be at least {} mm",
            MIN_PIPE_DIAMETER_MM
        )));
    }
    single_line_arg(name, "pipe name")?;

    let mut network = load_network(&ctx.data_file)?;
    let id = network.add_pipe(Pipe::new(name, length_km, diameter_mm, under_repair))?;
    save_network(&mut network, &ctx.data_file)?;

    if ctx.json {
        print_json(&json!({ "id": id }));
    } else {
        println!("Added pipe {}", id);
    }
    Ok(())
}

/// Show one pipe.
pub fn cmd_pipe_show(ctx: &Context, id: u64) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;
    let id = RecordId(id);

    let Some(pipe) = network.pipes().get(id) else {
        return report_missing(ctx, RecordKind::Pipe, id);
    };

    if ctx.json {
        print_json(&PipeEntry { id, pipe });
    } else {
        println!("Pipe {}", id);
        println!("{}", pipe);
    }
    Ok(())
}

/// Show every pipe.
pub fn cmd_pipe_list(ctx: &Context) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;
    let ids = network.pipes().ids();

    if ctx.json {
        print_json(&pipe_entries(&network, &ids));
    } else {
        print_pipes(&network, &ids);
    }
    Ok(())
}

/// Delete a pipe.
pub fn cmd_pipe_delete(ctx: &Context, id: u64) -> Result<(), GasnetError> {
    let mut network = load_network(&ctx.data_file)?;
    let id = RecordId(id);

    if !network.delete_pipe(id) {
        return report_missing(ctx, RecordKind::Pipe, id);
    }
    save_network(&mut network, &ctx.data_file)?;

    if ctx.json {
        print_json(&json!({ "deleted": id }));
    } else {
        println!("Deleted pipe {}", id);
    }
    Ok(())
}

/// Toggle one pipe's repair flag.
pub fn cmd_pipe_repair(ctx: &Context, id: u64) -> Result<(), GasnetError> {
    let mut network = load_network(&ctx.data_file)?;
    let id = RecordId(id);

    let under_repair = match network.toggle_repair(id) {
        Ok(state) => state,
        Err(e) if e.is_recoverable() => return report_refusal(ctx, &e),
        Err(e) => return Err(e),
    };
    save_network(&mut network, &ctx.data_file)?;

    if ctx.json {
        print_json(&json!({ "id": id, "under_repair": under_repair }));
    } else {
        println!("Pipe {} {}", id, repair_label(under_repair));
    }
    Ok(())
}

/// Find pipes by name substring and/or repair state.
pub fn cmd_pipe_find(
    ctx: &Context,
    name: Option<String>,
    under_repair: Option<bool>,
) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;
    let ids = network.find_pipes(&pipe_filter(name, under_repair));

    if ctx.json {
        print_json(&pipe_entries(&network, &ids));
    } else if ids.is_empty() {
        println!("No pipes match");
    } else {
        print_pipes(&network, &ids);
    }
    Ok(())
}

/// Change the repair flag of every pipe the filter selects.
///
/// `ids`, when non-empty, narrows the selection; ids outside the matches
/// are reported and skipped. `set` assigns the flag instead of toggling it.
pub fn cmd_pipe_batch(
    ctx: &Context,
    name: Option<String>,
    under_repair: Option<bool>,
    ids: &[u64],
    set: Option<bool>,
) -> Result<(), GasnetError> {
    let mut network = load_network(&ctx.data_file)?;
    let matches = network.find_pipes(&pipe_filter(name, under_repair));
    let (selection, skipped) = narrow_selection(matches, ids);

    if selection.is_empty() {
        return report_empty_batch(ctx, RecordKind::Pipe, &skipped);
    }

    let edit = match set {
        Some(value) => PipeEdit::SetRepair(value),
        None => PipeEdit::ToggleRepair,
    };
    let report = network.batch_edit_pipes(&selection, edit);
    save_network(&mut network, &ctx.data_file)?;

    print_batch_report(ctx, RecordKind::Pipe, &report, &skipped);
    Ok(())
}

fn pipe_filter(name: Option<String>, under_repair: Option<bool>) -> PipeFilter {
    let mut filter = PipeFilter::new();
    if let Some(name) = name {
        filter = filter.with_name(name);
    }
    if let Some(under_repair) = under_repair {
        filter = filter.with_repair(under_repair);
    }
    filter
}

// =============================================================================
// STATION COMMANDS
// =============================================================================

/// Add a compressor station.
pub fn cmd_station_add(
    ctx: &Context,
    name: &str,
    total: u32,
    working: u32,
    classification: &str,
) -> Result<(), GasnetError> {
    if total < MIN_TOTAL_WORKSHOPS {
        return Err(GasnetError::InvalidArgument(format!(
            "a station needs at least {} workshop",
            MIN_TOTAL_WORKSHOPS
        )));
    }
    if working > total {
        return Err(GasnetError::InvalidArgument(format!(
            "working workshops ({}) exceed total ({})",
            working, total
        )));
    }
    single_line_arg(name, "station name")?;
    single_line_arg(classification, "station classification")?;

    let mut network = load_network(&ctx.data_file)?;
    let station = Station::new(name, total, working, classification)?;
    let id = network.add_station(station)?;
    save_network(&mut network, &ctx.data_file)?;

    if ctx.json {
        print_json(&json!({ "id": id }));
    } else {
        println!("Added station {}", id);
    }
    Ok(())
}

/// Show one station.
pub fn cmd_station_show(ctx: &Context, id: u64) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;
    let id = RecordId(id);

    let Some(station) = network.stations().get(id) else {
        return report_missing(ctx, RecordKind::Station, id);
    };

    if ctx.json {
        print_json(&StationEntry::new(id, station));
    } else {
        println!("Station {}", id);
        println!("{}", station);
    }
    Ok(())
}

/// Show every station.
pub fn cmd_station_list(ctx: &Context) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;
    let ids = network.stations().ids();

    if ctx.json {
        print_json(&station_entries(&network, &ids));
    } else {
        print_stations(&network, &ids);
    }
    Ok(())
}

/// Delete a station.
pub fn cmd_station_delete(ctx: &Context, id: u64) -> Result<(), GasnetError> {
    let mut network = load_network(&ctx.data_file)?;
    let id = RecordId(id);

    if !network.delete_station(id) {
        return report_missing(ctx, RecordKind::Station, id);
    }
    save_network(&mut network, &ctx.data_file)?;

    if ctx.json {
        print_json(&json!({ "deleted": id }));
    } else {
        println!("Deleted station {}", id);
    }
    Ok(())
}

/// Start or stop one workshop on a station.
pub fn cmd_station_workshop(ctx: &Context, id: u64, edit: StationEdit) -> Result<(), GasnetError> {
    let mut network = load_network(&ctx.data_file)?;
    let id = RecordId(id);

    let result = match edit {
        StationEdit::StartWorkshop => network.start_workshop(id),
        StationEdit::StopWorkshop => network.stop_workshop(id),
    };
    let (working, total) = match result {
        Ok(counts) => counts,
        Err(e) if e.is_recoverable() => return report_refusal(ctx, &e),
        Err(e) => return Err(e),
    };
    save_network(&mut network, &ctx.data_file)?;

    if ctx.json {
        print_json(&json!({ "id": id, "working": working, "total": total }));
    } else {
        println!("Station {}: {}/{} working", id, working, total);
    }
    Ok(())
}

/// Find stations by name substring and/or minimum unused percentage.
pub fn cmd_station_find(
    ctx: &Context,
    name: Option<String>,
    min_unused: Option<f64>,
) -> Result<(), GasnetError> {
    let network = load_network(&ctx.data_file)?;
    let ids = network.find_stations(&station_filter(name, min_unused));

    if ctx.json {
        print_json(&station_entries(&network, &ids));
    } else if ids.is_empty() {
        println!("No stations match");
    } else {
        print_stations(&network, &ids);
    }
    Ok(())
}

/// Start or stop one workshop on every station the filter selects.
///
/// Stations already at the boundary are reported as rejected and left as
/// they were.
pub fn cmd_station_batch(
    ctx: &Context,
    edit: StationEdit,
    name: Option<String>,
    min_unused: Option<f64>,
    ids: &[u64],
) -> Result<(), GasnetError> {
    let mut network = load_network(&ctx.data_file)?;
    let matches = network.find_stations(&station_filter(name, min_unused));
    let (selection, skipped) = narrow_selection(matches, ids);

    if selection.is_empty() {
        return report_empty_batch(ctx, RecordKind::Station, &skipped);
    }

    let report = network.batch_edit_stations(&selection, edit);
    save_network(&mut network, &ctx.data_file)?;

    print_batch_report(ctx, RecordKind::Station, &report, &skipped);
    Ok(())
}

fn station_filter(name: Option<String>, min_unused: Option<f64>) -> StationFilter {
    let mut filter = StationFilter::new();
    if let Some(name) = name {
        filter = filter.with_name(name);
    }
    if let Some(percent) = min_unused {
        filter = filter.with_min_unused(percent);
    }
    filter
}

// =============================================================================
// SAVE / LOAD / INIT COMMANDS
// =============================================================================

/// Write the current data to `output`.
pub fn cmd_save(ctx: &Context, output: &Path) -> Result<(), GasnetError> {
    let mut network = load_network(&ctx.data_file)?;
    let snapshot = network.snapshot();
    write_file(&snapshot, output)?;
    network.mark_saved(&snapshot);
    flush_audit(&mut network);

    if ctx.json {
        print_json(&json!({
            "output": output.to_string_lossy(),
            "pipes": snapshot.pipes.len(),
            "stations": snapshot.stations.len(),
        }));
    } else {
        println!(
            "Saved {} pipes and {} stations to {:?}",
            snapshot.pipes.len(),
            snapshot.stations.len(),
            output
        );
    }
    Ok(())
}

/// Replace the current data with the contents of `input`.
///
/// The file is parsed completely before anything is replaced, so a
/// malformed file leaves the data file untouched. The current data file is
/// never read: it is replaced whatever it holds, even if it is corrupt.
pub fn cmd_load(ctx: &Context, input: &Path) -> Result<(), GasnetError> {
    let snapshot = read_file(input)?;
    let pipes = snapshot.pipes.len();
    let stations = snapshot.stations.len();

    let mut network = Network::with_audit(MemoryAudit::new());
    network.restore(snapshot);
    save_network(&mut network, &ctx.data_file)?;

    if ctx.json {
        print_json(&json!({
            "input": input.to_string_lossy(),
            "pipes": pipes,
            "stations": stations,
        }));
    } else {
        println!(
            "Loaded {} pipes and {} stations from {:?}",
            pipes, stations, input
        );
    }
    Ok(())
}

/// Create an empty data file.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), GasnetError> {
    if ctx.data_file.exists() && !force {
        return Err(GasnetError::InvalidArgument(format!(
            "data file {:?} already exists. Use --force to overwrite.",
            ctx.data_file
        )));
    }

    write_file(&Snapshot::new(), &ctx.data_file)?;
    println!("Initialized empty data file at {:?}", ctx.data_file);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load the network stored at `path`, or an empty one if the file is absent.
pub fn load_network(path: &Path) -> Result<CliNetwork, GasnetError> {
    if !path.exists() {
        tracing::debug!("No data file at {:?}, starting empty", path);
        return Ok(Network::with_audit(MemoryAudit::new()));
    }
    let snapshot = read_file(path)?;
    tracing::debug!(
        "Loaded {} pipes and {} stations from {:?}",
        snapshot.pipes.len(),
        snapshot.stations.len(),
        path
    );
    Ok(Network::from_snapshot(snapshot, MemoryAudit::new()))
}

/// Write the network back to `path`, then release its pending audit events.
///
/// On failure the events stay pending and never reach the audit log. The
/// write-back itself is not audited; only the `save` command records a save.
pub fn save_network(network: &mut CliNetwork, path: &Path) -> Result<(), GasnetError> {
    write_file(&network.snapshot(), path)?;
    tracing::debug!("Wrote data file {:?}", path);
    flush_audit(network);
    Ok(())
}

/// Forward pending audit events to the `gasnet::audit` log target.
fn flush_audit(network: &mut CliNetwork) {
    let mut sink = TracingAudit;
    for event in network.audit_mut().drain() {
        sink.record(&event);
    }
}

/// Reject text that would break the line-oriented data file.
fn single_line_arg(value: &str, field: &str) -> Result<(), GasnetError> {
    if value.contains(['\n', '\r']) {
        return Err(GasnetError::InvalidArgument(format!(
            "{} must not contain a line break",
            field
        )));
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Snapshot, GasnetError> {
    let file = File::open(path)
        .map_err(|e| GasnetError::IoError(format!("Cannot open {:?}: {}", path, e)))?;
    read_snapshot(BufReader::new(file))
}

/// Write through a sibling temp file. A failed write leaves the target
/// untouched.
fn write_file(snapshot: &Snapshot, path: &Path) -> Result<(), GasnetError> {
    let tmp = temp_path(path);
    let file = File::create(&tmp)
        .map_err(|e| GasnetError::IoError(format!("Cannot create {:?}: {}", tmp, e)))?;
    if let Err(e) = write_snapshot(BufWriter::new(file), snapshot) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path)
        .map_err(|e| GasnetError::IoError(format!("Cannot replace {:?}: {}", path, e)))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Keep only the requested ids among `matches`; return the kept set and
/// the requested ids that were not matches.
fn narrow_selection(
    matches: BTreeSet<RecordId>,
    requested: &[u64],
) -> (BTreeSet<RecordId>, BTreeSet<RecordId>) {
    if requested.is_empty() {
        return (matches, BTreeSet::new());
    }
    let requested: BTreeSet<RecordId> = requested.iter().copied().map(RecordId).collect();
    let skipped = requested.difference(&matches).copied().collect();
    let kept = requested.intersection(&matches).copied().collect();
    (kept, skipped)
}

fn report_missing(ctx: &Context, kind: RecordKind, id: RecordId) -> Result<(), GasnetError> {
    report_refusal(ctx, &GasnetError::NotFound { kind, id })
}

/// Print a recoverable refusal; the command still succeeds.
fn report_refusal(ctx: &Context, error: &GasnetError) -> Result<(), GasnetError> {
    tracing::debug!("Refused: {}", error);
    if ctx.json {
        print_json(&json!({ "error": error.to_string() }));
    } else {
        println!("{}", error);
    }
    Ok(())
}

fn report_empty_batch(
    ctx: &Context,
    kind: RecordKind,
    skipped: &BTreeSet<RecordId>,
) -> Result<(), GasnetError> {
    if ctx.json {
        print_json(&json!({ "selected": 0, "skipped": skipped }));
    } else {
        print_skipped(kind, skipped);
        println!("No {}s selected, nothing changed", kind);
    }
    Ok(())
}

fn print_batch_report(
    ctx: &Context,
    kind: RecordKind,
    report: &BatchReport,
    skipped: &BTreeSet<RecordId>,
) {
    if ctx.json {
        print_json(&BatchOutput { report, skipped });
        return;
    }

    print_skipped(kind, skipped);
    println!(
        "Batch edit on {}s: {} applied, {} rejected, {} missing",
        kind,
        report.applied.len(),
        report.rejected.len(),
        report.missing.len()
    );
    if !report.rejected.is_empty() {
        println!("  Rejected: {}", join_ids(&report.rejected));
    }
}

fn print_skipped(kind: RecordKind, skipped: &BTreeSet<RecordId>) {
    if !skipped.is_empty() {
        println!("Not among matching {}s, skipped: {}", kind, join_ids(skipped));
    }
}

fn join_ids(ids: &BTreeSet<RecordId>) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn next_id_label(id: Option<RecordId>) -> String {
    id.map_or_else(|| "none left".to_string(), |id| id.to_string())
}

fn repair_label(under_repair: bool) -> &'static str {
    if under_repair {
        "is now under repair"
    } else {
        "is back in service"
    }
}

fn print_pipes(network: &CliNetwork, ids: &BTreeSet<RecordId>) {
    println!("Pipes ({})", ids.len());
    for id in ids {
        if let Some(pipe) = network.pipes().get(*id) {
            println!("Pipe {}", id);
            println!("{}", pipe);
        }
    }
}

fn print_stations(network: &CliNetwork, ids: &BTreeSet<RecordId>) {
    println!("Stations ({})", ids.len());
    for id in ids {
        if let Some(station) = network.stations().get(*id) {
            println!("Station {}", id);
            println!("{}", station);
        }
    }
}

// =============================================================================
// JSON OUTPUT
// =============================================================================

/// A pipe with its id, as printed by `--json`.
#[derive(Serialize)]
struct PipeEntry<'a> {
    id: RecordId,
    #[serde(flatten)]
    pipe: &'a Pipe,
}

/// A station with its id and derived idle percentage.
#[derive(Serialize)]
struct StationEntry<'a> {
    id: RecordId,
    #[serde(flatten)]
    station: &'a Station,
    unused_percent: f64,
}

impl<'a> StationEntry<'a> {
    fn new(id: RecordId, station: &'a Station) -> Self {
        Self {
            id,
            station,
            unused_percent: station.unused_percent(),
        }
    }
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    #[serde(flatten)]
    report: &'a BatchReport,
    skipped: &'a BTreeSet<RecordId>,
}

fn pipe_entries<'a>(network: &'a CliNetwork, ids: &BTreeSet<RecordId>) -> Vec<PipeEntry<'a>> {
    ids.iter()
        .filter_map(|id| network.pipes().get(*id).map(|pipe| PipeEntry { id: *id, pipe }))
        .collect()
}

fn station_entries<'a>(
    network: &'a CliNetwork,
    ids: &BTreeSet<RecordId>,
) -> Vec<StationEntry<'a>> {
    ids.iter()
        .filter_map(|id| {
            network
                .stations()
                .get(*id)
                .map(|station| StationEntry::new(*id, station))
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}
