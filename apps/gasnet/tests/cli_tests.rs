//! Integration tests for the gasnet commands.
//!
//! Each test works on a data file inside its own temp directory and checks
//! the file contents after the command ran.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use gasnet::cli::{
    Context, cmd_init, cmd_load, cmd_pipe_add, cmd_pipe_batch, cmd_pipe_delete, cmd_pipe_repair,
    cmd_save, cmd_station_add, cmd_station_batch, cmd_station_workshop, load_network,
};
use gasnet_core::{GasnetError, Pipe, RecordId, StationEdit, decode_snapshot};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn context(dir: &TempDir) -> Context {
    Context {
        data_file: dir.path().join("gasnet.txt"),
        json: false,
    }
}

fn ids(raw: &[u64]) -> BTreeSet<RecordId> {
    raw.iter().copied().map(RecordId).collect()
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// =============================================================================
// PIPE COMMANDS
// =============================================================================

#[test]
fn test_add_delete_keeps_ids_unique() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    cmd_pipe_add(&ctx, "Trunk-B", 4.0, 700, false).unwrap();
    cmd_pipe_delete(&ctx, 1).unwrap();
    cmd_pipe_add(&ctx, "Trunk-C", 1.0, 500, true).unwrap();

    let network = load_network(&ctx.data_file).unwrap();
    assert_eq!(network.pipes().ids(), ids(&[2, 3]));
    assert_eq!(
        network.pipes().get(RecordId(3)),
        Some(&Pipe::new("Trunk-C", 1.0, 500, true))
    );
}

#[test]
fn test_add_rejects_short_pipe() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let result = cmd_pipe_add(&ctx, "tiny", 0.001, 100, false);
    assert!(matches!(result, Err(GasnetError::InvalidArgument(_))));
    assert!(!ctx.data_file.exists());
}

#[test]
fn test_add_rejects_line_break_in_name() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let result = cmd_pipe_add(&ctx, "Trunk\nA", 12.5, 700, false);
    assert!(matches!(result, Err(GasnetError::InvalidArgument(_))));
    assert!(!ctx.data_file.exists());
    assert!(!dir.path().join("gasnet.txt.tmp").exists());
}

#[test]
fn test_repair_toggles_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    cmd_pipe_repair(&ctx, 1).unwrap();
    assert_eq!(
        read(&ctx.data_file),
        "Pipes:1\n1\nTrunk-A\n12.5\n700\n1\nStations:0\n"
    );

    cmd_pipe_repair(&ctx, 1).unwrap();
    let network = load_network(&ctx.data_file).unwrap();
    assert!(!network.pipes().get(RecordId(1)).unwrap().is_under_repair());
}

#[test]
fn test_missing_pipe_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    let before = read(&ctx.data_file);

    cmd_pipe_repair(&ctx, 9).unwrap();
    cmd_pipe_delete(&ctx, 9).unwrap();
    assert_eq!(read(&ctx.data_file), before);
}

#[test]
fn test_batch_edits_filtered_pipes_only() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    cmd_pipe_add(&ctx, "Trunk-B", 3.0, 700, true).unwrap();
    cmd_pipe_add(&ctx, "Spur", 0.5, 300, false).unwrap();

    cmd_pipe_batch(&ctx, Some("Trunk".to_string()), Some(false), &[], Some(true)).unwrap();

    let network = load_network(&ctx.data_file).unwrap();
    let repaired: BTreeSet<RecordId> = network
        .pipes()
        .iter()
        .filter(|(_, pipe)| pipe.is_under_repair())
        .map(|(id, _)| id)
        .collect();
    assert_eq!(repaired, ids(&[1, 2]));
}

#[test]
fn test_batch_ids_outside_matches_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    cmd_pipe_add(&ctx, "Spur", 0.5, 300, false).unwrap();

    // id 2 does not match the name filter, so nothing is selected
    cmd_pipe_batch(&ctx, Some("Trunk".to_string()), None, &[2], None).unwrap();

    let network = load_network(&ctx.data_file).unwrap();
    assert!(network.pipes().iter().all(|(_, pipe)| !pipe.is_under_repair()));
}

// =============================================================================
// STATION COMMANDS
// =============================================================================

#[test]
fn test_station_add_rejects_working_above_total() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let result = cmd_station_add(&ctx, "KS-1", 2, 3, "A");
    assert!(matches!(result, Err(GasnetError::InvalidArgument(_))));
}

#[test]
fn test_station_add_rejects_line_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_station_add(&ctx, "KS-1", 2, 1, "A").unwrap();
    let before = read(&ctx.data_file);

    let bad_name = cmd_station_add(&ctx, "KS\r2", 2, 1, "A");
    assert!(matches!(bad_name, Err(GasnetError::InvalidArgument(_))));
    let bad_class = cmd_station_add(&ctx, "KS-2", 2, 1, "A\nB");
    assert!(matches!(bad_class, Err(GasnetError::InvalidArgument(_))));

    assert_eq!(read(&ctx.data_file), before);
}

#[test]
fn test_workshop_boundary_leaves_file_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_station_add(&ctx, "KS-1", 2, 2, "A").unwrap();
    let before = read(&ctx.data_file);

    cmd_station_workshop(&ctx, 1, StationEdit::StartWorkshop).unwrap();
    assert_eq!(read(&ctx.data_file), before);

    cmd_station_workshop(&ctx, 1, StationEdit::StopWorkshop).unwrap();
    let network = load_network(&ctx.data_file).unwrap();
    assert_eq!(
        network.stations().get(RecordId(1)).unwrap().working_workshops(),
        1
    );
}

#[test]
fn test_station_batch_over_unused_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_station_add(&ctx, "North", 4, 1, "A").unwrap();
    cmd_station_add(&ctx, "South", 4, 4, "A").unwrap();

    cmd_station_batch(&ctx, StationEdit::StartWorkshop, None, Some(50.0), &[]).unwrap();

    let network = load_network(&ctx.data_file).unwrap();
    let working: Vec<u32> = network
        .stations()
        .iter()
        .map(|(_, station)| station.working_workshops())
        .collect();
    assert_eq!(working, vec![2, 4]);
}

// =============================================================================
// SAVE / LOAD / INIT
// =============================================================================

#[test]
fn test_save_then_load_restores_data() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let backup = dir.path().join("backup.txt");

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    cmd_station_add(&ctx, "KS-1", 3, 1, "main").unwrap();
    cmd_save(&ctx, &backup).unwrap();
    assert_eq!(read(&backup), read(&ctx.data_file));

    cmd_pipe_delete(&ctx, 1).unwrap();
    cmd_load(&ctx, &backup).unwrap();

    let network = load_network(&ctx.data_file).unwrap();
    assert_eq!(network.pipes().ids(), ids(&[1]));
    assert_eq!(network.stations().ids(), ids(&[1]));
    assert_eq!(network.pipes().next_id(), Some(RecordId(2)));
}

#[test]
fn test_load_malformed_file_leaves_data_intact() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let broken = dir.path().join("broken.txt");

    cmd_pipe_add(&ctx, "keep", 1.0, 100, false).unwrap();
    let before = read(&ctx.data_file);

    std::fs::write(&broken, "Pipes:2\n1\nA\nnot-a-number\n100\n0\n").unwrap();
    let result = cmd_load(&ctx, &broken);

    assert!(matches!(
        result,
        Err(GasnetError::MalformedData { line: 4, .. })
    ));
    assert_eq!(read(&ctx.data_file), before);
}

#[test]
fn test_load_recovers_corrupt_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let backup = dir.path().join("backup.txt");

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    cmd_save(&ctx, &backup).unwrap();

    std::fs::write(&ctx.data_file, "garbage\n").unwrap();
    assert!(load_network(&ctx.data_file).is_err());

    cmd_load(&ctx, &backup).unwrap();
    assert_eq!(read(&ctx.data_file), read(&backup));
    let network = load_network(&ctx.data_file).unwrap();
    assert_eq!(
        network.pipes().get(RecordId(1)),
        Some(&Pipe::new("Trunk-A", 12.5, 700, false))
    );
}

#[test]
fn test_save_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let output = dir.path().join("absent").join("backup.txt");

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    assert!(cmd_save(&ctx, &output).is_err());
    assert!(!output.exists());
}

#[test]
fn test_init_requires_force_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    cmd_init(&ctx, false).unwrap();
    assert_eq!(read(&ctx.data_file), "Pipes:0\nStations:0\n");

    cmd_pipe_add(&ctx, "Trunk-A", 12.5, 700, false).unwrap();
    assert!(matches!(
        cmd_init(&ctx, false),
        Err(GasnetError::InvalidArgument(_))
    ));

    cmd_init(&ctx, true).unwrap();
    let snapshot = decode_snapshot(&read(&ctx.data_file)).unwrap();
    assert!(snapshot.is_empty());
}

#[test]
fn test_missing_data_file_is_empty_network() {
    let dir = tempfile::tempdir().unwrap();
    let network = load_network(&dir.path().join("absent.txt")).unwrap();
    assert!(network.is_empty());
}
