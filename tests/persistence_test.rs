#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: seed a profile into the persistent store
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "name, handle, location, rating, available").unwrap();
    writeln!(csv1, "Ada Lovelace, ada, London, 4.8, true").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("promarket"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("Ada Lovelace,London,4.8,true,"));

    // 2. Second run: empty seed, same DB path. The profile must come back
    // from disk.
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "name, handle, location, rating, available").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("promarket"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains("Ada Lovelace,London,4.8,true,"));
}
