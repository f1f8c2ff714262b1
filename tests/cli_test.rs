use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("promarket"));
    cmd.arg("tests/fixtures/profiles.csv")
        .arg("--min-rating")
        .arg("4.0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "name,location,rating,available,distance_km",
        ))
        .stdout(predicate::str::contains("Ada Lovelace,London,4.8,true,"))
        .stdout(predicate::str::contains("Grace Hopper,New York,4.5,true,"))
        .stdout(predicate::str::contains("Margaret Hamilton,Boston,4.2,false,"))
        // Below the rating threshold
        .stdout(predicate::str::contains("Edsger Dijkstra").not());

    Ok(())
}

#[test]
fn test_cli_name_filter_matches_handle() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("promarket"));
    cmd.arg("tests/fixtures/profiles.csv").arg("--name").arg("grace");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Grace Hopper"))
        .stdout(predicate::str::contains("Ada Lovelace").not());

    Ok(())
}

#[test]
fn test_cli_pagination_slices_by_rating_order() -> Result<(), Box<dyn std::error::Error>> {
    // Default sort is rating descending; page 2 of size 1 is the runner-up.
    let mut cmd = Command::new(cargo_bin!("promarket"));
    cmd.arg("tests/fixtures/profiles.csv")
        .arg("--page")
        .arg("2")
        .arg("--limit")
        .arg("1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Grace Hopper"))
        .stdout(predicate::str::contains("Ada Lovelace").not());

    Ok(())
}

#[test]
fn test_cli_rejects_invalid_page() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("promarket"));
    cmd.arg("tests/fixtures/profiles.csv").arg("--page").arg("0");

    cmd.assert().failure();

    Ok(())
}
