use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const SIGHTINGS: &str = "\
Date_time,city,state_province,country,UFO_shape,length_of_encounter_seconds,described_duration_of_encounter
10/10/1949 20:30,san marcos,tx,us,cylinder,2700,45 minutes
10/10/1956 21:00,edna,tx,us,circle,20,1/2 hour
10/10/1960 20:00,kaneohe,hi,us,light,900,15 minutes
10/10/1965 23:45,norwalk,ct,us,disk,1200,20 minutes
10/10/1973 19:00,niantic,ct,us,disk,1800,30 minutes
10/10/1974 21:30,cardiff,,gb,disk,1200,20 minutes
10/10/1976 22:00,san marcos,tx,us,light,60`,1 minute
10/10/1977 12:00,edna,tx,us,other,180,3 minutes
";

/// A `ufoq` command isolated from the caller's config files and environment
fn ufoq(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ufoq"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("UFOQ_INPUT")
        .env_remove("UFOQ_OUTPUT_DIR")
        .env_remove("UFOQ_VERBOSITY")
        .env_remove("UFOQ_TOP_K");
    cmd
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ufo_sighting_data.csv"), SIGHTINGS).unwrap();
    dir
}

#[test]
fn countries_written_as_csv() {
    let dir = workspace();
    ufoq(dir.path())
        .args(["countries", "-o", "query_results/countries.csv"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("query_results/countries.csv")).unwrap();
    assert_eq!(written, "country,sighting_count\nus,7\ngb,1\n");
}

#[test]
fn top_cities_with_limit_into_output_dir() {
    let dir = workspace();
    ufoq(dir.path())
        .args(["top-cities", "-k", "1", "--limit", "2", "--output-dir", "out"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("out/top_cities_by_state.csv")).unwrap();
    assert_eq!(
        written,
        "state_province,city,sighting_count,city_rank\nct,norwalk,1,1\nct,niantic,1,1\n"
    );
}

#[test]
fn all_writes_every_query() {
    let dir = workspace();
    ufoq(dir.path())
        .args(["all", "--output-dir", "results"])
        .assert()
        .success();

    for name in [
        "disk_sightings",
        "long_encounters",
        "sightings_by_country",
        "shape_statistics",
        "top_cities_by_state",
    ] {
        assert!(
            dir.path().join("results").join(format!("{name}.csv")).exists(),
            "{name}.csv missing"
        );
    }
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    ufoq(dir.path())
        .args(["--input", "nope.csv", "countries"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:").and(predicate::str::contains("nope.csv")));
}

#[test]
fn zero_top_k_is_rejected() {
    let dir = workspace();
    ufoq(dir.path())
        .env("UFOQ_TOP_K", "0")
        .arg("top-cities")
        .assert()
        .failure()
        .stderr(predicate::str::contains("top_k must be greater than 0"));
}

#[test]
fn config_file_sets_thresholds() {
    let dir = workspace();
    fs::write(
        dir.path().join("ufoq.toml"),
        "[queries]\nshape_min_count = 2\n",
    )
    .unwrap();

    ufoq(dir.path())
        .args(["shapes", "-o", "shapes.csv"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("shapes.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines[0],
        "UFO_shape,count,avg_duration,max_duration,min_duration"
    );
    assert!(lines[1].starts_with("disk,3,"), "{written}");
    assert_eq!(lines.len(), 2, "{written}");
}

#[test]
fn config_init_creates_file() {
    let dir = TempDir::new().unwrap();
    ufoq(dir.path())
        .args(["config", "init", "ufoq.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default configuration"));

    let text = fs::read_to_string(dir.path().join("ufoq.toml")).unwrap();
    assert!(text.contains("top_k = 5"), "{text}");

    ufoq(dir.path())
        .args(["config", "init", "ufoq.toml"])
        .assert()
        .failure();
}

#[test]
fn inspect_lists_columns() {
    let dir = workspace();
    ufoq(dir.path())
        .args(["inspect", "--sample", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows: 8").and(predicate::str::contains("UFO_shape")));
}

#[test]
fn version_shows_build_info() {
    let dir = TempDir::new().unwrap();
    ufoq(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ufoq ").and(predicate::str::contains("Commit:")));
}
