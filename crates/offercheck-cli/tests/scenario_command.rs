use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_offercheck_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("offercheck")
}

#[test]
fn test_scenario_pretty_output() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("scenario").arg("--seed").arg("7");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Scenario 1 (seed 7)"))
        .stdout(predicate::str::contains("Departure airport: #"))
        .stdout(predicate::str::contains("Destination:       #0"))
        .stdout(predicate::str::contains("Child birth date:"));
}

#[test]
fn test_scenario_seed_is_reproducible() {
    let run = || {
        let output = Command::new(get_offercheck_bin())
            .args(["--format", "json", "scenario", "--seed", "31337", "--count", "4"])
            .output()
            .unwrap();
        assert!(output.status.success());
        output.stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn test_scenario_json_values_in_range() {
    let output = Command::new(get_offercheck_bin())
        .args(["scenario", "--count", "50", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let scenarios: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let scenarios = scenarios.as_array().unwrap();
    assert_eq!(scenarios.len(), 50);

    for scenario in scenarios {
        let airport = scenario["airport_index"].as_u64().unwrap();
        assert!((1..=10).contains(&airport));
        assert_eq!(scenario["destination_index"], 0);
        assert!(scenario["birth_date"]["year_index"].as_u64().unwrap() < 10);
        assert!(scenario["birth_date"]["month_index"].as_u64().unwrap() < 12);
        assert!(scenario["birth_date"]["day_index"].as_u64().unwrap() < 28);
        assert!(scenario.get("seed").is_none());
    }
}

#[test]
fn test_scenario_rejects_zero_count() {
    let mut cmd = Command::new(get_offercheck_bin());
    cmd.arg("scenario").arg("--count").arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--count must be at least 1"));
}
