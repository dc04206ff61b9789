//! Structural checks for the daily update workflow.
//!
//! The crawler is only useful when the workflow that runs it keeps its
//! contract: the three entry points, the token wiring, and the commit step
//! that publishes stars.json. These tests pin that contract down.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Workflow {
    name: String,
    on: serde_yaml::Mapping,
    jobs: BTreeMap<String, Job>,
}

#[derive(Debug, Deserialize)]
struct Job {
    #[serde(rename = "runs-on")]
    runs_on: String,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    name: Option<String>,
    uses: Option<String>,
    run: Option<String>,
    env: Option<BTreeMap<String, String>>,
    with: Option<BTreeMap<String, String>>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Cron {
    cron: String,
}

fn load_workflow() -> Workflow {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../.github/workflows/update.yml");
    let raw = std::fs::read_to_string(&path).expect("workflow file should exist");
    serde_yaml::from_str(&raw).expect("workflow file should parse")
}

fn the_job(workflow: &Workflow) -> &Job {
    assert_eq!(workflow.jobs.len(), 1, "expected a single job");
    workflow.jobs.values().next().unwrap()
}

fn uses(step: &Step) -> &str {
    step.uses.as_deref().unwrap_or_default()
}

#[test]
fn test_triggers_are_exactly_the_three_entry_points() {
    let workflow = load_workflow();
    assert!(!workflow.name.is_empty());

    let triggers: Vec<&str> = workflow.on.iter().filter_map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        triggers,
        ["repository_dispatch", "workflow_dispatch", "schedule"]
    );
}

#[test]
fn test_schedule_runs_daily_at_0400_utc() {
    let workflow = load_workflow();

    let schedule = workflow
        .on
        .iter()
        .find(|(k, _)| k.as_str() == Some("schedule"))
        .map(|(_, v)| v.clone())
        .expect("schedule trigger");

    let crons: Vec<Cron> = serde_yaml::from_value(schedule).expect("schedule should be a cron list");
    assert_eq!(
        crons,
        vec![Cron {
            cron: "00 4 * * *".to_string(),
        }]
    );
}

#[test]
fn test_single_runner_environment() {
    let workflow = load_workflow();
    let job = the_job(&workflow);
    assert_eq!(job.runs_on, "ubuntu-latest");
}

#[test]
fn test_steps_check_out_build_crawl_and_commit_in_order() {
    let workflow = load_workflow();
    let steps = &the_job(&workflow).steps;

    assert_eq!(steps.len(), 4);
    assert!(steps.iter().all(|s| s.name.is_some()));

    assert!(uses(&steps[0]).starts_with("actions/checkout@"));
    assert!(uses(&steps[1]).starts_with("dtolnay/rust-toolchain@"));

    let run = steps[2].run.as_deref().expect("third step runs the crawler");
    assert!(run.contains("cargo run --release"));
    assert!(run.contains("--package starchart"));

    assert!(uses(&steps[3]).starts_with("stefanzweifel/git-auto-commit-action@"));
}

#[test]
fn test_token_is_injected_only_into_the_run_step() {
    let workflow = load_workflow();
    let steps = &the_job(&workflow).steps;

    let env = steps[2].env.as_ref().expect("run step should carry env");
    assert_eq!(env.len(), 1);
    assert_eq!(
        env.get("GITHUB_TOKEN").map(String::as_str),
        Some("${{ secrets.GITHUB_TOKEN }}")
    );

    for step in [&steps[0], &steps[1], &steps[3]] {
        assert!(step.env.is_none(), "only the run step should see the token");
    }
}

#[test]
fn test_commit_step_publishes_under_the_fixed_bot_identity() {
    let workflow = load_workflow();
    let steps = &the_job(&workflow).steps;

    let with = steps[3].with.as_ref().expect("commit step config");
    assert_eq!(
        with.get("commit_message").map(String::as_str),
        Some("Commit list")
    );

    let user = with.get("commit_user_name").expect("bot user name");
    let email = with.get("commit_user_email").expect("bot user email");
    assert_eq!(
        with.get("commit_author").map(String::as_str),
        Some(format!("{user} <{email}>").as_str())
    );
}
