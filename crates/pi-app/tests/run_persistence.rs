use std::path::PathBuf;

use pi_app::{RunOptions, RunRequest, query, run_service, save_scenario};
use pi_project::Scenario;
use pi_results::{ActuatorRange, RunStore};

fn scenario_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn step_response_run_persists_beside_scenario() {
    let dir = scenario_dir("pi_app_run_persistence");
    let scenario_path = dir.join("step.yaml");
    save_scenario(&scenario_path, &Scenario::step_response()).unwrap();

    let request = RunRequest {
        scenario_path: &scenario_path,
        options: RunOptions::default(),
    };

    let first = run_service::ensure_run(&request).unwrap();
    assert!(!first.loaded_from_cache);
    assert_eq!(first.manifest.samples, 1000);
    assert_eq!(first.manifest.scenario_name, "step-response");
    assert!(first.manifest.stats.rhs_calls > 0);
    assert_eq!(first.manifest.solver_version, pi_sim::SOLVER_VERSION);
    assert!(first.manifest.solver_version.starts_with("pi-sim/"));

    let second = run_service::ensure_run(&request).unwrap();
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);

    let store = RunStore::for_scenario(&scenario_path).unwrap();
    assert!(store.has_run(&first.run_id));
    let runs = run_service::list_runs(&scenario_path).unwrap();
    assert_eq!(runs.len(), 1);

    let (manifest, records) = run_service::load_run(&scenario_path, &first.run_id).unwrap();
    assert_eq!(records.len(), 1000);
    for rec in &records {
        assert!((-1.0..=1.0).contains(&rec.u));
    }

    assert_eq!(
        manifest.limits,
        ActuatorRange {
            u_min: -1.0,
            u_max: 1.0
        }
    );
    let summary = query::summarize_run(&manifest, &records).unwrap();
    assert!(summary.final_error.abs() < 0.02);
    assert!((summary.final_u_raw - 0.5).abs() < 0.02);
    assert!(summary.max_windup < 0.01);
}

#[test]
fn stored_run_keeps_its_own_limits_after_scenario_edit() {
    let dir = scenario_dir("pi_app_run_limits");
    let scenario_path = dir.join("step.yaml");
    let mut scenario = Scenario::step_response();
    save_scenario(&scenario_path, &scenario).unwrap();

    let request = RunRequest {
        scenario_path: &scenario_path,
        options: RunOptions::default(),
    };
    let first = run_service::ensure_run(&request).unwrap();

    // Narrow the actuator after the run was stored.
    scenario.params.u_min = -0.1;
    scenario.params.u_max = 0.1;
    save_scenario(&scenario_path, &scenario).unwrap();

    let (manifest, records) = run_service::load_run(&scenario_path, &first.run_id).unwrap();
    assert_eq!((manifest.limits.u_min, manifest.limits.u_max), (-1.0, 1.0));
    let summary = query::summarize_run(&manifest, &records).unwrap();
    assert!(summary.max_windup < 0.01);
}

#[test]
fn changed_scenario_gets_new_run_id() {
    let dir = scenario_dir("pi_app_run_ids");
    let scenario_path = dir.join("loop.yaml");

    let mut scenario = Scenario::integral_demo();
    save_scenario(&scenario_path, &scenario).unwrap();
    let request = RunRequest {
        scenario_path: &scenario_path,
        options: RunOptions::default(),
    };
    let first = run_service::ensure_run(&request).unwrap();

    scenario.params.use_ref = true;
    save_scenario(&scenario_path, &scenario).unwrap();
    let second = run_service::ensure_run(&request).unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert!(!second.loaded_from_cache);
    assert_eq!(run_service::list_runs(&scenario_path).unwrap().len(), 2);
}

#[test]
fn no_cache_forces_rerun() {
    let dir = scenario_dir("pi_app_no_cache");
    let scenario_path = dir.join("loop.json");
    save_scenario(&scenario_path, &Scenario::integral_demo()).unwrap();

    let cached = RunRequest {
        scenario_path: &scenario_path,
        options: RunOptions::default(),
    };
    run_service::ensure_run(&cached).unwrap();

    let forced = RunRequest {
        scenario_path: &scenario_path,
        options: RunOptions {
            use_cache: false,
            ..RunOptions::default()
        },
    };
    let response = run_service::ensure_run(&forced).unwrap();
    assert!(!response.loaded_from_cache);
}

#[test]
fn missing_run_is_reported() {
    let dir = scenario_dir("pi_app_missing_run");
    let scenario_path = dir.join("loop.yaml");
    save_scenario(&scenario_path, &Scenario::new("empty")).unwrap();

    assert!(matches!(
        run_service::load_run(&scenario_path, "deadbeef"),
        Err(pi_app::AppError::RunNotFound(_))
    ));
}
