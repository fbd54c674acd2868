//! SIGINT cancels a running batch. Kept in its own test binary so the
//! handler it installs cannot reach other tests.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use neon_catalog::Catalog;
use neon_codegen::{emit_with, EmitOptions};
use neon_harness::{
    cancel_on_interrupt, check, CancelToken, CapabilityConfig, CapabilityGate, HarnessConfig,
    Outcome, Runner,
};

#[test]
fn sigint_cancels_the_running_case_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let cwd_file = dir.path().join("cwd");
    let script = dir.path().join("cc.sh");
    fs::write(
        &script,
        format!(
            "pwd > '{path}.tmp'\nmv '{path}.tmp' '{path}'\nexec sleep 30\n",
            path = cwd_file.display()
        ),
    )
    .unwrap();

    let mut config = HarnessConfig::default();
    config.toolchain.compiler = "sh".to_string();
    config.toolchain.args = vec![script.display().to_string()];
    config.timeout_secs = 20;
    config
        .capabilities
        .insert("arm_neon_ok".to_string(), CapabilityConfig::assume_supported(&[]));

    let token = CancelToken::new();
    cancel_on_interrupt(&token).unwrap();
    let gate = CapabilityGate::resolve(&config, ["arm_neon_ok"]);
    let runner = Runner::new(config, gate).with_cancel_token(token.clone());

    let interrupter = {
        let cwd_file = cwd_file.clone();
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(10);
            while !cwd_file.exists() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            unsafe {
                libc::raise(libc::SIGINT);
            }
        })
    };

    let started = Instant::now();
    let case = emit_with(Catalog::builtin().lookup("vorn_s64").unwrap(), &EmitOptions::default())
        .unwrap();
    let result = check(runner.run(&case));
    interrupter.join().unwrap();

    assert!(token.is_cancelled());
    assert_eq!(result.outcome, Outcome::Skipped);
    assert!(started.elapsed() < Duration::from_secs(15));
    let scratch = fs::read_to_string(&cwd_file).unwrap();
    assert!(!Path::new(scratch.trim()).exists(), "{scratch} left behind");
}
