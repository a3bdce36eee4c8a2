use std::path::PathBuf;

use petta_kernel::config::Config;
use petta_kernel::engine::{Engine, EngineError, PettaEngine};
use petta_kernel::kernel::Kernel;
use petta_kernel::types::ExecuteRequest;

use super::{fixture_source, test_config};

#[tokio::test]
async fn test_start_without_petta_path() {
    let result = PettaEngine::start(&Config::empty()).await;
    assert!(matches!(result, Err(EngineError::PettaPathMissing)));
}

#[tokio::test]
async fn test_start_with_bogus_petta_path() {
    let config = Config {
        petta_path: Some(PathBuf::from("/nonexistent/PeTTa")),
        ..Config::empty()
    };
    let result = PettaEngine::start(&config).await;
    assert!(matches!(result, Err(EngineError::PettaPathInvalid(_))));
}

#[tokio::test]
async fn test_degraded_kernel_reports_reason() {
    let config = Config {
        petta_path: Some(PathBuf::from("/nonexistent/PeTTa")),
        ..Config::empty()
    };
    let kernel = Kernel::start(&config).await;
    assert!(!kernel.is_ready());

    let execution = kernel.execute(&ExecuteRequest::new("!(+ 1 2)")).await;
    assert_eq!(
        execution.reply.ename.as_deref(),
        Some("InitializationFailure")
    );
    let text = execution.stream.expect("error stream").text;
    assert!(text.contains("/nonexistent/PeTTa"));
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_engine_start_and_shutdown() {
    let config = test_config();
    let mut engine = PettaEngine::start(&config)
        .await
        .expect("Failed to start engine");

    assert!(engine.id().is_some());
    engine.shutdown().await.expect("Failed to shut down engine");

    // The bridge is gone after shutdown
    let unit = std::env::temp_dir().join("petta-kernel-unused.metta");
    let result = engine.evaluate(&unit).await;
    assert!(matches!(result, Err(EngineError::BridgeClosed(_))));
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_engine_evaluates_file() {
    let config = test_config();
    let mut engine = PettaEngine::start(&config)
        .await
        .expect("Failed to start engine");

    let dir = tempfile::tempdir().unwrap();
    let unit = dir.path().join("arithmetic.metta");
    std::fs::write(&unit, fixture_source("arithmetic.metta")).unwrap();

    let results = engine.evaluate(&unit).await.expect("Evaluation failed");
    assert_eq!(results, vec!["3".to_string()]);

    engine.shutdown().await.expect("Failed to shut down engine");
}
