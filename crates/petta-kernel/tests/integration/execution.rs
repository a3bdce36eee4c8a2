use petta_kernel::kernel::Kernel;
use petta_kernel::types::{ExecuteRequest, ExecuteStatus, Stream, StreamName};

use super::{fixture_source, test_config};

async fn start_kernel() -> Kernel<petta_kernel::engine::PettaEngine> {
    let kernel = Kernel::start(&test_config()).await;
    assert!(kernel.is_ready(), "PeTTa engine failed to start");
    kernel
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_basic_arithmetic() {
    let kernel = start_kernel().await;

    let execution = kernel
        .execute(&ExecuteRequest::new(fixture_source("arithmetic.metta")))
        .await;

    assert_eq!(execution.reply.status, ExecuteStatus::Ok);
    assert_eq!(execution.stream, Some(Stream::stdout("3")));

    kernel.shutdown(false).await;
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_multiple_results() {
    let kernel = start_kernel().await;

    let execution = kernel
        .execute(&ExecuteRequest::new(fixture_source("multiple_results.metta")))
        .await;

    assert!(execution.reply.is_ok());
    assert_eq!(execution.stream, Some(Stream::stdout("3\n12")));

    kernel.shutdown(false).await;
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_definitions_persist_between_requests() {
    let kernel = start_kernel().await;

    let definition = kernel
        .execute(&ExecuteRequest::new(fixture_source("definitions.metta")))
        .await;
    assert!(definition.reply.is_ok());
    assert_eq!(definition.stream, None);

    let first = kernel.execute(&ExecuteRequest::new("!(double 5)")).await;
    assert_eq!(first.stream, Some(Stream::stdout("10")));

    let second = kernel.execute(&ExecuteRequest::new("!(double 10)")).await;
    assert_eq!(second.stream, Some(Stream::stdout("20")));
    assert_eq!(second.reply.execution_count, 3);

    kernel.shutdown(false).await;
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_empty_code() {
    let kernel = start_kernel().await;

    let execution = kernel.execute(&ExecuteRequest::new("")).await;
    assert!(execution.reply.is_ok());
    assert_eq!(execution.stream, None);

    kernel.shutdown(false).await;
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_syntax_error() {
    let kernel = start_kernel().await;

    let execution = kernel
        .execute(&ExecuteRequest::new(fixture_source("syntax_error.metta")))
        .await;

    assert!(execution.is_error());
    let stream = execution.stream.expect("error output");
    assert_eq!(stream.name, StreamName::Stderr);
    assert!(!stream.text.is_empty());

    // The engine keeps serving after an error
    let after = kernel.execute(&ExecuteRequest::new("!(* 3 4)")).await;
    assert_eq!(after.stream, Some(Stream::stdout("12")));

    kernel.shutdown(false).await;
}

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_type_error() {
    let kernel = start_kernel().await;

    let execution = kernel
        .execute(&ExecuteRequest::new(fixture_source("type_error.metta")))
        .await;

    assert!(execution.is_error());
    let stream = execution.stream.expect("error output");
    assert_eq!(stream.name, StreamName::Stderr);

    kernel.shutdown(false).await;
}
