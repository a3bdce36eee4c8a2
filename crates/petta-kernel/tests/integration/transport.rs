use petta_kernel::kernel::Kernel;
use petta_kernel::protocol::serve;
use serde_json::Value;
use tokio::io::BufReader;

use super::test_config;

#[tokio::test]
#[ignore = "requires SWI-Prolog and PETTA_PATH"]
async fn test_serve_session() {
    let kernel = Kernel::start(&test_config()).await;
    assert!(kernel.is_ready());

    let input = concat!(
        "{\"msg_type\":\"kernel_info_request\"}\n",
        "{\"msg_type\":\"execute_request\",\"code\":\"(= (double $x) (* $x 2))\"}\n",
        "{\"msg_type\":\"execute_request\",\"code\":\"!(double 5)\"}\n",
        "{\"msg_type\":\"shutdown_request\",\"restart\":false}\n",
    );
    let mut output = Vec::new();
    serve(&kernel, BufReader::new(input.as_bytes()), &mut output)
        .await
        .expect("Transport failed");

    let messages: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let types: Vec<&str> = messages
        .iter()
        .map(|m| m["msg_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec![
            "kernel_info_reply",
            "execute_reply",
            "stream",
            "execute_reply",
            "shutdown_reply",
        ]
    );
    assert_eq!(messages[2]["text"], "10");
    assert_eq!(messages[3]["execution_count"], 2);
}
