use webmd_cli::diag::{header_lines, run_checks, DEFAULT_PROBE_URL};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    engine_logging::initialize_cli(false);

    let probe_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PROBE_URL.to_string());

    for line in header_lines() {
        println!("{line}");
    }
    for check in run_checks(&probe_url).await {
        match check.outcome {
            Ok(_) => println!("{}", check.render()),
            Err(_) => eprintln!("{}", check.render()),
        }
    }
}
