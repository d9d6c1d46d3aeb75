#[tokio::main]
async fn main() {
    // Errors are already reported by `run`.
    if wavemcp_cli::run().await.is_err() {
        std::process::exit(1);
    }
}
