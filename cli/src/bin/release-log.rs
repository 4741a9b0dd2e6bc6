use std::process::ExitCode;

use change_request_cli::RELEASE_LOG;

#[tokio::main]
async fn main() -> ExitCode {
    change_request_cli::run(&RELEASE_LOG).await
}
