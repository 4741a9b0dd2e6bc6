use std::process::ExitCode;

use change_request_cli::CHANGE_REQUEST;

#[tokio::main]
async fn main() -> ExitCode {
    change_request_cli::run(&CHANGE_REQUEST).await
}
