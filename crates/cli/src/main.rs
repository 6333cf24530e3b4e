mod app;
mod args;
mod episode;
mod logger;
mod prompt;

use std::process::ExitCode;

use app::App;

#[tokio::main]
async fn main() -> ExitCode {
    let app = App::new();

    let ok = tokio::select! {
        ok = app.run() => ok,
        _ = tokio::signal::ctrl_c() => {
            app.logger().failed("interrupted");
            false
        }
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
