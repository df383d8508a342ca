use std::io::{self, Write};

use faq_rag::{AppConfig, app, repl, telemetry};
use tracing::error;

#[tokio::main]
async fn main() {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();
    telemetry::init();

    let mut stdout = io::stdout();
    let _ = repl::print_banner(&mut stdout);

    let code = match AppConfig::from_env() {
        Ok(cfg) => match app::run(cfg).await {
            Ok(_) => 0,
            Err(e) => {
                error!(error = %e, details = ?e, "startup failed");
                println!("{}", e.user_message());
                e.exit_code()
            }
        },
        Err(e) => {
            error!(error = %e, details = ?e, "configuration failed");
            println!("{}", e.user_message());
            e.exit_code()
        }
    };

    let _ = stdout.flush();
    // The stdin reader runs on a blocking thread that cannot be cancelled;
    // exit directly instead of waiting for it during runtime shutdown.
    std::process::exit(i32::from(code));
}
