//! Roster HTTP server entry point.

#[tokio::main]
async fn main() {
    if let Err(err) = roster_server::start_server().await {
        eprintln!("roster-server: {err}");
        std::process::exit(1);
    }
}
