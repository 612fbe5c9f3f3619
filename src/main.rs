#[tokio::main]
async fn main() {
    if let Err(err) = telegram_node::runner::server::run_stdio().await {
        eprintln!("telegram-node: {}", err);
        std::process::exit(1);
    }
}
