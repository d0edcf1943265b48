#[tokio::main]
async fn main() {
    if let Err(e) = store_ratings::start_server().await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
