#[tokio::main]
async fn main() -> std::io::Result<()> {
    neon_drive::run_with_config().await
}
