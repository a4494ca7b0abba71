#[tokio::main]
async fn main() -> Result<(), server::error::AppError> {
    server::start_server().await
}
