#[tokio::main]
async fn main() {
    verification_backend::run().await;
}
