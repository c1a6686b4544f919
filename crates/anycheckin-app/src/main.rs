#[tokio::main]
async fn main() -> anyhow::Result<()> {
    anycheckin_lib::run().await
}
