use anyhow::Result;
use sinumerik_toolpath::cli::run;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    run().await
}
