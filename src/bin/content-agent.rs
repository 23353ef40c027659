/// Content agent: serves the sanitize/typeset protocol over stdio.
/// Stdout carries response lines only; all logging goes to stderr.
use retmap::content::protocol;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("retmap=info".parse()?),
        )
        .init();

    tracing::info!("content agent ready");
    protocol::serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    tracing::info!("input closed, shutting down");
    Ok(())
}
