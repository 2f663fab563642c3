use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub fn init_tracing(verbose: bool) -> Result<(), anyhow::Error> {
    let default_filter = if verbose {
        "vizmodel=debug,vizm=debug"
    } else {
        "vizmodel=info,vizm=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // stdout carries command output; logs go to stderr.
    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
