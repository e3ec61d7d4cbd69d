use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use inkwell_server::{InkwellServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_config(file: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match file {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(ttl) = args.session_ttl {
        config.session_ttl_secs = ttl;
    }
    config.seed_demo |= args.seed_demo;
    tracing::debug!(?config, "effective configuration");

    let server = InkwellServer::new(config).context("invalid server configuration")?;
    println!(
        "{} Inkwell on {}",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold()
    );
    if server.config().seed_demo {
        println!("  Demo account: {}", "demo".yellow());
    }

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.file.as_deref())?;
    let source = match &args.file {
        Some(path) => path.display().to_string(),
        None => "defaults".into(),
    };
    println!("{} {}", "#".dimmed(), format!("effective configuration ({source})").dimmed());
    print!("{}", config.to_toml()?);
    Ok(())
}
