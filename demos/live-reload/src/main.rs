//! Binds a demo schema over layered JSON5 files, then applies `--set`
//! overrides to the already-bound instance and prints it again.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use propbind::{ConfigSchema, LayeredSourceOptions, LiveConfig, config_enum, config_schema};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

config_enum!(LogFormat { Text => "TEXT", Json => "JSON" });

config_schema! {
    /// TLS settings nested under the server key.
    struct TlsConfig {
        value is_enabled: bool = "false";
        value get_cert_path: Option<String>;
    }
}

config_schema! {
    /// Settings shared by every service.
    struct ServiceConfig {
        value get_name: String = "demo";
        value get_log_format: LogFormat = "TEXT";
    }
}

config_schema! {
    /// Server settings read by the demo.
    struct ServerConfig at "server": ServiceConfig {
        value get_host: String = "127.0.0.1";
        value get_port: u16 = "8080";
        value get_allowed_origins: Vec<String> = "";
        nested get_tls: TlsConfig;
    }
}

/// Command-line options for the live reload demo.
#[derive(Parser)]
#[command(name = "propbind-live-reload", version)]
struct Cli {
    /// Working directory used to discover local propbind.json5 layers
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// Extra JSON5 file applied above the discovered layers
    #[arg(long)]
    config: Vec<PathBuf>,
    /// Runtime override applied after binding, as key=value
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
    /// Bind under this prefix instead of the schema's own
    #[arg(long)]
    prefix: Option<String>,
    /// Skip the system and user layers
    #[arg(long)]
    isolated: bool,
}

fn main() -> Result<()> {
    propbind::init_logging();
    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().context("failed to resolve current working directory")?,
    };
    let mut options = LayeredSourceOptions::new(&cwd);
    if cli.isolated {
        options.system_config_path = None;
        options.user_config_path = None;
    }
    for path in &cli.config {
        options = options.with_runtime_path(path);
    }

    let live = LiveConfig::load(options).context("failed to load configuration layers")?;
    println!(
        "layers:\n{}",
        serde_json::to_string_pretty(live.layers()).context("failed to render layers")?
    );

    let server = match cli.prefix.as_deref() {
        Some(prefix) => live.bind_with_prefix::<ServerConfig>(prefix),
        None => live.bind::<ServerConfig>(),
    }
    .context("failed to bind server schema")?;
    println!("before: {}", render(&server)?);

    if cli.overrides.is_empty() {
        return Ok(());
    }
    for assignment in &cli.overrides {
        live.apply_override(assignment)
            .with_context(|| format!("invalid override {assignment}"))?;
    }
    info!("applied overrides (count={})", cli.overrides.len());
    println!("after:  {}", render(&server)?);

    let service = server.view::<ServiceConfig>();
    let tls = server.get_tls()?;
    println!(
        "{} listens on {}:{} (log_format={:?}, tls={}, cert={})",
        service.get_name()?,
        server.get_host()?,
        server.get_port()?,
        service.get_log_format()?,
        tls.is_enabled()?,
        tls.get_cert_path()?.as_deref().unwrap_or("<none>"),
    );
    let origins = server.get_allowed_origins()?;
    if !origins.is_empty() {
        println!("allowed origins: {}", origins.join(", "));
    }
    Ok(())
}

fn render(server: &ServerConfig) -> Result<String> {
    server
        .bound()
        .render()
        .context("failed to resolve server settings")
}
