use crate::{cli::globals::GlobalArgs, gate};
use anyhow::Result;
use secrecy::SecretString;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub gate_password: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if args.gate_password.is_none() {
        warn!("No gate password configured, the gate endpoint will answer 500");
    }

    let globals = GlobalArgs::new(args.gate_password.map(SecretString::from));

    gate::new(args.port, globals).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("gate_password_set", args.gate_password.is_some().to_string()),
        ("version", env!("CARGO_PKG_VERSION").to_string()),
        ("commit", short_commit(gate::GIT_COMMIT_HASH)),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{title}:");
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}
