use crate::cli::actions::{server::Args, Action};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    // Absence of the gate password is a per-request 500, not a startup error.
    let gate_password = matches.get_one::<String>("gate-password").cloned();

    Ok(Action::Server(Args {
        port,
        gate_password,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{actions::Action, commands};
    use anyhow::Result;

    #[test]
    fn test_dispatch_with_password() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "mockupmagic",
            "--port",
            "9090",
            "--gate-password",
            "hunter2",
        ])?;

        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 9090);
        assert_eq!(args.gate_password.as_deref(), Some("hunter2"));
        Ok(())
    }

    #[test]
    fn test_dispatch_without_password() -> Result<()> {
        temp_env::with_vars([("MOCKUPMAGIC_GATE_PASSWORD", None::<String>)], || {
            let matches = commands::new().get_matches_from(vec!["mockupmagic"]);

            let action = handler(&matches).expect("dispatch failed");
            let Action::Server(args) = action;
            assert_eq!(args.port, 8080);
            assert_eq!(args.gate_password, None);
        });
        Ok(())
    }
}
