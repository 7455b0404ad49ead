use secrecy::SecretString;

/// Process-wide configuration, populated once at startup and handed to the
/// router as an explicit extension so handlers never read ambient state.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub gate_password: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub const fn new(gate_password: Option<SecretString>) -> Self {
        Self { gate_password }
    }
}
