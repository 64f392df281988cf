use log::{info, o, warn, Logger};

/// Who is currently using the directory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Guest,
    Privileged,
}

/// Unlocks the curation affordances for whoever knows the shared PIN.
///
/// This only decides what the host offers; it is a plain equality check
/// against a static value and guards nothing at rest.
pub struct AdminGate {
    secret: String,
    role: Role,
    logger: Logger,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>, logger: &Logger) -> Self {
        AdminGate {
            secret: secret.into(),
            role: Role::Guest,
            logger: logger.new(o!("component" => "admin")),
        }
    }

    /// Compares `candidate` with the secret. A match grants privileges;
    /// a mismatch leaves the role as it was.
    pub fn check_secret(&mut self, candidate: &str) -> bool {
        if candidate == self.secret {
            if self.role == Role::Guest {
                info!(self.logger, "Admin mode unlocked");
            }

            self.role = Role::Privileged;
            true
        } else {
            warn!(self.logger, "Rejected admin PIN");
            false
        }
    }

    /// Returns to guest mode. Hosts may choose not to offer this.
    pub fn lock(&mut self) {
        if self.role == Role::Privileged {
            info!(self.logger, "Admin mode locked");
        }

        self.role = Role::Guest;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_privileged(&self) -> bool {
        self.role == Role::Privileged
    }
}
