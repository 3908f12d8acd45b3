use tracing::{debug, info};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Whether this client is signed in. Credentials are checked by plain
/// equality against the configured pair; there is no token or lockout.
#[derive(Debug, Clone, Default)]
pub struct Session {
    connected: bool,
    credentials: Option<Credentials>,
}

impl Session {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            connected: false,
            credentials,
        }
    }

    pub fn signed_in(credentials: Option<Credentials>) -> Self {
        Self {
            connected: true,
            credentials,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn login(&mut self, email: &str, password: &str) -> bool {
        let accepted = self
            .credentials
            .as_ref()
            .map(|expected| expected.email == email && expected.password == password)
            .unwrap_or(false);
        if accepted {
            self.connected = true;
            info!("session opened");
        } else {
            debug!("login rejected");
        }
        accepted
    }

    pub fn logout(&mut self) {
        self.connected = false;
        info!("session closed");
    }
}
