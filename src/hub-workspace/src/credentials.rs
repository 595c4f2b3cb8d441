use tracing::trace;

/// Finds the connection credential of a workspace in its container log
pub trait CredentialSource: Send + Sync {
    fn extract(&self, log: &str) -> Option<String>;
}

/// first line carrying the marker wins, the credential is the rest of that line
#[derive(Debug, Clone)]
pub struct LogScrapeCredentials {
    marker: String,
}

impl LogScrapeCredentials {
    pub fn new<T: Into<String>>(marker: T) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl CredentialSource for LogScrapeCredentials {
    fn extract(&self, log: &str) -> Option<String> {
        log.lines().find_map(|line| {
            line.find(&self.marker).map(|position| {
                trace!("credential marker found");
                line[position + self.marker.len()..].trim().to_owned()
            })
        })
    }
}
