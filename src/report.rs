use std::path::Path;

/// Progress events emitted while provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report<'a> {
    /// The credentials file was written.
    CredentialsWritten(&'a Path),
    /// The nginx rule was written.
    RuleWritten(&'a Path),
    /// The metadata endpoint returned nothing usable.
    NoMetadata,
    /// Every step finished.
    Done,
    /// Files are rendered to stdout instead of written.
    DryRun,
}

/// Receives [`Report`] events. Created once at startup and passed
/// to each component.
pub trait Reporter {
    fn report(&self, event: &Report<'_>);
}

/// Forwards reports to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &Report<'_>) {
        match event {
            Report::CredentialsWritten(path) => {
                tracing::info!(path = %path.display(), ".htpasswd created");
            }
            Report::RuleWritten(path) => {
                tracing::info!(path = %path.display(), "nginx rule created");
            }
            Report::NoMetadata => {
                tracing::warn!("no instance metadata, process finished");
            }
            Report::Done => tracing::info!("done"),
            Report::DryRun => tracing::info!("dry run, no changes will be made"),
        }
    }
}
