use std::path::{Path, PathBuf};

use crate::cmd;
use crate::error::LoginResult;
use crate::metadata::InstanceMetadata;
use crate::report::{Report, Reporter};

/// Writes the nginx basic-auth credentials file. The instance
/// name is the user, the subscription id hashed with
/// `openssl passwd -apr1` is the password.
///
/// # Example
///
/// ```
/// use horizon_login::Htpasswd;
///
/// let htpasswd = Htpasswd::new().path("/tmp/.htpasswd");
///
/// assert_eq!(htpasswd.path.to_str(), Some("/tmp/.htpasswd"));
/// assert_eq!(htpasswd.program, "openssl");
/// ```
#[derive(Debug, Clone)]
pub struct Htpasswd {
    pub path: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}

impl Htpasswd {
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/etc/nginx/.htpasswd"),
            program: "openssl".to_string(),
            args: vec!["passwd".to_string(), "-apr1".to_string()],
        }
    }

    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Replace the hashing command. The password is appended as
    /// the last argument.
    #[must_use]
    pub fn hasher(mut self, program: &str, args: &[&str]) -> Self {
        self.program = program.to_string();
        self.args = args.iter().map(|a| (*a).to_string()).collect();
        self
    }

    /// Hash a password with the configured command. The output is
    /// returned as printed, trailing newline included.
    pub fn hash_password(&self, password: &str) -> LoginResult<String> {
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.push(password);

        Ok(cmd::run(&self.program, &args)?.stdout)
    }

    /// Render the `user:hash` line for this instance.
    pub fn render(&self, metadata: &InstanceMetadata) -> LoginResult<String> {
        let hash = self.hash_password(metadata.subscription_id())?;
        Ok(format!("{}:{hash}", metadata.name()))
    }

    /// Write the credentials file, replacing any previous content,
    /// and return its path.
    pub fn write(
        &self,
        metadata: &InstanceMetadata,
        reporter: &dyn Reporter,
    ) -> LoginResult<PathBuf> {
        let content = self.render(metadata)?;
        std::fs::write(&self.path, content)?;

        reporter.report(&Report::CredentialsWritten(&self.path));
        Ok(self.path.clone())
    }
}

impl Default for Htpasswd {
    fn default() -> Self {
        Self::new()
    }
}
