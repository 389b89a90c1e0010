use std::path::PathBuf;

use clap::Parser;

use crate::error::LoginResult;
use crate::htpasswd::Htpasswd;
use crate::metadata::{InstanceMetadata, MetadataClient};
use crate::nginx::NginxRule;
use crate::report::{Report, Reporter};

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Both files were written.
    Provisioned { htpasswd: PathBuf, rule: PathBuf },
    /// The metadata service returned nothing. Nothing was written.
    NoMetadata,
    /// Files were rendered to stdout only.
    DryRun,
}

/// Fetches instance metadata, then writes the credentials file
/// and the nginx rule in that order.
pub struct Pipeline {
    metadata: MetadataClient,
    htpasswd: Htpasswd,
    rule: NginxRule,
    dry_run: bool,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: MetadataClient::new(),
            htpasswd: Htpasswd::new(),
            rule: NginxRule::new(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn metadata(mut self, client: MetadataClient) -> Self {
        self.metadata = client;
        self
    }

    #[must_use]
    pub fn htpasswd(mut self, htpasswd: Htpasswd) -> Self {
        self.htpasswd = htpasswd;
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: NginxRule) -> Self {
        self.rule = rule;
        self
    }

    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run every step once. No step is retried and a failure
    /// part way through leaves earlier files in place.
    pub fn execute(&self, reporter: &dyn Reporter) -> LoginResult<Outcome> {
        let Some(metadata) = self.metadata.fetch()? else {
            reporter.report(&Report::NoMetadata);
            return Ok(Outcome::NoMetadata);
        };

        if self.dry_run {
            reporter.report(&Report::DryRun);
            println!("{}", self.render_dry_run(&metadata)?);
            return Ok(Outcome::DryRun);
        }

        let htpasswd = self.htpasswd.write(&metadata, reporter)?;
        let rule = self.rule.write(&metadata, &htpasswd, reporter)?;

        reporter.report(&Report::Done);
        Ok(Outcome::Provisioned { htpasswd, rule })
    }

    /// Everything a run would write, as one document. The
    /// subscription id is left out.
    pub fn render_dry_run(&self, metadata: &InstanceMetadata) -> LoginResult<String> {
        let credentials = self.htpasswd.render(metadata)?;
        let rule = self.rule.render(metadata, &self.htpasswd.path)?;

        Ok(format!(
            "--- instance metadata ---\n{}\n\
             --- {} ---\n{}\n\
             --- {} ---\n{rule}",
            serde_json::to_string_pretty(metadata)?,
            self.htpasswd.path.display(),
            credentials.trim_end(),
            self.rule.path.display(),
        ))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Command line for the `horizon-login` binary. Every flag is
/// optional; without any the fixed production paths are used.
#[derive(Debug, Parser)]
#[command(name = "horizon-login")]
#[command(about = "Protect the instance web root with nginx basic auth")]
pub struct Cli {
    /// Instance metadata endpoint
    #[arg(long)]
    pub metadata_url: Option<String>,

    /// Credentials file to write
    #[arg(long)]
    pub htpasswd_path: Option<PathBuf>,

    /// nginx rule file to write
    #[arg(long)]
    pub rule_path: Option<PathBuf>,

    /// Directory searched for the web root
    #[arg(long)]
    pub home_dir: Option<PathBuf>,

    /// Web root to serve, skipping the search
    #[arg(long)]
    pub web_root: Option<PathBuf>,

    /// Print the generated files without writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Build the pipeline, applying any overrides.
    #[must_use]
    pub fn into_pipeline(self) -> Pipeline {
        let mut metadata = MetadataClient::new();
        if let Some(url) = &self.metadata_url {
            metadata = metadata.url(url);
        }

        let mut htpasswd = Htpasswd::new();
        if let Some(path) = &self.htpasswd_path {
            htpasswd = htpasswd.path(path);
        }

        let mut rule = NginxRule::new();
        if let Some(path) = &self.rule_path {
            rule = rule.path(path);
        }
        if let Some(dir) = &self.home_dir {
            rule = rule.home_dir(dir);
        }
        if let Some(root) = &self.web_root {
            rule = rule.web_root(root);
        }

        Pipeline::new()
            .metadata(metadata)
            .htpasswd(htpasswd)
            .rule(rule)
            .dry_run(self.dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_without_arguments() {
        let cli = Cli::try_parse_from(["horizon-login"]).expect("parse failed");

        assert!(cli.metadata_url.is_none());
        assert!(cli.htpasswd_path.is_none());
        assert!(cli.rule_path.is_none());
        assert!(cli.home_dir.is_none());
        assert!(cli.web_root.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn cli_overrides_reach_pipeline() {
        let cli = Cli::try_parse_from([
            "horizon-login",
            "--metadata-url",
            "http://localhost/meta",
            "--htpasswd-path",
            "/tmp/htpasswd",
            "--rule-path",
            "/tmp/login.conf",
            "--home-dir",
            "/srv/home",
            "--web-root",
            "/srv/www",
            "--dry-run",
        ])
        .expect("parse failed");

        let pipeline = cli.into_pipeline();

        assert_eq!(pipeline.metadata.url, "http://localhost/meta");
        assert_eq!(pipeline.htpasswd.path, PathBuf::from("/tmp/htpasswd"));
        assert_eq!(pipeline.rule.path, PathBuf::from("/tmp/login.conf"));
        assert_eq!(pipeline.rule.home_dir, PathBuf::from("/srv/home"));
        assert_eq!(pipeline.rule.web_root, Some(PathBuf::from("/srv/www")));
        assert!(pipeline.dry_run);
    }

    #[test]
    fn cli_defaults_match_fixed_paths() {
        let pipeline = Cli::try_parse_from(["horizon-login"])
            .expect("parse failed")
            .into_pipeline();

        assert_eq!(pipeline.metadata.url, "http://169.254.169.254/metadata/instance");
        assert_eq!(pipeline.htpasswd.path, PathBuf::from("/etc/nginx/.htpasswd"));
        assert_eq!(
            pipeline.rule.path,
            PathBuf::from("/etc/nginx/conf.d/blue_horizon_login.conf")
        );
        assert!(!pipeline.dry_run);
    }
}
