use std::path::{Path, PathBuf};

use crate::error::{LoginError, LoginResult};
use crate::metadata::InstanceMetadata;
use crate::report::{Report, Reporter};

const LOOPBACK: &str = "127.0.0.1";

/// The substituted values of a login rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFields {
    pub root: String,
    pub allowed_ip: String,
    pub user_file: String,
}

/// Render the nginx `server` block.
#[must_use]
pub fn render(fields: &RuleFields, server_name: &str) -> String {
    format!(
        "server {{\n    \
         listen 80;\n    \
         listen [::]:80;\n    \
         server_name {server_name};\n    \
         root {root};\n    \
         index index.html;\n    \
         allow {LOOPBACK};\n    \
         allow {ip};\n    \
         auth_basic 'Test';\n    \
         auth_basic_user_file {user_file};\n\
         }}\n",
        root = fields.root,
        ip = fields.allowed_ip,
        user_file = fields.user_file,
    )
}

/// Read the substituted values back out of a rendered rule.
/// Returns `None` if any of them is missing.
#[must_use]
pub fn parse(content: &str) -> Option<RuleFields> {
    let mut root = None;
    let mut allowed_ip = None;
    let mut user_file = None;

    for line in content.lines() {
        let Some((key, value)) = line.trim().trim_end_matches(';').split_once(char::is_whitespace)
        else {
            continue;
        };
        let value = value.trim();
        match key {
            "root" => root = Some(value.to_string()),
            "allow" if value != LOOPBACK => allowed_ip = Some(value.to_string()),
            "auth_basic_user_file" => user_file = Some(value.to_string()),
            _ => {}
        }
    }

    Some(RuleFields {
        root: root?,
        allowed_ip: allowed_ip?,
        user_file: user_file?,
    })
}

/// Locate the web root: the lexicographically first non-hidden
/// entry of `parent`, joined with `subdir`. A missing or
/// unreadable `parent` counts as empty.
pub fn discover_web_root(parent: &Path, subdir: &str) -> LoginResult<PathBuf> {
    let not_found = || LoginError::WebRootNotFound(parent.to_path_buf());

    let mut names: Vec<_> = std::fs::read_dir(parent)
        .map_err(|_| not_found())?
        .filter_map(Result::ok)
        .map(|e| e.file_name())
        .filter(|n| !n.to_string_lossy().starts_with('.'))
        .collect();
    names.sort();

    let first = names
        .into_iter()
        .next()
        .ok_or_else(not_found)?;

    Ok(parent.join(first).join(subdir))
}

/// Writes the nginx rule restricting the site to the loopback
/// address and the instance's public IP behind basic auth.
///
/// # Example
///
/// ```
/// use horizon_login::NginxRule;
///
/// let rule = NginxRule::new().web_root("/srv/site");
///
/// assert_eq!(rule.server_name, "test.com www.test.com");
/// assert_eq!(rule.web_root.as_deref(), Some(std::path::Path::new("/srv/site")));
/// ```
#[derive(Debug, Clone)]
pub struct NginxRule {
    pub path: PathBuf,
    pub home_dir: PathBuf,
    pub subdir: String,
    pub web_root: Option<PathBuf>,
    pub server_name: String,
}

impl NginxRule {
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/etc/nginx/conf.d/blue_horizon_login.conf"),
            home_dir: PathBuf::from("/home"),
            subdir: "www".to_string(),
            web_root: None,
            server_name: "test.com www.test.com".to_string(),
        }
    }

    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn home_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.home_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn subdir(mut self, subdir: &str) -> Self {
        self.subdir = subdir.to_string();
        self
    }

    /// Use this web root instead of searching `home_dir`.
    #[must_use]
    pub fn web_root(mut self, root: impl AsRef<Path>) -> Self {
        self.web_root = Some(root.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn server_name(mut self, name: &str) -> Self {
        self.server_name = name.to_string();
        self
    }

    pub fn resolve_web_root(&self) -> LoginResult<PathBuf> {
        self.web_root.as_ref().map_or_else(
            || discover_web_root(&self.home_dir, &self.subdir),
            |root| Ok(root.clone()),
        )
    }

    /// Render the rule for this instance.
    pub fn render(&self, metadata: &InstanceMetadata, user_file: &Path) -> LoginResult<String> {
        let root = self.resolve_web_root()?;
        let fields = RuleFields {
            root: root.display().to_string(),
            allowed_ip: metadata.public_ip().to_string(),
            user_file: user_file.display().to_string(),
        };
        Ok(render(&fields, &self.server_name))
    }

    /// Write the rule, replacing any previous content, and return
    /// its path.
    pub fn write(
        &self,
        metadata: &InstanceMetadata,
        user_file: &Path,
        reporter: &dyn Reporter,
    ) -> LoginResult<PathBuf> {
        let content = self.render(metadata, user_file)?;
        std::fs::write(&self.path, content)?;

        reporter.report(&Report::RuleWritten(&self.path));
        Ok(self.path.clone())
    }
}

impl Default for NginxRule {
    fn default() -> Self {
        Self::new()
    }
}
