//! Protect a cloud VM's web root with nginx basic auth.
//!
//! On boot the instance asks the Azure metadata service who it
//! is, then writes two files for nginx:
//!
//! - `/etc/nginx/.htpasswd` with `<instance name>:<hash>`, where the
//!   hash is `openssl passwd -apr1` of the subscription id
//! - `/etc/nginx/conf.d/blue_horizon_login.conf`, a `server` block
//!   serving `/home/<first user>/www` to the loopback address and
//!   the instance's public IP behind basic auth
//!
//! If the metadata service returns nothing the run stops with a
//! warning and succeeds.
//!
//! # Example
//!
//! ```rust,no_run
//! use horizon_login::{Htpasswd, NginxRule, Pipeline, TracingReporter};
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new()
//!         .htpasswd(Htpasswd::new().path("/etc/nginx/.htpasswd"))
//!         .rule(NginxRule::new().web_root("/home/alice/www"));
//!
//!     pipeline.execute(&TracingReporter)?;
//!     Ok(())
//! }
//! ```

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cmd;
pub mod error;
pub mod htpasswd;
pub mod metadata;
pub mod nginx;
pub mod pipeline;
pub mod report;

pub use error::{LoginError, LoginResult};
pub use htpasswd::Htpasswd;
pub use metadata::{InstanceMetadata, MetadataClient};
pub use nginx::NginxRule;
pub use pipeline::{Cli, Outcome, Pipeline};
pub use report::{Report, Reporter, TracingReporter};
