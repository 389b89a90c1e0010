use std::cell::RefCell;
use std::path::{Path, PathBuf};

use horizon_login::error::LoginError;
use horizon_login::nginx::{self, RuleFields};
use horizon_login::{InstanceMetadata, NginxRule, Report, Reporter};

#[derive(Default)]
struct Recorder(RefCell<Vec<String>>);

impl Reporter for Recorder {
    fn report(&self, event: &Report<'_>) {
        self.0.borrow_mut().push(format!("{event:?}"));
    }
}

fn metadata() -> InstanceMetadata {
    InstanceMetadata::new("abc123", "blue-horizon-vm", "203.0.113.5")
}

#[test]
fn roundtrip_recovers_substitutions() {
    let fields = RuleFields {
        root: "/home/alice/www".into(),
        allowed_ip: "203.0.113.5".into(),
        user_file: "/etc/nginx/.htpasswd".into(),
    };

    let rendered = nginx::render(&fields, "test.com www.test.com");

    assert_eq!(nginx::parse(&rendered), Some(fields));
}

#[test]
fn discovers_first_entry_in_order() {
    let home = tempfile::tempdir().expect("temp dir");
    for user in ["carol", "alice", "bob", ".cache"] {
        std::fs::create_dir(home.path().join(user)).expect("mkdir");
    }

    let root = nginx::discover_web_root(home.path(), "www").expect("discover failed");

    assert_eq!(root, home.path().join("alice").join("www"));
}

#[test]
fn empty_parent_is_lookup_error() {
    let home = tempfile::tempdir().expect("temp dir");

    let err = nginx::discover_web_root(home.path(), "www").unwrap_err();

    assert!(matches!(err, LoginError::WebRootNotFound(ref p) if p == home.path()));
}

#[test]
fn missing_parent_is_lookup_error() {
    let home = tempfile::tempdir().expect("temp dir");
    let parent = home.path().join("no-home");

    let err = nginx::discover_web_root(&parent, "www").unwrap_err();

    assert!(matches!(err, LoginError::WebRootNotFound(ref p) if *p == parent));
}

#[test]
fn write_renders_rule() {
    let home = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir(home.path().join("alice")).expect("mkdir");
    let out = tempfile::tempdir().expect("temp dir");
    let path = out.path().join("blue_horizon_login.conf");
    let rule = NginxRule::new().home_dir(home.path()).path(&path);
    let recorder = Recorder::default();

    let written = rule
        .write(&metadata(), Path::new("/etc/nginx/.htpasswd"), &recorder)
        .expect("write failed");

    assert_eq!(written, path);
    let content = std::fs::read_to_string(&path).expect("read back");
    let fields = nginx::parse(&content).expect("rule should parse");
    assert_eq!(fields.root, home.path().join("alice/www").display().to_string());
    assert_eq!(fields.allowed_ip, "203.0.113.5");
    assert_eq!(fields.user_file, "/etc/nginx/.htpasswd");
    assert!(content.contains("server_name test.com www.test.com;"));
    assert!(content.contains("allow 127.0.0.1;"));
    assert!(recorder.0.borrow()[0].starts_with("RuleWritten"));
}

#[test]
fn empty_home_writes_nothing() {
    let home = tempfile::tempdir().expect("temp dir");
    let out = tempfile::tempdir().expect("temp dir");
    let path = out.path().join("blue_horizon_login.conf");
    let rule = NginxRule::new().home_dir(home.path()).path(&path);
    let recorder = Recorder::default();

    let err = rule
        .write(&metadata(), Path::new("/etc/nginx/.htpasswd"), &recorder)
        .unwrap_err();

    assert!(matches!(err, LoginError::WebRootNotFound(_)));
    assert!(!path.exists());
    assert!(recorder.0.borrow().is_empty());
}

#[test]
fn overwrites_existing_rule() {
    let out = tempfile::tempdir().expect("temp dir");
    let path = out.path().join("blue_horizon_login.conf");
    std::fs::write(&path, "server { listen 8080; }\n").expect("seed");
    let rule = NginxRule::new().web_root("/srv/site").path(&path);

    rule.write(&metadata(), Path::new("/tmp/.htpasswd"), &Recorder::default())
        .expect("write failed");

    let content = std::fs::read_to_string(&path).expect("read back");
    assert!(!content.contains("8080"));
    assert_eq!(
        nginx::parse(&content).map(|f| PathBuf::from(f.root)),
        Some(PathBuf::from("/srv/site"))
    );
}

#[test]
fn custom_server_name() {
    let rule = NginxRule::new()
        .web_root("/srv/site")
        .server_name("login.example.com");

    let content = rule
        .render(&metadata(), Path::new("/etc/nginx/.htpasswd"))
        .expect("render failed");

    assert!(content.contains("server_name login.example.com;"));
}

#[test]
fn custom_subdir() {
    let home = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir(home.path().join("dave")).expect("mkdir");
    let rule = NginxRule::new().home_dir(home.path()).subdir("public");

    let root = rule.resolve_web_root().expect("resolve failed");

    assert_eq!(root, home.path().join("dave").join("public"));
}
