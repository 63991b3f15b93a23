use std::env;
use std::io::Write;

use tmplctl_controller::config::loader::load_config;

#[test]
fn loads_file_and_env_overrides() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
base_url = "https://api.example.test"
service_id = "svc-file"
service_secret_key = "secret-file"

[logging]
level = "debug"

[http]
timeout_ms = 5000
"#
    )
    .unwrap();

    unsafe {
        env::set_var("TMPLCTL__SERVICE_ID", "svc-env");
    }
    let cfg = load_config(file.path().to_str());
    unsafe {
        env::remove_var("TMPLCTL__SERVICE_ID");
    }

    let cfg = cfg.expect("config loads");
    assert_eq!(cfg.base_url, "https://api.example.test");
    assert_eq!(cfg.service_id, "svc-env");
    assert_eq!(cfg.service_secret_key, "secret-file");
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.http.timeout_ms, 5000);
}

#[test]
fn missing_required_values_fail_validation() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
base_url = ""
service_id = "svc"
service_secret_key = "secret"
"#
    )
    .unwrap();

    let err = load_config(file.path().to_str()).unwrap_err();
    assert_eq!(err, "base_url must not be empty");
}
