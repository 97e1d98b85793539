use clap::Parser;
use loggly_target::app::{Cli, LogLevel, read_records};
use loggly_target::{Level, TargetConfig};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const TOKEN: &str = "123456789012345678901234567890123456";

fn clean_env() {
    unsafe {
        for var in [
            "LOGGLY_CONFIG_FILE",
            "LOGGLY_CUSTOMER_TOKEN",
            "LOGGLY_TAGS",
            "LOGGLY_BULK",
            "LOG_LEVEL",
        ] {
            std::env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn test_flags_build_target_config() {
    clean_env();

    let cli = Cli::try_parse_from([
        "loggly-ship",
        "--customer-token",
        TOKEN,
        "--base-url",
        "http://example.com",
        "--tag",
        "one",
        "--tag",
        "two",
        "--bulk",
        "--enable-ip",
        "--remote-addr",
        "10.0.0.1",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(cli.log_level, LogLevel::Debug);
    assert_eq!(cli.remote_addr, Some("10.0.0.1".parse().unwrap()));

    let config = cli.target_config().unwrap();
    assert_eq!(config.customer_token.as_deref(), Some(TOKEN));
    assert_eq!(config.tags, vec!["one", "two"]);
    assert!(config.bulk);
    assert!(config.enable_ip);
    assert!(!config.finish_request);

    let settings = config.validate().unwrap();
    assert_eq!(
        settings.url(),
        format!("http://example.com/bulk/{TOKEN}/tag/one,two/")
    );
}

#[test]
#[serial]
fn test_flags_override_config_file() {
    clean_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customer_token = \"{TOKEN}\"").unwrap();
    writeln!(file, "tags = [\"file\"]").unwrap();
    writeln!(file, "enable_trail = true").unwrap();

    let cli = Cli::try_parse_from([
        "loggly-ship",
        "--config-file",
        file.path().to_str().unwrap(),
        "--tag",
        "flag",
    ])
    .unwrap();

    let config = cli.target_config().unwrap();
    assert_eq!(config.tags, vec!["flag"]);
    assert!(config.enable_trail);
    assert_eq!(config.base_url, TargetConfig::default().base_url);
}

#[test]
fn test_read_records_from_ndjson() {
    let input = concat!(
        r#"{"message":"first","level":8,"category":"app","timestamp":"2014-12-02T10:01:10Z"}"#,
        "\n",
        r#"{"message":"second","level":1,"category":"db","timestamp":"2014-12-02T10:01:11Z","trace":[{"file":"a.php","line":3}]}"#,
        "\n"
    );

    let records = read_records(input.as_bytes()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].level, Level::Trace.severity());
    assert_eq!(records[1].category, "db");
    assert_eq!(records[1].trace.len(), 1);
}

#[test]
fn test_read_records_rejects_garbage() {
    assert!(read_records("{not json".as_bytes()).is_err());
}

#[test]
fn test_read_records_empty_input() {
    assert!(read_records("".as_bytes()).unwrap().is_empty());
}
