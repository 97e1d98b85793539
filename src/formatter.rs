//! Turns buffered log records into the flat JSON objects Loggly indexes.

use crate::config::{TargetSettings, TimestampZone};
use crate::domain::{LogRecord, TraceFrame, level_name};
use chrono::Local;
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Address reported when IP enrichment is on but the client is unknown.
pub const UNKNOWN_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Per-request enrichment input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub remote_addr: Option<IpAddr>,
}

impl RequestContext {
    pub fn new(remote_addr: IpAddr) -> Self {
        Self {
            remote_addr: Some(remote_addr),
        }
    }
}

/// One log entry as shipped. Optional keys are left out entirely when the
/// matching enrichment is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedEntry {
    pub timestamp: String,
    pub level: &'static str,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct MessageFormatter {
    enable_ip: bool,
    trail: Option<String>,
    enable_trace: bool,
    timestamp_zone: TimestampZone,
}

impl MessageFormatter {
    pub fn new(settings: &TargetSettings) -> Self {
        Self {
            enable_ip: settings.enable_ip,
            trail: settings.enable_trail.then(|| settings.trail.clone()),
            enable_trace: settings.enable_trace,
            timestamp_zone: settings.timestamp_zone,
        }
    }

    pub fn format_message(&self, record: &LogRecord, context: &RequestContext) -> FormattedEntry {
        FormattedEntry {
            timestamp: self.format_timestamp(record),
            level: level_name(record.level),
            category: record.category.clone(),
            message: record.message.clone(),
            ip: self
                .enable_ip
                .then(|| context.remote_addr.unwrap_or(UNKNOWN_IP).to_string()),
            trail: self.trail.clone(),
            trace: self.enable_trace.then(|| summarize_trace(&record.trace)),
        }
    }

    fn format_timestamp(&self, record: &LogRecord) -> String {
        match self.timestamp_zone {
            TimestampZone::Utc => record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            TimestampZone::Local => record
                .timestamp
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        }
    }
}

/// Flattens frames to `file(line)` strings; Loggly indexes nested objects
/// poorly. Frames without a file are dropped, order is kept.
pub fn summarize_trace(frames: &[TraceFrame]) -> Vec<String> {
    frames
        .iter()
        .filter_map(|frame| {
            let file = frame.file.as_deref().filter(|file| !file.is_empty())?;
            Some(match frame.line {
                Some(line) => format!("{file}({line})"),
                None => format!("{file}()"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use crate::domain::Level;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const TOKEN: &str = "123456789012345678901234567890123456";

    fn formatter(config: TargetConfig) -> MessageFormatter {
        MessageFormatter::new(&config.validate().unwrap())
    }

    fn base_config() -> TargetConfig {
        TargetConfig {
            base_url: "http://example.com/".to_string(),
            tags: vec!["one".into(), "two".into(), "three".into()],
            ..TargetConfig::with_token(TOKEN)
        }
    }

    fn record() -> LogRecord {
        LogRecord::new(
            "log message",
            Level::Trace,
            "test",
            Utc.with_ymd_and_hms(2014, 12, 2, 10, 1, 10).unwrap(),
        )
    }

    #[test]
    fn test_plain_entry_has_exactly_four_keys() {
        let entry = formatter(base_config()).format_message(&record(), &RequestContext::default());

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "timestamp": "2014/12/02 10:01:10",
                "level": "trace",
                "category": "test",
                "message": "log message",
            })
        );
    }

    #[test]
    fn test_ip_falls_back_to_unspecified_address() {
        let config = TargetConfig {
            enable_ip: true,
            ..base_config()
        };
        let entry = formatter(config).format_message(&record(), &RequestContext::default());

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "timestamp": "2014/12/02 10:01:10",
                "level": "trace",
                "category": "test",
                "message": "log message",
                "ip": "0.0.0.0",
            })
        );
    }

    #[test]
    fn test_ip_uses_remote_address() {
        let config = TargetConfig {
            enable_ip: true,
            ..base_config()
        };
        let context = RequestContext::new("203.0.113.7".parse().unwrap());
        let entry = formatter(config).format_message(&record(), &context);

        assert_eq!(entry.ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_remote_address_ignored_when_ip_disabled() {
        let context = RequestContext::new("203.0.113.7".parse().unwrap());
        let entry = formatter(base_config()).format_message(&record(), &context);

        assert_eq!(entry.ip, None);
    }

    #[test]
    fn test_trail_added_verbatim() {
        let config = TargetConfig {
            enable_ip: true,
            enable_trail: true,
            trail: Some("61b5e46fa4f60638ef7d785bbb67023a".to_string()),
            ..base_config()
        };
        let entry = formatter(config).format_message(&record(), &RequestContext::default());

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "timestamp": "2014/12/02 10:01:10",
                "level": "trace",
                "category": "test",
                "message": "log message",
                "ip": "0.0.0.0",
                "trail": "61b5e46fa4f60638ef7d785bbb67023a",
            })
        );
    }

    #[test]
    fn test_trace_skips_frames_without_file() {
        let config = TargetConfig {
            enable_trace: true,
            ..base_config()
        };
        let record = record().with_trace(vec![
            TraceFrame::new("/app/controllers/Site.php", 42),
            TraceFrame::internal(),
            TraceFrame {
                file: Some(String::new()),
                line: Some(1),
            },
            TraceFrame::new("/app/index.php", 7),
            TraceFrame {
                file: Some("/app/boot.php".to_string()),
                line: None,
            },
        ]);
        let entry = formatter(config).format_message(&record, &RequestContext::default());

        assert_eq!(
            entry.trace,
            Some(vec![
                "/app/controllers/Site.php(42)".to_string(),
                "/app/index.php(7)".to_string(),
                "/app/boot.php()".to_string(),
            ])
        );
    }

    #[test]
    fn test_trace_key_present_but_empty_without_frames() {
        let config = TargetConfig {
            enable_trace: true,
            ..base_config()
        };
        let entry = formatter(config).format_message(&record(), &RequestContext::default());
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["trace"], json!([]));
    }

    #[test]
    fn test_trace_key_absent_when_disabled() {
        let record = record().with_trace(vec![TraceFrame::new("a.php", 1)]);
        let entry = formatter(base_config()).format_message(&record, &RequestContext::default());
        let value = serde_json::to_value(&entry).unwrap();

        assert!(value.get("trace").is_none());
    }

    #[test]
    fn test_local_zone_renders_in_process_time() {
        let config = TargetConfig {
            timestamp_zone: TimestampZone::Local,
            ..base_config()
        };
        let record = record();
        let entry = formatter(config).format_message(&record, &RequestContext::default());

        let local = record.timestamp.with_timezone(&Local);
        assert_eq!(entry.timestamp, local.format(TIMESTAMP_FORMAT).to_string());

        // YYYY/MM/DD HH:MM:SS
        assert_eq!(entry.timestamp.len(), 19);
        let parsed =
            chrono::NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parsed, local.naive_local());
    }

    #[test]
    fn test_unknown_level_name() {
        let mut record = record();
        record.level = 0x1000;
        let entry = formatter(base_config()).format_message(&record, &RequestContext::default());

        assert_eq!(entry.level, "unknown");
    }

    #[test]
    fn test_format_message_is_deterministic() {
        let formatter = formatter(TargetConfig {
            enable_ip: true,
            enable_trail: true,
            enable_trace: true,
            ..base_config()
        });
        let first = formatter.format_message(&record(), &RequestContext::default());
        let second = formatter.format_message(&record(), &RequestContext::default());

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
