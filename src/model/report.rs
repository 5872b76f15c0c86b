use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Results of one page scan: the parameters discovered and, when a
/// reflection check ran, the subset whose markers were echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub hostname: String,
    pub url: String,
    pub scanned_at: DateTime<Utc>,
    pub parameters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflections: Option<Vec<String>>,
}

impl ScanReport {
    pub fn new(hostname: impl Into<String>, url: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            hostname: hostname.into(),
            url: url.into(),
            scanned_at: Utc::now(),
            parameters,
            reflections: None,
        }
    }

    pub fn with_reflections(mut self, reflections: Vec<String>) -> Self {
        self.reflections = Some(reflections);
        self
    }
}

/// Payload carried on the probe-completion channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum ProbeState {
    Checked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_state_payload_shape() {
        let json = serde_json::to_string(&ProbeState::Checked).unwrap();
        assert_eq!(json, r#"{"state":"checked"}"#);
    }

    #[test]
    fn test_report_skips_missing_reflections() {
        let report = ScanReport::new("x.test", "https://x.test/", vec!["q".to_string()]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("reflections"));

        let report = report.with_reflections(vec!["q".to_string()]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("reflections"));
    }
}
