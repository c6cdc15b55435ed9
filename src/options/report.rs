use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default EMDB model-analysis endpoint.
pub const DEFAULT_SERVER_URL: &str =
    "https://www.ebi.ac.uk/emdb/api/analysis/model/scores";

/// Which derived per-residue metric the service should report.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Q-score map-model fit.
    #[default]
    Qscore,
    /// Atom inclusion.
    Ai,
}

impl Metric {
    /// Query-string value sent to the service.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qscore => "qscore",
            Self::Ai => "ai",
        }
    }
}

/// Where and what to request. Also the parameter set a cached report was
/// built with: attaching with different options re-fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Quality Report", inline)]
#[serde(default)]
pub struct ReportOptions {
    /// JSON API server URL. The lowercased entry id is appended as a path
    /// segment.
    #[schemars(title = "Server URL")]
    pub server_url: String,
    /// Metric to request. `None` (written `"none"`) omits the `metric`
    /// query parameter.
    #[schemars(title = "Metric", with = "Option<Metric>")]
    #[serde(with = "metric_field")]
    pub metric: Option<Metric>,
    /// Global request timeout in seconds.
    #[schemars(skip)]
    pub timeout_secs: u64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            metric: Some(Metric::Qscore),
            timeout_secs: 30,
        }
    }
}

/// `Option<Metric>` as a plain string, with `"none"` standing in for
/// `None` since TOML has no null.
mod metric_field {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Metric;

    const NONE: &str = "none";

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S: Serializer>(
        metric: &Option<Metric>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(metric.map_or(NONE, Metric::as_str))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Metric>, D::Error> {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            NONE => Ok(None),
            "qscore" => Ok(Some(Metric::Qscore)),
            "ai" => Ok(Some(Metric::Ai)),
            other => Err(D::Error::unknown_variant(
                other,
                &["qscore", "ai", NONE],
            )),
        }
    }
}

impl ReportOptions {
    /// Copy of these options requesting `metric`.
    #[must_use]
    pub fn with_metric(&self, metric: Metric) -> Self {
        Self {
            metric: Some(metric),
            ..self.clone()
        }
    }

    /// Request URL for `entry_id`:
    /// `{server_url}/{entry_id lowercased}[?metric={metric}]`.
    #[must_use]
    pub fn entry_url(&self, entry_id: &str) -> String {
        let base = self.server_url.trim_end_matches('/');
        let id = entry_id.to_lowercase();
        match self.metric {
            Some(metric) => format!("{base}/{id}?metric={}", metric.as_str()),
            None => format!("{base}/{id}"),
        }
    }
}
