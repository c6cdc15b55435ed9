//! Normalization of the two report payload shapes.
//!
//! **Score shape** (EMDB model analysis): a JSON object whose values are
//! arrays of flat per-residue records keyed by author chain:
//!
//! ```json
//! { "emd-1234": [ { "type": "qscore", "chain": "A", "position": 12,
//!                   "residue": "LEU", "score": 0.71, "color": "#7ABABA" } ] }
//! ```
//!
//! **Issues shape** (residue-wise outlier summary): an object under the
//! lowercased entry id with a nested entity → chain → model → residue
//! structure carrying outlier tags:
//!
//! ```json
//! { "1cbs": { "molecules": [ { "entity_id": 1, "chains": [
//!     { "struct_asym_id": "A", "models": [ { "model_id": 1, "residues": [
//!         { "author_residue_number": 12, "author_insertion_code": "",
//!           "outlier_types": ["clashes"] } ] } ] } ] } ] } }
//! ```
//!
//! The shape is picked from the response itself.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::issues::IssueTier;
use super::store::{push_unique, ResidueRecord};
use super::{ParsedAs, ReportError};
use crate::util::rgb::Rgb;

/// Fallback residue color.
pub const NEUTRAL_GRAY: Rgb = Rgb::new(170, 170, 170);

/// One externally reported fact about a residue, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotationEntry {
    /// Entity id. When present, `chain_id` is the internal chain label;
    /// when absent, `chain_id` is the author chain label.
    pub entity_id: Option<String>,
    /// Chain label (see `entity_id`).
    pub chain_id: String,
    /// Author residue number, possibly fractional.
    pub author_seq_id: f64,
    /// Author insertion code.
    pub insertion_code: Option<String>,
    /// Issue tags in report order.
    pub issue_types: Vec<String>,
    /// Reported score, for score payloads.
    pub score: Option<f64>,
    /// Reported type, for score payloads.
    pub primary_type: Option<String>,
    /// Reported color, for score payloads.
    pub display_color: Option<Rgb>,
}

impl RawAnnotationEntry {
    /// Normalize into a [`ResidueRecord`].
    ///
    /// Entries without a score are classified by [`IssueTier`]; scored
    /// entries keep their own score, type and color (neutral gray when the
    /// color is missing or unparseable).
    #[must_use]
    pub fn to_record(&self) -> ResidueRecord {
        let mut issue_types = Vec::new();
        for tag in &self.issue_types {
            push_unique(&mut issue_types, tag);
        }

        match self.score {
            Some(score) => ResidueRecord {
                score,
                issue_types,
                primary_type: self.primary_type.clone().unwrap_or_default(),
                display_color: self.display_color.unwrap_or(NEUTRAL_GRAY),
            },
            None => {
                let tier = IssueTier::classify(&self.issue_types);
                ResidueRecord {
                    score: tier.score(),
                    issue_types,
                    primary_type: tier.label().to_owned(),
                    display_color: tier.color(),
                }
            }
        }
    }
}

/// Entries of one payload in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    /// Which shape was recognized.
    pub parsed_as: ParsedAs,
    /// Entries in report order.
    pub entries: Vec<RawAnnotationEntry>,
    /// Every tag seen, de-duplicated in first-seen order.
    pub issue_types: Vec<String>,
}

#[derive(Deserialize)]
struct ScoreRecord {
    #[serde(rename = "type", default)]
    kind: String,
    chain: String,
    position: f64,
    score: f64,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize)]
struct OutlierSummary {
    molecules: Vec<Molecule>,
}

#[derive(Deserialize)]
struct Molecule {
    entity_id: Scalar,
    chains: Vec<MoleculeChain>,
}

#[derive(Deserialize)]
struct MoleculeChain {
    struct_asym_id: Scalar,
    models: Vec<ModelOutliers>,
}

#[derive(Deserialize)]
struct ModelOutliers {
    model_id: Scalar,
    residues: Vec<ResidueOutliers>,
}

#[derive(Deserialize)]
struct ResidueOutliers {
    author_residue_number: f64,
    #[serde(default)]
    author_insertion_code: Option<String>,
    #[serde(default)]
    outlier_types: Vec<String>,
}

/// Ids the services emit either as numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Str(s) => s,
        }
    }

    fn as_model_num(&self) -> Option<i32> {
        match self {
            Self::Int(i) => i32::try_from(*i).ok(),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }
}

/// Parse a response body for `entry_id`, keeping only records of model
/// `model_num` from issue payloads.
///
/// # Errors
///
/// - [`ReportError::Json`] when the body is not JSON.
/// - [`ReportError::MissingData`] when the body is empty, the entry is
///   absent, or no annotation entries remain.
/// - [`ReportError::Schema`] when the JSON matches neither shape.
pub fn parse_payload(
    body: &str,
    entry_id: &str,
    model_num: i32,
) -> Result<ParsedPayload, ReportError> {
    let key = entry_id.to_lowercase();
    if body.trim().is_empty() {
        return Err(ReportError::MissingData(key));
    }
    let value: Value =
        serde_json::from_str(body).map_err(|e| ReportError::Json(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ReportError::Schema("expected a JSON object".into()));
    };
    if map.is_empty() {
        return Err(ReportError::MissingData(key));
    }

    let payload = if let Some(entry @ Value::Object(_)) = map.get(&key) {
        parse_issues(entry.clone(), model_num)?
    } else if map.values().all(Value::is_array) {
        parse_scores(map)?
    } else if map.values().all(Value::is_object) {
        // issue payload for some other entry
        return Err(ReportError::MissingData(key));
    } else {
        return Err(ReportError::Schema(
            "expected score arrays or an outlier summary".into(),
        ));
    };

    if payload.entries.is_empty() {
        return Err(ReportError::MissingData(key));
    }
    Ok(payload)
}

fn parse_scores(map: Map<String, Value>) -> Result<ParsedPayload, ReportError> {
    let mut entries = Vec::new();
    let mut issue_types = Vec::new();

    for (source, records) in map {
        let records: Vec<ScoreRecord> = serde_json::from_value(records)
            .map_err(|e| ReportError::Schema(format!("{source}: {e}")))?;
        for record in records {
            let tags = if record.kind.is_empty() {
                Vec::new()
            } else {
                push_unique(&mut issue_types, &record.kind);
                vec![record.kind.clone()]
            };
            entries.push(RawAnnotationEntry {
                entity_id: None,
                chain_id: record.chain,
                author_seq_id: record.position,
                insertion_code: None,
                issue_types: tags,
                score: Some(record.score),
                primary_type: Some(record.kind),
                display_color: record.color.as_deref().and_then(Rgb::parse_hex),
            });
        }
    }

    Ok(ParsedPayload {
        parsed_as: ParsedAs::Score,
        entries,
        issue_types,
    })
}

fn parse_issues(
    entry: Value,
    model_num: i32,
) -> Result<ParsedPayload, ReportError> {
    let summary: OutlierSummary = serde_json::from_value(entry)
        .map_err(|e| ReportError::Schema(e.to_string()))?;
    let mut entries = Vec::new();
    let mut issue_types = Vec::new();

    for molecule in summary.molecules {
        let entity_id = molecule.entity_id.into_string();
        for chain in molecule.chains {
            let asym_id = chain.struct_asym_id.into_string();
            let models = chain
                .models
                .into_iter()
                .filter(|m| m.model_id.as_model_num() == Some(model_num));
            for model in models {
                for residue in model.residues {
                    for tag in &residue.outlier_types {
                        push_unique(&mut issue_types, tag);
                    }
                    entries.push(RawAnnotationEntry {
                        entity_id: Some(entity_id.clone()),
                        chain_id: asym_id.clone(),
                        author_seq_id: residue.author_residue_number,
                        insertion_code: residue.author_insertion_code,
                        issue_types: residue.outlier_types,
                        score: None,
                        primary_type: None,
                        display_color: None,
                    });
                }
            }
        }
    }

    Ok(ParsedPayload {
        parsed_as: ParsedAs::Issues,
        entries,
        issue_types,
    })
}
