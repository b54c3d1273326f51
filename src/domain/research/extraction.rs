//! Extraction, refinement and acceptance types

use serde::{Deserialize, Serialize};

use super::language_model::StructuredOutput;
use super::passage::Passage;

/// One extracted, scored fact derived from a single passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationStrip {
    pub content: String,
    pub source: String,
    pub relevance_score: f32,
    pub faithfulness_score: f32,
}

impl InformationStrip {
    pub fn new(
        content: impl Into<String>,
        source: impl Into<String>,
        relevance_score: f32,
        faithfulness_score: f32,
    ) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            relevance_score,
            faithfulness_score,
        }
    }
}

/// Extractor output for one passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub strips: Vec<InformationStrip>,
    pub query_relevance: f32,
}

impl StructuredOutput for ExtractionResult {
    const SCHEMA_NAME: &'static str = "extraction_result";

    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "strips": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "content": { "type": "string", "description": "추출된 정보 내용" },
                            "source": { "type": "string", "description": "정보의 출처(법률 조항/URL 등)" },
                            "relevance_score": { "type": "number", "minimum": 0, "maximum": 1 },
                            "faithfulness_score": { "type": "number", "minimum": 0, "maximum": 1 }
                        },
                        "required": ["content", "source", "relevance_score", "faithfulness_score"],
                        "additionalProperties": false
                    }
                },
                "query_relevance": { "type": "number", "minimum": 0, "maximum": 1 }
            },
            "required": ["strips", "query_relevance"],
            "additionalProperties": false
        })
    }

    fn validate(&self) -> Result<(), String> {
        check_unit_range("query_relevance", self.query_relevance)?;

        for (i, strip) in self.strips.iter().enumerate() {
            check_unit_range(&format!("strips[{}].relevance_score", i), strip.relevance_score)?;
            check_unit_range(
                &format!("strips[{}].faithfulness_score", i),
                strip.faithfulness_score,
            )?;
        }

        Ok(())
    }
}

/// Refiner output; consumed immediately to update the rewritten query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedQuery {
    pub question_refined: String,
    pub reason: String,
}

impl StructuredOutput for RefinedQuery {
    const SCHEMA_NAME: &'static str = "refined_query";

    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question_refined": { "type": "string", "description": "개선된 질문" },
                "reason": { "type": "string", "description": "이유" }
            },
            "required": ["question_refined", "reason"],
            "additionalProperties": false
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.question_refined.trim().is_empty() {
            return Err("question_refined must not be empty".to_string());
        }
        Ok(())
    }
}

fn check_unit_range(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be within [0, 1], got {}", field, value))
    }
}

/// Thresholds deciding which extracted strips are kept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    /// Strips need relevance and faithfulness strictly above this
    #[serde(default = "default_strip_threshold")]
    pub strip_threshold: f32,
    /// Results below this query relevance are discarded wholesale
    #[serde(default = "default_query_relevance_threshold")]
    pub query_relevance_threshold: f32,
}

fn default_strip_threshold() -> f32 {
    0.7
}

fn default_query_relevance_threshold() -> f32 {
    0.8
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            strip_threshold: default_strip_threshold(),
            query_relevance_threshold: default_query_relevance_threshold(),
        }
    }
}

impl AcceptancePolicy {
    pub fn accepts_result(&self, result: &ExtractionResult) -> bool {
        result.query_relevance >= self.query_relevance_threshold
    }

    pub fn accepts_strip(&self, strip: &InformationStrip) -> bool {
        strip.relevance_score > self.strip_threshold
            && strip.faithfulness_score > self.strip_threshold
    }

    /// Strips retained from `result`, re-sourced to the originating passage
    pub fn accept(&self, result: ExtractionResult, passage: &Passage) -> Vec<InformationStrip> {
        if !self.accepts_result(&result) {
            return Vec::new();
        }

        result
            .strips
            .into_iter()
            .filter(|strip| self.accepts_strip(strip))
            .map(|mut strip| {
                strip.source = passage.source_id.clone();
                strip
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::research::language_model::parse_structured;

    fn passage() -> Passage {
        Passage::new("제34조(개인정보 유출 등의 통지·신고)", "개인정보 보호법 제34조")
    }

    fn strip(relevance: f32, faithfulness: f32) -> InformationStrip {
        InformationStrip::new("유출 시 정보주체에게 통지", "model-guess", relevance, faithfulness)
    }

    #[test]
    fn test_low_query_relevance_discards_every_strip() {
        let policy = AcceptancePolicy::default();
        let result = ExtractionResult {
            strips: vec![strip(1.0, 1.0), strip(0.99, 0.95)],
            query_relevance: 0.79,
        };

        assert!(policy.accept(result, &passage()).is_empty());
    }

    #[test]
    fn test_query_relevance_threshold_is_inclusive() {
        let policy = AcceptancePolicy::default();
        let result = ExtractionResult {
            strips: vec![strip(0.9, 0.9)],
            query_relevance: 0.8,
        };

        assert_eq!(policy.accept(result, &passage()).len(), 1);
    }

    #[test]
    fn test_strip_thresholds_are_exclusive() {
        let policy = AcceptancePolicy::default();

        assert!(!policy.accepts_strip(&strip(0.7, 0.9)));
        assert!(!policy.accepts_strip(&strip(0.9, 0.7)));
        assert!(policy.accepts_strip(&strip(0.71, 0.71)));
    }

    #[test]
    fn test_retention_requires_all_three_conditions() {
        let policy = AcceptancePolicy::default();
        let grid = [0.0_f32, 0.5, 0.7, 0.75, 0.8, 1.0];

        for &query_relevance in &grid {
            for &relevance in &grid {
                for &faithfulness in &grid {
                    let result = ExtractionResult {
                        strips: vec![strip(relevance, faithfulness)],
                        query_relevance,
                    };
                    let kept = policy.accept(result, &passage()).len() == 1;
                    let expected =
                        relevance > 0.7 && faithfulness > 0.7 && query_relevance >= 0.8;

                    assert_eq!(
                        kept, expected,
                        "qr={} rel={} faith={}",
                        query_relevance, relevance, faithfulness
                    );
                }
            }
        }
    }

    #[test]
    fn test_accepted_strip_takes_passage_source() {
        let policy = AcceptancePolicy::default();
        let result = ExtractionResult {
            strips: vec![strip(0.9, 0.9)],
            query_relevance: 0.9,
        };

        let accepted = policy.accept(result, &passage());
        assert_eq!(accepted[0].source, "개인정보 보호법 제34조");
    }

    #[test]
    fn test_out_of_range_score_is_schema_violation() {
        let raw = r#"{"strips":[{"content":"c","source":"s","relevance_score":1.4,"faithfulness_score":0.9}],"query_relevance":0.9}"#;
        let err = parse_structured::<ExtractionResult>(raw).unwrap_err();

        assert!(err.to_string().contains("strips[0].relevance_score"));
    }

    #[test]
    fn test_empty_refined_query_is_schema_violation() {
        let raw = r#"{"question_refined":"  ","reason":"none"}"#;
        assert!(parse_structured::<RefinedQuery>(raw).is_err());
    }
}
