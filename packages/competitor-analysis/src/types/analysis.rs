//! Typed analysis results and their validating decode step.
//!
//! Replies from the reasoning service are first read into the `*Reply` wire
//! structs (plain integers, no invariants), then converted with `TryFrom`,
//! which rejects out-of-range scores instead of clamping them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest allowed score.
pub const MAX_SCORE: u8 = 10;

/// An integer score in the inclusive range 0..=10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Validate `value` for the named field.
    pub fn new(field: &'static str, value: i64) -> Result<Self, ValidationError> {
        if (0..=i64::from(MAX_SCORE)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::ScoreOutOfRange { field, value })
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, MAX_SCORE)
    }
}

/// Capabilities shared by both result variants.
pub trait Assessment {
    /// One-paragraph takeaway.
    fn summary(&self) -> &str;
    fn recommendations(&self) -> &[String];
    fn design_score(&self) -> Score;
    fn technology_potential(&self) -> Score;
}

/// Competitive analysis of textual material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub unique_offers: Vec<String>,
    pub recommendations: Vec<String>,
    pub summary: String,
    pub design_score: Score,
    pub technology_potential: Score,
}

impl TextAnalysis {
    /// Build a result with empty lists, validating both scores.
    pub fn new(
        summary: impl Into<String>,
        design_score: i64,
        technology_potential: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            unique_offers: Vec::new(),
            recommendations: Vec::new(),
            summary: summary.into(),
            design_score: Score::new("design_score", design_score)?,
            technology_potential: Score::new("technology_potential", technology_potential)?,
        })
    }

    pub fn with_strengths(mut self, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.strengths = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weaknesses(mut self, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.weaknesses = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unique_offers(
        mut self,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.unique_offers = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recommendations(
        mut self,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.recommendations = items.into_iter().map(Into::into).collect();
        self
    }
}

impl Assessment for TextAnalysis {
    fn summary(&self) -> &str {
        &self.summary
    }

    fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    fn design_score(&self) -> Score {
        self.design_score
    }

    fn technology_potential(&self) -> Score {
        self.technology_potential
    }
}

/// Visual-marketing analysis of an image or page screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAnalysis {
    pub description: String,
    pub marketing_insights: Vec<String>,
    pub visual_style_score: Score,
    pub visual_style_analysis: String,
    pub recommendations: Vec<String>,
    pub design_score: Score,
    pub technology_potential: Score,
}

impl ImageAnalysis {
    /// Build a result with empty lists, validating all three scores.
    pub fn new(
        description: impl Into<String>,
        visual_style_score: i64,
        design_score: i64,
        technology_potential: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            description: description.into(),
            marketing_insights: Vec::new(),
            visual_style_score: Score::new("visual_style_score", visual_style_score)?,
            visual_style_analysis: String::new(),
            recommendations: Vec::new(),
            design_score: Score::new("design_score", design_score)?,
            technology_potential: Score::new("technology_potential", technology_potential)?,
        })
    }

    pub fn with_marketing_insights(
        mut self,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.marketing_insights = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_visual_style_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.visual_style_analysis = analysis.into();
        self
    }

    pub fn with_recommendations(
        mut self,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.recommendations = items.into_iter().map(Into::into).collect();
        self
    }
}

impl Assessment for ImageAnalysis {
    /// The description doubles as the summary.
    fn summary(&self) -> &str {
        &self.description
    }

    fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    fn design_score(&self) -> Score {
        self.design_score
    }

    fn technology_potential(&self) -> Score {
        self.technology_potential
    }
}

/// Either analysis variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum AnalysisResult {
    Text(TextAnalysis),
    Image(ImageAnalysis),
}

impl AnalysisResult {
    pub fn as_text(&self) -> Option<&TextAnalysis> {
        match self {
            AnalysisResult::Text(a) => Some(a),
            AnalysisResult::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageAnalysis> {
        match self {
            AnalysisResult::Image(a) => Some(a),
            AnalysisResult::Text(_) => None,
        }
    }

    fn inner(&self) -> &dyn Assessment {
        match self {
            AnalysisResult::Text(a) => a,
            AnalysisResult::Image(a) => a,
        }
    }
}

impl Assessment for AnalysisResult {
    fn summary(&self) -> &str {
        self.inner().summary()
    }

    fn recommendations(&self) -> &[String] {
        self.inner().recommendations()
    }

    fn design_score(&self) -> Score {
        self.inner().design_score()
    }

    fn technology_potential(&self) -> Score {
        self.inner().technology_potential()
    }
}

impl From<TextAnalysis> for AnalysisResult {
    fn from(a: TextAnalysis) -> Self {
        AnalysisResult::Text(a)
    }
}

impl From<ImageAnalysis> for AnalysisResult {
    fn from(a: ImageAnalysis) -> Self {
        AnalysisResult::Image(a)
    }
}

// =============================================================================
// Wire replies
// =============================================================================

/// Reply schema for text analysis requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TextAnalysisReply {
    /// Competitor strengths, short phrases
    pub strengths: Vec<String>,
    /// Competitor weaknesses, short phrases
    pub weaknesses: Vec<String>,
    /// Distinctive offers or features
    pub unique_offers: Vec<String>,
    /// Actionable recommendations for our business
    pub recommendations: Vec<String>,
    /// Two or three sentence overall summary
    pub summary: String,
    /// Design quality, integer 0-10
    pub design_score: i64,
    /// Technology potential, integer 0-10
    pub technology_potential: i64,
}

impl TryFrom<TextAnalysisReply> for TextAnalysis {
    type Error = ValidationError;

    fn try_from(reply: TextAnalysisReply) -> Result<Self, Self::Error> {
        Ok(TextAnalysis::new(
            reply.summary,
            reply.design_score,
            reply.technology_potential,
        )?
        .with_strengths(reply.strengths)
        .with_weaknesses(reply.weaknesses)
        .with_unique_offers(reply.unique_offers)
        .with_recommendations(reply.recommendations))
    }
}

/// Reply schema for image (vision) analysis requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ImageAnalysisReply {
    /// What the image shows
    pub description: String,
    /// Marketing observations, short phrases
    pub marketing_insights: Vec<String>,
    /// Visual style quality, integer 0-10
    pub visual_style_score: i64,
    /// Narrative assessment of the visual style
    pub visual_style_analysis: String,
    /// Actionable recommendations for our business
    pub recommendations: Vec<String>,
    /// Design quality, integer 0-10
    pub design_score: i64,
    /// Technology potential, integer 0-10
    pub technology_potential: i64,
}

impl TryFrom<ImageAnalysisReply> for ImageAnalysis {
    type Error = ValidationError;

    fn try_from(reply: ImageAnalysisReply) -> Result<Self, Self::Error> {
        Ok(ImageAnalysis::new(
            reply.description,
            reply.visual_style_score,
            reply.design_score,
            reply.technology_potential,
        )?
        .with_marketing_insights(reply.marketing_insights)
        .with_visual_style_analysis(reply.visual_style_analysis)
        .with_recommendations(reply.recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds_inclusive() {
        assert_eq!(Score::new("s", 0).unwrap().value(), 0);
        assert_eq!(Score::new("s", 10).unwrap().value(), 10);
        assert_eq!(
            Score::new("s", 11),
            Err(ValidationError::ScoreOutOfRange { field: "s", value: 11 })
        );
        assert!(Score::new("s", -1).is_err());
    }

    #[test]
    fn test_text_analysis_rejects_out_of_range() {
        let err = TextAnalysis::new("ok", 5, 42).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ScoreOutOfRange {
                field: "technology_potential",
                value: 42
            }
        );
    }

    #[test]
    fn test_image_reply_with_bad_visual_score_is_rejected() {
        let reply = ImageAnalysisReply {
            visual_style_score: -3,
            design_score: 5,
            technology_potential: 5,
            ..Default::default()
        };
        let err = ImageAnalysis::try_from(reply).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ScoreOutOfRange { field: "visual_style_score", value: -3 }
        ));
    }

    #[test]
    fn test_text_reply_converts_all_fields() {
        let reply = TextAnalysisReply {
            strengths: vec!["Great prices".into()],
            weaknesses: vec!["Slow delivery".into(), "No live chat support".into()],
            unique_offers: vec![],
            recommendations: vec!["Promote fast shipping".into()],
            summary: "Cheap but slow.".into(),
            design_score: 6,
            technology_potential: 4,
        };
        let analysis = TextAnalysis::try_from(reply).unwrap();
        assert_eq!(analysis.weaknesses.len(), 2);
        assert_eq!(analysis.design_score.value(), 6);
        assert_eq!(analysis.summary(), "Cheap but slow.");
    }

    #[test]
    fn test_assessment_dispatch_over_variants() {
        let image: AnalysisResult = ImageAnalysis::new("Bold red banner", 8, 7, 3)
            .unwrap()
            .with_recommendations(["Use calmer palette"])
            .into();
        assert_eq!(image.summary(), "Bold red banner");
        assert_eq!(image.recommendations(), ["Use calmer palette".to_string()]);
        assert_eq!(image.design_score().value(), 7);
        assert!(image.as_text().is_none());
    }

    #[test]
    fn test_result_serializes_with_variant_tag() {
        let result: AnalysisResult = TextAnalysis::new("s", 1, 2).unwrap().into();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["variant"], "text");
        assert_eq!(json["design_score"], 1);
    }
}
