//! Markdown report rendering.
//!
//! Empty sections are omitted; empty strings and zero scores never fail.

use chrono::{DateTime, Utc};

use crate::types::analysis::{AnalysisResult, Assessment, ImageAnalysis, Score, TextAnalysis};

/// Render a report stamped with the current time.
pub fn render_markdown(analysis: &AnalysisResult) -> String {
    render_markdown_at(analysis, Utc::now())
}

/// Render a report with an explicit timestamp.
pub fn render_markdown_at(analysis: &AnalysisResult, generated_at: DateTime<Utc>) -> String {
    let kind = match analysis {
        AnalysisResult::Text(_) => "Text",
        AnalysisResult::Image(_) => "Image",
    };

    let mut md = String::from("# Competitor Analysis Report\n\n");
    md.push_str(&format!(
        "**Date:** {}  \n**Analysis type:** {}\n\n---\n\n",
        generated_at.format("%d.%m.%Y %H:%M"),
        kind
    ));

    match analysis {
        AnalysisResult::Text(text) => text_sections(&mut md, text),
        AnalysisResult::Image(image) => image_sections(&mut md, image),
    }

    md.push_str("## Scores\n\n");
    md.push_str("| Metric | Score |\n|---|---|\n");
    if let AnalysisResult::Image(image) = analysis {
        score_row(&mut md, "Visual style", image.visual_style_score);
    }
    score_row(&mut md, "Design", analysis.design_score());
    score_row(&mut md, "Technology potential", analysis.technology_potential());
    md
}

fn text_sections(md: &mut String, text: &TextAnalysis) {
    paragraph(md, "Summary", &text.summary);
    list(md, "Strengths", &text.strengths);
    list(md, "Weaknesses", &text.weaknesses);
    list(md, "Unique offers", &text.unique_offers);
    list(md, "Recommendations", &text.recommendations);
}

fn image_sections(md: &mut String, image: &ImageAnalysis) {
    paragraph(md, "Description", &image.description);
    list(md, "Marketing insights", &image.marketing_insights);
    paragraph(md, "Visual style", &image.visual_style_analysis);
    list(md, "Recommendations", &image.recommendations);
}

fn paragraph(md: &mut String, heading: &str, body: &str) {
    let body = body.trim();
    if body.is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n\n{}\n\n---\n\n", heading, body));
}

fn list(md: &mut String, heading: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n\n", heading));
    for item in items {
        md.push_str(&format!("- {}\n", item));
    }
    md.push_str("\n---\n\n");
}

fn score_row(md: &mut String, metric: &str, score: Score) {
    md.push_str(&format!("| {} | {} |\n", metric, score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_text_report_sections() {
        let analysis: AnalysisResult = TextAnalysis::new("Cheap but slow.", 6, 4)
            .unwrap()
            .with_strengths(["Great prices"])
            .with_weaknesses(["Slow delivery", "No live chat support"])
            .into();
        let md = render_markdown_at(&analysis, fixed_time());

        assert!(md.contains("**Date:** 14.03.2026 09:30"));
        assert!(md.contains("**Analysis type:** Text"));
        assert!(md.contains("## Summary\n\nCheap but slow."));
        assert!(md.contains("- Slow delivery\n- No live chat support\n"));
        assert!(!md.contains("## Unique offers"));
        assert!(md.contains("| Design | 6/10 |"));
    }

    #[test]
    fn test_image_report_has_visual_score() {
        let analysis: AnalysisResult = ImageAnalysis::new("Red sale banner", 8, 7, 3)
            .unwrap()
            .with_marketing_insights(["Urgency messaging"])
            .into();
        let md = render_markdown_at(&analysis, fixed_time());

        assert!(md.contains("**Analysis type:** Image"));
        assert!(md.contains("## Description\n\nRed sale banner"));
        assert!(md.contains("| Visual style | 8/10 |"));
        assert!(md.contains("| Technology potential | 3/10 |"));
    }

    #[test]
    fn test_empty_analysis_still_renders() {
        let analysis: AnalysisResult = TextAnalysis::new("", 0, 0)
            .unwrap()
            .with_strengths(["  "])
            .into();
        let md = render_markdown(&analysis);

        assert!(md.starts_with("# Competitor Analysis Report"));
        assert!(!md.contains("## Summary"));
        assert!(!md.contains("## Strengths"));
        assert!(md.contains("| Design | 0/10 |"));
    }
}
