//! Prompt templates for the reasoning service.

use crate::types::content::{ExtractedContent, SourceKind};

/// Marker used in place of a page field that was not recovered.
pub const NOT_FOUND: &str = "not found";

pub const TEXT_SYSTEM_PROMPT: &str = "You are an experienced competitive-intelligence analyst. \
You study material about a competitor of our business and produce a structured assessment: \
its strengths, its weaknesses, the offers that set it apart, and concrete recommendations \
for how our business should respond. Keep list items short. Scores are integers from 0 to 10, \
where 0 is absent and 10 is best in class. Reply with JSON matching the provided schema only.";

pub const VISION_SYSTEM_PROMPT: &str = "You are a visual-marketing analyst. \
You study an image published by a competitor (a banner, product photo, landing page screenshot) \
and assess its design, its visual style and the marketing message it carries, then give \
concrete recommendations for our business. Scores are integers from 0 to 10, \
where 0 is absent and 10 is best in class. Reply with JSON matching the provided schema only.";

/// User prompt for a text-only request.
pub fn text_prompt(content: &ExtractedContent) -> String {
    match content.source_kind() {
        SourceKind::Webpage => webpage_text_prompt(content),
        SourceKind::Pdf => format!(
            "Analyse this text extracted from a competitor's PDF document:\n\n{}",
            content.raw_text().unwrap_or_default()
        ),
        SourceKind::Text | SourceKind::Image => format!(
            "Analyse this information about a competitor:\n\n{}",
            content.raw_text().unwrap_or_default()
        ),
    }
}

/// User prompt for a request carrying an image.
///
/// Webpage screenshots get the page's URL and outline as context hints.
pub fn vision_prompt(content: &ExtractedContent) -> String {
    if content.source_kind() != SourceKind::Webpage {
        return "Analyse this competitor image. Describe what it shows, assess its visual style \
                and list the marketing insights it reveals."
            .to_string();
    }

    let mut prompt = String::from(
        "This is a screenshot of a competitor's website. Analyse its design, visual style \
         and marketing message.\n\nContext recovered from the page:\n",
    );
    prompt.push_str(&format!("- URL: {}\n", content.url().unwrap_or(NOT_FOUND)));
    prompt.push_str(&format!("- Title: {}\n", content.title().unwrap_or(NOT_FOUND)));
    prompt.push_str(&format!("- Heading: {}\n", content.heading().unwrap_or(NOT_FOUND)));
    prompt.push_str(&format!(
        "- Lead paragraph: {}\n",
        content.lead_paragraph().unwrap_or(NOT_FOUND)
    ));
    prompt
}

fn webpage_text_prompt(content: &ExtractedContent) -> String {
    format!(
        "Analyse a competitor's website from the content recovered from it.\n\n\
         URL: {}\n\
         Page title: {}\n\
         Main heading (h1): {}\n\
         First paragraph: {}\n\n\
         Where a part was not found, base the assessment on what is available.",
        content.url().unwrap_or(NOT_FOUND),
        content.title().unwrap_or(NOT_FOUND),
        content.heading().unwrap_or(NOT_FOUND),
        content.lead_paragraph().unwrap_or(NOT_FOUND),
    )
}
