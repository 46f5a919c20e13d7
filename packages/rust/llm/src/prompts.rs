//! Fixed prompt templates for structured generation.

/// Research prompt: a short briefing with key facts.
pub fn research_prompt(topic: &str, corpus: &str) -> String {
    format!(
        r#"Based on the following research content about "{topic}", create a comprehensive response with:

1. A clear title
2. A detailed comprehensive explanation (300-500 words)
3. A concise summary (50-100 words)
4. 5-7 key facts and figures as bullet points
5. 5-7 diagram/visualization ideas that would help explain this topic
6. 4-6 related topics for further exploration

Return your answer in JSON format with fields:
title, summary, comprehensiveResponse, keyPoints (array), diagramIdeas (array), relatedTopics (array).

Research Content:
{corpus}
"#
    )
}

/// Content prompt: a full article with insights, in an exact JSON shape.
pub fn content_prompt(topic: &str, corpus: &str) -> String {
    format!(
        r#"You are an expert content creator. Based on the research about "{topic}", create comprehensive content.

Provide your response in EXACTLY this JSON format:
{{
  "title": "A compelling title for {topic}",
  "articleText": "A detailed 800-1200 word article with proper paragraphs and formatting",
  "summary": "A concise 2-3 sentence summary",
  "diagramIdeas": [
    "Architecture diagram showing {topic} components",
    "Workflow diagram illustrating {topic} process",
    "Comparison chart of {topic} vs traditional methods",
    "Timeline showing {topic} evolution",
    "Mind map of {topic} key concepts",
    "Use case diagram for {topic} applications"
  ],
  "keyInsights": [
    "5-8 actionable insights about {topic}",
    "Key statistics and facts",
    "Important considerations",
    "Future trends and implications"
  ],
  "relatedTopics": [
    "4-6 related topics for further exploration",
    "Connected concepts and technologies",
    "Advanced applications",
    "Industry-specific uses"
  ]
}}

Research Data: {corpus}

Remember: Return ONLY the JSON object, no additional text or markdown formatting.
"#
    )
}
