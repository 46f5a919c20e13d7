//! Deterministic, topic-derived substitutes used when generation fails.
//!
//! Canned lists are picked by an ordered keyword table over the lower-cased
//! topic (substring match, first hit wins). Matching is literal, so
//! "blockchain" contains "ai" and lands in the AI family.

/// Topic family selecting a canned list set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFamily {
    Ai,
    Cloud,
    Blockchain,
    Generic,
}

const FAMILY_RULES: &[(&[&str], TopicFamily)] = &[
    (&["ai", "artificial intelligence", "generative"], TopicFamily::Ai),
    (&["cloud"], TopicFamily::Cloud),
    (&["blockchain"], TopicFamily::Blockchain),
];

impl TopicFamily {
    /// Classify `topic` against the keyword table.
    pub fn of(topic: &str) -> Self {
        let lowered = topic.to_lowercase();
        FAMILY_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(_, family)| *family)
            .unwrap_or(TopicFamily::Generic)
    }
}

/// First `max_chars` characters of `text`, plus `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Summary sentence for research results.
pub fn research_summary(topic: &str) -> String {
    format!("Research results for: {topic}")
}

/// Summary sentence for generated content.
pub fn content_summary(topic: &str) -> String {
    format!(
        "Comprehensive overview of {topic} covering key concepts, applications, and future implications."
    )
}

/// Key points attached to every research fallback.
pub fn research_key_points() -> Vec<String> {
    owned(&[
        "Research conducted",
        "Content analyzed",
        "Information synthesized",
    ])
}

/// Diagram ideas suited to `topic`.
pub fn diagram_ideas(topic: &str) -> Vec<String> {
    match TopicFamily::of(topic) {
        TopicFamily::Ai => owned(&[
            "AI System Architecture showing data flow and processing layers",
            "Machine Learning Pipeline from data ingestion to model deployment",
            "AI vs Human Intelligence comparison matrix",
            "Timeline of AI development milestones",
            "AI Application Areas mind map (healthcare, finance, automotive, etc.)",
            "Neural Network Structure diagram showing layers and connections",
            "AI Ethics Framework flowchart for responsible development",
        ]),
        TopicFamily::Cloud => owned(&[
            "Cloud Architecture diagram with IaaS, PaaS, SaaS layers",
            "Data migration workflow to cloud infrastructure",
            "Multi-cloud deployment strategy visualization",
            "Cloud security framework and protocols",
            "Cost optimization decision tree for cloud services",
            "Hybrid cloud infrastructure layout and connections",
        ]),
        TopicFamily::Blockchain => owned(&[
            "Blockchain network architecture and node distribution",
            "Transaction flow diagram through blockchain",
            "Consensus mechanism comparison chart",
            "Smart contract execution workflow",
            "Cryptocurrency ecosystem map",
            "Blockchain vs traditional database comparison",
        ]),
        TopicFamily::Generic => vec![
            format!("System architecture overview for {topic}"),
            format!("Process workflow diagram for {topic} implementation"),
            "Component interaction diagram showing relationships".to_string(),
            format!("Timeline showing {topic} evolution and milestones"),
            format!("Comparison matrix of different {topic} approaches"),
            format!("Use case scenarios and applications for {topic}"),
            format!("Decision tree for implementing {topic} solutions"),
        ],
    }
}

/// Key insights suited to `topic`. Only the AI family has a dedicated set.
pub fn key_insights(topic: &str) -> Vec<String> {
    match TopicFamily::of(topic) {
        TopicFamily::Ai => owned(&[
            "AI is transforming industries at an unprecedented pace",
            "Generative AI models require massive computational resources and data",
            "Ethical considerations are crucial for responsible AI development",
            "AI augments human capabilities rather than replacing them entirely",
            "Continuous learning and adaptation are key features of modern AI systems",
            "Data quality and bias directly impact AI model performance",
            "AI adoption requires significant organizational change management",
        ]),
        _ => vec![
            format!("{topic} is rapidly transforming multiple industries worldwide"),
            "Implementation requires careful planning and strategic approach".to_string(),
            "Key benefits include significant efficiency gains and innovation opportunities"
                .to_string(),
            "Main challenges involve technical complexity and effective change management"
                .to_string(),
            "Future trends point toward increased adoption and deeper integration".to_string(),
            "Success depends on proper training and organizational readiness".to_string(),
            format!("Cost-benefit analysis is essential before {topic} implementation"),
        ],
    }
}

/// Related topics suited to `topic`. Blockchain topics use the generic set.
pub fn related_topics(topic: &str) -> Vec<String> {
    match TopicFamily::of(topic) {
        TopicFamily::Ai => owned(&[
            "Machine Learning Fundamentals and Algorithms",
            "Deep Learning and Neural Networks",
            "Natural Language Processing Applications",
            "Computer Vision and Image Recognition",
            "AI Ethics and Responsible Development",
            "Future of AI Technology and Society",
        ]),
        TopicFamily::Cloud => owned(&[
            "DevOps and Continuous Integration",
            "Microservices Architecture",
            "Containerization and Kubernetes",
            "Cloud Security Best Practices",
            "Serverless Computing",
            "Edge Computing and IoT",
        ]),
        TopicFamily::Blockchain | TopicFamily::Generic => vec![
            format!("Advanced {topic} implementation techniques"),
            format!("{topic} best practices and methodologies"),
            format!("Industry-specific applications of {topic}"),
            format!("Future trends and innovations in {topic}"),
            "Related technologies and complementary tools".to_string(),
            "Strategic implementation and adoption strategies".to_string(),
        ],
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
