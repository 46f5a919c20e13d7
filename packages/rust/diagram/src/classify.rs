//! Keyword rule tables for diagram requests.
//!
//! Each table is an ordered list of (keywords, result) pairs tested against
//! the lower-cased description; the first rule with any matching keyword wins.

use topiclens_shared::DiagramType;

const TYPE_RULES: &[(&[&str], DiagramType)] = &[
    (&["architecture", "system", "component"], DiagramType::Architecture),
    (&["workflow", "process", "flow"], DiagramType::Flowchart),
    (&["timeline", "evolution", "history"], DiagramType::Timeline),
    (&["conceptual", "abstract", "artistic"], DiagramType::Conceptual),
    (&["professional", "business", "presentation"], DiagramType::Professional),
];

/// Mermaid template families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MermaidTemplate {
    Architecture,
    Class,
    Sequence,
    Flowchart,
}

const TEMPLATE_RULES: &[(&[&str], MermaidTemplate)] = &[
    (&["architecture", "system"], MermaidTemplate::Architecture),
    (&["class", "object"], MermaidTemplate::Class),
    (&["sequence", "interaction"], MermaidTemplate::Sequence),
];

fn first_match<T: Copy>(rules: &[(&[&str], T)], text: &str) -> Option<T> {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, result)| *result)
}

/// Classify a free-text description. Defaults to [`DiagramType::Mermaid`].
pub fn classify(description: &str) -> DiagramType {
    first_match(TYPE_RULES, description).unwrap_or(DiagramType::Mermaid)
}

/// Pick the Mermaid template for a description. Defaults to a flowchart.
pub fn mermaid_template(description: &str) -> MermaidTemplate {
    first_match(TEMPLATE_RULES, description).unwrap_or(MermaidTemplate::Flowchart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_matching_rule() {
        assert_eq!(classify("Show me the system architecture"), DiagramType::Architecture);
        assert_eq!(classify("workflow for onboarding"), DiagramType::Flowchart);
        assert_eq!(classify("timeline of events"), DiagramType::Timeline);
        assert_eq!(classify("an abstract rendering"), DiagramType::Conceptual);
        assert_eq!(classify("slides for a business review"), DiagramType::Professional);
        assert_eq!(classify("just a concept"), DiagramType::Mermaid);
    }

    #[test]
    fn earlier_rules_win() {
        // "component" (architecture) outranks "process" (flowchart).
        assert_eq!(classify("process component map"), DiagramType::Architecture);
        // "flow" is a substring of "workflow" and "dataflow".
        assert_eq!(classify("Dataflow through history"), DiagramType::Flowchart);
    }

    #[test]
    fn picks_mermaid_templates() {
        assert_eq!(mermaid_template("payment system"), MermaidTemplate::Architecture);
        assert_eq!(mermaid_template("Object model"), MermaidTemplate::Class);
        assert_eq!(mermaid_template("login interaction"), MermaidTemplate::Sequence);
        assert_eq!(mermaid_template("anything else"), MermaidTemplate::Flowchart);
    }
}
