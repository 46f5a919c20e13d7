//! Self-contained SVG placeholder. Terminates every dispatch chain.

use topiclens_shared::{DiagramRequest, DiagramResponse, DiagramType};

/// Longest description shown before truncation.
const MAX_LABEL_CHARS: usize = 50;

/// Gradient stops for a color scheme name. Unknown schemes use blue.
fn gradient(scheme: &str) -> (&'static str, &'static str) {
    match scheme.to_lowercase().as_str() {
        "green" => ("#43e97b", "#38f9d7"),
        "purple" => ("#8e2de2", "#4a00e0"),
        "monochrome" => ("#434343", "#000000"),
        _ => ("#667eea", "#764ba2"),
    }
}

fn label(description: &str) -> String {
    if description.chars().count() > MAX_LABEL_CHARS {
        let head: String = description.chars().take(MAX_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// SVG markup sized to the request.
pub fn svg(request: &DiagramRequest) -> String {
    // Geometry in u64 so any u32 size fits.
    let w = u64::from(request.width.max(1));
    let h = u64::from(request.height.max(1));
    let (from, to) = gradient(&request.color_scheme);
    let text = escape_xml(&label(&request.description));

    let (card_x, card_y) = (w / 8, h / 6);
    let (card_w, card_h) = (w - 2 * card_x, h - 2 * card_y);
    let center = w / 2;
    let (title_y, caption_y) = (h * 2 / 5, h * 3 / 5);

    format!(
        r##"<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="grad1" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" stop-color="{from}"/>
      <stop offset="100%" stop-color="{to}"/>
    </linearGradient>
  </defs>
  <rect width="{w}" height="{h}" fill="url(#grad1)" rx="10"/>
  <rect x="{card_x}" y="{card_y}" width="{card_w}" height="{card_h}" fill="white" rx="8" opacity="0.9"/>
  <text x="{center}" y="{title_y}" text-anchor="middle" font-size="14" fill="#333" font-weight="bold">{text}</text>
  <text x="{center}" y="{caption_y}" text-anchor="middle" font-size="12" fill="#666">Diagram visualization</text>
</svg>
"##
    )
}

/// Placeholder response for `request`.
pub fn response(request: &DiagramRequest) -> DiagramResponse {
    let mut response = DiagramResponse::for_request(request, DiagramType::Basic, "SVG", "Internal");
    response.svg_content = Some(svg(request));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_to_request_with_scheme_gradient() {
        let mut request = DiagramRequest::new("data lake");
        request.width = 400;
        request.height = 300;
        request.color_scheme = "green".into();
        let svg = svg(&request);
        assert!(svg.starts_with(r#"<svg width="400" height="300""#));
        assert!(svg.contains(r#"<rect x="50" y="50" width="300" height="200""#));
        assert!(svg.contains("#43e97b"));
        assert!(svg.contains(">data lake</text>"));
        assert!(svg.contains("Diagram visualization"));
    }

    #[test]
    fn extreme_sizes_do_not_overflow() {
        let mut request = DiagramRequest::new("huge");
        request.width = u32::MAX;
        request.height = u32::MAX;
        let response = response(&request);
        let svg = response.svg_content.expect("svg");
        assert!(svg.starts_with(r#"<svg width="4294967295" height="4294967295""#));
        assert!(svg.contains(r#"y="1717986918""#));
        assert!(svg.contains(r#"y="2576980377""#));
        assert_eq!(response.height, u32::MAX);
    }

    #[test]
    fn unknown_scheme_uses_blue() {
        let mut request = DiagramRequest::new("x");
        request.color_scheme = "neon".into();
        assert!(svg(&request).contains("#667eea"));
    }

    #[test]
    fn long_descriptions_are_truncated_and_escaped() {
        let description = format!("<{}>", "a".repeat(60));
        let svg = svg(&DiagramRequest::new(description));
        let expected = format!("&lt;{}...", "a".repeat(49));
        assert!(svg.contains(&expected));
        assert!(!svg.contains("<aaa"));
    }

    #[test]
    fn response_is_basic_internal_svg() {
        let response = response(&DiagramRequest::new("anything"));
        assert_eq!(response.diagram_type, DiagramType::Basic);
        assert_eq!(response.provider, "Internal");
        assert_eq!(response.format, "SVG");
        assert_eq!(response.description, "anything");
        assert!(response.svg_content.is_some());
    }
}
