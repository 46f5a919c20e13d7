//! Corpus synthesis: many extracted texts into one prompt-ready string.

/// Join texts, each followed by a blank line, and trim the result.
pub fn synthesize<S: AsRef<str>>(texts: &[S]) -> String {
    let mut corpus = String::new();
    for text in texts {
        corpus.push_str(text.as_ref());
        corpus.push_str("\n\n");
    }
    corpus.trim().to_string()
}
