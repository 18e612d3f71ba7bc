//! Episode title matching.

use regex_lite::Regex;
use tracing::warn;

/// Matcher for one episode, built from the title template.
///
/// Templates that do not compile as a regex fall back to a literal
/// substring match on the rendered text.
#[derive(Debug, Clone)]
pub enum EpisodePattern {
    Compiled(Regex),
    Literal(String),
}

impl EpisodePattern {
    /// Render `template` for `episode` and compile it.
    pub fn build(template: &str, episode: u32) -> Self {
        let raw = render_template(template, episode);
        match Regex::new(&raw) {
            Ok(regex) => EpisodePattern::Compiled(regex),
            Err(e) => {
                warn!(
                    pattern = %raw,
                    error = %e,
                    "Episode pattern is not a valid regex, using plain substring search"
                );
                EpisodePattern::Literal(raw)
            }
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        match self {
            EpisodePattern::Compiled(regex) => regex.is_match(title),
            EpisodePattern::Literal(text) => title.contains(text.as_str()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, EpisodePattern::Literal(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            EpisodePattern::Compiled(regex) => regex.as_str(),
            EpisodePattern::Literal(text) => text,
        }
    }
}

/// Substitute the episode number into `template`.
///
/// Placeholders: `{ep}` and `{0}` insert the plain number, `{ep:0Nd}` pads
/// with zeros to N digits and `{ep:Nd}` pads with spaces. `{{` and `}}` are
/// escaped braces and render as `{` and `}`, so a quantifier is written
/// `\d{{3,4}}`. Any other lone brace (`\d{2}`) is copied through untouched.
pub fn render_template(template: &str, episode: u32) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut rest = template;

    while let Some(start) = rest.find(['{', '}']) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix('}') {
            out.push('}');
            rest = after;
            continue;
        }

        let after = &tail[1..];
        let rendered = after
            .find('}')
            .and_then(|end| render_placeholder(&after[..end], episode).map(|s| (end, s)));

        match rendered {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn render_placeholder(placeholder: &str, episode: u32) -> Option<String> {
    if placeholder == "ep" || placeholder == "0" {
        return Some(episode.to_string());
    }

    let format = placeholder
        .strip_prefix("ep:")
        .or_else(|| placeholder.strip_prefix("0:"))?;
    let digits = format.strip_suffix('d')?;
    if digits.is_empty() {
        return Some(episode.to_string());
    }

    let width: usize = digits.parse().ok()?;
    if digits.starts_with('0') {
        Some(format!("{:0width$}", episode, width = width))
    } else {
        Some(format!("{:width$}", episode, width = width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_zero_padded() {
        assert_eq!(render_template("Show - {ep:02d}", 5), "Show - 05");
        assert_eq!(render_template("Show - {ep:02d}", 123), "Show - 123");
        assert_eq!(render_template("Show - {ep:03d}", 7), "Show - 007");
    }

    #[test]
    fn test_render_plain_placeholders() {
        assert_eq!(render_template("Show - {ep}", 5), "Show - 5");
        assert_eq!(render_template("Show - {0}", 12), "Show - 12");
        assert_eq!(render_template("Show - {ep:d}", 9), "Show - 9");
        assert_eq!(render_template("Show - {ep:3d}", 9), "Show -   9");
    }

    #[test]
    fn test_render_keeps_regex_braces() {
        assert_eq!(
            render_template(r"\[Sub\] Show - {ep:02d} \(\d{3,4}p\)", 4),
            r"\[Sub\] Show - 04 \(\d{3,4}p\)"
        );
        assert_eq!(render_template("Show {", 1), "Show {");
        assert_eq!(render_template("{unknown} {ep}", 2), "{unknown} 2");
    }

    #[test]
    fn test_render_escaped_braces() {
        assert_eq!(
            render_template(r"Show - {ep:02d} \(\d{{3,4}}p\)", 5),
            r"Show - 05 \(\d{3,4}p\)"
        );
        assert_eq!(render_template("{{ep}} {ep}", 7), "{ep} 7");
        assert_eq!(render_template("Show }", 1), "Show }");
    }

    #[test]
    fn test_escaped_quantifier_compiles_and_matches() {
        let pattern = EpisodePattern::build(r"Show - {ep:02d} \(\d{{3,4}}p\)", 5);
        assert!(!pattern.is_literal());
        assert!(pattern.matches("[Sub] Show - 05 (1080p)"));
        assert!(pattern.matches("[Sub] Show - 05 (720p)"));
        assert!(!pattern.matches("[Sub] Show - 05 (10p)"));
    }

    #[test]
    fn test_compiled_pattern_searches_anywhere() {
        let pattern = EpisodePattern::build(r"Show - {ep:02d}\b", 5);
        assert!(!pattern.is_literal());
        assert!(pattern.matches("[Group] Show - 05 [1080p].mkv"));
        assert!(!pattern.matches("[Group] Show - 050 [1080p].mkv"));
        assert!(!pattern.matches("[Group] Show - 06 [1080p].mkv"));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_literal() {
        let pattern = EpisodePattern::build("[Group] Show (Part {ep:02d}", 3);
        assert!(pattern.is_literal());
        assert_eq!(pattern.as_str(), "[Group] Show (Part 03");
        assert!(pattern.matches("[Group] Show (Part 03) [720p]"));
        assert!(!pattern.matches("[Group] Show (Part 04) [720p]"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let pattern = EpisodePattern::build("Show - {ep:02d}", 1);
        assert!(!pattern.matches("show - 01"));
    }
}
