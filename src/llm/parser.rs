//! Tolerant parsing of model responses into an [`Analysis`]
//!
//! Each section is read independently. A section that is missing or malformed
//! falls back to its default and records a [`ParseWarning`]; the other sections
//! are unaffected.

use crate::output::report::{
    Analysis, RewrittenBullet, MAX_IMPROVEMENTS, MAX_MISSING_KEYWORDS, MAX_REWRITTEN_BULLETS,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number regex"));
static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s+").expect("valid list marker regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    MatchScore,
    MissingKeywords,
    Improvements,
    RewrittenBullets,
    AtsTips,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::MatchScore,
        Section::MissingKeywords,
        Section::Improvements,
        Section::RewrittenBullets,
        Section::AtsTips,
    ];

    fn keys(&self) -> &'static [&'static str] {
        match self {
            Section::MatchScore => &["match_score", "score"],
            Section::MissingKeywords => &["missing_keywords", "keywords"],
            Section::Improvements => &["improvements", "suggestions"],
            Section::RewrittenBullets => &["rewritten_bullets", "rewritten_examples"],
            Section::AtsTips => &["ats_tips", "tips"],
        }
    }

    /// Match a free-text heading such as "Top 5 Missing Keywords".
    fn from_label(label: &str) -> Option<Section> {
        let label = label.to_lowercase();
        if label.contains("score") {
            Some(Section::MatchScore)
        } else if label.contains("keyword") {
            Some(Section::MissingKeywords)
        } else if label.contains("rewrit") || label.contains("bullet") {
            Some(Section::RewrittenBullets)
        } else if label.contains("improvement") || label.contains("suggestion") {
            Some(Section::Improvements)
        } else if label.contains("tip") || label.contains("ats") || label.contains("format") {
            Some(Section::AtsTips)
        } else {
            None
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::MatchScore => "match score",
            Section::MissingKeywords => "missing keywords",
            Section::Improvements => "improvements",
            Section::RewrittenBullets => "rewritten bullets",
            Section::AtsTips => "ATS tips",
        };
        f.write_str(name)
    }
}

/// Non-fatal problems found while reading a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    NotJson,
    MissingSection(Section),
    MalformedSection(Section),
    InvalidScore(String),
    ScoreOutOfRange(f64),
    Truncated { section: Section, dropped: usize },
    MalformedEntry { section: Section, index: usize },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::NotJson => {
                write!(f, "response was not JSON; read labeled sections instead")
            }
            ParseWarning::MissingSection(section) => write!(f, "{} missing from response", section),
            ParseWarning::MalformedSection(section) => {
                write!(f, "{} had an unexpected shape and was ignored", section)
            }
            ParseWarning::InvalidScore(raw) => write!(f, "match score {:?} is not a number", raw),
            ParseWarning::ScoreOutOfRange(value) => {
                write!(f, "match score {} outside 0-100 was clamped", value)
            }
            ParseWarning::Truncated { section, dropped } => {
                write!(f, "{} extra {} entries dropped", dropped, section)
            }
            ParseWarning::MalformedEntry { section, index } => {
                write!(f, "{} entry {} was incomplete and skipped", section, index + 1)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub analysis: Analysis,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedResponse {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &str) -> ParsedResponse {
        let text = strip_code_fences(raw);

        match find_json_object(text) {
            Some(object) => parse_json(&object),
            None => {
                let mut parsed = parse_labeled(text);
                parsed.warnings.insert(0, ParseWarning::NotJson);
                parsed
            }
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` fences around a response.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(inner) => inner.trim().strip_suffix("```").unwrap_or(inner).trim(),
        None => text,
    }
}

/// The first JSON object carrying at least one known section.
///
/// Objects are read from each `{` in turn, so prose after the object (or a
/// stray brace before it) does not hide it. The outermost `{ ... }` span is
/// the last resort.
fn find_json_object(text: &str) -> Option<Map<String, Value>> {
    for (start, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            if Section::ALL.iter().any(|section| lookup(&map, *section).is_some()) {
                return Some(map);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, section: Section) -> Option<&'a Value> {
    section
        .keys()
        .iter()
        .find_map(|key| map.get(*key))
        .filter(|value| !value.is_null())
}

fn parse_json(map: &Map<String, Value>) -> ParsedResponse {
    let mut warnings = Vec::new();
    let mut analysis = Analysis::default();

    match lookup(map, Section::MatchScore) {
        Some(value) => analysis.match_score = read_score(value, &mut warnings),
        None => warnings.push(ParseWarning::MissingSection(Section::MatchScore)),
    }

    analysis.score_explanation = map
        .get("score_explanation")
        .or_else(|| map.get("explanation"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    analysis.missing_keywords = read_string_list(map, Section::MissingKeywords, &mut warnings);
    analysis.improvements = read_string_list(map, Section::Improvements, &mut warnings);
    analysis.rewritten_bullets = read_bullets(map, &mut warnings);
    analysis.ats_tips = read_string_list(map, Section::AtsTips, &mut warnings);

    truncate_sections(&mut analysis, &mut warnings);

    ParsedResponse { analysis, warnings }
}

fn read_score(value: &Value, warnings: &mut Vec<ParseWarning>) -> u8 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => NUMBER_RE
            .find(s)
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => clamp_score(n, warnings),
        _ => {
            warnings.push(ParseWarning::InvalidScore(value.to_string()));
            0
        }
    }
}

fn clamp_score(value: f64, warnings: &mut Vec<ParseWarning>) -> u8 {
    if !(0.0..=100.0).contains(&value) {
        warnings.push(ParseWarning::ScoreOutOfRange(value));
    }
    value.round().clamp(0.0, 100.0) as u8
}

fn read_string_list(
    map: &Map<String, Value>,
    section: Section,
    warnings: &mut Vec<ParseWarning>,
) -> Vec<String> {
    match lookup(map, section) {
        None => {
            warnings.push(ParseWarning::MissingSection(section));
            Vec::new()
        }
        Some(Value::Array(items)) => items.iter().filter_map(item_text).collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.trim().to_string()],
        Some(_) => {
            warnings.push(ParseWarning::MalformedSection(section));
            Vec::new()
        }
    }
}

/// Strings are kept as-is; numbers and booleans are stringified; anything else is skipped.
fn item_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn read_bullets(map: &Map<String, Value>, warnings: &mut Vec<ParseWarning>) -> Vec<RewrittenBullet> {
    let section = Section::RewrittenBullets;
    let items = match lookup(map, section) {
        None => {
            warnings.push(ParseWarning::MissingSection(section));
            return Vec::new();
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            warnings.push(ParseWarning::MalformedSection(section));
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let bullet = item.as_object().and_then(read_bullet);
            if bullet.is_none() {
                warnings.push(ParseWarning::MalformedEntry { section, index });
            }
            bullet
        })
        .collect()
}

fn read_bullet(entry: &Map<String, Value>) -> Option<RewrittenBullet> {
    let field = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| entry.get(*key).and_then(Value::as_str))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let before = field(&["original", "before"])?;
    let after = field(&["improved", "after"])?;
    let keywords_added = entry
        .get("keywords_added")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(item_text).collect())
        .unwrap_or_default();

    Some(RewrittenBullet {
        before,
        after,
        keywords_added,
    })
}

fn truncate_sections(analysis: &mut Analysis, warnings: &mut Vec<ParseWarning>) {
    fn cap<T>(items: &mut Vec<T>, max: usize, section: Section, warnings: &mut Vec<ParseWarning>) {
        if items.len() > max {
            warnings.push(ParseWarning::Truncated {
                section,
                dropped: items.len() - max,
            });
            items.truncate(max);
        }
    }

    cap(&mut analysis.missing_keywords, MAX_MISSING_KEYWORDS, Section::MissingKeywords, warnings);
    cap(&mut analysis.improvements, MAX_IMPROVEMENTS, Section::Improvements, warnings);
    cap(&mut analysis.rewritten_bullets, MAX_REWRITTEN_BULLETS, Section::RewrittenBullets, warnings);
}

/// Read "Label: value" headings followed by bulleted lines.
fn parse_labeled(text: &str) -> ParsedResponse {
    let mut warnings = Vec::new();
    let mut analysis = Analysis::default();
    let mut seen: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;
    let mut score_text: Option<String> = None;
    let mut pending_before: Option<String> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let item = LIST_MARKER_RE.replace(line, "").trim().to_string();

        // "Keywords added:" belongs to the bullet above it, not to a new section
        if current == Some(Section::RewrittenBullets) {
            if let Some(value) = strip_label(&item, &["keywords added", "keywords_added"]) {
                if let Some(bullet) = analysis.rewritten_bullets.last_mut() {
                    bullet.keywords_added = split_keywords(value);
                }
                continue;
            }
        }

        if let Some(value) = strip_label(&item, &["score explanation", "explanation"]) {
            append_sentence(&mut analysis.score_explanation, value);
            current = score_text.is_some().then_some(Section::MatchScore);
            continue;
        }

        if let Some((section, rest)) = heading(line) {
            current = Some(section);
            if !seen.contains(&section) {
                seen.push(section);
            }
            if section == Section::MatchScore && !rest.is_empty() && score_text.is_none() {
                score_text = Some(rest.to_string());
            }
            continue;
        }

        let Some(section) = current else { continue };

        match section {
            Section::MatchScore => {
                if score_text.is_none() {
                    score_text = Some(item);
                } else {
                    append_sentence(&mut analysis.score_explanation, &item);
                }
            }
            Section::MissingKeywords => analysis.missing_keywords.push(item),
            Section::Improvements => analysis.improvements.push(item),
            Section::AtsTips => analysis.ats_tips.push(item),
            Section::RewrittenBullets => {
                if let Some(value) = strip_label(&item, &["before", "original"]) {
                    pending_before = Some(value.to_string());
                } else if let Some(value) = strip_label(&item, &["after", "improved"]) {
                    if let Some(before) = pending_before.take() {
                        analysis.rewritten_bullets.push(RewrittenBullet {
                            before,
                            after: value.to_string(),
                            keywords_added: Vec::new(),
                        });
                    }
                }
            }
        }
    }

    match score_text {
        Some(raw) => match NUMBER_RE.find(&raw).and_then(|m| m.as_str().parse::<f64>().ok()) {
            Some(n) => analysis.match_score = clamp_score(n, &mut warnings),
            None => warnings.push(ParseWarning::InvalidScore(raw)),
        },
        None => warnings.push(ParseWarning::MissingSection(Section::MatchScore)),
    }

    for section in Section::ALL.into_iter().skip(1) {
        if !seen.contains(&section) {
            warnings.push(ParseWarning::MissingSection(section));
        }
    }

    truncate_sections(&mut analysis, &mut warnings);

    ParsedResponse { analysis, warnings }
}

/// Recognise a heading line and return the text after its colon.
fn heading(line: &str) -> Option<(Section, &str)> {
    if LIST_MARKER_RE.is_match(line) {
        return None;
    }

    let is_markdown = line.starts_with('#');
    let line = line.trim_start_matches('#').trim().trim_matches('*').trim();

    let (label, rest) = match line.split_once(':') {
        Some((label, rest)) => (label.trim().trim_matches('*').trim(), rest.trim().trim_matches('*').trim()),
        None if is_markdown => (line, ""),
        None => return None,
    };

    if label.is_empty() || label.len() > 40 {
        return None;
    }
    Section::from_label(label).map(|section| (section, rest))
}

fn strip_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    let (label, rest) = line.split_once(':')?;
    let label = label
        .trim()
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
        .to_lowercase();
    labels
        .iter()
        .any(|l| label == *l)
        .then(|| rest.trim().trim_matches('*').trim())
}

fn split_keywords(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn append_sentence(target: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}
