//! Prose output parsing: numbered sections first, then a line scan.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::coerce::{clean_block, find_probability, find_score, non_empty};
use super::{ParseFailure, RawFields};
use crate::types::{Advice, Summary};

/// `1.`, `2)`, `**3.**`, `## 4:` at line start, optionally followed by a
/// short title ending in a colon.
static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t>#*_]*([1-4])[.):][*_]*(?:[ \t]+|$)(?:[*_]*[A-Za-z][A-Za-z '&/-]{0,30}?[*_]*:[*_]*)?[ \t]*",
    )
    .unwrap()
});
static ADVICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:advice|next move)\b[*_]*\s*[:\-]?[*_]*[ \t]*(.*)").unwrap());
static SUMMARY_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:summary|what'?s happening|detailed analysis|analysis)\s*:\s*").unwrap());
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-•*]|\d+[.)])\s+(.+)$").unwrap());

/// Split `text` into numbered sections. Only ascending ordinals count as
/// section headers, so numbered lists inside a section are left alone.
fn sections(text: &str) -> BTreeMap<u8, &str> {
    let mut headers: Vec<(u8, usize, usize)> = Vec::new();
    for caps in SECTION_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(ordinal) = caps.get(1).and_then(|m| m.as_str().parse::<u8>().ok()) else {
            continue;
        };
        if headers.last().map_or(true, |(last, _, _)| ordinal > *last) {
            headers.push((ordinal, whole.start(), whole.end()));
        }
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, (ordinal, _, body_start))| {
            let end = headers.get(i + 1).map_or(text.len(), |(_, start, _)| *start);
            (*ordinal, &text[*body_start..end])
        })
        .collect()
}

/// Several bullet or numbered lines become steps; anything else is one sentence.
fn advice_from_block(block: &str) -> Option<Advice> {
    let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
    let items: Vec<String> = lines
        .iter()
        .filter_map(|l| LIST_ITEM_RE.captures(l))
        .filter_map(|c| c.get(1).and_then(|m| non_empty(m.as_str())))
        .collect();
    if items.len() >= 2 && items.len() == lines.len() {
        return Some(Advice::Steps(items));
    }
    non_empty(block).map(Advice::Text)
}

/// Four numbered sections: score, summary, probability, advice.
pub fn parse_sections(text: &str) -> Result<RawFields, ParseFailure> {
    if text.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }
    let sections = sections(text);
    if sections.len() < 2 {
        return Err(ParseFailure::NoSections);
    }

    let first = sections.get(&1).copied();
    let third = sections.get(&3).copied();

    let score = first.and_then(find_score).or_else(|| find_score(text));
    let probability = third
        .and_then(find_probability)
        .or_else(|| find_probability(text));

    let summary = match sections.get(&2) {
        Some(block) => non_empty(block),
        // Some models fold the summary into the score section.
        None if first.is_some() && third.is_some() => first
            .and_then(|block| block.trim_start().split_once('\n'))
            .and_then(|(_, rest)| non_empty(rest)),
        None => None,
    }
    .map(Summary::Text);

    let advice = sections.get(&4).and_then(|block| advice_from_block(block));

    let fields = RawFields {
        score,
        probability,
        summary,
        advice,
        label: None,
    };
    if !fields.has_anchor() {
        return Err(ParseFailure::NoAnchorFields);
    }
    Ok(fields)
}

/// Last resort: find a "Level N" and an "N%" anywhere, take advice from a
/// marker or the last plain line, and keep the remaining lines as the summary.
pub fn parse_lines(text: &str) -> Result<RawFields, ParseFailure> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(ParseFailure::Empty);
    }

    let score = lines.iter().find_map(|l| find_score(l));
    let probability = lines.iter().find_map(|l| find_probability(l));

    let (advice_line, advice) = find_advice(&lines);
    let summary = summary_text(&lines, advice_line);

    let fields = RawFields {
        score,
        probability,
        summary,
        advice: advice.map(Advice::Text),
        label: None,
    };
    if !fields.has_anchor() {
        return Err(ParseFailure::NoAnchorFields);
    }
    Ok(fields)
}

/// Lines carrying a score or probability belong to neither summary nor advice.
fn is_anchor_line(line: &str) -> bool {
    find_score(line).is_some() || find_probability(line).is_some()
}

/// Text after an advice marker, or the line after a bare marker. Without a
/// marker, the last line that is not a score or probability line. Returns
/// the index of the first line consumed by advice.
fn find_advice(lines: &[&str]) -> (Option<usize>, Option<String>) {
    for (i, line) in lines.iter().enumerate() {
        let Some(rest) = ADVICE_RE.captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        if let Some(advice) = non_empty(rest.as_str()) {
            return (Some(i), Some(advice));
        }
        return (Some(i), lines.get(i + 1).and_then(|next| non_empty(next)));
    }

    lines
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, line)| !is_anchor_line(line))
        .find_map(|(i, line)| non_empty(line).map(|advice| (Some(i), Some(advice))))
        .unwrap_or((None, None))
}

fn summary_text(lines: &[&str], advice_line: Option<usize>) -> Option<Summary> {
    let kept: Vec<String> = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| {
            advice_line.map_or(true, |a| *i < a) && !is_anchor_line(line)
        })
        .map(|(_, line)| clean_block(&SUMMARY_PREFIX_RE.replace(line, "")))
        .filter(|line| !line.is_empty())
        .collect();
    (!kept.is_empty()).then(|| Summary::Text(kept.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_with_markdown_headers() {
        let text = "**1. Delulu Score:** Level 2 – Situationship Final Boss\n\n\
            **2. Summary:** They double text *a lot*.\n\
            Mostly memes.\n\n\
            **3. Relationship Probability:** 35%\n\n\
            **4. Advice:**\n- Send one meme\n- Wait for a reply\n";
        let fields = parse_sections(text).unwrap();
        assert_eq!(fields.score, Some(2));
        assert_eq!(fields.probability, Some(35));
        assert_eq!(
            fields.summary,
            Some(Summary::Text("They double text a lot. Mostly memes.".into()))
        );
        assert_eq!(
            fields.advice,
            Some(Advice::Steps(vec!["Send one meme".into(), "Wait for a reply".into()]))
        );
    }

    #[test]
    fn test_nested_numbered_list_stays_in_section() {
        let text = "1. Score: Level 4\n2. Summary: Cute.\n3. Probability: 80%\n\
            4. Advice:\n1. Say hi\n2. Plan a date\n";
        let fields = parse_sections(text).unwrap();
        assert_eq!(fields.probability, Some(80));
        assert_eq!(
            fields.advice,
            Some(Advice::Steps(vec!["Say hi".into(), "Plan a date".into()]))
        );
    }

    #[test]
    fn test_summary_folded_into_score_section() {
        let text = "1. Level 5\nThey already picked wedding colors.\n3. 90%\n4. Calm down.";
        let fields = parse_sections(text).unwrap();
        assert_eq!(fields.score, Some(5));
        assert_eq!(
            fields.summary,
            Some(Summary::Text("They already picked wedding colors.".into()))
        );
        assert_eq!(fields.advice, Some(Advice::Text("Calm down.".into())));
    }

    #[test]
    fn test_blank_lines_within_section_are_ignored() {
        let tight = "1. Level 3\n2. Summary: one\ntwo\n3. 40%\n4. Advice: go";
        let loose = "1. Level 3\n\n2. Summary:\n\none\n\n\ntwo\n\n3. 40%\n\n4. Advice: go\n\n";
        assert_eq!(parse_sections(tight).unwrap(), parse_sections(loose).unwrap());
    }

    #[test]
    fn test_decimal_is_not_a_header() {
        assert_eq!(
            parse_sections("1.5 hours of calls, Level 2\nand 30% chance"),
            Err(ParseFailure::NoSections)
        );
    }

    #[test]
    fn test_line_scan_single_line() {
        let fields = parse_lines("Level 3 ... 62% ... Advice: text him back tomorrow").unwrap();
        assert_eq!(fields.score, Some(3));
        assert_eq!(fields.probability, Some(62));
        assert_eq!(fields.advice, Some(Advice::Text("text him back tomorrow".into())));
        assert_eq!(fields.summary, None);
    }

    #[test]
    fn test_line_scan_multi_line() {
        let text = "You're at Level 4.\nSummary: They call every night.\n\
            Chance: 75%\nAdvice:\nAsk about the weekend.";
        let fields = parse_lines(text).unwrap();
        assert_eq!(fields.score, Some(4));
        assert_eq!(fields.probability, Some(75));
        assert_eq!(fields.summary, Some(Summary::Text("They call every night.".into())));
        assert_eq!(fields.advice, Some(Advice::Text("Ask about the weekend.".into())));
    }

    #[test]
    fn test_line_scan_last_plain_line_is_advice() {
        let text = "Level 4 energy\nThey talk daily.\nMaybe 80% there\nJust ask them out this weekend.";
        let fields = parse_lines(text).unwrap();
        assert_eq!(
            fields.advice,
            Some(Advice::Text("Just ask them out this weekend.".into()))
        );
        assert_eq!(fields.summary, Some(Summary::Text("They talk daily.".into())));
    }

    #[test]
    fn test_line_scan_trailing_anchor_line_is_skipped_for_advice() {
        let text = "Detailed Analysis: Mixed signals all week.\nSlow down a little.\nLevel 2, about 30%";
        let fields = parse_lines(text).unwrap();
        assert_eq!(fields.advice, Some(Advice::Text("Slow down a little.".into())));
        assert_eq!(
            fields.summary,
            Some(Summary::Text("Mixed signals all week.".into()))
        );
    }

    #[test]
    fn test_line_scan_needs_an_anchor() {
        assert_eq!(
            parse_lines("no numbers here\nat all"),
            Err(ParseFailure::NoAnchorFields)
        );
        assert_eq!(parse_lines("\n  \n"), Err(ParseFailure::Empty));
    }
}
