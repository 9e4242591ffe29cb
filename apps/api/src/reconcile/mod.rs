//! Resume Reconciliation — finds a suggested "before" passage in the live resume
//! text and swaps in the rewrite.
//!
//! The model that produced the suggestion does not always echo the resume
//! verbatim, and the live text drifts as earlier rewrites are applied. Three
//! tiers are tried in order, first hit wins:
//!
//! 1. `Exact`      — verbatim substring.
//! 2. `Normalized` — whitespace-collapsed, trimmed, lowercased comparison,
//!    mapped back to raw offsets.
//! 3. `Fragment`   — the longest 8..=3 word prefix of the passage, matched
//!    case-insensitively, replacing through the end of that line.
//!
//! Everything here is a pure function of its inputs. Session bookkeeping
//! (applied set, highlight) lives in `crate::session`.

mod normalize;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use normalize::{case_fold, normalize, FoldedText};

/// Longest word prefix tried by the fragment tier.
const MAX_FRAGMENT_WORDS: usize = 8;
/// Shorter prefixes are too ambiguous to replace a whole line on.
const MIN_FRAGMENT_WORDS: usize = 3;

/// Which search tier located the passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Normalized,
    Fragment,
}

/// Half-open byte range `[start, end)` into a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

/// Where a passage was found in the text that was searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub start: usize,
    pub end: usize,
    pub tier: MatchTier,
}

/// A successful reconciliation.
///
/// `match_range` covers the inserted text in `new_text`, not the replaced text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub new_text: String,
    pub match_range: MatchRange,
    pub tier: MatchTier,
}

/// The passage could not be located under any tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the original passage could not be located in the resume text")]
pub struct NotFound;

/// Locates `original` in `live_text` and replaces it with `suggested`.
pub fn locate_and_replace(
    live_text: &str,
    original: &str,
    suggested: &str,
) -> Result<Reconciled, NotFound> {
    let located = locate(live_text, original).ok_or(NotFound)?;

    let mut new_text = live_text.to_owned();
    new_text.replace_range(located.start..located.end, suggested);

    Ok(Reconciled {
        new_text,
        match_range: MatchRange {
            start: located.start,
            end: located.start + suggested.len(),
        },
        tier: located.tier,
    })
}

/// Runs the three tiers in order and returns the first hit.
///
/// A blank `original` never matches.
pub fn locate(live_text: &str, original: &str) -> Option<Located> {
    if original.trim().is_empty() {
        return None;
    }

    let located = locate_exact(live_text, original)
        .or_else(|| locate_normalized(live_text, original))
        .or_else(|| locate_fragment(live_text, original))?;

    debug!(
        "Located passage via {:?} tier at {}..{}",
        located.tier, located.start, located.end
    );
    Some(located)
}

fn locate_exact(live_text: &str, original: &str) -> Option<Located> {
    live_text.find(original).map(|start| Located {
        start,
        end: start + original.len(),
        tier: MatchTier::Exact,
    })
}

fn locate_normalized(live_text: &str, original: &str) -> Option<Located> {
    let needle = normalize(original);
    let (start, end) = FoldedText::normalized(live_text).find_raw(&needle)?;

    Some(Located {
        start,
        end: fold_trailing_whitespace(live_text, end),
        tier: MatchTier::Normalized,
    })
}

fn locate_fragment(live_text: &str, original: &str) -> Option<Located> {
    let words: Vec<&str> = original.split_whitespace().collect();
    let longest = words.len().min(MAX_FRAGMENT_WORDS);
    if longest < MIN_FRAGMENT_WORDS {
        return None;
    }

    let haystack = FoldedText::case_folded(live_text);

    (MIN_FRAGMENT_WORDS..=longest).rev().find_map(|n| {
        let fragment = case_fold(&words[..n].join(" "));
        let (start, fragment_end) = haystack.find_raw(&fragment)?;
        let end = live_text[fragment_end..]
            .find('\n')
            .map_or(live_text.len(), |offset| fragment_end + offset);

        Some(Located {
            start,
            end,
            tier: MatchTier::Fragment,
        })
    })
}

/// Extends a normalized match over the spaces and tabs that follow it on the
/// same line.
///
/// A line break always ends the fold and is never absorbed, so the next line
/// keeps its indentation and any blank lines. A run that ends at a newline is
/// folded whole; a run that ends at more text on the same line keeps its last
/// character as the separator. Nothing is folded when only whitespace remains.
fn fold_trailing_whitespace(text: &str, end: usize) -> usize {
    let rest = &text[end..];
    if rest.trim_start().is_empty() {
        return end;
    }

    let run: usize = rest
        .chars()
        .take_while(|c| c.is_whitespace() && *c != '\n')
        .map(char::len_utf8)
        .sum();

    if run == 0 {
        return end;
    }
    if rest[run..].starts_with('\n') {
        return end + run;
    }

    let separator = rest[..run].chars().next_back().map_or(0, char::len_utf8);
    end + run - separator
}
