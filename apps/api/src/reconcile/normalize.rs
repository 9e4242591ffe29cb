//! Text views used by the fuzzy tiers.
//!
//! Both views lowercase character by character and remember, for every byte of
//! the derived text, which span of the raw text produced it. Offsets found in
//! the derived text can then be mapped back to exact raw byte offsets, even when
//! lowercasing changes the UTF-8 length of a character.

/// A lowercased view of raw text with a byte-level map back into the raw text.
#[derive(Debug, Clone)]
pub struct FoldedText {
    pub text: String,
    /// `spans[i]` is the raw `[start, end)` that produced byte `i` of `text`.
    spans: Vec<(usize, usize)>,
}

impl FoldedText {
    /// Whitespace-normalized view: every maximal whitespace run becomes one
    /// space, leading and trailing runs are dropped, and letters are lowercased.
    ///
    /// A collapsed space maps to the whole raw run, so the normalized position
    /// advances once per run rather than once per raw whitespace character.
    pub fn normalized(raw: &str) -> Self {
        let mut folded = Self::with_capacity(raw.len());
        let mut pending_run: Option<(usize, usize)> = None;

        for (idx, ch) in raw.char_indices() {
            let end = idx + ch.len_utf8();
            if ch.is_whitespace() {
                pending_run = Some(match pending_run {
                    Some((start, _)) => (start, end),
                    None => (idx, end),
                });
                continue;
            }

            if let Some(run) = pending_run.take() {
                if !folded.text.is_empty() {
                    folded.push(' ', run);
                }
            }
            folded.push_lowercase(ch, (idx, end));
        }

        folded
    }

    /// Case-folded view with whitespace kept exactly as written.
    pub fn case_folded(raw: &str) -> Self {
        let mut folded = Self::with_capacity(raw.len());
        for (idx, ch) in raw.char_indices() {
            folded.push_lowercase(ch, (idx, idx + ch.len_utf8()));
        }
        folded
    }

    /// Maps a byte range of the folded text back to the raw range that produced it.
    ///
    /// Returns `None` for empty or out-of-bounds ranges.
    pub fn raw_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end || end > self.spans.len() {
            return None;
        }
        Some((self.spans[start].0, self.spans[end - 1].1))
    }

    /// Finds `needle` (already folded) and returns the raw range it covers.
    pub fn find_raw(&self, needle: &str) -> Option<(usize, usize)> {
        if needle.is_empty() {
            return None;
        }
        let pos = self.text.find(needle)?;
        self.raw_span(pos, pos + needle.len())
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            spans: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, ch: char, span: (usize, usize)) {
        self.text.push(ch);
        self.spans.extend(std::iter::repeat(span).take(ch.len_utf8()));
    }

    fn push_lowercase(&mut self, ch: char, span: (usize, usize)) {
        for lower in ch.to_lowercase() {
            self.push(lower, span);
        }
    }
}

/// Normalized form of a needle, matching what [`FoldedText::normalized`] produces.
pub fn normalize(text: &str) -> String {
    FoldedText::normalized(text).text
}

/// Lowercases per character, matching what [`FoldedText::case_folded`] produces.
pub fn case_fold(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}
