//! Static Helvetica metric table and greedy word wrap for the PDF exporter.
//!
//! Widths are the standard Helvetica AFM advance widths in 1/1000 em, covering
//! ASCII 0x20..=0x7E. Index = (char as usize) - 32. Anything outside that range
//! falls back to `AVERAGE_WIDTH`, which slightly over-estimates most accented
//! Latin glyphs and so errs on the side of wrapping early.

const HELVETICA_WIDTHS: [u16; 95] = [
    // sp    !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // :    ;    <    =    >    ?    @
    278, 278, 584, 584, 584, 556, 1015,
    // A-M
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    // N-Z
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [    \    ]    ^    _    `
    278, 278, 278, 469, 556, 333,
    // a-m
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    // n-z
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // {    |    }    ~
    334, 260, 334, 584,
];

const AVERAGE_WIDTH: u16 = 556;

/// Rendered width of `s` in em units.
pub fn measure_str(s: &str) -> f32 {
    s.chars().map(char_width).sum()
}

fn char_width(c: char) -> f32 {
    let code = c as usize;
    let units = if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else {
        AVERAGE_WIDTH
    };
    f32::from(units) / 1000.0
}

/// Greedy word wrap of a single paragraph at `max_width_em`.
///
/// Runs of whitespace collapse to one space. A word wider than the line is
/// broken at character boundaries. A blank paragraph yields one empty line so
/// vertical spacing in the source survives.
pub fn wrap_paragraph(paragraph: &str, max_width_em: f32) -> Vec<String> {
    let space_w = char_width(' ');
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0_f32;

    for word in paragraph.split_whitespace() {
        let word_w = measure_str(word);

        if word_w > max_width_em {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            }
            for piece in break_word(word, max_width_em) {
                current_w = measure_str(&piece);
                lines.push(piece);
            }
            // The last piece stays open so following words can join it.
            current = lines.pop().unwrap_or_default();
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_w = word_w;
        } else if current_w + space_w + word_w > max_width_em {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_w = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_w += space_w + word_w;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn break_word(word: &str, max_width_em: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_w = 0.0_f32;

    for c in word.chars() {
        let w = char_width(c);
        if !piece.is_empty() && piece_w + w > max_width_em {
            pieces.push(std::mem::take(&mut piece));
            piece_w = 0.0;
        }
        piece.push(c);
        piece_w += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_known_widths() {
        assert!((measure_str(" ") - 0.278).abs() < f32::EPSILON);
        assert!((measure_str("W") - 0.944).abs() < f32::EPSILON);
        assert!((measure_str("il") - 0.444).abs() < 1e-6);
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        assert!((measure_str("é") - 0.556).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        assert_eq!(wrap_paragraph("Led a team", 40.0), vec!["Led a team"]);
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        assert_eq!(wrap_paragraph("  Led   a\tteam ", 40.0), vec!["Led a team"]);
    }

    #[test]
    fn test_blank_paragraph_yields_one_empty_line() {
        assert_eq!(wrap_paragraph("   ", 40.0), vec![String::new()]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Reduced p99 latency by 40% across 3 services by introducing a shared caching layer and request coalescing";
        let max = 20.0;
        let lines = wrap_paragraph(text, max);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(measure_str(line) <= max, "line too wide: {line:?}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_overlong_word_is_broken() {
        let word = "a".repeat(100); // 100 * 0.556 = 55.6em
        let lines = wrap_paragraph(&format!("x {word} y"), 20.0);
        assert_eq!(lines[0], "x");
        for line in &lines {
            assert!(measure_str(line) <= 20.0);
        }
        assert_eq!(lines.concat().replace(' ', ""), format!("x{word}y"));
        assert!(lines.last().unwrap().ends_with(" y"));
    }
}
