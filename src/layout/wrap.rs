//! Greedy line breaking for mixed Latin/CJK text.

/// One breakable unit of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Latin word or number, including internal apostrophes and hyphens (`don't`, `e-mail`).
    Word(&'a str),
    /// A single CJK character, which may break on either side.
    Cjk(&'a str),
    /// A single non-newline whitespace character.
    Space(&'a str),
    /// A single punctuation or symbol character.
    Punct(&'a str),
    Newline,
}

impl<'a> Token<'a> {
    fn text(self) -> &'a str {
        match self {
            Token::Word(s) | Token::Cjk(s) | Token::Space(s) | Token::Punct(s) => s,
            Token::Newline => "\n",
        }
    }
}

/// Result of wrapping one text block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Wrapped {
    pub lines: Vec<String>,
    /// `true` when content was cut to honor the line budget.
    pub truncated: bool,
}

pub(crate) fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303f}'   // CJK symbols and punctuation
        | '\u{3040}'..='\u{30ff}' // kana
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{ac00}'..='\u{d7af}' // hangul
        | '\u{f900}'..='\u{faff}'
        | '\u{ff00}'..='\u{ffef}' // full-width forms
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() && !is_cjk(c)
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

/// Split `text` into breakable units.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut iter = text.char_indices().peekable();
    while let Some((start, c)) = iter.next() {
        if c == '\n' {
            out.push(Token::Newline);
            continue;
        }
        let one = &text[start..start + c.len_utf8()];
        if is_word_char(c) {
            let mut end = start + c.len_utf8();
            loop {
                match iter.peek().copied() {
                    Some((i, n)) if is_word_char(n) => {
                        end = i + n.len_utf8();
                        iter.next();
                    }
                    // A joiner only belongs to the word when another word char follows it.
                    Some((i, n)) if is_joiner(n) => {
                        let after = text[i + n.len_utf8()..].chars().next();
                        if after.is_some_and(is_word_char) {
                            end = i + n.len_utf8();
                            iter.next();
                        } else {
                            break;
                        }
                    }
                    _ => break,
                }
            }
            out.push(Token::Word(&text[start..end]));
        } else if is_cjk(c) {
            out.push(Token::Cjk(one));
        } else if c.is_whitespace() {
            out.push(Token::Space(one));
        } else {
            out.push(Token::Punct(one));
        }
    }
    out
}

/// Wrap `text` greedily into lines no wider than `max_width`.
///
/// Breaks happen between tokens; a token wider than the column is split per character. Leading
/// whitespace of a wrapped line is dropped and trailing whitespace trimmed. When more than
/// `max_lines` lines would be produced, the output is cut to `max_lines` and the last line ends
/// with `ellipsis` (shortened until it fits).
pub fn wrap_text(
    text: &str,
    max_width: f32,
    max_lines: usize,
    ellipsis: &str,
    mut measure: impl FnMut(&str) -> f32,
) -> Wrapped {
    let text = text.trim();
    if text.is_empty() || max_lines == 0 {
        return Wrapped {
            lines: Vec::new(),
            truncated: !text.is_empty(),
        };
    }

    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();

    fn emit(lines: &mut Vec<String>, cur: &mut String) {
        lines.push(cur.trim_end().to_string());
        cur.clear();
    }

    for tok in tokenize(text) {
        if lines.len() > max_lines {
            break;
        }
        if tok == Token::Newline {
            emit(&mut lines, &mut cur);
            continue;
        }
        if cur.is_empty() && matches!(tok, Token::Space(_)) {
            continue;
        }
        let piece = tok.text();
        let candidate = format!("{cur}{piece}");
        if measure(&candidate) <= max_width {
            cur = candidate;
            continue;
        }
        if !cur.trim().is_empty() {
            emit(&mut lines, &mut cur);
            if matches!(tok, Token::Space(_)) {
                continue;
            }
            if measure(piece) <= max_width {
                cur.push_str(piece);
                continue;
            }
        }
        // The token cannot fit on a line of its own: hard-break it.
        for ch in piece.chars() {
            if lines.len() > max_lines {
                break;
            }
            let mut next = cur.clone();
            next.push(ch);
            if measure(&next) <= max_width || cur.is_empty() {
                cur = next;
            } else {
                emit(&mut lines, &mut cur);
                cur.push(ch);
            }
        }
    }
    if !cur.trim().is_empty() {
        emit(&mut lines, &mut cur);
    }

    if lines.len() <= max_lines {
        return Wrapped {
            lines,
            truncated: false,
        };
    }

    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        *last = fit_ellipsis(last, ellipsis, max_width, &mut measure);
    }
    Wrapped {
        lines,
        truncated: true,
    }
}

/// Append `marker` to `line`, removing trailing characters until the result fits `max_width`.
pub fn fit_ellipsis(
    line: &str,
    marker: &str,
    max_width: f32,
    mut measure: impl FnMut(&str) -> f32,
) -> String {
    let mut base = line.trim_end().to_string();
    loop {
        let candidate = format!("{base}{marker}");
        if base.is_empty() || measure(&candidate) <= max_width {
            return candidate;
        }
        base.pop();
        let trimmed = base.trim_end().len();
        base.truncate(trimmed);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
