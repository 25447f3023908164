use super::*;

fn mono(s: &str) -> f32 {
    s.chars().count() as f32 * 10.0
}

#[test]
fn tokenizer_keeps_contracted_and_hyphenated_words_whole() {
    let toks = tokenize("don't re-run 3.5x");
    assert_eq!(
        toks,
        vec![
            Token::Word("don't"),
            Token::Space(" "),
            Token::Word("re-run"),
            Token::Space(" "),
            Token::Word("3"),
            Token::Punct("."),
            Token::Word("5x"),
        ]
    );
}

#[test]
fn tokenizer_splits_cjk_per_character_and_trailing_joiners() {
    let toks = tokenize("AI芯片-\n好");
    assert_eq!(
        toks,
        vec![
            Token::Word("AI"),
            Token::Cjk("芯"),
            Token::Cjk("片"),
            Token::Punct("-"),
            Token::Newline,
            Token::Cjk("好"),
        ]
    );
}

#[test]
fn greedy_wrap_breaks_on_whitespace() {
    let w = wrap_text("the quick brown fox jumps", 100.0, 10, "…", mono);
    assert_eq!(w.lines, vec!["the quick", "brown fox", "jumps"]);
    assert!(!w.truncated);
    for line in &w.lines {
        assert!(mono(line) <= 100.0);
    }
}

#[test]
fn overlong_word_is_hard_broken() {
    let w = wrap_text("a supercalifragilistic b", 80.0, 10, "…", mono);
    assert_eq!(w.lines, vec!["a", "supercal", "ifragili", "stic b"]);
}

#[test]
fn cjk_wraps_between_characters() {
    let w = wrap_text("人工智能改变世界", 30.0, 10, "…", mono);
    assert_eq!(w.lines, vec!["人工智", "能改变", "世界"]);
}

#[test]
fn explicit_newline_forces_break() {
    let w = wrap_text("one\ntwo three", 1000.0, 10, "…", mono);
    assert_eq!(w.lines, vec!["one", "two three"]);
}

#[test]
fn overflow_is_truncated_with_fitting_ellipsis() {
    let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
    let w = wrap_text(text, 110.0, 2, "…", mono);
    assert!(w.truncated);
    assert_eq!(w.lines.len(), 2);
    assert_eq!(w.lines[0], "alpha beta");
    assert!(w.lines[1].ends_with('…'));
    assert!(mono(&w.lines[1]) <= 110.0);
}

#[test]
fn text_within_budget_is_not_truncated() {
    let w = wrap_text("short", 100.0, 1, "…", mono);
    assert_eq!(w.lines, vec!["short"]);
    assert!(!w.truncated);
}

#[test]
fn empty_and_blank_text_produce_no_lines() {
    assert_eq!(wrap_text("", 100.0, 3, "…", mono), Wrapped::default());
    assert_eq!(wrap_text("  \n ", 100.0, 3, "…", mono), Wrapped::default());
}

#[test]
fn ellipsis_trims_until_fit() {
    assert_eq!(fit_ellipsis("abcdefghij", "…", 50.0, mono), "abcd…");
    assert_eq!(fit_ellipsis("ab   ", "...", 50.0, mono), "ab...");
    assert_eq!(fit_ellipsis("abc", "…", 0.0, mono), "…");
}

#[test]
fn unbroken_blob_stops_measuring_once_budget_is_spent() {
    let blob = "x".repeat(200_000);
    let mut calls = 0usize;
    let w = wrap_text(&blob, 100.0, 5, "\u{2026}", |s| {
        calls += 1;
        mono(s)
    });
    assert!(w.truncated);
    assert_eq!(w.lines.len(), 5);
    assert!(w.lines[4].ends_with('\u{2026}'));
    assert!(calls < 200, "measured {calls} times");
}

#[test]
fn whitespace_after_newline_is_not_carried_into_the_line() {
    let w = wrap_text("first\n   second line", 200.0, 5, "\u{2026}", mono);
    assert_eq!(w.lines, vec!["first", "second line"]);
}
