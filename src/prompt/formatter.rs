use once_cell::sync::Lazy;
use regex::Regex;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;

use crate::config::DEFAULT_WRAP_WIDTH;

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s+").expect("sentence break pattern is valid"));

/// Splits after every period that is followed by whitespace. The period stays
/// with its sentence and the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for found in SENTENCE_BREAK.find_iter(text) {
        let end = found.start() + 1;
        if end > start {
            sentences.push(&text[start..end]);
        }
        start = found.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

/// A whitespace-delimited word measured in characters, not terminal columns,
/// so combining marks and wide glyphs each count as one.
#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    chars: usize,
}

impl Fragment for Word<'_> {
    fn width(&self) -> f64 {
        self.chars as f64
    }

    fn whitespace_width(&self) -> f64 {
        1.0
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

fn wrap_sentence(sentence: &str, width: usize) -> String {
    let words: Vec<Word> = sentence
        .split_whitespace()
        .map(|text| Word {
            text,
            chars: text.chars().count(),
        })
        .collect();

    wrap_first_fit(&words, &[width as f64])
        .iter()
        .map(|line| {
            line.iter()
                .map(|word| word.text)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Re-flows an enhanced prompt into one greedily wrapped paragraph per
/// sentence, separated by blank lines.
pub fn format_prompt(text: &str, width: usize) -> String {
    split_sentences(text.trim())
        .into_iter()
        .map(|sentence| wrap_sentence(sentence, width))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_prompt_default(text: &str) -> String {
    format_prompt(text, DEFAULT_WRAP_WIDTH)
}
