//! Text folding and console layout helpers.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("failed to compile whitespace regex"));

/// Collapse every whitespace run into a single space and trim both ends.
pub fn clean_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Replace accented characters with their unaccented base form.
pub fn remove_accents(input: &str) -> String {
    input.nfkd().filter(|ch| !is_combining_mark(*ch)).collect()
}

/// Fold a title or guess into the form used for answer comparison:
/// accents removed, alphanumerics only, lowercase.
pub fn strip_text(input: &str) -> String {
    remove_accents(input)
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Greedily wrap `text` into lines of at most `width` characters.
///
/// Whitespace between lines is dropped, words longer than `width` are broken
/// (at a hyphen when one fits) and hyphenated words may split after the hyphen.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = split_chunks(text);
    chunks.reverse();

    let mut lines: Vec<String> = Vec::new();
    while !chunks.is_empty() {
        let mut line: Vec<Vec<char>> = Vec::new();
        let mut len = 0;

        if !lines.is_empty() && chunks.last().is_some_and(|chunk| is_blank(chunk)) {
            chunks.pop();
        }

        while chunks.last().is_some_and(|chunk| len + chunk.len() <= width) {
            if let Some(chunk) = chunks.pop() {
                len += chunk.len();
                line.push(chunk);
            }
        }

        if chunks.last().is_some_and(|chunk| chunk.len() > width) {
            break_long_chunk(&mut chunks, &mut line, width - len);
        }

        if line.last().is_some_and(|chunk| is_blank(chunk)) {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line.concat().into_iter().collect());
        }
    }
    lines
}

/// Wrap `text` to `width` and justify every line but the last.
///
/// Padding is spread across the gaps between words, the remainder going to the
/// earliest gaps. Lines holding a single word are left as they are.
pub fn justify_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let lines = wrap_text(text, width);
    let Some((last, body)) = lines.split_last() else {
        return String::new();
    };

    let mut justified: Vec<String> = body.iter().map(|line| justify_line(line, width)).collect();
    justified.push(last.clone());
    justified.join("\n")
}

fn justify_line(line: &str, width: usize) -> String {
    let words: Vec<&str> = line.split_whitespace().collect();
    let gaps = words.len().saturating_sub(1);
    if gaps == 0 {
        return words.concat();
    }

    let used: usize = words.iter().map(|word| word.chars().count()).sum();
    let spaces = width.saturating_sub(used);
    let per_gap = spaces / gaps;
    let mut extra = spaces % gaps;

    let mut justified = String::with_capacity(width);
    for word in &words[..gaps] {
        justified.push_str(word);
        let pad = per_gap + usize::from(extra > 0);
        justified.extend(std::iter::repeat(' ').take(pad));
        extra = extra.saturating_sub(1);
    }
    justified.push_str(words[gaps]);
    justified
}

fn split_chunks(text: &str) -> Vec<Vec<char>> {
    let chars: Vec<char> = text
        .chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .collect();

    let mut chunks = Vec::new();
    let mut current: Vec<char> = Vec::new();
    let mut in_space = false;
    for (index, &ch) in chars.iter().enumerate() {
        let is_space = ch == ' ';
        if !current.is_empty() && is_space != in_space {
            chunks.push(std::mem::take(&mut current));
        }
        in_space = is_space;
        current.push(ch);

        // "well-known" wraps as "well-" / "known"
        if ch == '-' && index >= 2 {
            let after_letters = chars[index - 2].is_alphabetic() && chars[index - 1].is_alphabetic();
            let before_letter = chars.get(index + 1).is_some_and(|next| next.is_alphabetic());
            if after_letters && before_letter {
                chunks.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn break_long_chunk(chunks: &mut [Vec<char>], line: &mut Vec<Vec<char>>, space_left: usize) {
    let Some(chunk) = chunks.last_mut() else {
        return;
    };
    if space_left == 0 {
        return;
    }

    let mut end = space_left;
    if let Some(hyphen) = chunk[..space_left].iter().rposition(|ch| *ch == '-') {
        if hyphen > 0 && chunk[..hyphen].iter().any(|ch| *ch != '-') {
            end = hyphen + 1;
        }
    }
    let rest = chunk.split_off(end);
    line.push(std::mem::replace(chunk, rest));
}

fn is_blank(chunk: &[char]) -> bool {
    chunk.iter().all(|ch| *ch == ' ')
}
