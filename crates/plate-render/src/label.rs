//! Fitting category names inside a well.

use crate::settings::RenderSettings;

/// A wrapped label with its font size and per-line vertical offsets from
/// the well center (pixels, positive is down).
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub lines: Vec<String>,
    pub font_size_pt: f32,
    pub offsets: Vec<f32>,
}

/// Splits a word after each hyphen that joins two letter runs, so
/// "Anti-CD3" becomes "Anti-" and "CD3".
fn hyphen_chunks(word: &str) -> Vec<Vec<char>> {
    let chars: Vec<char> = word.chars().collect();
    let letter = |i: usize| chars.get(i).is_some_and(|c| c.is_alphabetic());
    let mut chunks = vec![];
    let mut start = 0;
    for (idx, ch) in chars.iter().enumerate() {
        let breakable = *ch == '-'
            && idx >= 2
            && letter(idx - 2)
            && letter(idx - 1)
            && letter(idx + 1)
            && (letter(idx + 2) || chars.get(idx + 2) == Some(&'-') && letter(idx + 3));
        if breakable {
            chunks.push(chars[start..=idx].to_vec());
            start = idx + 1;
        }
    }
    chunks.push(chars[start..].to_vec());
    chunks
}

/// How much of an over-long chunk goes onto a line with `space_left`
/// columns: up to the last hyphen in reach, otherwise all of it.
fn long_chunk_split(chunk: &[char], space_left: usize) -> usize {
    chunk[..space_left]
        .iter()
        .rposition(|c| *c == '-')
        .filter(|&hyphen| hyphen > 0 && chunk[..hyphen].iter().any(|c| *c != '-'))
        .map(|hyphen| hyphen + 1)
        .unwrap_or(space_left)
}

/// Greedy word wrap. Hyphenated words may break after the hyphen. Chunks
/// longer than `width` fill the rest of the current line and continue on
/// the following ones.
pub fn wrap_label(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines: Vec<String> = vec![];
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        for (chunk_index, chunk) in hyphen_chunks(word).into_iter().enumerate() {
            let mut rest = chunk;
            let mut new_word = chunk_index == 0;
            while !rest.is_empty() {
                let sep = usize::from(current_len > 0 && new_word);
                if current_len + sep + rest.len() <= width {
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.extend(rest.iter());
                    current_len += sep + rest.len();
                    break;
                }
                if rest.len() > width {
                    let space_left = width.saturating_sub(current_len + sep);
                    if space_left > 0 {
                        if sep == 1 {
                            current.push(' ');
                        }
                        let end = long_chunk_split(&rest, space_left);
                        current.extend(rest[..end].iter());
                        rest.drain(..end);
                    }
                }
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                new_word = false;
            }
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

pub fn font_size_for_lines(line_count: usize, settings: &RenderSettings) -> f32 {
    (settings.max_font_size_pt - line_count as f32).max(settings.min_font_size_pt)
}

/// Wraps, sizes and vertically centers a label. `None` for blank labels.
pub fn layout_label(text: &str, settings: &RenderSettings) -> Option<LabelLayout> {
    if text.trim().is_empty() {
        return None;
    }
    let lines = wrap_label(text, settings.max_chars_per_line);
    let spacing = settings.line_spacing_px();
    let middle = (lines.len() as f32 - 1.0) / 2.0;
    let offsets = (0..lines.len())
        .map(|idx| (idx as f32 - middle) * spacing)
        .collect();
    Some(LabelLayout {
        font_size_pt: font_size_for_lines(lines.len(), settings),
        lines,
        offsets,
    })
}
