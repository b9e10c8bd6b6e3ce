//! Paragraph-based text chunking for the context agent.

use std::collections::VecDeque;

/// Text is split on blank lines before being merged into chunks.
pub const SEPARATOR: &str = "\n\n";

/// Split `text` on [`SEPARATOR`] and greedily merge the pieces into chunks of
/// at most `chunk_size` characters, carrying up to `chunk_overlap` characters
/// of trailing pieces into the next chunk.
///
/// A single piece longer than `chunk_size` becomes its own oversized chunk.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let sep_len = SEPARATOR.chars().count();
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0usize;

    for piece in text.split(SEPARATOR).map(str::trim).filter(|s| !s.is_empty()) {
        let len = piece.chars().count();

        if !window.is_empty() && total + sep_len + len > chunk_size {
            chunks.push(join(&window));

            // Drop leading pieces until the carried-over text fits the
            // overlap budget and leaves room for the new piece.
            while let Some(&(_, front_len)) = window.front() {
                let over_overlap = total > chunk_overlap;
                let no_room = total + sep_len + len > chunk_size;
                if !over_overlap && !no_room {
                    break;
                }
                window.pop_front();
                let joined_sep = if window.is_empty() { 0 } else { sep_len };
                total = total.saturating_sub(front_len + joined_sep);
            }
        }

        total += len + if window.is_empty() { 0 } else { sep_len };
        window.push_back((piece, len));
    }

    if !window.is_empty() {
        chunks.push(join(&window));
    }
    chunks
}

fn join(window: &VecDeque<(&str, usize)>) -> String {
    window
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
