//! Markdown-aware text splitting.
//!
//! Documents are cut along structural boundaries (headings and blank-line
//! paragraph breaks) where possible, with a fixed-width character window as
//! the fallback for oversized blocks. Consecutive chunks share up to
//! `overlap` characters of context so meaning is not lost at cut points.

/// Splits raw document text into overlapping, bounded-size chunks.
///
/// All sizes are Unicode scalar counts, never byte offsets. Splitting is
/// fully deterministic: the same input and parameters always produce the
/// same chunk sequence.
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(800, 100)
    }
}

impl Chunker {
    /// Precondition: `chunk_size > overlap`. `Config::validate` enforces
    /// this before an engine is ever constructed.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be greater than zero");
        assert!(overlap < chunk_size, "overlap must be smaller than chunk_size");
        Self {
            chunk_size,
            overlap,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for block in structural_blocks(text) {
            let block_len = char_len(&block);

            if block_len > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.extend(self.slide(&block));
                continue;
            }

            let current_len = char_len(&current);
            let separator = if current.is_empty() { 0 } else { 2 };

            if current_len + separator + block_len > self.chunk_size {
                chunks.push(std::mem::take(&mut current));

                // Carry trailing context of the flushed chunk into the next
                // one, trimmed so the size bound still holds.
                if self.overlap > 0 {
                    let budget = self.chunk_size.saturating_sub(block_len + 2);
                    let carry =
                        char_suffix(chunks.last().map(String::as_str).unwrap_or(""), self.overlap.min(budget));
                    current.push_str(carry);
                }
            }

            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(&block);
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// Fixed-width fallback for a block that exceeds `chunk_size` on its
    /// own: contiguous windows stepping by `chunk_size - overlap`.
    fn slide(&self, block: &str) -> Vec<String> {
        let chars: Vec<char> = block.chars().collect();
        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            windows.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start = end - self.overlap;
        }

        windows
    }
}

/// Split text into structural blocks: a heading line always starts a new
/// block, a blank line ends the current one.
fn structural_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else if line.trim_start().starts_with('#') {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
            current.push(line);
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of `s`, respecting char boundaries.
fn char_suffix(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if len <= n {
        return s;
    }
    let skip = len - n;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}
