//! A paginated corpus flattened into one char buffer.
//!
//! Pages are joined with a single space; page start/end offsets map any
//! buffer position back to its page with a binary search.

use crate::normalize::normalize;

/// Start/end offsets of one page inside the book buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOffset {
    pub start: usize,
    pub end: usize, // exclusive
}

impl PageOffset {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Normalized pages concatenated into a single owned buffer.
#[derive(Debug, Clone)]
pub struct Book {
    text: Vec<char>,
    offsets: Vec<PageOffset>,
}

impl Book {
    /// Normalize every page and join them with a single space.
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Self {
        let normalized: Vec<String> = pages.iter().map(|p| normalize(p.as_ref())).collect();
        Self::from_normalized(&normalized)
    }

    /// Join already-normalized pages.
    pub fn from_normalized<S: AsRef<str>>(pages: &[S]) -> Self {
        let mut text = Vec::new();
        let mut offsets = Vec::with_capacity(pages.len());

        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            let start = text.len();
            text.extend(page.as_ref().chars());
            offsets.push(PageOffset {
                start,
                end: text.len(),
            });
        }

        Self { text, offsets }
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn offset(&self, page: usize) -> PageOffset {
        self.offsets[page]
    }

    /// Chars of one page, without the separator.
    pub fn page(&self, page: usize) -> &[char] {
        let offset = self.offsets[page];
        &self.text[offset.start..offset.end]
    }

    /// Page containing buffer position `pos`.
    ///
    /// A separator position belongs to the page before it. `None` only for
    /// an empty book.
    pub fn page_of(&self, pos: usize) -> Option<usize> {
        if self.offsets.is_empty() {
            return None;
        }
        // Number of pages starting at or before pos
        let idx = self.offsets.partition_point(|offset| offset.start <= pos);
        Some(idx.saturating_sub(1))
    }

    /// Buffer built from the last `seam_len` chars of `left` followed by a
    /// space and the first `seam_len` chars of `left + 1`.
    pub fn seam(&self, left: usize, seam_len: usize) -> Vec<char> {
        let tail = self.page(left);
        let head = self.page(left + 1);
        let tail = &tail[tail.len().saturating_sub(seam_len)..];
        let head = &head[..head.len().min(seam_len)];

        let mut seam = Vec::with_capacity(tail.len() + head.len() + 1);
        seam.extend_from_slice(tail);
        seam.push(' ');
        seam.extend_from_slice(head);
        seam
    }
}
