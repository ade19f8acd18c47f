//! In-memory annotation buffer keyed by page.
//!
//! The buffer is the codec-side snapshot of everything placed on an answer
//! sheet. Live surfaces come and go with page/scale changes; whatever was
//! flushed here survives them.

use std::collections::BTreeMap;

use super::record::Annotation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationBuffer {
    pages: BTreeMap<u32, Vec<Annotation>>,
}

impl AnnotationBuffer {
    /// Group a flat record list (as returned by the store) by page.
    pub fn from_records(records: Vec<Annotation>) -> Self {
        let mut buffer = Self::default();
        for record in records {
            buffer
                .pages
                .entry(record.page_number)
                .or_default()
                .push(record);
        }
        buffer
    }

    /// Replace everything buffered for one page. An empty list clears the page.
    pub fn replace_page(&mut self, page_number: u32, records: Vec<Annotation>) {
        if records.is_empty() {
            self.pages.remove(&page_number);
        } else {
            self.pages.insert(page_number, records);
        }
    }

    pub fn page(&self, page_number: u32) -> &[Annotation] {
        self.pages
            .get(&page_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The full set for the answer sheet: the union across all pages.
    pub fn to_records(&self) -> Vec<Annotation> {
        self.pages.values().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
