use crate::model::PAGE_SIZE;

/// Inputs of a roster fetch. Matching over name/email/phone is done by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub page: u32,
    pub limit: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self { term: String::new(), page: 1, limit: PAGE_SIZE }
    }
}

impl SearchQuery {
    /// Replace the search term. A changed term always starts again from page 1.
    /// Returns whether the query changed.
    pub fn set_term(&mut self, term: &str) -> bool {
        if self.term == term {
            return false;
        }
        self.term = term.to_string();
        self.page = 1;
        true
    }

    /// Advance one page if `total_pages` allows it.
    pub fn next_page(&mut self, total_pages: u32) -> bool {
        if self.page < total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Query-string pairs in the order the list endpoint documents them.
    pub fn params(&self) -> [(&'static str, String); 3] {
        [
            ("search", self.term.clone()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

pub fn page_label(page: u32, total_pages: u32) -> String {
    format!("Page {} of {}", page, total_pages.max(1))
}
