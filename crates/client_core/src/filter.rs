//! Case-insensitive substring search over directory and catalog records.

use shared::domain::{Application, Business, Location};

/// A record that exposes the text fields a search query is matched against.
pub trait Searchable {
    fn search_fields(&self) -> impl Iterator<Item = &str>;
}

impl Searchable for Location {
    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.name.as_str()),
            Some(self.address.as_str()),
            Some(self.city.as_str()),
            Some(self.state.as_str()),
            self.phone.as_deref(),
            self.email.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

impl Searchable for Business {
    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.chain_name.as_str(),
            self.dba_name.as_str(),
            self.legal_name.as_str(),
        ]
        .into_iter()
    }
}

impl Searchable for Application {
    fn search_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
    }
}

/// Lowercased needle, or `None` when the query is blank and filtering is off.
fn needle(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    }
}

fn contains_needle(record: &impl Searchable, needle: &str) -> bool {
    record
        .search_fields()
        .any(|field| field.to_lowercase().contains(needle))
}

pub fn matches(record: &impl Searchable, query: &str) -> bool {
    match needle(query) {
        Some(needle) => contains_needle(record, &needle),
        None => true,
    }
}

/// Records matching `query` on any searched field, in input order.
pub fn filter<'a, T: Searchable>(records: &'a [T], query: &str) -> Vec<&'a T> {
    let Some(needle) = needle(query) else {
        return records.iter().collect();
    };

    records
        .iter()
        .filter(|record| contains_needle(*record, &needle))
        .collect()
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
