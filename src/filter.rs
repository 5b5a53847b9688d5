//! Predicate filtering over a user's collection.
//!
//! Every field of [`CollectionFilter`] that is set narrows the result; unset
//! fields impose nothing. Filtering never touches the source entries.

use crate::types::{CollectionEntry, Subtype};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionFilter {
    pub subtype: Option<Subtype>,
    pub own: Option<bool>,
    pub prevowned: Option<bool>,
    pub fortrade: Option<bool>,
    pub want: Option<bool>,
    pub wanttoplay: Option<bool>,
    pub wanttobuy: Option<bool>,
    pub wishlist: Option<bool>,
    pub preordered: Option<bool>,
    pub has_rating: Option<bool>,
    pub has_comment: Option<bool>,
    pub wishlistpriority: Option<i32>,
    pub yearpublished: Option<i32>,
    /// Strictly before this year.
    pub published_before: Option<i32>,
    /// Strictly after this year.
    pub published_after: Option<i32>,
    pub min_numplays: Option<i32>,
    pub max_numplays: Option<i32>,
}

impl CollectionFilter {
    pub fn matches(&self, entry: &CollectionEntry) -> bool {
        let flags = [
            (self.own, entry.own),
            (self.prevowned, entry.prevowned),
            (self.fortrade, entry.fortrade),
            (self.want, entry.want),
            (self.wanttoplay, entry.wanttoplay),
            (self.wanttobuy, entry.wanttobuy),
            (self.wishlist, entry.wishlist),
            (self.preordered, entry.preordered),
        ];
        if flags
            .iter()
            .any(|(wanted, value)| wanted.is_some_and(|w| *value != i32::from(w)))
        {
            return false;
        }

        if self.subtype.is_some_and(|s| entry.subtype != s.as_str()) {
            return false;
        }
        if self.has_rating.is_some_and(|h| entry.rating.is_some() != h) {
            return false;
        }
        if self.has_comment.is_some_and(|h| entry.comment.is_some() != h) {
            return false;
        }
        if self.wishlistpriority.is_some_and(|p| entry.wishlistpriority != p) {
            return false;
        }

        let year = entry.yearpublished;
        if self.yearpublished.is_some_and(|y| year != y)
            || self.published_before.is_some_and(|y| year >= y)
            || self.published_after.is_some_and(|y| year <= y)
        {
            return false;
        }

        let plays = entry.numplays;
        !(self.min_numplays.is_some_and(|m| plays < m)
            || self.max_numplays.is_some_and(|m| plays > m))
    }

    /// A new list with the matching entries, source order preserved.
    pub fn apply(&self, entries: &[CollectionEntry]) -> Vec<CollectionEntry> {
        entries
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }
}
