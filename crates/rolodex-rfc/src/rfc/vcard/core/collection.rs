//! vCard document collections.

use std::ops::Index;

use super::property::names;
use super::vcard::VCard;
use crate::error::RfcResult;
use crate::rfc::vcard::index::{SearchKind, VCardIndexer};
use crate::rfc::vcard::parse::{ParseError, ParseErrorKind};

/// Position of a document inside a [`VCardSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub(crate) usize);

impl CardId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An arena of vCards sharing at most one indexer.
///
/// Documents are addressed by [`CardId`]; the indexer owned by the set maps
/// names, phones, groups, and property values back to those ids.
#[derive(Debug, Clone, Default)]
pub struct VCardSet {
    cards: Vec<VCard>,
    indexer: Option<VCardIndexer>,
}

impl VCardSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set that indexes every document inserted into it.
    #[must_use]
    pub fn with_indexer(indexer: VCardIndexer) -> Self {
        Self {
            cards: Vec::new(),
            indexer: Some(indexer),
        }
    }

    /// ## Summary
    /// Attaches an indexer, cataloguing every document already in the set.
    /// Any previously attached indexer is returned.
    pub fn set_indexer(&mut self, mut indexer: VCardIndexer) -> Option<VCardIndexer> {
        for (i, card) in self.cards.iter_mut().enumerate() {
            indexer.index_card(card, CardId(i));
            card.set_indexer(Some(indexer.id()));
        }
        self.indexer.replace(indexer)
    }

    #[must_use]
    pub const fn indexer(&self) -> Option<&VCardIndexer> {
        self.indexer.as_ref()
    }

    /// ## Summary
    /// Adds a document, indexing it when the set has an indexer.
    ///
    /// ## Errors
    /// Returns a format error if the document has no VERSION property.
    pub fn insert(&mut self, mut card: VCard) -> RfcResult<CardId> {
        if !card.contains(names::VERSION) {
            return Err(ParseError::new(
                ParseErrorKind::MissingVersion,
                0,
                "vCard has no VERSION property",
            )
            .into());
        }

        let id = CardId(self.cards.len());
        card.set_indexer(None);
        if let Some(indexer) = self.indexer.as_mut() {
            indexer.index_card(&card, id);
            card.set_indexer(Some(indexer.id()));
        }
        self.cards.push(card);
        Ok(id)
    }

    /// ## Summary
    /// Moves every document of `other` into this set, re-indexing them
    /// against this set's indexer.
    ///
    /// ## Errors
    /// Returns a format error if a document has no VERSION property.
    pub fn extend(&mut self, other: Self) -> RfcResult<Vec<CardId>> {
        other.cards.into_iter().map(|card| self.insert(card)).collect()
    }

    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&VCard> {
        self.cards.get(id.0)
    }

    #[must_use]
    pub fn cards(&self) -> &[VCard] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VCard> {
        self.cards.iter()
    }

    /// Iterates documents together with their ids.
    pub fn entries(&self) -> impl Iterator<Item = (CardId, &VCard)> {
        self.cards.iter().enumerate().map(|(i, c)| (CardId(i), c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<VCard> {
        self.cards
    }

    fn indexed(&self, indexsearch: bool) -> Option<&VCardIndexer> {
        self.indexer.as_ref().filter(|_| indexsearch)
    }

    fn scan(&self, pred: impl Fn(&VCard) -> bool) -> Vec<CardId> {
        self.entries()
            .filter(|(_, card)| pred(card))
            .map(|(id, _)| id)
            .collect()
    }

    /// Finds documents by formatted or structured name.
    #[must_use]
    pub fn find_by_name(
        &self,
        query: &str,
        case: bool,
        fullmatch: bool,
        indexsearch: bool,
    ) -> Vec<CardId> {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.find_by_name(query, case, fullmatch),
            None => self.scan(|c| c.find_by_name(query, case, fullmatch)),
        }
    }

    /// Finds documents by property group.
    #[must_use]
    pub fn find_by_group(
        &self,
        query: &str,
        case: bool,
        fullmatch: bool,
        indexsearch: bool,
    ) -> Vec<CardId> {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.find_by_group(query, case, fullmatch),
            None => self.scan(|c| c.find_by_group(query, case, fullmatch)),
        }
    }

    /// Finds documents by telephone number.
    #[must_use]
    pub fn find_by_phone(
        &self,
        number: &str,
        fullmatch: bool,
        parsestr: bool,
        indexsearch: bool,
    ) -> Vec<CardId> {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.find_by_phone(number, fullmatch, parsestr),
            None => self.scan(|c| c.find_by_phone(number, fullmatch, parsestr)),
        }
    }

    #[must_use]
    pub fn find_by_phone_startswith(
        &self,
        number: &str,
        parsestr: bool,
        indexsearch: bool,
    ) -> Vec<CardId> {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.find_by_phone_startswith(number, parsestr),
            None => self.scan(|c| c.find_by_phone_startswith(number, parsestr)),
        }
    }

    #[must_use]
    pub fn find_by_phone_endswith(
        &self,
        number: &str,
        parsestr: bool,
        indexsearch: bool,
    ) -> Vec<CardId> {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.find_by_phone_endswith(number, parsestr),
            None => self.scan(|c| c.find_by_phone_endswith(number, parsestr)),
        }
    }

    /// Finds documents by property name and joined value.
    ///
    /// The indexer only answers this when it was built with parameter
    /// indexing enabled; otherwise pass `indexsearch = false` to scan.
    #[must_use]
    pub fn find_by_property(
        &self,
        name: &str,
        value: &str,
        fullmatch: bool,
        indexsearch: bool,
    ) -> Vec<CardId> {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.find_by_property(name, value, fullmatch),
            None => self.scan(|c| c.find_by_property(name, value, fullmatch)),
        }
    }

    /// Finds documents by joined value of any property.
    #[must_use]
    pub fn find_by_value(&self, value: &str, fullmatch: bool, indexsearch: bool) -> Vec<CardId> {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.find_by_value(value, fullmatch),
            None => self.scan(|c| c.find_by_value(value, fullmatch)),
        }
    }

    /// ## Summary
    /// Finds documents whose keys of `kind` score at or above `threshold`
    /// under the caller's `score_fn(candidate, value)`.
    #[must_use]
    pub fn difference_search<T, F>(
        &self,
        kind: &SearchKind,
        value: &str,
        score_fn: F,
        threshold: T,
        indexsearch: bool,
    ) -> Vec<CardId>
    where
        T: PartialOrd,
        F: Fn(&str, &str) -> T,
    {
        match self.indexed(indexsearch) {
            Some(indexer) => indexer.difference_search(kind, value, score_fn, threshold),
            None => self.scan(|c| {
                c.search_keys(kind)
                    .iter()
                    .any(|key| score_fn(key, value) >= threshold)
            }),
        }
    }
}

impl Index<CardId> for VCardSet {
    type Output = VCard;

    fn index(&self, id: CardId) -> &Self::Output {
        &self.cards[id.0]
    }
}

impl IntoIterator for VCardSet {
    type Item = VCard;
    type IntoIter = std::vec::IntoIter<VCard>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}

impl<'a> IntoIterator for &'a VCardSet {
    type Item = &'a VCard;
    type IntoIter = std::slice::Iter<'a, VCard>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::{ConstructOptions, VCardProperty, VCardValue, VCardVersion};

    fn card(name: &str, phone: &str) -> VCard {
        let prop = |n: &str, v: &str| {
            VCardProperty::from_values(
                None,
                n,
                Vec::new(),
                vec![VCardValue::from(v)],
                VCardVersion::V4,
                &ConstructOptions::default(),
            )
            .unwrap()
        };
        VCard::from_properties(vec![
            prop("VERSION", "4.0"),
            prop("FN", name),
            prop("TEL", phone),
        ])
        .unwrap()
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut set = VCardSet::new();
        let a = set.insert(card("Alice", "111")).unwrap();
        let b = set.insert(card("Bob", "222")).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(set[b].contact_name().as_deref(), Some("Bob"));
    }

    #[test]
    fn insert_tags_card_with_indexer() {
        let mut set = VCardSet::with_indexer(VCardIndexer::new(false));
        let id = set.insert(card("Alice", "111")).unwrap();
        let indexer_id = set.indexer().map(VCardIndexer::id);
        assert_eq!(set[id].indexer(), indexer_id);
        assert_eq!(set.find_by_name("alice", false, true, true), vec![id]);
    }

    #[test]
    fn indexed_and_scanned_searches_agree() {
        let mut set = VCardSet::with_indexer(VCardIndexer::new(true));
        set.insert(card("Alice", "8 (999) 123")).unwrap();
        set.insert(card("Bob", "222")).unwrap();

        for indexsearch in [true, false] {
            assert_eq!(set.find_by_phone("123", false, true, indexsearch).len(), 1);
            assert_eq!(set.find_by_name("bo", false, false, indexsearch).len(), 1);
            assert_eq!(set.find_by_value("4.0", true, indexsearch).len(), 2);
        }
    }

    #[test]
    fn set_indexer_catalogues_existing_cards() {
        let mut set = VCardSet::new();
        let id = set.insert(card("Alice", "111")).unwrap();
        assert!(set.set_indexer(VCardIndexer::new(false)).is_none());
        assert_eq!(set.find_by_phone("111", true, true, true), vec![id]);
        assert!(set[id].indexer().is_some());
    }

    #[test]
    fn extend_reindexes_incoming_cards() {
        let mut other = VCardSet::new();
        other.insert(card("Carol", "333")).unwrap();

        let mut set = VCardSet::with_indexer(VCardIndexer::new(false));
        set.insert(card("Alice", "111")).unwrap();
        let ids = set.extend(other).unwrap();

        assert_eq!(ids, vec![CardId(1)]);
        assert_eq!(set.find_by_name("Carol", true, true, true), ids);
    }

    #[test]
    fn difference_search_scan_fallback() {
        let mut set = VCardSet::new();
        set.insert(card("Alice", "111")).unwrap();
        set.insert(card("Alicia", "222")).unwrap();

        let prefix_len = |a: &str, b: &str| a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count();
        let found = set.difference_search(&SearchKind::Name, "Alic", prefix_len, 4, true);
        assert_eq!(found.len(), 2);
    }
}
