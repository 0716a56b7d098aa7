//! Search index over a collection of vCards.
//!
//! The indexer maps keys (names, phone numbers, groups, and optionally every
//! property's joined value) to the [`CardId`]s of the documents carrying them.
//! Tables only grow; a document is never un-indexed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use icu::casemap::CaseMapper;
use rolodex_core::config::ParserConfig;

use crate::rfc::vcard::core::{CardId, VCard, VCardProperty, names};

static NEXT_INDEXER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle identifying the indexer that catalogued a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexerId(u64);

impl IndexerId {
    fn next() -> Self {
        Self(NEXT_INDEXER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which keys a search looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKind {
    /// FN values and `;`-joined N values.
    Name,
    /// TEL values, raw and digits-only.
    Phone,
    /// Property groups.
    Group,
    /// Joined values of the named property, or of every property when `None`.
    Property(Option<String>),
}

/// Keeps only ASCII digits.
#[must_use]
pub fn normalize_phone(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

/// Name key of a property: FN's first value, or N's values joined by `;`.
pub(crate) fn name_key(property: &VCardProperty) -> Option<String> {
    if property.is(names::FN) {
        property.values.first().map(|v| v.to_text().into_owned())
    } else if property.is(names::N) {
        Some(property.joined_values())
    } else {
        None
    }
}

/// Phone keys of a TEL property: the raw text and its digits.
pub(crate) fn phone_keys(property: &VCardProperty) -> Option<(String, String)> {
    if !property.is(names::TEL) {
        return None;
    }
    let raw = property.values.first()?.to_text().into_owned();
    let digits = normalize_phone(&raw);
    Some((raw, digits))
}

/// Text comparison for names and groups. Case-insensitive comparison uses
/// Unicode case folding.
pub(crate) fn text_matches(key: &str, query: &str, case: bool, fullmatch: bool) -> bool {
    if case {
        return if fullmatch {
            key == query
        } else {
            key.contains(query)
        };
    }

    let folder = CaseMapper::new();
    let key = folder.fold_string(key);
    let query = folder.fold_string(query);
    if fullmatch {
        key == query
    } else {
        key.contains(query.as_ref())
    }
}

pub(crate) fn value_matches(key: &str, value: &str, fullmatch: bool) -> bool {
    if fullmatch {
        key == value
    } else {
        key.contains(value)
    }
}

fn push_unique(list: &mut Vec<CardId>, card: CardId) {
    if list.last() != Some(&card) {
        list.push(card);
    }
}

/// Collects the ids stored under every key accepted by `pred`, sorted and
/// without duplicates.
fn collect<'a>(
    tables: impl IntoIterator<Item = &'a HashMap<String, Vec<CardId>>>,
    pred: impl Fn(&str) -> bool,
) -> Vec<CardId> {
    let mut found: Vec<CardId> = tables
        .into_iter()
        .flat_map(HashMap::iter)
        .filter(|(key, _)| pred(key))
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect();
    found.sort_unstable();
    found.dedup();
    found
}

/// Incremental search index.
///
/// Names, phones, and groups are always catalogued. The generic
/// property table is filled only when built with `index_params`; FN, N, and
/// TEL live in their own tables and are not repeated there.
#[derive(Debug, Clone)]
pub struct VCardIndexer {
    id: IndexerId,
    index_params: bool,
    names: HashMap<String, Vec<CardId>>,
    phones: HashMap<String, Vec<CardId>>,
    groups: HashMap<String, Vec<CardId>>,
    params: HashMap<String, HashMap<String, Vec<CardId>>>,
}

impl Default for VCardIndexer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl VCardIndexer {
    #[must_use]
    pub fn new(index_params: bool) -> Self {
        Self {
            id: IndexerId::next(),
            index_params,
            names: HashMap::new(),
            phones: HashMap::new(),
            groups: HashMap::new(),
            params: HashMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.index_params)
    }

    #[must_use]
    pub const fn id(&self) -> IndexerId {
        self.id
    }

    #[must_use]
    pub const fn indexes_params(&self) -> bool {
        self.index_params
    }

    /// ## Summary
    /// Catalogues one property of document `card`.
    pub fn index(&mut self, property: &VCardProperty, card: CardId) {
        if let Some(group) = &property.group {
            push_unique(self.groups.entry(group.clone()).or_default(), card);
        }

        if let Some(key) = name_key(property) {
            push_unique(self.names.entry(key).or_default(), card);
        } else if let Some((raw, digits)) = phone_keys(property) {
            push_unique(self.phones.entry(raw).or_default(), card);
            push_unique(self.phones.entry(digits).or_default(), card);
        } else if self.index_params {
            let table = self.params.entry(property.name.clone()).or_default();
            push_unique(table.entry(property.joined_values()).or_default(), card);
        }
    }

    /// Catalogues every property of a document.
    pub fn index_card(&mut self, vcard: &VCard, card: CardId) {
        for property in vcard {
            self.index(property, card);
        }
        tracing::trace!(card = card.index(), properties = vcard.len(), "Indexed vCard");
    }

    /// Number of distinct name and phone keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len() + self.phones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact name lookup.
    #[must_use]
    pub fn get_name(&self, name: &str) -> &[CardId] {
        self.names.get(name).map_or(&[], Vec::as_slice)
    }

    /// Exact phone lookup, raw or digits-only.
    #[must_use]
    pub fn get_phone(&self, phone: &str) -> &[CardId] {
        self.phones.get(phone).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn get_group(&self, group: &str) -> &[CardId] {
        self.groups.get(group).map_or(&[], Vec::as_slice)
    }

    /// Exact lookup of a property's joined value in the generic table.
    #[must_use]
    pub fn get_param(&self, name: &str, value: &str) -> &[CardId] {
        self.params
            .get(&name.to_ascii_uppercase())
            .and_then(|table| table.get(value))
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn find_by_name(&self, query: &str, case: bool, fullmatch: bool) -> Vec<CardId> {
        if case && fullmatch {
            return self.get_name(query).to_vec();
        }
        collect([&self.names], |key| {
            text_matches(key, query, case, fullmatch)
        })
    }

    #[must_use]
    pub fn find_by_group(&self, query: &str, case: bool, fullmatch: bool) -> Vec<CardId> {
        if case && fullmatch {
            return self.get_group(query).to_vec();
        }
        collect([&self.groups], |key| {
            text_matches(key, query, case, fullmatch)
        })
    }

    /// With `parsestr`, stored numbers are compared digits only.
    #[must_use]
    pub fn find_by_phone(&self, number: &str, fullmatch: bool, parsestr: bool) -> Vec<CardId> {
        self.phone_search(parsestr, |phone| {
            if fullmatch {
                phone == number
            } else {
                phone.contains(number)
            }
        })
    }

    #[must_use]
    pub fn find_by_phone_startswith(&self, number: &str, parsestr: bool) -> Vec<CardId> {
        self.phone_search(parsestr, |phone| phone.starts_with(number))
    }

    #[must_use]
    pub fn find_by_phone_endswith(&self, number: &str, parsestr: bool) -> Vec<CardId> {
        self.phone_search(parsestr, |phone| phone.ends_with(number))
    }

    fn phone_search(&self, parsestr: bool, pred: impl Fn(&str) -> bool) -> Vec<CardId> {
        collect([&self.phones], |key| {
            if parsestr {
                pred(&normalize_phone(key))
            } else {
                pred(key)
            }
        })
    }

    /// Searches the generic table of one property. Empty unless the indexer
    /// was built with `index_params`.
    #[must_use]
    pub fn find_by_property(&self, name: &str, value: &str, fullmatch: bool) -> Vec<CardId> {
        collect(self.params.get(&name.to_ascii_uppercase()), |key| {
            value_matches(key, value, fullmatch)
        })
    }

    #[must_use]
    pub fn find_by_value(&self, value: &str, fullmatch: bool) -> Vec<CardId> {
        collect(self.params.values(), |key| {
            value_matches(key, value, fullmatch)
        })
    }

    /// ## Summary
    /// Returns documents with a key of `kind` for which
    /// `score_fn(key, value) >= threshold`. The scoring function is the
    /// caller's; the indexer only walks its keys.
    #[must_use]
    pub fn difference_search<T, F>(
        &self,
        kind: &SearchKind,
        value: &str,
        score_fn: F,
        threshold: T,
    ) -> Vec<CardId>
    where
        T: PartialOrd,
        F: Fn(&str, &str) -> T,
    {
        let accept = |key: &str| score_fn(key, value) >= threshold;
        match kind {
            SearchKind::Name => collect([&self.names], accept),
            SearchKind::Phone => collect([&self.phones], accept),
            SearchKind::Group => collect([&self.groups], accept),
            SearchKind::Property(None) => collect(self.params.values(), accept),
            SearchKind::Property(Some(name)) => {
                collect(self.params.get(&name.to_ascii_uppercase()), accept)
            }
        }
    }
}
