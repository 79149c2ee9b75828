//! Domain records and their status transitions.
//!
//! Stores hand out immutable [`RecordSet`] snapshots. A transition either
//! returns a fresh snapshot (exactly one record replaced, added or dropped)
//! or the very same snapshot when nothing matched, so callers can skip the
//! write with [`RecordSet::same_snapshot`].

use crate::auth::{Action, Role, User};
use crate::scope::{self, Scoped};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Closed string enum with fixed wire labels.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.label() == s.trim())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

pub mod assets;
pub mod attendance;
pub mod fees;
pub mod requests;
pub mod rooms;
pub mod students;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Record: Clone {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct RecordSet<T> {
    items: Arc<Vec<T>>,
}

impl<T: Record> RecordSet<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|r| r.id() == id)
    }

    /// True when both handles point at the same snapshot.
    pub fn same_snapshot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Replaces the record with `id` by `f(record)`. `f` returning `None`,
    /// or no record with that id, yields this snapshot unchanged.
    pub fn replace_one<F>(&self, id: &str, f: F) -> Self
    where
        F: FnOnce(&T) -> Option<T>,
    {
        let Some(idx) = self.items.iter().position(|r| r.id() == id) else {
            return self.clone();
        };
        let Some(next) = f(&self.items[idx]) else {
            return self.clone();
        };
        let mut items = Vec::with_capacity(self.items.len());
        items.extend_from_slice(&self.items[..idx]);
        items.push(next);
        items.extend_from_slice(&self.items[idx + 1..]);
        Self::new(items)
    }

    pub fn prepend(&self, record: T) -> Self {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(record);
        items.extend_from_slice(&self.items);
        Self::new(items)
    }

    pub fn remove(&self, id: &str) -> Self {
        if self.get(id).is_none() {
            return self.clone();
        }
        Self::new(self.items.iter().filter(|r| r.id() != id).cloned().collect())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{role} may not perform {action}")]
    Forbidden { role: Role, action: Action },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Who is acting, and when. Derived fields (dates, transaction ids) come
/// from here so transitions stay deterministic under test.
#[derive(Debug, Clone)]
pub struct Actor<'a> {
    pub user: &'a User,
    pub at: DateTime<Utc>,
}

impl<'a> Actor<'a> {
    pub fn now(user: &'a User) -> Self {
        Self {
            user,
            at: Utc::now(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.at.date_naive()
    }

    pub fn today_str(&self) -> String {
        self.today().format(DATE_FORMAT).to_string()
    }

    pub fn require(&self, action: Action) -> Result<(), TransitionError> {
        if self.user.role.permits(action) {
            Ok(())
        } else {
            tracing::debug!(role = %self.user.role, %action, "transition refused");
            Err(TransitionError::Forbidden {
                role: self.user.role,
                action,
            })
        }
    }
}

/// Gated, scoped single-record replacement. Records the actor cannot see
/// count as missing.
pub fn transition<T, F>(
    set: &RecordSet<T>,
    actor: &Actor<'_>,
    action: Action,
    id: &str,
    f: F,
) -> Result<RecordSet<T>, TransitionError>
where
    T: Record + Scoped,
    F: FnOnce(&T) -> Option<T>,
{
    actor.require(action)?;
    Ok(set.replace_one(id, |r| {
        if scope::is_visible(r, actor.user) {
            f(r)
        } else {
            None
        }
    }))
}

/// Gated, scoped removal.
pub fn remove_visible<T>(
    set: &RecordSet<T>,
    actor: &Actor<'_>,
    action: Action,
    id: &str,
) -> Result<RecordSet<T>, TransitionError>
where
    T: Record + Scoped,
{
    actor.require(action)?;
    match set.get(id) {
        Some(r) if scope::is_visible(r, actor.user) => Ok(set.remove(id)),
        _ => Ok(set.clone()),
    }
}

/// Case-insensitive substring match; an empty needle matches.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Zero-padded `YYYY-MM-DD` form of any date `parse_date` accepts, so
/// `2024-4-1` and `2024-04-01` key the same day.
pub fn canonical_date(s: &str) -> Option<String> {
    parse_date(s).map(|d| d.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use chrono::TimeZone;

    pub fn actor_at(user: &User) -> Actor<'_> {
        Actor {
            user,
            at: Utc.with_ymd_and_hms(2024, 4, 3, 9, 30, 0).unwrap(),
        }
    }

    pub const TODAY: &str = "2024-04-03";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str, u32);

    impl Record for Item {
        fn id(&self) -> &str {
            self.0
        }
    }

    fn set() -> RecordSet<Item> {
        RecordSet::new(vec![Item("a", 1), Item("b", 2), Item("c", 3)])
    }

    #[test]
    fn replace_one_on_missing_id_keeps_snapshot() {
        let s = set();
        let next = s.replace_one("zz", |r| Some(Item(r.0, 99)));
        assert!(next.same_snapshot(&s));
    }

    #[test]
    fn replace_one_declined_keeps_snapshot() {
        let s = set();
        let next = s.replace_one("b", |_| None);
        assert!(next.same_snapshot(&s));
    }

    #[test]
    fn replace_one_produces_new_snapshot_and_keeps_order() {
        let s = set();
        let next = s.replace_one("b", |r| Some(Item(r.0, r.1 * 10)));
        assert!(!next.same_snapshot(&s));
        assert_eq!(next.as_slice(), &[Item("a", 1), Item("b", 20), Item("c", 3)]);
        assert_eq!(s.as_slice()[1], Item("b", 2));
    }

    #[test]
    fn prepend_and_remove() {
        let s = set();
        let added = s.prepend(Item("z", 0));
        assert_eq!(added.as_slice()[0], Item("z", 0));
        assert_eq!(added.len(), 4);

        let removed = added.remove("b");
        assert_eq!(removed.len(), 3);
        assert!(removed.get("b").is_none());
        assert!(removed.remove("nope").same_snapshot(&removed));
    }

    #[test]
    fn contains_ci_matches_case_insensitively() {
        assert!(contains_ci("John Doe", "john"));
        assert!(contains_ci("A-101", ""));
        assert!(!contains_ci("A-101", "b-"));
    }
}
