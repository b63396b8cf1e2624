//! In-memory page store for the server.
//!
//! Holds the rendered home page and one [`PostSlot`] per post slug. Locks are
//! taken only for the duration of a map access and never held across an
//! `.await`. A poisoned lock is recovered rather than propagated: every write
//! leaves the maps in a consistent state, so a panic elsewhere cannot corrupt
//! them.
//!
//! Not-found slots are remembered so repeated requests for a missing post cost
//! no API calls, but only up to a limit: past [`DEFAULT_MISSING_LIMIT`] the
//! oldest not-found slug is forgotten first.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::hash_page;
use crate::generate::Site;

/// State of one post page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostSlot {
    Ready(String),
    /// Being generated on demand.
    Pending,
    /// The content API has no post with this UID.
    NotFound,
    /// On-demand generation failed with this message.
    Failed(String),
}

#[derive(Debug, Default)]
struct HomeEntry {
    html: String,
    hash: String,
}

/// Not-found slugs kept before the oldest is evicted.
pub const DEFAULT_MISSING_LIMIT: usize = 1024;

#[derive(Debug, Default)]
struct Posts {
    slots: HashMap<String, PostSlot>,
    /// Not-found slugs, oldest first.
    missing: VecDeque<String>,
}

#[derive(Debug)]
pub struct PageStore {
    home: RwLock<Option<HomeEntry>>,
    posts: RwLock<Posts>,
    missing_limit: usize,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::with_missing_limit(DEFAULT_MISSING_LIMIT)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that remembers at most `limit` not-found slugs.
    pub fn with_missing_limit(limit: usize) -> Self {
        Self {
            home: RwLock::default(),
            posts: RwLock::default(),
            missing_limit: limit,
        }
    }

    /// Seed the store with a build's home page and pre-rendered posts.
    pub fn from_site(site: &Site) -> Self {
        let store = Self::new();
        store.set_home(site.home.html.clone());
        {
            let mut posts = write(&store.posts);
            for post in &site.posts {
                posts.slots.insert(post.slug.clone(), PostSlot::Ready(post.html.clone()));
            }
        }
        store
    }

    pub fn home(&self) -> Option<String> {
        read(&self.home).as_ref().map(|entry| entry.html.clone())
    }

    /// Replace the home page. Returns `false` if the HTML is identical to the
    /// page already stored.
    pub fn set_home(&self, html: String) -> bool {
        let hash = hash_page(&html);
        let mut home = write(&self.home);
        if home.as_ref().is_some_and(|entry| entry.hash == hash) {
            return false;
        }
        *home = Some(HomeEntry { html, hash });
        true
    }

    pub fn post(&self, slug: &str) -> Option<PostSlot> {
        read(&self.posts).slots.get(slug).cloned()
    }

    /// Mark `slug` as pending if nothing is known about it yet.
    ///
    /// Returns `true` for exactly one caller per unknown slug; that caller is
    /// responsible for resolving it and calling [`settle`](Self::settle).
    pub fn claim(&self, slug: &str) -> bool {
        let mut posts = write(&self.posts);
        if posts.slots.contains_key(slug) {
            return false;
        }
        posts.slots.insert(slug.to_string(), PostSlot::Pending);
        true
    }

    /// Record the outcome of a resolution.
    ///
    /// Settling a slug as not found may evict the oldest not-found slug, so the
    /// number of remembered missing posts stays within the store's limit.
    pub fn settle(&self, slug: &str, slot: PostSlot) {
        let mut guard = write(&self.posts);
        let posts = &mut *guard;
        let missing = slot == PostSlot::NotFound;
        let previous = posts.slots.insert(slug.to_string(), slot);
        let was_missing = previous == Some(PostSlot::NotFound);

        if was_missing && !missing {
            posts.missing.retain(|s| s != slug);
        }
        if missing && !was_missing {
            posts.missing.push_back(slug.to_string());
            while posts.missing.len() > self.missing_limit {
                let Some(oldest) = posts.missing.pop_front() else {
                    break;
                };
                if posts.slots.get(&oldest) == Some(&PostSlot::NotFound) {
                    posts.slots.remove(&oldest);
                }
            }
        }
    }

    /// Remove a failed slot so the next request resolves again. Returns the
    /// failure message, or `None` if the slot was not failed.
    pub fn take_failure(&self, slug: &str) -> Option<String> {
        let mut posts = write(&self.posts);
        match posts.slots.get(slug) {
            Some(PostSlot::Failed(_)) => match posts.slots.remove(slug) {
                Some(PostSlot::Failed(message)) => Some(message),
                _ => None,
            },
            _ => None,
        }
    }

    /// Forget every not-found slug, so posts published since are picked up.
    /// Returns how many were forgotten.
    pub fn forget_missing(&self) -> usize {
        let mut posts = write(&self.posts);
        posts.missing.clear();
        let before = posts.slots.len();
        posts.slots.retain(|_, slot| *slot != PostSlot::NotFound);
        before - posts.slots.len()
    }

    /// Number of post pages ready to serve.
    pub fn ready_posts(&self) -> usize {
        read(&self.posts)
            .slots
            .values()
            .filter(|slot| matches!(slot, PostSlot::Ready(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratedPost, HomePage};

    #[test]
    fn set_home_reports_changes_only() {
        let store = PageStore::new();
        assert_eq!(store.home(), None);
        assert!(store.set_home("<p>v1</p>".into()));
        assert!(!store.set_home("<p>v1</p>".into()));
        assert!(store.set_home("<p>v2</p>".into()));
        assert_eq!(store.home().as_deref(), Some("<p>v2</p>"));
    }

    #[test]
    fn claim_is_granted_once() {
        let store = PageStore::new();
        assert!(store.claim("hooks"));
        assert!(!store.claim("hooks"));
        assert_eq!(store.post("hooks"), Some(PostSlot::Pending));
    }

    #[test]
    fn settled_slot_is_not_claimable() {
        let store = PageStore::new();
        store.claim("hooks");
        store.settle("hooks", PostSlot::Ready("<p>x</p>".into()));
        assert!(!store.claim("hooks"));
        assert_eq!(store.ready_posts(), 1);
    }

    #[test]
    fn take_failure_clears_only_failed_slots() {
        let store = PageStore::new();
        store.settle("a", PostSlot::Failed("503".into()));
        store.settle("b", PostSlot::Ready("b".into()));

        assert_eq!(store.take_failure("a").as_deref(), Some("503"));
        assert_eq!(store.post("a"), None);
        assert_eq!(store.take_failure("a"), None);
        assert_eq!(store.take_failure("b"), None);
        assert!(store.post("b").is_some());
        assert!(store.claim("a"));
    }

    #[test]
    fn forget_missing_drops_not_found_slots() {
        let store = PageStore::new();
        store.settle("gone", PostSlot::NotFound);
        store.settle("here", PostSlot::Ready("x".into()));
        store.settle("busy", PostSlot::Pending);

        assert_eq!(store.forget_missing(), 1);
        assert_eq!(store.post("gone"), None);
        assert!(store.post("here").is_some());
        assert!(store.post("busy").is_some());
    }

    #[test]
    fn not_found_slots_are_capped_oldest_first() {
        let store = PageStore::with_missing_limit(2);
        store.settle("ready", PostSlot::Ready("x".into()));
        for slug in ["a", "b", "c"] {
            assert!(store.claim(slug));
            store.settle(slug, PostSlot::NotFound);
        }

        assert_eq!(store.post("a"), None);
        assert_eq!(store.post("b"), Some(PostSlot::NotFound));
        assert_eq!(store.post("c"), Some(PostSlot::NotFound));
        assert!(store.post("ready").is_some());
        // evicted slug resolves again on its next request
        assert!(store.claim("a"));
    }

    #[test]
    fn missing_limit_restarts_after_forget() {
        let store = PageStore::with_missing_limit(2);
        store.settle("a", PostSlot::NotFound);
        store.settle("b", PostSlot::NotFound);
        assert_eq!(store.forget_missing(), 2);

        store.settle("c", PostSlot::NotFound);
        store.settle("d", PostSlot::NotFound);
        assert_eq!(store.post("c"), Some(PostSlot::NotFound));
        assert_eq!(store.post("d"), Some(PostSlot::NotFound));
    }

    #[test]
    fn from_site_seeds_home_and_posts() {
        let site = Site {
            home: HomePage {
                html: "<p>home</p>".into(),
                posts: 1,
                pages: 1,
                has_more: false,
            },
            posts: vec![GeneratedPost {
                slug: "hooks".into(),
                title: "Hooks".into(),
                html: "<p>hooks</p>".into(),
            }],
        };
        let store = PageStore::from_site(&site);
        assert_eq!(store.home().as_deref(), Some("<p>home</p>"));
        assert_eq!(store.post("hooks"), Some(PostSlot::Ready("<p>hooks</p>".into())));
        assert!(!store.set_home("<p>home</p>".into()));
    }
}
