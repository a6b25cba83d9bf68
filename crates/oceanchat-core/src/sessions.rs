use oceanchat_api::Session;

/// Title given to a session inserted with an empty hint.
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// The known sessions, most recently touched first, plus the id of the one
/// the timeline currently shows (`None` = new, unsaved session).
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    current: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a server listing.
    pub fn replace_all(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
        self.sort_recent_first();
    }

    /// Touch or insert a session and move it to the front.
    ///
    /// An existing session gets a fresh `updated_at`; its title is set from
    /// the hint only when it has none, never overwritten. An unknown id is
    /// inserted with both timestamps at now and the hint as title (or the
    /// default when the hint is empty).
    pub fn upsert(&mut self, session_id: &str, title_hint: &str) {
        if let Some(pos) = self.sessions.iter().position(|s| s.session_id == session_id) {
            let mut session = self.sessions.remove(pos);
            session.touch();
            if session.title.is_none() && !title_hint.is_empty() {
                session.title = Some(title_hint.to_string());
            }
            self.sessions.insert(0, session);
        } else {
            let title = if title_hint.is_empty() {
                DEFAULT_SESSION_TITLE
            } else {
                title_hint
            };
            self.sessions.insert(0, Session::new(session_id, title));
        }
        self.sort_recent_first();
    }

    pub fn set_current(&mut self, session_id: impl Into<String>) {
        self.current = Some(session_id.into());
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // Stable sort: the freshly touched entry is already at the front, so it
    // stays ahead of any entry sharing its timestamp.
    fn sort_recent_first(&mut self) {
        self.sessions
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session(id: &str, title: Option<&str>, age_secs: i64) -> Session {
        let at = Utc::now() - Duration::seconds(age_secs);
        Session {
            session_id: id.into(),
            title: title.map(str::to_string),
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(store: &SessionStore) -> Vec<&str> {
        store.sessions().iter().map(|s| s.session_id.as_str()).collect()
    }

    fn assert_sorted_recent_first(store: &SessionStore) {
        let stamps: Vec<_> = store.sessions().iter().map(|s| s.updated_at).collect();
        for pair in stamps.windows(2) {
            assert!(pair[0] >= pair[1], "store must stay sorted by recency");
        }
    }

    #[test]
    fn replace_all_sorts_by_recency() {
        let mut store = SessionStore::new();
        store.replace_all(vec![
            session("old", Some("Old"), 300),
            session("new", Some("New"), 10),
            session("mid", Some("Mid"), 100),
        ]);
        assert_eq!(ids(&store), vec!["new", "mid", "old"]);
        assert_sorted_recent_first(&store);
    }

    #[test]
    fn upsert_moves_touched_session_to_front() {
        let mut store = SessionStore::new();
        store.replace_all(vec![
            session("a", Some("A"), 10),
            session("b", Some("B"), 100),
        ]);

        store.upsert("b", "ignored");
        assert_eq!(ids(&store), vec!["b", "a"]);
        assert_sorted_recent_first(&store);
    }

    #[test]
    fn upsert_inserts_unknown_sessions_at_front() {
        let mut store = SessionStore::new();
        store.replace_all(vec![session("a", Some("A"), 10)]);

        store.upsert("fresh", "Hello there");
        assert_eq!(ids(&store), vec!["fresh", "a"]);
        let front = store.get("fresh").unwrap();
        assert_eq!(front.title.as_deref(), Some("Hello there"));
        assert_eq!(front.created_at, front.updated_at);
    }

    #[test]
    fn upsert_never_overwrites_an_existing_title() {
        let mut store = SessionStore::new();
        store.replace_all(vec![session("a", Some("Kept"), 10)]);

        store.upsert("a", "Replacement");
        assert_eq!(store.get("a").unwrap().title.as_deref(), Some("Kept"));
    }

    #[test]
    fn upsert_fills_in_a_missing_title() {
        let mut store = SessionStore::new();
        store.replace_all(vec![session("a", None, 10)]);

        store.upsert("a", "First words");
        assert_eq!(store.get("a").unwrap().title.as_deref(), Some("First words"));
    }

    #[test]
    fn empty_hint_falls_back_to_default_title_on_insert() {
        let mut store = SessionStore::new();
        store.upsert("a", "");
        assert_eq!(
            store.get("a").unwrap().title.as_deref(),
            Some(DEFAULT_SESSION_TITLE)
        );
    }

    #[test]
    fn ordering_invariant_holds_across_upsert_sequences() {
        let mut store = SessionStore::new();
        for id in ["a", "b", "c", "a", "d", "b", "b", "e"] {
            store.upsert(id, "t");
            assert_sorted_recent_first(&store);
            assert_eq!(store.sessions()[0].session_id, id);
        }
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn current_session_bookkeeping() {
        let mut store = SessionStore::new();
        assert_eq!(store.current(), None);
        store.set_current("s1");
        assert_eq!(store.current(), Some("s1"));
        store.clear_current();
        assert_eq!(store.current(), None);
    }
}
