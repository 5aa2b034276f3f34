//! Integration tests for `ChatResolver` against a real SQLite store and
//! counting doubles for the identity platform and Graph.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use incontact_chats::{
    AccessToken, ChatDirectory, ChatParticipant, ChatResolver, ChatResolverError, ChatResult,
    ChatSource, ChatStore, RemoteChat, RemoteMember, TokenExchange,
};
use incontact_config::DatabaseConfig;
use incontact_database::{
    initialize_database, ChatRecord, ChatRepository, CreateChatRecord, DatabaseError,
    DatabaseResult,
};
use tempfile::TempDir;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Default)]
struct CountingCredentials {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl TokenExchange for CountingCredentials {
    async fn exchange(&self, user_assertion: &str, scope: &str) -> ChatResult<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(scope, GRAPH_SCOPE);
        if self.fail {
            return Err(ChatResolverError::token_exchange("invalid_grant"));
        }
        Ok(AccessToken::new(format!("obo:{user_assertion}")))
    }
}

#[derive(Default)]
struct FakeDirectory {
    chats: Mutex<Vec<RemoteChat>>,
    searches: AtomicUsize,
    creates: AtomicUsize,
    created_owners: Mutex<Vec<(String, String)>>,
}

impl FakeDirectory {
    fn with_chat(id: &str, topic: &str, member_object_ids: &[&str]) -> Self {
        let directory = Self::default();
        directory.chats.lock().unwrap().push(remote_chat(id, topic, member_object_ids));
        directory
    }

    fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

fn remote_chat(id: &str, topic: &str, member_object_ids: &[&str]) -> RemoteChat {
    RemoteChat {
        id: id.to_string(),
        topic: Some(topic.to_string()),
        chat_type: Some("group".to_string()),
        members: member_object_ids
            .iter()
            .map(|oid| RemoteMember {
                user_id: Some(oid.to_string()),
                user: None,
                display_name: None,
            })
            .collect(),
    }
}

#[async_trait]
impl ChatDirectory for FakeDirectory {
    async fn find_group_chats(&self, token: &AccessToken, topic: &str) -> ChatResult<Vec<RemoteChat>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        assert!(token.secret().starts_with("obo:"));
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|chat| chat.topic.as_deref() == Some(topic))
            .cloned()
            .collect())
    }

    async fn create_group_chat(
        &self,
        _token: &AccessToken,
        topic: &str,
        first_owner_object_id: &str,
        second_owner_object_id: &str,
    ) -> ChatResult<RemoteChat> {
        let index = self.creates.fetch_add(1, Ordering::SeqCst);
        self.created_owners.lock().unwrap().push((
            first_owner_object_id.to_string(),
            second_owner_object_id.to_string(),
        ));
        let chat = remote_chat(
            &format!("19:created-{index}@thread.v2"),
            topic,
            &[first_owner_object_id, second_owner_object_id],
        );
        self.chats.lock().unwrap().push(chat.clone());
        Ok(chat)
    }
}

/// Wraps a store and counts every call reaching it.
struct CountingStore<S> {
    inner: S,
    finds: AtomicUsize,
    id_lookups: AtomicUsize,
    writes: AtomicUsize,
}

impl<S> CountingStore<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            finds: AtomicUsize::new(0),
            id_lookups: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<S: ChatStore> ChatStore for CountingStore<S> {
    async fn find_chat(
        &self,
        topic: &str,
        user_ids: &[String; 2],
    ) -> DatabaseResult<Option<ChatRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_chat(topic, user_ids).await
    }

    async fn chat_by_id(&self, chat_id: &str) -> DatabaseResult<Option<ChatRecord>> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.chat_by_id(chat_id).await
    }

    async fn create_chat(&self, record: CreateChatRecord) -> DatabaseResult<ChatRecord> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create_chat(record).await
    }
}

struct Harness {
    resolver: ChatResolver,
    store: Arc<CountingStore<ChatRepository>>,
    repository: ChatRepository,
    credentials: Arc<CountingCredentials>,
    directory: Arc<FakeDirectory>,
    _temp_dir: TempDir,
}

async fn harness_with(directory: FakeDirectory, credentials: CountingCredentials) -> Harness {
    let temp_dir = TempDir::new().expect("tempdir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", temp_dir.path().join("resolver.db").display()),
        max_connections: 1,
    };
    let pool = initialize_database(&config).await.expect("database");
    let repository = ChatRepository::new(pool);

    let store = Arc::new(CountingStore::new(repository.clone()));
    let credentials = Arc::new(credentials);
    let directory = Arc::new(directory);

    let resolver = ChatResolver::new(
        store.clone(),
        credentials.clone(),
        directory.clone(),
        GRAPH_SCOPE,
    );

    Harness {
        resolver,
        store,
        repository,
        credentials,
        directory,
        _temp_dir: temp_dir,
    }
}

async fn harness(directory: FakeDirectory) -> Harness {
    harness_with(directory, CountingCredentials::default()).await
}

fn supervisor() -> ChatParticipant {
    ChatParticipant::new("user-supervisor", "AAAA-1111")
}

fn agent() -> ChatParticipant {
    ChatParticipant::new("user-agent", "BBBB-2222")
}

#[tokio::test]
async fn local_match_skips_remote_calls() {
    let h = harness(FakeDirectory::default()).await;
    h.repository
        .create(&CreateChatRecord::new(
            "19:known@thread.v2",
            "Shift sync",
            vec!["user-agent".to_string(), "user-supervisor".to_string()],
        ))
        .await
        .unwrap();

    let resolved = h
        .resolver
        .resolve("caller", &[supervisor(), agent()], "Shift sync")
        .await
        .unwrap();

    assert_eq!(resolved.chat_id, "19:known@thread.v2");
    assert_eq!(resolved.source, ChatSource::LocalStore);
    assert_eq!(h.credentials.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.directory.searches(), 0);
    assert_eq!(h.directory.creates(), 0);
    assert_eq!(h.store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wrong_participant_count_fails_before_any_collaborator() {
    let h = harness(FakeDirectory::default()).await;

    for participants in [vec![], vec![supervisor()], vec![supervisor(), agent(), agent()]] {
        let error = h
            .resolver
            .get_or_create_chat("caller", &participants, "Shift sync")
            .await
            .unwrap_err();

        assert!(error.is_invalid_input());
        assert!(matches!(
            error,
            ChatResolverError::InvalidParticipants { count } if count == participants.len()
        ));
    }

    assert_eq!(h.store.finds.load(Ordering::SeqCst), 0);
    assert_eq!(h.credentials.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.directory.searches(), 0);
}

#[tokio::test]
async fn remote_match_ignores_order_and_case_then_persists() {
    let directory = FakeDirectory::with_chat("19:remote@thread.v2", "Shift sync", &["bbbb-2222", "aaaa-1111"]);
    let h = harness(directory).await;

    let first = h
        .resolver
        .resolve("caller", &[supervisor(), agent()], "Shift sync")
        .await
        .unwrap();
    assert_eq!(first.chat_id, "19:remote@thread.v2");
    assert_eq!(first.source, ChatSource::RemoteSearch);
    assert_eq!(h.directory.creates(), 0);

    let record = h
        .repository
        .find_by_id("19:remote@thread.v2")
        .await
        .unwrap()
        .expect("mapping should be persisted");
    assert_eq!(record.topic, "Shift sync");
    assert_eq!(
        record.member_ids,
        vec!["user-agent".to_string(), "user-supervisor".to_string()]
    );
}

#[tokio::test]
async fn swapped_participants_resolve_to_same_remote_chat() {
    let directory = FakeDirectory::with_chat("19:pair@thread.v2", "Standup", &["A", "B"]);
    let h = harness(directory).await;

    let forward = [ChatParticipant::new("u1", "A"), ChatParticipant::new("u2", "B")];
    let reverse = [ChatParticipant::new("u2", "B"), ChatParticipant::new("u1", "a")];

    let first = h.resolver.get_or_create_chat("caller", &forward, "Standup").await.unwrap();
    let second = h.resolver.get_or_create_chat("caller", &reverse, "Standup").await.unwrap();

    assert_eq!(first, "19:pair@thread.v2");
    assert_eq!(second, first);
    assert_eq!(h.directory.searches(), 1, "second call is served locally");
}

#[tokio::test]
async fn remote_chat_with_extra_member_is_not_reused() {
    let directory = FakeDirectory::with_chat(
        "19:crowded@thread.v2",
        "Shift sync",
        &["AAAA-1111", "BBBB-2222", "CCCC-3333"],
    );
    let h = harness(directory).await;

    let resolved = h
        .resolver
        .resolve("caller", &[supervisor(), agent()], "Shift sync")
        .await
        .unwrap();

    assert_eq!(resolved.source, ChatSource::RemoteCreate);
    assert_ne!(resolved.chat_id, "19:crowded@thread.v2");
}

#[tokio::test]
async fn missing_chat_is_created_then_served_locally() {
    let h = harness(FakeDirectory::default()).await;
    let participants = [supervisor(), agent()];

    let created = h
        .resolver
        .resolve("caller", &participants, "O'Brien's sync")
        .await
        .unwrap();

    assert_eq!(created.source, ChatSource::RemoteCreate);
    assert_eq!(created.chat_id, "19:created-0@thread.v2");
    assert_eq!(h.directory.searches(), 1);
    assert_eq!(h.directory.creates(), 1);
    assert_eq!(h.store.writes.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.directory.created_owners.lock().unwrap().as_slice(),
        &[("AAAA-1111".to_string(), "BBBB-2222".to_string())]
    );

    let again = h
        .resolver
        .resolve("caller", &participants, "O'Brien's sync")
        .await
        .unwrap();

    assert_eq!(again.chat_id, created.chat_id);
    assert_eq!(again.source, ChatSource::LocalStore);
    assert_eq!(h.credentials.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.directory.searches(), 1);
    assert_eq!(h.directory.creates(), 1);
    assert_eq!(h.repository.count().await.unwrap(), 1);
}

#[tokio::test]
async fn different_topic_is_a_different_chat() {
    let h = harness(FakeDirectory::default()).await;
    let participants = [supervisor(), agent()];

    let morning = h.resolver.get_or_create_chat("caller", &participants, "Morning").await.unwrap();
    let evening = h.resolver.get_or_create_chat("caller", &participants, "Evening").await.unwrap();

    assert_ne!(morning, evening);
    assert_eq!(h.directory.creates(), 2);
}

#[tokio::test]
async fn token_exchange_failure_aborts_resolution() {
    let credentials = CountingCredentials {
        fail: true,
        ..CountingCredentials::default()
    };
    let h = harness_with(FakeDirectory::default(), credentials).await;

    let error = h
        .resolver
        .get_or_create_chat("expired", &[supervisor(), agent()], "Shift sync")
        .await
        .unwrap_err();

    assert!(matches!(error, ChatResolverError::TokenExchange { .. }));
    assert_eq!(h.directory.searches(), 0);
    assert_eq!(h.store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_persist_of_same_chat_is_tolerated() {
    let directory = FakeDirectory::with_chat("19:raced@thread.v2", "Shift sync", &["AAAA-1111", "BBBB-2222"]);
    let h = harness(directory).await;

    // Another resolver persisted the same Graph chat under a different topic
    // snapshot between our local miss and our write.
    h.repository
        .create(&CreateChatRecord::new(
            "19:raced@thread.v2",
            "Shift sync (renamed)",
            vec!["user-agent".to_string(), "user-supervisor".to_string()],
        ))
        .await
        .unwrap();

    let chat_id = h
        .resolver
        .get_or_create_chat("caller", &[supervisor(), agent()], "Shift sync")
        .await
        .unwrap();

    assert_eq!(chat_id, "19:raced@thread.v2");
    assert_eq!(h.repository.count().await.unwrap(), 1);
    assert_eq!(h.store.id_lookups.load(Ordering::SeqCst), 1);

    let stored = h.repository.find_by_id("19:raced@thread.v2").await.unwrap().unwrap();
    assert_eq!(stored.topic, "Shift sync (renamed)");
}

#[tokio::test]
async fn same_participant_twice_fails_before_any_collaborator() {
    let h = harness(FakeDirectory::default()).await;

    let same_user = [
        ChatParticipant::new("user-supervisor", "AAAA-1111"),
        ChatParticipant::new("user-supervisor", "BBBB-2222"),
    ];
    let same_object_id = [
        ChatParticipant::new("user-supervisor", "aaaa-1111"),
        ChatParticipant::new("user-agent", "AAAA-1111"),
    ];

    for participants in [same_user, same_object_id] {
        for _ in 0..2 {
            let error = h
                .resolver
                .get_or_create_chat("caller", &participants, "Shift sync")
                .await
                .unwrap_err();

            assert!(error.is_invalid_input());
            assert!(matches!(error, ChatResolverError::DuplicateParticipant { .. }));
        }
    }

    assert_eq!(h.store.finds.load(Ordering::SeqCst), 0);
    assert_eq!(h.store.writes.load(Ordering::SeqCst), 0);
    assert_eq!(h.credentials.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.directory.searches(), 0);
    assert_eq!(h.directory.creates(), 0);
}

struct BrokenStore;

#[async_trait]
impl ChatStore for BrokenStore {
    async fn find_chat(&self, _topic: &str, _user_ids: &[String; 2]) -> DatabaseResult<Option<ChatRecord>> {
        Err(DatabaseError::QueryError("disk I/O error".to_string()))
    }

    async fn chat_by_id(&self, _chat_id: &str) -> DatabaseResult<Option<ChatRecord>> {
        unreachable!("lookup fails first")
    }

    async fn create_chat(&self, _record: CreateChatRecord) -> DatabaseResult<ChatRecord> {
        unreachable!("lookup fails first")
    }
}

#[tokio::test]
async fn store_failure_propagates_unchanged() {
    let directory = Arc::new(FakeDirectory::default());
    let resolver = ChatResolver::new(
        Arc::new(BrokenStore),
        Arc::new(CountingCredentials::default()),
        directory.clone(),
        GRAPH_SCOPE,
    );

    let error = resolver
        .get_or_create_chat("caller", &[supervisor(), agent()], "Shift sync")
        .await
        .unwrap_err();

    assert!(matches!(error, ChatResolverError::Store(DatabaseError::QueryError(_))));
    assert_eq!(directory.searches(), 0);
}

/// Lookups miss; every insert fails.
#[derive(Default)]
struct ReadOnlyStore {
    writes: AtomicUsize,
}

#[async_trait]
impl ChatStore for ReadOnlyStore {
    async fn find_chat(&self, _topic: &str, _user_ids: &[String; 2]) -> DatabaseResult<Option<ChatRecord>> {
        Ok(None)
    }

    async fn chat_by_id(&self, _chat_id: &str) -> DatabaseResult<Option<ChatRecord>> {
        Ok(None)
    }

    async fn create_chat(&self, _record: CreateChatRecord) -> DatabaseResult<ChatRecord> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(DatabaseError::QueryError("attempt to write a readonly database".to_string()))
    }
}

#[tokio::test]
async fn persist_failure_after_remote_create_propagates() {
    let store = Arc::new(ReadOnlyStore::default());
    let directory = Arc::new(FakeDirectory::default());
    let resolver = ChatResolver::new(
        store.clone(),
        Arc::new(CountingCredentials::default()),
        directory.clone(),
        GRAPH_SCOPE,
    );

    let result = resolver
        .resolve("caller", &[supervisor(), agent()], "Shift sync")
        .await;

    let error = match result {
        Ok(resolved) => panic!("persist failure reported as success: {resolved:?}"),
        Err(error) => error,
    };
    assert!(matches!(error, ChatResolverError::Store(DatabaseError::QueryError(_))));
    assert!(!error.is_invalid_input());

    // The Graph chat stays behind; nothing deletes it.
    assert_eq!(directory.creates(), 1);
    assert_eq!(directory.chats.lock().unwrap().len(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}
