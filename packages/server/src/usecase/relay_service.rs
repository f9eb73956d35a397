//! UseCase: リレーサービス（接続・切断・メッセージ処理の窓口）
//!
//! ## 概要
//!
//! `RelayService` は履歴バッファ・接続レジストリ・ブロードキャストディスパッチャを
//! 単独で所有し、外部からのイベント（接続、切断、メッセージ）を 1 件ずつ処理します。
//!
//! ## 並行性
//!
//! 全ての操作は同期的で、途中で待機しません。マルチスレッドのホストから使う場合は
//! サービス全体を 1 つの Mutex で保護し、操作ごとにロックを取得します
//! （`ui::state::AppState` を参照）。

use std::sync::Arc;

use kairo_shared::time::{Clock, SystemClock};

use crate::domain::{
    BroadcastDispatcher, Connection, ConnectionId, ConnectionRegistry, ConnectionSink,
    ConnectionState, ConnectionSummary, ContentMessage, DeliveryFailureHook, DuplicateIdError,
    HistoryBuffer, OutboundEvent, RelayMessage, SessionId, Timestamp,
};

/// `on_connect` の処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOutcome {
    /// この接続のセッション（`on_disconnect` に渡す）
    pub session: SessionId,
    pub state: ConnectionState,
}

/// `on_message` の処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// 履歴に追加され、`delivered` 件の接続に配信された
    Broadcast { delivered: usize },
    /// 要求元に履歴スナップショットを返信した（`delivered` は返信の成否）
    HistoryReplied { delivered: bool },
    /// 何もしなかった（ハンドシェイク、未登録の要求元など）
    Ignored,
}

/// メッセージリレーのファサード
pub struct RelayService {
    /// 直近メッセージの履歴（このサービスのみが所有）
    history: HistoryBuffer,
    /// 接続中のクライアント（このサービスのみが所有）
    registry: ConnectionRegistry,
    /// 配信処理
    dispatcher: BroadcastDispatcher,
    /// 接続時刻の取得に使う時計
    clock: Arc<dyn Clock>,
}

impl RelayService {
    /// 空の履歴・空のレジストリで新しい RelayService を作成
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: HistoryBuffer::new(history_capacity),
            registry: ConnectionRegistry::new(),
            dispatcher: BroadcastDispatcher::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// 時計を差し替える（テスト用）
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 配信失敗フックを差し替える
    pub fn with_failure_hook(mut self, hook: Arc<dyn DeliveryFailureHook>) -> Self {
        self.dispatcher = BroadcastDispatcher::new(hook);
        self
    }

    /// 接続を登録し、履歴スナップショットを送信する
    ///
    /// # Returns
    ///
    /// * `Ok` with `ConnectionState::Established` - 登録とスナップショット送信に成功
    /// * `Ok` with `ConnectionState::Closed` - 登録後のスナップショット送信に失敗し、接続は削除済み
    /// * `Err(DuplicateIdError)` - 同じ ID の接続が既に存在する（状態は変更されない）
    pub fn on_connect(
        &mut self,
        id: ConnectionId,
        sink: impl ConnectionSink + 'static,
    ) -> Result<ConnectOutcome, DuplicateIdError> {
        // Attaching
        let connected_at = Timestamp::new(self.clock.now_millis());
        let connection = Connection::new(id.clone(), connected_at, sink);
        let session = connection.session();
        self.registry.register(connection)?;

        // Established: スナップショットはブロードキャストより先にキューに入る
        let snapshot = OutboundEvent::HistorySnapshot(self.history.snapshot());
        if !self.dispatcher.deliver_to(&id, &snapshot, &mut self.registry) {
            tracing::warn!(connection_id = %id, "Connection closed during handshake");
            return Ok(ConnectOutcome {
                session,
                state: ConnectionState::Closed,
            });
        }

        tracing::info!(
            connection_id = %id,
            %session,
            history_len = self.history.len(),
            connections = self.registry.len(),
            "Connection established"
        );
        Ok(ConnectOutcome {
            session,
            state: ConnectionState::Established,
        })
    }

    /// 接続を登録解除する（冪等）
    ///
    /// 登録中の接続が `session` と一致する場合のみ削除します。同じ ID で
    /// 再接続した新しいセッションは、古いセッションの切断通知では削除されません。
    pub fn on_disconnect(&mut self, id: &ConnectionId, session: SessionId) -> ConnectionState {
        match self.registry.get(id).map(Connection::session) {
            Some(current) if current == session => {
                self.registry.unregister(id);
                tracing::info!(
                    connection_id = %id,
                    %session,
                    connections = self.registry.len(),
                    "Connection closed"
                );
            }
            Some(current) => {
                tracing::debug!(
                    connection_id = %id,
                    %session,
                    current_session = %current,
                    "Disconnect from a previous session ignored"
                );
            }
            None => {
                tracing::debug!(connection_id = %id, "Disconnect for unknown connection ignored");
            }
        }
        ConnectionState::Closed
    }

    /// メッセージを処理する
    ///
    /// - content-message: 履歴に追加してから全接続にブロードキャスト
    /// - history-request: 要求元のみにスナップショットを返信（ブロードキャストしない）
    /// - handshake: ログのみ
    pub fn on_message(&mut self, message: RelayMessage) -> MessageOutcome {
        tracing::trace!(kind = message.kind().as_str(), "Handling message");
        match message {
            RelayMessage::Content(content) => self.accept_content(content),
            RelayMessage::HistoryRequest { requester } => self.reply_history(&requester),
            RelayMessage::Handshake { from } => {
                tracing::debug!(
                    connection_id = from.as_ref().map(ConnectionId::as_str),
                    "Handshake received"
                );
                MessageOutcome::Ignored
            }
        }
    }

    fn accept_content(&mut self, content: ContentMessage) -> MessageOutcome {
        let event = OutboundEvent::Content(content.clone());
        if let Some(evicted) = self.history.append(content) {
            tracing::debug!(
                evicted_timestamp = evicted.timestamp().value(),
                "History full, evicted oldest message"
            );
        }

        let delivered = self.dispatcher.broadcast(&event, &mut self.registry);
        tracing::debug!(
            delivered,
            history_len = self.history.len(),
            "Broadcasted content message"
        );
        MessageOutcome::Broadcast { delivered }
    }

    fn reply_history(&mut self, requester: &ConnectionId) -> MessageOutcome {
        if !self.registry.contains(requester) {
            tracing::warn!(
                connection_id = %requester,
                "History request from unregistered connection ignored"
            );
            return MessageOutcome::Ignored;
        }

        let snapshot = OutboundEvent::HistorySnapshot(self.history.snapshot());
        let delivered = self
            .dispatcher
            .deliver_to(requester, &snapshot, &mut self.registry);
        MessageOutcome::HistoryReplied { delivered }
    }

    /// 現在の履歴のコピー（古い順）
    pub fn history_snapshot(&self) -> Vec<ContentMessage> {
        self.history.snapshot()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// 接続中のクライアント一覧（登録順）
    pub fn connections(&self) -> Vec<ConnectionSummary> {
        self.registry.summaries()
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DEFAULT_HISTORY_CAPACITY, MessageText},
        test_support::{FailingSink, RecordingSink},
    };
    use kairo_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - on_connect / on_disconnect / on_message の振る舞い
    // - 履歴スナップショットの送信タイミングと内容
    // - 配信失敗時の接続削除（部分失敗の隔離）
    //
    // 【なぜこのテストが必要か】
    // - RelayService は 3 つのコンポーネントを協調させる唯一の窓口
    // - 途中参加した接続が重複・欠落なく履歴を受け取ることを保証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 接続時の履歴送信（空・10 件）
    // 2. 重複 ID の拒否
    // 3. 60 件送信後の履歴が最新 50 件であること
    // 4. 履歴要求が要求元のみに返信され、ブロードキャストされないこと
    // 5. 送信失敗した接続の削除
    // ========================================

    fn id(name: &str) -> ConnectionId {
        ConnectionId::new(name.to_string()).unwrap()
    }

    fn content(text: &str, timestamp: i64) -> ContentMessage {
        ContentMessage::new(MessageText::new(text), Timestamp::new(timestamp), None)
    }

    fn numbered(range: std::ops::RangeInclusive<i64>) -> Vec<ContentMessage> {
        range.map(|n| content(&format!("M{}", n), n)).collect()
    }

    fn registered_ids(service: &RelayService) -> Vec<ConnectionId> {
        service.connections().into_iter().map(|c| c.id).collect()
    }

    fn create_test_service() -> RelayService {
        RelayService::new(DEFAULT_HISTORY_CAPACITY).with_clock(Arc::new(FixedClock::new(1000)))
    }

    #[test]
    fn test_connect_sends_empty_snapshot() {
        // テスト項目: 履歴が空でも接続時に空のスナップショットが送信される
        // given (前提条件):
        let mut service = create_test_service();
        let sink = RecordingSink::new();

        // when (操作):
        let outcome = service.on_connect(id("alice"), sink.clone());

        // then (期待する結果):
        assert_eq!(outcome.map(|o| o.state), Ok(ConnectionState::Established));
        assert_eq!(sink.events(), vec![OutboundEvent::HistorySnapshot(vec![])]);
        assert_eq!(registered_ids(&service), vec![id("alice")]);
    }

    #[test]
    fn test_connect_after_ten_messages_receives_exactly_those_ten() {
        // テスト項目: 10 件送信後に接続したクライアントは、その 10 件のみを順序通りに受け取る
        // given (前提条件):
        let mut service = create_test_service();
        for message in numbered(1..=10) {
            service.on_message(RelayMessage::Content(message));
        }
        let late = RecordingSink::new();

        // when (操作):
        service.on_connect(id("late"), late.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(
            late.events(),
            vec![OutboundEvent::HistorySnapshot(numbered(1..=10))]
        );

        // 次のブロードキャストは 1 件だけ追加で届く
        service.on_message(RelayMessage::Content(content("M11", 11)));
        assert_eq!(
            late.events(),
            vec![
                OutboundEvent::HistorySnapshot(numbered(1..=10)),
                OutboundEvent::Content(content("M11", 11)),
            ]
        );
    }

    #[test]
    fn test_connect_duplicate_id_is_rejected() {
        // テスト項目: 同じ ID での接続は DuplicateIdError となり、既存の接続は影響を受けない
        // given (前提条件):
        let mut service = create_test_service();
        let first = RecordingSink::new();
        service.on_connect(id("alice"), first.clone()).unwrap();
        let second = RecordingSink::new();

        // when (操作):
        let result = service.on_connect(id("alice"), second.clone());

        // then (期待する結果):
        assert_eq!(result, Err(DuplicateIdError(id("alice"))));
        assert!(second.events().is_empty());
        assert_eq!(service.connection_count(), 1);

        service.on_message(RelayMessage::Content(content("hi", 1)));
        assert_eq!(first.events().len(), 2);
        assert!(second.events().is_empty());
    }

    #[test]
    fn test_connect_with_dead_sink_is_closed() {
        // テスト項目: スナップショット送信に失敗した接続は Closed となり登録されない
        // given (前提条件):
        let mut service = create_test_service();

        // when (操作):
        let outcome = service.on_connect(id("ghost"), FailingSink);

        // then (期待する結果):
        assert_eq!(outcome.map(|o| o.state), Ok(ConnectionState::Closed));
        assert_eq!(service.connection_count(), 0);
    }

    #[test]
    fn test_connect_records_connection_time_from_clock() {
        // テスト項目: 接続時刻が注入された時計から取得される
        // given (前提条件):
        let mut service = create_test_service();

        // when (操作):
        service.on_connect(id("alice"), RecordingSink::new()).unwrap();

        // then (期待する結果):
        assert_eq!(
            service.connections(),
            vec![ConnectionSummary {
                id: id("alice"),
                connected_at: Timestamp::new(1000),
            }]
        );
    }

    #[test]
    fn test_sixty_messages_keep_latest_fifty() {
        // テスト項目: M1..M60 を送信すると履歴は M11..M60 の 50 件になる
        // given (前提条件):
        let mut service = create_test_service();

        // when (操作):
        for message in numbered(1..=60) {
            service.on_message(RelayMessage::Content(message));
        }

        // then (期待する結果):
        let snapshot = service.history_snapshot();
        assert_eq!(snapshot.len(), 50);
        assert_eq!(snapshot, numbered(11..=60));
    }

    #[test]
    fn test_content_message_is_broadcast_to_all_including_sender() {
        // テスト項目: メッセージが送信者を含む全接続に配信される
        // given (前提条件):
        let mut service = create_test_service();
        let alice = RecordingSink::new();
        let bob = RecordingSink::new();
        service.on_connect(id("alice"), alice.clone()).unwrap();
        service.on_connect(id("bob"), bob.clone()).unwrap();
        let message = ContentMessage::new(
            MessageText::new("hello"),
            Timestamp::new(5),
            Some(id("alice")),
        );

        // when (操作):
        let outcome = service.on_message(RelayMessage::Content(message.clone()));

        // then (期待する結果):
        assert_eq!(outcome, MessageOutcome::Broadcast { delivered: 2 });
        assert_eq!(alice.last(), Some(OutboundEvent::Content(message.clone())));
        assert_eq!(bob.last(), Some(OutboundEvent::Content(message)));
    }

    #[test]
    fn test_history_request_replies_only_to_requester() {
        // テスト項目: X が 3 件送信後に履歴要求すると、X のみに 3 件が返信されブロードキャストは発生しない
        // given (前提条件):
        let mut service = create_test_service();
        let x = RecordingSink::new();
        let y = RecordingSink::new();
        service.on_connect(id("x"), x.clone()).unwrap();
        service.on_connect(id("y"), y.clone()).unwrap();
        for message in numbered(1..=3) {
            service.on_message(RelayMessage::Content(message));
        }
        let y_events_before = y.events().len();

        // when (操作):
        let outcome = service.on_message(RelayMessage::HistoryRequest { requester: id("x") });

        // then (期待する結果):
        assert_eq!(outcome, MessageOutcome::HistoryReplied { delivered: true });
        assert_eq!(x.last(), Some(OutboundEvent::HistorySnapshot(numbered(1..=3))));
        assert_eq!(y.events().len(), y_events_before);
        assert_eq!(service.history_snapshot().len(), 3);
    }

    #[test]
    fn test_history_request_with_empty_history() {
        // テスト項目: 履歴が空でも履歴要求は成功し、空のスナップショットが返る
        // given (前提条件):
        let mut service = create_test_service();
        let x = RecordingSink::new();
        service.on_connect(id("x"), x.clone()).unwrap();

        // when (操作):
        let outcome = service.on_message(RelayMessage::HistoryRequest { requester: id("x") });

        // then (期待する結果):
        assert_eq!(outcome, MessageOutcome::HistoryReplied { delivered: true });
        assert_eq!(x.last(), Some(OutboundEvent::HistorySnapshot(vec![])));
    }

    #[test]
    fn test_history_request_from_unknown_connection_is_ignored() {
        // テスト項目: 未登録の接続からの履歴要求は無視される
        // given (前提条件):
        let mut service = create_test_service();

        // when (操作):
        let outcome = service.on_message(RelayMessage::HistoryRequest {
            requester: id("ghost"),
        });

        // then (期待する結果):
        assert_eq!(outcome, MessageOutcome::Ignored);
    }

    #[test]
    fn test_handshake_is_ignored() {
        // テスト項目: ハンドシェイクは履歴にも配信にも影響しない
        // given (前提条件):
        let mut service = create_test_service();
        let alice = RecordingSink::new();
        service.on_connect(id("alice"), alice.clone()).unwrap();

        // when (操作):
        let outcome = service.on_message(RelayMessage::Handshake {
            from: Some(id("alice")),
        });

        // then (期待する結果):
        assert_eq!(outcome, MessageOutcome::Ignored);
        assert_eq!(alice.events().len(), 1);
        assert!(service.history_snapshot().is_empty());
    }

    #[test]
    fn test_failed_connection_is_pruned_during_broadcast() {
        // テスト項目: 配信に失敗した接続は削除され、他の接続への配信は継続される
        // given (前提条件):
        let mut service = create_test_service();
        let dead = RecordingSink::new();
        let b = RecordingSink::new();
        service.on_connect(id("a"), dead.clone()).unwrap();
        service.on_connect(id("b"), b.clone()).unwrap();
        dead.close();

        // when (操作):
        let first = service.on_message(RelayMessage::Content(content("one", 1)));
        let second = service.on_message(RelayMessage::Content(content("two", 2)));

        // then (期待する結果):
        assert_eq!(first, MessageOutcome::Broadcast { delivered: 1 });
        assert_eq!(second, MessageOutcome::Broadcast { delivered: 1 });
        assert_eq!(registered_ids(&service), vec![id("b")]);
        assert_eq!(b.events().len(), 3);
        // 履歴には失敗に関係なく追加される
        assert_eq!(service.history_snapshot().len(), 2);
    }

    #[test]
    fn test_disconnect_is_idempotent_and_stops_delivery() {
        // テスト項目: 切断は冪等で、切断後のブロードキャストは対象外となる
        // given (前提条件):
        let mut service = create_test_service();
        let alice = RecordingSink::new();
        let session = service.on_connect(id("alice"), alice.clone()).unwrap().session;

        // when (操作):
        let first = service.on_disconnect(&id("alice"), session);
        let second = service.on_disconnect(&id("alice"), session);
        let outcome = service.on_message(RelayMessage::Content(content("after", 1)));

        // then (期待する結果):
        assert_eq!(first, ConnectionState::Closed);
        assert_eq!(second, ConnectionState::Closed);
        assert_eq!(outcome, MessageOutcome::Broadcast { delivered: 0 });
        assert_eq!(alice.events().len(), 1);
    }

    #[test]
    fn test_disconnect_from_previous_session_keeps_reconnected_id() {
        // テスト項目: 削除済みの古いセッションの切断通知は、同じ ID で再接続した接続を削除しない
        // given (前提条件):
        let mut service = create_test_service();
        let old = RecordingSink::new();
        let old_session = service.on_connect(id("alice"), old.clone()).unwrap().session;
        old.close();
        service.on_message(RelayMessage::Content(content("prune", 1)));
        let new = RecordingSink::new();
        let new_session = service.on_connect(id("alice"), new.clone()).unwrap().session;

        // when (操作):
        let state = service.on_disconnect(&id("alice"), old_session);
        let outcome = service.on_message(RelayMessage::Content(content("after", 2)));

        // then (期待する結果):
        assert_ne!(old_session, new_session);
        assert_eq!(state, ConnectionState::Closed);
        assert_eq!(registered_ids(&service), vec![id("alice")]);
        assert_eq!(outcome, MessageOutcome::Broadcast { delivered: 1 });
        assert_eq!(new.last(), Some(OutboundEvent::Content(content("after", 2))));
    }

    #[test]
    fn test_disconnect_with_current_session_after_reconnect() {
        // テスト項目: 再接続後のセッションで切断すると、その接続が削除される
        // given (前提条件):
        let mut service = create_test_service();
        let first = service.on_connect(id("alice"), RecordingSink::new()).unwrap().session;
        service.on_disconnect(&id("alice"), first);
        let second = service.on_connect(id("alice"), RecordingSink::new()).unwrap().session;

        // when (操作):
        service.on_disconnect(&id("alice"), second);

        // then (期待する結果):
        assert_eq!(service.connection_count(), 0);
    }

    #[test]
    fn test_new_service_starts_empty() {
        // テスト項目: 新しいサービスは空の履歴・空のレジストリで開始する
        // given (前提条件):

        // when (操作):
        let service = RelayService::new(10);

        // then (期待する結果):
        assert!(service.history_snapshot().is_empty());
        assert_eq!(service.connection_count(), 0);
        assert_eq!(service.history_capacity(), 10);
    }
}
