use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::Notify;
use twitchtui::chat::{
    ChatBridge, ChatCredentials, ChatError, ChatLink, ChatMessage, ChatOutcome, ChatTransport,
};

#[derive(Default)]
struct Calls {
    connects: usize,
    credentials: Vec<String>,
    joins: Vec<String>,
    disconnects: usize,
}

#[derive(Clone)]
enum Script {
    FailConnect(ChatError),
    FailJoin(ChatError),
    /// Deliver these, then end the stream or stay open.
    Deliver {
        events: Vec<Result<ChatMessage, ChatError>>,
        hold_open: bool,
    },
}

struct FakeTransport {
    script: Script,
    gate: Option<Arc<Notify>>,
    calls: Arc<Mutex<Calls>>,
}

impl FakeTransport {
    fn new(script: Script) -> Self {
        Self {
            script,
            gate: None,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn connect(
        &self,
        credentials: &ChatCredentials,
    ) -> Result<Box<dyn ChatLink>, ChatError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.connects += 1;
            calls.credentials.push(credentials.oauth_token.clone());
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let (events, hold_open, join_error) = match self.script.clone() {
            Script::FailConnect(error) => return Err(error),
            Script::FailJoin(error) => (Vec::new(), false, Some(error)),
            Script::Deliver { events, hold_open } => (events, hold_open, None),
        };
        Ok(Box::new(FakeLink {
            events: events.into(),
            hold_open,
            join_error,
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct FakeLink {
    events: VecDeque<Result<ChatMessage, ChatError>>,
    hold_open: bool,
    join_error: Option<ChatError>,
    calls: Arc<Mutex<Calls>>,
}

#[async_trait]
impl ChatLink for FakeLink {
    async fn join(&mut self, channel: &str) -> Result<(), ChatError> {
        self.calls.lock().unwrap().joins.push(channel.to_string());
        match self.join_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError> {
        match self.events.pop_front() {
            Some(event) => event.map(Some),
            None if self.hold_open => std::future::pending().await,
            None => Ok(None),
        }
    }

    async fn disconnect(&mut self) -> Result<(), ChatError> {
        self.calls.lock().unwrap().disconnects += 1;
        Ok(())
    }
}

fn bridge(transport: FakeTransport) -> (ChatBridge, Arc<Mutex<Calls>>) {
    let calls = Arc::clone(&transport.calls);
    let bridge = ChatBridge::with_credentials(
        Arc::new(transport),
        ChatCredentials::new("nerd99", "tok_xyz"),
    );
    (bridge, calls)
}

async fn with_timeout<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}

#[tokio::test]
async fn messages_arrive_in_transport_order_without_loss() {
    let mut expected = vec![ChatMessage::joined(":nerd99!nerd99@nerd99.tmi.twitch.tv JOIN #alpha")];
    expected.extend((0..500).map(|i| ChatMessage::new(format!("user{}", i % 7), format!("msg {i}"))));
    let (bridge, calls) = bridge(FakeTransport::new(Script::Deliver {
        events: expected.iter().cloned().map(Ok).collect(),
        hold_open: false,
    }));

    let mut handle = bridge.connect("alpha");
    assert_eq!(handle.channel(), "alpha");
    assert_eq!(with_timeout(handle.outcome()).await, Some(ChatOutcome::Connected));
    assert_eq!(handle.outcome().await, None);

    let mut received = Vec::new();
    while let Some(message) = with_timeout(handle.next_message()).await {
        received.push(message);
    }
    assert_eq!(received, expected);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.connects, 1);
    assert_eq!(calls.credentials, vec!["oauth:tok_xyz".to_string()]);
    assert_eq!(calls.joins, vec!["alpha".to_string()]);
    assert_eq!(calls.disconnects, 1);
}

#[tokio::test]
async fn connect_failure_publishes_one_failed_outcome() {
    let (bridge, calls) = bridge(FakeTransport::new(Script::FailConnect(
        ChatError::Authentication("Login authentication failed".into()),
    )));

    let mut handle = bridge.connect("alpha");
    assert_eq!(
        with_timeout(handle.outcome()).await,
        Some(ChatOutcome::Failed(ChatError::Authentication(
            "Login authentication failed".into()
        )))
    );
    assert_eq!(handle.outcome().await, None);
    assert_eq!(with_timeout(handle.next_message()).await, None);
    assert!(calls.lock().unwrap().joins.is_empty());
}

#[tokio::test]
async fn join_failure_publishes_one_failed_outcome_and_disconnects() {
    let (bridge, calls) = bridge(FakeTransport::new(Script::FailJoin(ChatError::Protocol(
        "no such channel".into(),
    ))));

    let mut handle = bridge.connect("ghost");
    let mut outcome_rx = handle.take_outcome().unwrap();
    let outcome = with_timeout(&mut outcome_rx).await.unwrap();
    assert_eq!(
        outcome,
        ChatOutcome::Failed(ChatError::Protocol("no such channel".into()))
    );
    assert!(handle.take_outcome().is_none());
    assert_eq!(with_timeout(handle.next_message()).await, None);
    assert_eq!(calls.lock().unwrap().disconnects, 1);
}

#[tokio::test]
async fn failure_after_join_keeps_the_single_connected_outcome() {
    let (bridge, _calls) = bridge(FakeTransport::new(Script::Deliver {
        events: vec![
            Ok(ChatMessage::new("a", "one")),
            Ok(ChatMessage::new("b", "two")),
            Err(ChatError::Protocol("socket reset".into())),
            Ok(ChatMessage::new("c", "never")),
        ],
        hold_open: false,
    }));

    let mut handle = bridge.connect("alpha");
    assert_eq!(with_timeout(handle.outcome()).await, Some(ChatOutcome::Connected));

    let mut received = Vec::new();
    while let Some(message) = with_timeout(handle.next_message()).await {
        received.push(message.text);
    }
    assert_eq!(received, vec!["one", "two"]);
    assert_eq!(handle.outcome().await, None);
}

#[tokio::test]
async fn connect_returns_before_the_transport_does() {
    let gate = Arc::new(Notify::new());
    let (bridge, _calls) = bridge(
        FakeTransport::new(Script::Deliver {
            events: vec![Ok(ChatMessage::new("a", "hi"))],
            hold_open: true,
        })
        .gated(Arc::clone(&gate)),
    );

    let mut handle = bridge.connect("alpha");
    let mut outcome_rx = handle.take_outcome().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(outcome_rx.try_recv().is_err());

    gate.notify_one();
    assert_eq!(with_timeout(&mut outcome_rx).await.unwrap(), ChatOutcome::Connected);
    assert_eq!(
        with_timeout(handle.next_message()).await,
        Some(ChatMessage::new("a", "hi"))
    );
}

#[tokio::test]
async fn disconnect_stops_an_open_connection() {
    let (bridge, calls) = bridge(FakeTransport::new(Script::Deliver {
        events: Vec::new(),
        hold_open: true,
    }));

    let mut handle = bridge.connect("alpha");
    assert_eq!(with_timeout(handle.outcome()).await, Some(ChatOutcome::Connected));
    with_timeout(handle.disconnect()).await;

    assert_eq!(calls.lock().unwrap().disconnects, 1);
    assert_eq!(with_timeout(handle.next_message()).await, None);
}

#[tokio::test]
async fn dropping_the_handle_cancels_a_pending_connect() {
    let gate = Arc::new(Notify::new());
    let (bridge, calls) = bridge(
        FakeTransport::new(Script::Deliver {
            events: Vec::new(),
            hold_open: true,
        })
        .gated(Arc::clone(&gate)),
    );

    let mut handle = bridge.connect("alpha");
    let outcome_rx = handle.take_outcome().unwrap();
    drop(handle);

    assert_eq!(
        with_timeout(outcome_rx).await.unwrap(),
        ChatOutcome::Failed(ChatError::Cancelled)
    );
    assert!(calls.lock().unwrap().joins.is_empty());
}
