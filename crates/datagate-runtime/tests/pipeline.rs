//! End-to-end tests of the invocation pipeline:
//! EventfulConnector → ReactiveInvoker → registry → stub engines,
//! driven the way a transport layer would drive them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use datagate_auth::{GrantedAuthorizer, Role};
use datagate_engine::testing::{Recorder, StubEngine};
use datagate_engine::{Command, Connector, Engine, GatewayError, StreamedResults};
use datagate_event::testing::CollectingEmitter;
use datagate_event::Subject;
use datagate_runtime::{
    deliver, EngineRegistry, EventfulConnector, ReactiveInvoker, Scheduler, SuspendedResponse,
};
use datagate_types::{Language, MediaType, Principal, Timeout};

struct Gateway {
    connector: EventfulConnector,
    recorder: Arc<Recorder>,
    events: Arc<CollectingEmitter>,
}

/// Wires the full stack around one stub engine deployed as
/// (`default`, its language), authorized by `role`.
fn gateway(engine: StubEngine, role: Role) -> Gateway {
    let recorder = engine.recorder();
    let registry = Arc::new(EngineRegistry::new());
    registry.on_deploy(
        &"default".parse().unwrap(),
        [Arc::new(engine) as Arc<dyn Engine>],
    );

    let invoker = ReactiveInvoker::new(
        registry,
        Arc::new(GrantedAuthorizer::with_role(role)),
        Scheduler::current(),
    );
    let events = Arc::new(CollectingEmitter::default());
    let connector = EventfulConnector::around(events.clone(), Arc::new(invoker));

    Gateway {
        connector,
        recorder,
        events,
    }
}

fn sql_command(schema: &str) -> Command {
    Command::builder()
        .language(Language::Sql)
        .schema_name(schema)
        .property("query", "SELECT 1")
        .accept(MediaType::new("application", "json"))
        .owner(Principal::anonymous())
        .build()
}

#[tokio::test]
async fn successful_query_streams_and_reports() {
    let gateway = gateway(
        StubEngine::new(Language::Sql)
            .produces(MediaType::new("application", "json"))
            .payload(b"[42]".to_vec()),
        Role::Read,
    );

    let outcome = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe()
        .outcome()
        .await;
    let results = outcome.unwrap().unwrap();
    assert_eq!(results.media_type(), &MediaType::new("application", "json"));

    let mut sink = Vec::new();
    results.write(&mut sink).unwrap();
    assert_eq!(sink, b"[42]");

    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Executed, Subject::Completed]
    );
    assert_eq!(gateway.recorder.executed(), 1);
    assert_eq!(gateway.recorder.written(), 1);
    assert_eq!(gateway.recorder.closed(), 1);
}

#[tokio::test]
async fn missing_schema_never_touches_an_engine() {
    let gateway = gateway(StubEngine::new(Language::Sql), Role::Read);

    let outcome = gateway
        .connector
        .accept(sql_command("missing"))
        .subscribe()
        .outcome()
        .await;

    assert_eq!(
        outcome.unwrap_err(),
        GatewayError::SchemaNotFound("missing".parse().unwrap())
    );
    assert_eq!(gateway.recorder.prepared(), 0);
    assert_eq!(gateway.recorder.executed(), 0);
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Rejected]
    );
}

#[tokio::test]
async fn unsupported_language_is_distinct_from_missing_schema() {
    let gateway = gateway(StubEngine::new(Language::Sql), Role::Read);

    let command = Command::builder()
        .language(Language::Sparql)
        .schema_name("default")
        .build();
    let outcome = gateway.connector.accept(command).subscribe().outcome().await;

    assert!(matches!(
        outcome.unwrap_err(),
        GatewayError::LanguageNotSupported {
            language: Language::Sparql,
            ..
        }
    ));
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Rejected]
    );
}

#[tokio::test]
async fn forbidden_command_never_executes() {
    let gateway = gateway(StubEngine::new(Language::Sql), Role::None);

    let outcome = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe()
        .outcome()
        .await;

    assert!(matches!(outcome.unwrap_err(), GatewayError::Forbidden(_)));
    assert_eq!(gateway.recorder.executed(), 0);
    assert_eq!(gateway.recorder.written(), 0);
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Rejected]
    );
}

#[tokio::test]
async fn prepare_failure_stops_after_the_rejection_event() {
    let gateway = gateway(
        StubEngine::new(Language::Sql)
            .fail_prepare(GatewayError::InvalidCommand("query and update given".into())),
        Role::Read,
    );

    let outcome = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe()
        .outcome()
        .await;

    assert_eq!(
        outcome.unwrap_err(),
        GatewayError::InvalidCommand("query and update given".into())
    );
    assert_eq!(gateway.recorder.executed(), 0);
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Rejected]
    );
}

#[tokio::test]
async fn execute_failure_is_a_system_failure() {
    let gateway = gateway(
        StubEngine::new(Language::Sql).fail_execute(GatewayError::Execution("backend down".into())),
        Role::Read,
    );

    let outcome = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe()
        .outcome()
        .await;

    assert_eq!(
        outcome.unwrap_err(),
        GatewayError::Execution("backend down".into())
    );
    assert_eq!(gateway.recorder.closed(), 1);
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Failed]
    );
}

#[tokio::test]
async fn write_failure_reports_failed_never_completed() {
    let gateway = gateway(
        StubEngine::new(Language::Sql).fail_write(GatewayError::Execution("sink broke".into())),
        Role::Read,
    );

    let outcome = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe()
        .outcome()
        .await;
    let results = outcome.unwrap().unwrap();
    let mut sink = Vec::new();
    assert!(results.write(&mut sink).is_err());

    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Executed, Subject::Failed]
    );
    assert_eq!(gateway.recorder.closed(), 1);
}

#[tokio::test]
async fn concurrent_release_signals_cancel_exactly_once() {
    let gateway = gateway(
        StubEngine::new(Language::Sql).block_until_cancelled(),
        Role::Read,
    );

    let subscription = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe();
    let handle = subscription.handle();

    while gateway.recorder.executed() == 0 {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    // timeout and disconnect race on the same release guard
    let signals: Vec<_> = (0..2)
        .map(|_| {
            let h = handle.clone();
            std::thread::spawn(move || h.unsubscribe())
        })
        .collect();
    for signal in signals {
        signal.join().unwrap();
    }

    let outcome = subscription.outcome().await;
    assert_eq!(outcome.unwrap_err(), GatewayError::Cancelled);
    assert!(gateway.recorder.cancel_observed());
    assert_eq!(gateway.recorder.closed(), 1);
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Failed]
    );
}

/// Recording double of the transport's async-response primitive.
#[derive(Default)]
struct FakeResponse {
    resumptions: Mutex<Vec<String>>,
    writes: AtomicUsize,
}

impl FakeResponse {
    fn first_resumption(&self) -> Option<String> {
        self.resumptions.lock().unwrap().first().cloned()
    }
}

impl SuspendedResponse for FakeResponse {
    fn resume(&self, results: StreamedResults) -> bool {
        // write immediately, the way a transport thread would
        let mut sink = Vec::new();
        let written = results.write(&mut sink).is_ok();
        if written {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        let mut resumptions = self.resumptions.lock().unwrap();
        if resumptions.is_empty() {
            resumptions.push(format!("body:{}", String::from_utf8_lossy(&sink)));
            true
        } else {
            false
        }
    }

    fn resume_no_content(&self) -> bool {
        let mut resumptions = self.resumptions.lock().unwrap();
        if resumptions.is_empty() {
            resumptions.push("no-content".into());
            true
        } else {
            false
        }
    }

    fn resume_error(&self, error: GatewayError) -> bool {
        let mut resumptions = self.resumptions.lock().unwrap();
        if resumptions.is_empty() {
            resumptions.push(format!("error:{error}"));
            true
        } else {
            false
        }
    }

    fn is_resumed(&self) -> bool {
        !self.resumptions.lock().unwrap().is_empty()
    }
}

#[tokio::test]
async fn deliver_drives_a_request_to_the_response() {
    let gateway = gateway(
        StubEngine::new(Language::Sql).payload(b"a,b\n1,2\n".to_vec()),
        Role::Read,
    );
    let response = FakeResponse::default();

    let subscription = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe();
    deliver(subscription, &response, Timeout::from_millis(5_000)).await;

    assert_eq!(response.first_resumption().unwrap(), "body:a,b\n1,2\n");
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Executed, Subject::Completed]
    );
}

#[tokio::test]
async fn deliver_timeout_cancels_and_resumes_unavailable() {
    let gateway = gateway(
        StubEngine::new(Language::Sql).block_until_cancelled(),
        Role::Read,
    );
    let response = FakeResponse::default();

    let subscription = gateway
        .connector
        .accept(sql_command("default"))
        .subscribe();
    deliver(subscription, &response, Timeout::from_millis(30)).await;

    assert_eq!(
        response.first_resumption().unwrap(),
        "error:execution did not complete in time"
    );

    // the worker observes the cancellation and releases the invocation
    let waited = std::time::Instant::now();
    while gateway.recorder.closed() == 0 && waited.elapsed() < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(gateway.recorder.cancel_observed());
    assert_eq!(gateway.recorder.closed(), 1);

    // the drained outcome still produces the terminal event
    while gateway.events.subjects().len() < 2 && waited.elapsed() < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        gateway.events.subjects(),
        vec![Subject::Received, Subject::Failed]
    );
}

#[tokio::test]
async fn events_of_one_request_share_a_correlation_distinct_from_others() {
    let gateway = gateway(StubEngine::new(Language::Sql), Role::Read);

    for _ in 0..2 {
        let outcome = gateway
            .connector
            .accept(sql_command("default"))
            .subscribe()
            .outcome()
            .await;
        let mut sink = Vec::new();
        outcome.unwrap().unwrap().write(&mut sink).unwrap();
    }

    let events = gateway.events.events();
    assert_eq!(events.len(), 6);
    let (first, second) = events.split_at(3);
    assert!(first
        .iter()
        .all(|e| e.correlation() == first[0].correlation()));
    assert!(second
        .iter()
        .all(|e| e.correlation() == second[0].correlation()));
    assert_ne!(first[0].correlation(), second[0].correlation());
}
