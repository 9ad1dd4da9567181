//! Integration tests for pvrpc.
//!
//! These tests drive handlers through the host the way a server would.

use pvrpc::array::{BulkArrayReader, ChunkedSlice, ElementKind};
use pvrpc::handler::{ChannelContext, CompletionSink, HandlerState, RpcServer, RpcService};
use pvrpc::host::{HostConfig, ServiceHost, INCOMPLETE_REQUEST};
use pvrpc::service::{HelloService, HelloServiceFactory, SummaryService, SummaryServiceFactory};
use pvrpc::structure::{FieldDesc, PvStructure};
use pvrpc::{PvRpcError, Result, Status};

fn hello_host() -> ServiceHost {
    ServiceHost::builder()
        .service(HelloService::NAME, HelloServiceFactory::create)
        .service(SummaryService::NAME, SummaryServiceFactory::create)
        .build()
}

fn name_arg(name: &str) -> PvStructure {
    PvStructure::new().with_field("name", name).unwrap()
}

/// Echoes `seq` back, counting calls per handler instance.
#[derive(Default)]
struct Sequencer {
    calls: i64,
}

impl RpcService for Sequencer {
    fn argument_fields(&self) -> Vec<FieldDesc> {
        vec![FieldDesc::scalar("seq", ElementKind::Long)]
    }

    fn reply_fields(&self) -> Vec<FieldDesc> {
        vec![
            FieldDesc::scalar("seq", ElementKind::Long),
            FieldDesc::scalar("calls", ElementKind::Long),
        ]
    }

    fn compute(
        &mut self,
        _ctx: &ChannelContext,
        argument: &PvStructure,
        reply: &mut PvStructure,
    ) -> Result<()> {
        self.calls += 1;
        reply.set_field("seq", argument.get_long("seq")?)?;
        reply.set_field("calls", self.calls)
    }
}

/// Handler that tags each reply with its call number and delivers it
/// `deliveries` times.
struct Repeater {
    deliveries: usize,
    calls: i64,
    sink: Option<Box<dyn CompletionSink>>,
    state: HandlerState,
}

impl Repeater {
    fn boxed(deliveries: usize) -> Box<dyn RpcServer> {
        Box::new(Repeater {
            deliveries,
            calls: 0,
            sink: None,
            state: HandlerState::Uninitialized,
        })
    }
}

impl RpcServer for Repeater {
    fn initialize(&mut self, _context: ChannelContext, sink: Box<dyn CompletionSink>) -> Status {
        self.sink = Some(sink);
        self.state = HandlerState::Ready;
        Status::ok()
    }

    fn request(&mut self, _argument: &PvStructure) -> Result<()> {
        self.calls += 1;
        let reply = PvStructure::new().with_field("call", self.calls)?;
        if let Some(sink) = &self.sink {
            for _ in 0..self.deliveries {
                sink.deliver(Status::ok(), Some(reply.clone()));
            }
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.sink = None;
        self.state = HandlerState::Destroyed;
    }

    fn state(&self) -> HandlerState {
        self.state
    }
}

/// Test the canonical hello round trip through the host.
#[tokio::test]
async fn test_hello_world_through_host() {
    let host = hello_host();
    let channel = host.open_channel("hello", "greeter").await.unwrap();

    let outcome = channel.call(name_arg("World")).await.unwrap();

    assert!(outcome.is_ok());
    let reply = outcome.reply.unwrap();
    assert_eq!(reply.introspect(), vec![FieldDesc::string("greeting")]);
    assert_eq!(reply.get_string("greeting").unwrap(), "Hello World");

    channel.close().await.unwrap();
    assert_eq!(host.open_channels(), 0);
}

/// Test that a missing field is a failure outcome, not a call error.
#[tokio::test]
async fn test_missing_field_through_host() {
    let host = hello_host();
    let channel = host.open_channel("hello", "greeter").await.unwrap();

    let outcome = channel.call(PvStructure::new()).await.unwrap();

    assert!(!outcome.is_ok());
    assert!(outcome.reply.is_none());
    assert!(matches!(
        outcome.into_reply(),
        Err(PvRpcError::Compute(reason)) if reason == "missing field: name"
    ));

    // Channel keeps working after a failed call
    let outcome = channel.call(name_arg("again")).await.unwrap();
    assert!(outcome.is_ok());
}

/// Test that calls on one channel are handled in order by one instance.
#[tokio::test]
async fn test_calls_are_serialized_per_channel() {
    let host = ServiceHost::builder()
        .rpc_service("seq", Sequencer::default)
        .build();
    let channel = host.open_channel("seq", "ordered").await.unwrap();

    for seq in 1..=20i64 {
        let argument = PvStructure::new().with_field("seq", seq).unwrap();
        let reply = channel.call(argument).await.unwrap().into_reply().unwrap();
        assert_eq!(reply.get_long("seq").unwrap(), seq);
        assert_eq!(reply.get_long("calls").unwrap(), seq);
    }
}

/// Test that channels have independent handler instances.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_channels_are_independent() {
    let host = std::sync::Arc::new(
        ServiceHost::builder()
            .rpc_service("seq", Sequencer::default)
            .build(),
    );

    let mut tasks = Vec::new();
    for ch in 0..8 {
        let host = host.clone();
        tasks.push(tokio::spawn(async move {
            let channel = host
                .open_channel("seq", &format!("ch{}", ch))
                .await
                .unwrap();
            for seq in 1..=10i64 {
                let argument = PvStructure::new().with_field("seq", seq).unwrap();
                let reply = channel.call(argument).await.unwrap().into_reply().unwrap();
                assert_eq!(reply.get_long("calls").unwrap(), seq);
            }
            channel.close().await.unwrap();
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(host.open_channels(), 0);
}

/// Test the channel limit and that closing frees a slot.
#[tokio::test]
async fn test_channel_limit() {
    let host = ServiceHost::builder()
        .service(HelloService::NAME, HelloServiceFactory::create)
        .max_channels(2)
        .build();

    let a = host.open_channel("hello", "a").await.unwrap();
    let _b = host.open_channel("hello", "b").await.unwrap();

    let err = host.open_channel("hello", "c").await.unwrap_err();
    assert!(matches!(err, PvRpcError::ChannelLimit(2)));

    a.close().await.unwrap();
    let c = host.open_channel("hello", "c").await.unwrap();
    assert!(c.is_open());
}

/// Test that dropping a handle tears the channel down.
#[tokio::test]
async fn test_drop_handle_closes_channel() {
    let host = ServiceHost::builder()
        .service(HelloService::NAME, HelloServiceFactory::create)
        .max_channels(1)
        .build();

    let channel = host.open_channel("hello", "a").await.unwrap();
    drop(channel);

    // The task releases its permit once it observes the closed queue.
    for _ in 0..100 {
        if host.open_channels() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(host.open_channels(), 0);
    assert!(host.open_channel("hello", "b").await.is_ok());
}

/// Test array arguments copied with the configured chunk limit.
#[tokio::test]
async fn test_summary_with_small_chunks() {
    let config = HostConfig::from_json_str(r#"{"array_chunk_limit": 3}"#).unwrap();
    let host = ServiceHost::builder()
        .service(SummaryService::NAME, SummaryServiceFactory::create)
        .config(config)
        .build();
    let channel = host.open_channel("summary", "stats").await.unwrap();

    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    let argument = PvStructure::new().with_field("values", values).unwrap();
    let reply = channel.call(argument).await.unwrap().into_reply().unwrap();

    assert_eq!(reply.get_long("count").unwrap(), 10);
    assert_eq!(reply.get_double("sum").unwrap(), 55.0);
    assert_eq!(reply.get_double("mean").unwrap(), 5.5);
    assert_eq!(reply.get_double("min").unwrap(), 1.0);
    assert_eq!(reply.get_double("max").unwrap(), 10.0);
}

/// Test that request options reach the handler's context.
#[tokio::test]
async fn test_pv_request_is_attached() {
    struct Options;

    impl RpcService for Options {
        fn argument_fields(&self) -> Vec<FieldDesc> {
            Vec::new()
        }

        fn reply_fields(&self) -> Vec<FieldDesc> {
            vec![FieldDesc::string("mode")]
        }

        fn compute(
            &mut self,
            ctx: &ChannelContext,
            _argument: &PvStructure,
            reply: &mut PvStructure,
        ) -> Result<()> {
            reply.set_field("mode", ctx.pv_request().get_string("mode")?.to_string())
        }
    }

    let host = ServiceHost::builder().rpc_service("opts", || Options).build();
    let pv_request = PvStructure::new().with_field("mode", "fast").unwrap();
    let channel = host
        .open_channel_with("opts", "o", pv_request)
        .await
        .unwrap();

    let reply = channel
        .call(PvStructure::new())
        .await
        .unwrap()
        .into_reply()
        .unwrap();
    assert_eq!(reply.get_string("mode").unwrap(), "fast");
}

/// Test bulk reads of every element kind from chunked slices.
#[test]
fn test_bulk_reads_all_kinds() {
    let doubles: Vec<f64> = (0..10).map(|i| i as f64 / 4.0).collect();
    let longs: Vec<i64> = (0..33).map(|i| i * i).collect();
    let bytes: Vec<i8> = (-5..5).collect();
    let strings: Vec<String> = ["a", "bb", "", "dddd"].iter().map(|s| s.to_string()).collect();

    assert_eq!(
        BulkArrayReader::read_doubles(&ChunkedSlice::new(&doubles, 3)).unwrap(),
        doubles
    );
    assert_eq!(
        BulkArrayReader::read_longs(&ChunkedSlice::new(&longs, 7)).unwrap(),
        longs
    );
    assert_eq!(
        BulkArrayReader::read_bytes(&ChunkedSlice::new(&bytes, 1)).unwrap(),
        bytes
    );
    assert_eq!(
        BulkArrayReader::read_strings(&ChunkedSlice::new(&strings, 2)).unwrap(),
        strings
    );
}

/// Test that extra completions never answer a later call.
#[tokio::test]
async fn test_extra_completions_are_dropped() {
    let host = ServiceHost::builder()
        .service("twice", || Repeater::boxed(2))
        .build();
    let channel = host.open_channel("twice", "t").await.unwrap();

    for call in 1..=3i64 {
        let reply = channel
            .call(PvStructure::new())
            .await
            .unwrap()
            .into_reply()
            .unwrap();
        assert_eq!(reply.get_long("call").unwrap(), call);
    }

    channel.close().await.unwrap();
}

/// Test that a handler returning without completing yields a failure.
#[tokio::test]
async fn test_missing_completion_is_a_failure() {
    let host = ServiceHost::builder()
        .service("silent", || Repeater::boxed(0))
        .build();
    let channel = host.open_channel("silent", "s").await.unwrap();

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        channel.call(PvStructure::new()),
    )
    .await
    .expect("call should not hang")
    .unwrap();

    assert!(!outcome.is_ok());
    assert_eq!(outcome.status.reason(), Some(INCOMPLETE_REQUEST));
    assert!(outcome.reply.is_none());

    tokio::time::timeout(std::time::Duration::from_secs(5), channel.close())
        .await
        .expect("close should not hang")
        .unwrap();
    assert_eq!(host.open_channels(), 0);
}
