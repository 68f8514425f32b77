//! End-to-end tests: real listener, real sockets.

use axum::routing::get;
use sail::prelude::*;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{RwLock, oneshot};

fn config_for(port: u16) -> ConfigService {
    let config = ConfigService::empty();
    config.set("HOST", "127.0.0.1");
    config.set("PORT", &port.to_string());
    config
}

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

async fn wait_for_listener(port: u16) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while TcpStream::connect(addr(port)).await.is_err() {
        assert!(Instant::now() < deadline, "listener on {port} never came up");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Registers a single GET route answering with a fixed body.
struct RouteModule {
    path: &'static str,
    body: &'static str,
}

#[async_trait]
impl Module for RouteModule {
    fn name(&self) -> &str {
        self.path
    }

    async fn initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
        let body = self.body;
        ctx.router().handle(self.path, get(move || async move { body }))?;
        ctx.container().register(self.path, body.to_string())?;
        Ok(())
    }
}

/// Sleeps inside its handler, counting completed requests.
struct SlowModule {
    delay: Duration,
    completed: Arc<AtomicUsize>,
}

#[async_trait]
impl Module for SlowModule {
    async fn initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
        let delay = self.delay;
        let completed = Arc::clone(&self.completed);
        ctx.router().handle(
            "/slow",
            get(move || async move {
                tokio::time::sleep(delay).await;
                completed.fetch_add(1, Ordering::SeqCst);
                "done"
            }),
        )?;
        Ok(())
    }
}

#[derive(Default)]
struct ShutdownProbe {
    shut_down: Arc<AtomicBool>,
}

#[async_trait]
impl Module for ShutdownProbe {
    async fn initialize(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
        Ok(())
    }
}

#[async_trait]
impl OnApplicationShutdown for ShutdownProbe {
    async fn on_application_shutdown(&mut self) -> Result<(), LifecycleError> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingModule;

#[async_trait]
impl Module for FailingModule {
    async fn initialize(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
        Err(LifecycleError::init_failed("boom"))
    }
}

#[tokio::test]
async fn test_empty_application_starts_and_stops_on_signal() {
    let port = 38_101;
    let app = Application::builder().config(config_for(port)).build();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let run = tokio::spawn(app.run_until(async {
        let _ = stop_rx.await;
    }));
    wait_for_listener(port).await;

    let started = Instant::now();
    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("shutdown exceeded bound")
        .unwrap();

    assert!(result.is_ok());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(TcpStream::connect(addr(port)).await.is_err());
}

#[tokio::test]
async fn test_failed_initialization_never_binds() {
    let port = 38_102;
    let probe = ShutdownProbe::default();
    let shut_down = Arc::clone(&probe.shut_down);

    let mut app = Application::builder().config(config_for(port)).build();
    app.register_entry(ModuleEntry::new(probe).with_shutdown()).unwrap();
    app.register_module(FailingModule).unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        app.run_until(std::future::pending()),
    )
    .await
    .expect("run must return after a failed init");

    match result {
        Err(SailError::Lifecycle(LifecycleError::InitializationFailed(msg))) => {
            assert_eq!(msg, "boom")
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(TcpStream::connect(addr(port)).await.is_err());
    assert!(!shut_down.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_routes_from_each_module_are_dispatched() {
    let port = 38_103;
    let mut app = Application::builder().config(config_for(port)).build();
    app.use_middleware(request_id());
    app.register_module(RouteModule {
        path: "/a",
        body: "module a",
    })
    .unwrap();
    app.register_module(RouteModule {
        path: "/b",
        body: "module b",
    })
    .unwrap();
    let container = Arc::clone(app.container());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let run = tokio::spawn(app.run_until(async {
        let _ = stop_rx.await;
    }));
    wait_for_listener(port).await;

    let base = format!("http://127.0.0.1:{port}");
    let a = reqwest::get(format!("{base}/a")).await.unwrap();
    assert!(a.headers().contains_key(sail::router::REQUEST_ID_HEADER));
    assert_eq!(a.text().await.unwrap(), "module a");
    let b = reqwest::get(format!("{base}/b")).await.unwrap();
    assert_eq!(b.text().await.unwrap(), "module b");
    let c = reqwest::get(format!("{base}/c")).await.unwrap();
    assert_eq!(c.status(), reqwest::StatusCode::NOT_FOUND);

    assert_eq!(
        container.resolve::<String>("/a").as_deref().map(String::as_str),
        Some("module a")
    );
    assert!(container.is_frozen());
    assert!(container.register("late", 1_u8).is_err());

    stop_tx.send(()).unwrap();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_listener_failure_still_runs_module_shutdown() {
    let port = 38_104;
    let _occupied = std::net::TcpListener::bind(addr(port)).unwrap();

    let probe = Arc::new(RwLock::new(ShutdownProbe::default()));
    let mut app = Application::builder().config(config_for(port)).build();
    app.register_entry(ModuleEntry::shared(Arc::clone(&probe)).with_shutdown())
        .unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        app.run_until(std::future::pending()),
    )
    .await
    .expect("listener failure must end the run");

    assert!(matches!(result, Err(SailError::Listener(_))));
    assert!(probe.read().await.shut_down.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_in_flight_request_completes_during_shutdown() {
    let port = 38_105;
    let completed = Arc::new(AtomicUsize::new(0));
    let mut app = Application::builder().config(config_for(port)).build();
    app.register_module(SlowModule {
        delay: Duration::from_millis(300),
        completed: Arc::clone(&completed),
    })
    .unwrap();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let run = tokio::spawn(app.run_until(async {
        let _ = stop_rx.await;
    }));
    wait_for_listener(port).await;

    let request = tokio::spawn(reqwest::get(format!("http://127.0.0.1:{port}/slow")));
    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.text().await.unwrap(), "done");
    run.await.unwrap().unwrap();
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_is_bounded_when_requests_hang() {
    let port = 38_106;
    let completed = Arc::new(AtomicUsize::new(0));
    let mut app = Application::builder()
        .config(config_for(port))
        .shutdown_timeout(Duration::from_millis(200))
        .build();
    app.register_module(SlowModule {
        delay: Duration::from_secs(30),
        completed: Arc::clone(&completed),
    })
    .unwrap();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let run = tokio::spawn(app.run_until(async {
        let _ = stop_rx.await;
    }));
    wait_for_listener(port).await;

    let _request = tokio::spawn(reqwest::get(format!("http://127.0.0.1:{port}/slow")));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("shutdown must not wait for the hanging request")
        .unwrap()
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(completed.load(Ordering::SeqCst), 0);
}
