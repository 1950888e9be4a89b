use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use faultline::{
    Accent, Config, DeliveryError, FaultConsole, FaultMonitor, RuntimeError, Severity,
    SignalSource, Surface,
};

/// Surface double recording every call.
#[derive(Default)]
struct Recorder {
    visible: bool,
    shows: usize,
    lines: Vec<(String, Accent)>,
}

impl Surface for Recorder {
    fn is_visible(&self) -> bool {
        self.visible
    }
    fn show(&mut self) {
        self.visible = true;
        self.shows += 1;
    }
    fn hide(&mut self) {
        self.visible = false;
    }
    fn append_line(&mut self, line: &str, accent: Accent) {
        self.lines.push((line.to_string(), accent));
    }
}

fn monitor(sources: usize) -> FaultMonitor<Recorder> {
    let cfg = Config {
        source_count: sources,
        home_thread_name: "test-home".to_string(),
        ..Config::default()
    };
    FaultMonitor::builder(cfg)
        .build(Recorder::default())
        .expect("monitor")
}

fn join(monitor: FaultMonitor<Recorder>) -> FaultConsole<Recorder> {
    monitor.join().expect("home thread")
}

#[tokio::test]
async fn mixed_emissions_are_counted_exactly() {
    let monitor = monitor(3);
    let mut expected: HashMap<String, u64> = HashMap::new();
    let mut workers = Vec::new();

    // Deterministic mix over sources and emission paths.
    for i in 0..90usize {
        let source = &monitor.sources()[(i * 7 + i / 5) % 3];
        *expected.entry(source.name().to_string()).or_default() += 1;
        if let Some(worker) = source.emit(i % 3 != 0) {
            workers.push(worker);
        }
    }
    for worker in workers {
        worker.join().expect("worker");
    }

    let records = monitor.records().await.expect("records");
    let log = monitor.log().await.expect("log");
    assert_eq!(log.len(), 90);
    for record in &records {
        assert_eq!(
            Some(&record.count),
            expected.get(&*record.source),
            "{}",
            record.source
        );
    }
    assert_eq!(records.iter().map(|r| r.count).sum::<u64>(), 90);

    // Every entry's tier is a pure function of its count.
    for entry in &log {
        assert_eq!(entry.severity, Severity::from_count(entry.count));
    }

    let console = join(monitor);
    let (_, presenter) = console.into_parts();
    let surface = presenter.into_surface();
    assert_eq!(surface.shows, 1);
    assert_eq!(surface.lines.len(), 90);
}

#[tokio::test]
async fn one_source_escalates_warning_elevated_critical() {
    let monitor = monitor(1);
    let screen = Arc::clone(&monitor.sources()[0]);

    screen.emit(false);
    screen.emit(true).expect("worker").join().expect("worker");
    screen.emit(false);

    let log = monitor.log().await.expect("log");
    let tiers: Vec<(u64, Severity)> = log.iter().map(|e| (e.count, e.severity)).collect();
    assert_eq!(
        tiers,
        vec![
            (1, Severity::Warning),
            (2, Severity::Elevated),
            (3, Severity::Critical),
        ]
    );

    let console = join(monitor);
    let accents: Vec<Accent> = console
        .presenter()
        .surface()
        .lines
        .iter()
        .map(|(_, a)| *a)
        .collect();
    assert_eq!(accents, vec![Accent::Light, Accent::Medium, Accent::Strong]);
    assert!(console.presenter().surface().lines[2]
        .0
        .ends_with("Screen0 Errors=3"));
}

#[tokio::test]
async fn log_follows_each_threads_emission_order() {
    let sources: Vec<Arc<SignalSource>> = (0..4)
        .map(|i| SignalSource::arc(format!("T{i}")))
        .collect();
    let monitor = FaultMonitor::builder(Config::default())
        .with_sources(sources.clone())
        .build(Recorder::default())
        .expect("monitor");

    // One producer thread per source, each emitting same-thread in a burst.
    let producers: Vec<_> = sources
        .iter()
        .map(|source| {
            let source = Arc::clone(source);
            thread::spawn(move || {
                for _ in 0..25 {
                    source.emit(false);
                }
            })
        })
        .collect();
    for p in producers {
        p.join().expect("producer");
    }

    let log = monitor.log().await.expect("log");
    assert_eq!(log.len(), 100);
    for source in &sources {
        let counts: Vec<u64> = log
            .iter()
            .filter(|e| &*e.source == source.name())
            .map(|e| e.count)
            .collect();
        assert_eq!(counts, (1..=25).collect::<Vec<u64>>(), "{}", source.name());
    }
    join(monitor);
}

#[tokio::test]
async fn nothing_is_delivered_after_shutdown() {
    let monitor = monitor(2);
    monitor.sources()[0].emit(false);
    assert_eq!(monitor.log().await.map(|l| l.len()), Ok(1));

    monitor.shutdown();
    assert!(monitor.is_shut_down());
    assert!(monitor.dispatcher().is_shut_down());

    for source in monitor.sources() {
        source.emit(false);
        if let Some(worker) = source.emit(true) {
            worker.join().expect("worker");
        }
    }
    assert_eq!(
        monitor
            .dispatcher()
            .try_post(|_: &mut FaultConsole<Recorder>| {}),
        Err(DeliveryError::PostAfterShutdown)
    );
    assert_eq!(monitor.log().await, Err(DeliveryError::PostAfterShutdown));

    let console = join(monitor);
    assert_eq!(console.aggregator().len(), 1);
    assert!(console.presenter().is_disposing());
}

#[tokio::test]
async fn dismissed_surface_reopens_on_next_fault() {
    let monitor = monitor(1);
    let screen = Arc::clone(&monitor.sources()[0]);

    screen.emit(false);
    screen.emit(false);
    monitor.dismiss();
    screen.emit(false);
    monitor.log().await.expect("barrier");

    let console = join(monitor);
    let surface = console.presenter().surface();
    assert_eq!(surface.shows, 2);
    assert!(surface.visible);
}

#[test]
fn building_without_sources_fails() {
    let err = FaultMonitor::builder(Config::default())
        .with_sources(Vec::new())
        .build(Recorder::default())
        .err()
        .expect("no sources");
    assert!(matches!(err, RuntimeError::NoSources));
}

#[tokio::test]
async fn run_returns_console_after_shutdown() {
    let cfg = Config {
        min_interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(15),
        grace: Duration::from_secs(5),
        ..Config::default()
    };
    let monitor = FaultMonitor::builder(cfg)
        .build(Recorder::default())
        .expect("monitor");
    let token = monitor.shutdown_token();

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });
    let console = monitor.run().await.expect("run");
    stopper.await.expect("stopper");

    // Whatever was delivered before shutdown is consistent.
    let agg = console.aggregator();
    let total: u64 = agg.records().iter().map(|r| r.count).sum();
    assert_eq!(total as usize, agg.len());
    assert!(console.presenter().is_disposing());
}

#[test]
fn stuck_home_thread_is_abandoned_after_grace() {
    let cfg = Config {
        grace: Duration::from_millis(50),
        ..Config::default()
    };
    let monitor = FaultMonitor::builder(cfg)
        .build(Recorder::default())
        .expect("monitor");

    let (entered_tx, entered_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    monitor
        .dispatcher()
        .post(move |_: &mut FaultConsole<Recorder>| {
            let _ = entered_tx.send(());
            let _ = release_rx.recv();
        });
    entered_rx.recv().expect("callback entered");
    monitor.shutdown();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let res = runtime.block_on(monitor.run());
    assert!(matches!(res, Err(RuntimeError::GraceExceeded { .. })));

    // Dropping the runtime must not wait on the stuck home thread.
    drop(runtime);
    release_tx.send(()).expect("release");
}
