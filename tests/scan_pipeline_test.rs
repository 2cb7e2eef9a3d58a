use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use subprobe::{
    ConsoleSink, Pacing, Probe, ProbeResult, Resolve, ResultSink, ScanConfig, ScanEngine,
    ScanError, Wordlist,
};
use tokio_test::assert_ok;

/// 记录调用的解析器，只有 `live` 中的域名能解析
struct FakeResolver {
    live: HashSet<String>,
    seen: Mutex<Vec<String>>,
}

impl FakeResolver {
    fn new(live: &[&str]) -> Arc<Self> {
        Arc::new(FakeResolver {
            live: live.iter().map(|s| s.to_string()).collect(),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolve for FakeResolver {
    async fn resolve(&self, hostname: &str) -> bool {
        self.seen.lock().unwrap().push(hostname.to_string());
        self.live.contains(hostname)
    }
}

/// 记录调用的探测器，未配置的域名视为两种协议都失败
struct FakeProber {
    statuses: HashMap<String, u16>,
    panic_on: Option<String>,
    seen: Mutex<Vec<String>>,
}

impl FakeProber {
    fn new(statuses: &[(&str, u16)]) -> Arc<Self> {
        Arc::new(FakeProber {
            statuses: statuses.iter().map(|(h, s)| (h.to_string(), *s)).collect(),
            panic_on: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Probe for FakeProber {
    async fn probe(&self, hostname: &str, _timeout: Duration) -> Option<u16> {
        self.seen.lock().unwrap().push(hostname.to_string());
        if self.panic_on.as_deref() == Some(hostname) {
            panic!("probe exploded for {}", hostname);
        }
        self.statuses.get(hostname).copied()
    }
}

/// 收集输出行
#[derive(Clone, Default)]
struct LineSink(Arc<Mutex<Vec<String>>>);

impl ResultSink for LineSink {
    fn emit(&mut self, result: &ProbeResult) {
        self.0.lock().unwrap().push(ConsoleSink::render(result, false));
    }
}

fn fast_config(domain: &str) -> ScanConfig {
    ScanConfig {
        pacing: Pacing::Fixed(Duration::ZERO),
        ..ScanConfig::new(domain)
    }
}

fn engine(config: ScanConfig, resolver: Arc<FakeResolver>, prober: Arc<FakeProber>) -> ScanEngine {
    assert_ok!(ScanEngine::with_components(config, resolver, prober))
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

#[tokio::test]
async fn four_line_wordlist_scenario() {
    let resolver = FakeResolver::new(&["www.example.com", "mail.example.com"]);
    let prober = FakeProber::new(&[("www.example.com", 200), ("mail.example.com", 500)]);
    let sink = LineSink::default();

    let wordlist = Wordlist::from_lines(["www", "", "  mail  ", "doesnotexist123xyz"]);
    let engine = engine(fast_config("example.com"), resolver.clone(), prober.clone());
    let report = assert_ok!(engine.run_with_sink(&wordlist, sink.clone()).await);

    // 单worker时解析顺序就是字典顺序
    assert_eq!(
        resolver.seen(),
        vec![
            "www.example.com",
            "mail.example.com",
            "doesnotexist123xyz.example.com"
        ]
    );
    assert_eq!(report.summary.submitted, 3);
    assert_eq!(report.summary.processed, 3);
    assert_eq!(report.summary.resolved, 2);
    assert_eq!(report.summary.included, 1);
    assert_eq!(*sink.0.lock().unwrap(), vec!["www.example.com -> 200"]);
}

#[tokio::test]
async fn resolver_sees_every_candidate_exactly_once() {
    let labels: Vec<String> = (0..500)
        .map(|i| if i % 7 == 0 { "   ".to_string() } else { format!(" host{} ", i) })
        .collect();
    let expected: Vec<String> = labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| format!("{}.test.org", l))
        .collect();

    let resolver = FakeResolver::new(&[]);
    let prober = FakeProber::new(&[]);
    let config = ScanConfig {
        workers: Some(6),
        ..fast_config("test.org")
    };

    let wordlist = Wordlist::from_lines(labels);
    let report = assert_ok!(engine(config, resolver.clone(), prober).run(&wordlist).await);

    let seen = resolver.seen();
    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(unique.len(), seen.len());
    assert_eq!(sorted(seen), sorted(expected.clone()));
    assert_eq!(report.summary.submitted, expected.len());
    assert_eq!(report.summary.processed, expected.len());
    assert_eq!(report.summary.workers, 6);
}

#[tokio::test]
async fn unresolved_candidates_are_never_probed() {
    let resolver = FakeResolver::new(&["live.example.com"]);
    let prober = FakeProber::new(&[("live.example.com", 200), ("dead.example.com", 200)]);

    let wordlist = Wordlist::from_lines(["live", "dead", "gone"]);
    let engine = engine(fast_config("example.com"), resolver, prober.clone());
    let report = assert_ok!(engine.run(&wordlist).await);

    assert_eq!(prober.seen(), vec!["live.example.com"]);
    assert_eq!(report.summary.resolved, 1);
    assert_eq!(report.included.len(), 1);
}

#[tokio::test]
async fn only_allow_listed_statuses_are_included() {
    let hosts = ["ok", "forbidden", "missing", "broken", "moved", "silent"];
    let live: Vec<String> = hosts.iter().map(|h| format!("{}.example.com", h)).collect();
    let live_refs: Vec<&str> = live.iter().map(String::as_str).collect();

    let resolver = FakeResolver::new(&live_refs);
    let prober = FakeProber::new(&[
        ("ok.example.com", 200),
        ("forbidden.example.com", 403),
        ("missing.example.com", 404),
        ("broken.example.com", 500),
        ("moved.example.com", 301),
    ]);

    let wordlist = Wordlist::from_lines(hosts);
    let report = assert_ok!(
        engine(fast_config("example.com"), resolver, prober)
            .run(&wordlist)
            .await
    );

    for result in &report.included {
        assert!(result.included());
        assert!(matches!(result.status(), Some(200 | 403 | 404)));
    }
    let included: BTreeSet<&str> = report.included.iter().map(|r| r.hostname()).collect();
    assert_eq!(
        included,
        ["forbidden.example.com", "missing.example.com", "ok.example.com"]
            .into_iter()
            .collect()
    );
    assert_eq!(report.summary.responded, 5);
}

#[tokio::test]
async fn server_error_produces_no_output_line() {
    let resolver = FakeResolver::new(&["api.example.com"]);
    let prober = FakeProber::new(&[("api.example.com", 500)]);
    let sink = LineSink::default();

    let wordlist = Wordlist::from_lines(["api"]);
    let engine = engine(fast_config("example.com"), resolver, prober);
    let report = assert_ok!(engine.run_with_sink(&wordlist, sink.clone()).await);

    assert!(report.included.is_empty());
    assert_eq!(report.summary.responded, 1);
    assert!(sink.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn custom_allow_list_is_respected() {
    let resolver = FakeResolver::new(&["a.example.com", "b.example.com"]);
    let prober = FakeProber::new(&[("a.example.com", 200), ("b.example.com", 500)]);
    let config = ScanConfig {
        allowed_status: [500].into_iter().collect(),
        ..fast_config("example.com")
    };

    let wordlist = Wordlist::from_lines(["a", "b"]);
    let report = assert_ok!(engine(config, resolver, prober).run(&wordlist).await);

    assert_eq!(report.included.len(), 1);
    assert_eq!(report.included[0].to_string(), "b.example.com -> 500");
}

#[tokio::test]
async fn repeated_scans_yield_the_same_result_set() {
    let labels: Vec<String> = (0..200).map(|i| format!("h{}", i)).collect();
    let live: Vec<String> = (0..200)
        .filter(|i| i % 3 == 0)
        .map(|i| format!("h{}.example.com", i))
        .collect();
    let statuses: Vec<(String, u16)> = live
        .iter()
        .enumerate()
        .map(|(i, h)| (h.clone(), [200, 403, 404, 500][i % 4]))
        .collect();

    let wordlist = Wordlist::from_lines(labels);
    let mut runs = Vec::new();
    for _ in 0..2 {
        let live_refs: Vec<&str> = live.iter().map(String::as_str).collect();
        let status_refs: Vec<(&str, u16)> =
            statuses.iter().map(|(h, s)| (h.as_str(), *s)).collect();
        let config = ScanConfig {
            workers: Some(5),
            ..fast_config("example.com")
        };
        let engine = engine(config, FakeResolver::new(&live_refs), FakeProber::new(&status_refs));
        let report = assert_ok!(engine.run(&wordlist).await);
        let set: BTreeSet<String> = report.included.iter().map(|r| r.to_string()).collect();
        runs.push(set);
    }

    assert!(!runs[0].is_empty());
    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn jittered_pacing_still_completes() {
    let resolver = FakeResolver::new(&["x.example.com"]);
    let prober = FakeProber::new(&[("x.example.com", 404)]);
    let config = ScanConfig {
        workers: Some(2),
        pacing: Pacing::jitter(Duration::from_millis(1), Duration::from_millis(3)),
        ..ScanConfig::new("example.com")
    };

    let wordlist = Wordlist::from_lines(["x", "y", "z", "w"]);
    let report = assert_ok!(engine(config, resolver, prober).run(&wordlist).await);
    assert_eq!(report.summary.processed, 4);
    assert_eq!(report.included.len(), 1);
}

#[tokio::test]
async fn empty_wordlist_finishes_immediately() {
    let wordlist = Wordlist::parse("\n   \n\t\n");
    let report = assert_ok!(
        engine(fast_config("example.com"), FakeResolver::new(&[]), FakeProber::new(&[]))
            .run(&wordlist)
            .await
    );
    assert_eq!(report.summary.submitted, 0);
    assert_eq!(report.summary.processed, 0);
    assert_eq!(report.summary.workers, 1);
}

#[tokio::test]
async fn stopped_engine_reports_interrupted() {
    let resolver = FakeResolver::new(&[]);
    let engine = engine(fast_config("example.com"), resolver.clone(), FakeProber::new(&[]));
    engine.stop_handle().store(false, Ordering::Relaxed);

    let wordlist = Wordlist::from_lines(["a", "b", "c"]);
    let report = assert_ok!(engine.run(&wordlist).await);

    assert!(report.summary.interrupted);
    assert_eq!(report.summary.submitted, 3);
    assert_eq!(report.summary.processed, 0);
    assert!(resolver.seen().is_empty());
}

#[tokio::test]
async fn panicking_worker_is_reported() {
    let resolver = FakeResolver::new(&["a.example.com", "b.example.com", "c.example.com"]);
    let prober = Arc::new(FakeProber {
        statuses: [("a.example.com".to_string(), 200)].into_iter().collect(),
        panic_on: Some("b.example.com".to_string()),
        seen: Mutex::new(Vec::new()),
    });
    let config = ScanConfig {
        workers: Some(2),
        ..fast_config("example.com")
    };

    let wordlist = Wordlist::from_lines(["a", "b", "c"]);
    let err = engine(config, resolver.clone(), prober)
        .run(&wordlist)
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::WorkerFailed(_)));
    // 其余worker继续消费队列
    assert_eq!(resolver.seen().len(), 3);
}

#[tokio::test]
async fn empty_domain_is_rejected() {
    let result = ScanEngine::with_components(
        ScanConfig::new(""),
        FakeResolver::new(&[]),
        FakeProber::new(&[]),
    );
    assert!(matches!(result, Err(ScanError::EmptyDomain)));
}

#[test]
fn wordlist_file_drops_invalid_utf8() {
    let path = std::env::temp_dir().join(format!("subprobe-wordlist-{}.txt", std::process::id()));
    std::fs::write(&path, b"w\xffww\n\n  api \r\nm\xfe\xfdail\n").unwrap();

    let wordlist = assert_ok!(Wordlist::from_file(&path));
    let hosts: Vec<String> = wordlist
        .candidates("example.com")
        .map(|c| c.into_hostname())
        .collect();
    let _ = std::fs::remove_file(&path);

    assert_eq!(
        hosts,
        vec!["www.example.com", "api.example.com", "mail.example.com"]
    );
}

#[tokio::test]
async fn missing_wordlist_aborts_before_scanning() {
    let err = subprobe::scan_subdomains("example.com", "/definitely/not/here/wordlist.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::WordlistUnavailable { .. }));
}
