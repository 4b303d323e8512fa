//! Integration tests for resolver crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use httpmock::prelude::*;
    use nbs_config::Config;
    use nbs_errors::{Error, FailureKind, ResolveError};
    use nbs_events::{AppEvent, DownloadEvent, EventReceiver, ProbeEvent, ResolutionEvent};
    use nbs_index::MetadataCache;
    use nbs_net::{NetClient, NetConfig, RetryPolicy};
    use nbs_resolver::*;
    use nbs_types::{
        Candidate, DebVersion, FetchedArtifact, ProbeResult, ProbeTask, RepositoryDescriptor,
        ResolutionOutcome,
    };
    use std::io::Write;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    const INDEX_PATH: &str = "/dists/bookworm/main/binary-amd64/Packages.gz";

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn index_for(package: &str, version: &str) -> Vec<u8> {
        gzip(&format!(
            "Package: other\nVersion: 0.1-1\nFilename: pool/main/o/other/other_0.1-1_amd64.deb\n\n\
             Package: {package}\nVersion: {version}\nFilename: {}\n\n",
            deb_path(package, version).trim_start_matches('/')
        ))
    }

    fn deb_path(package: &str, version: &str) -> String {
        let initial = &package[..1];
        format!("/pool/main/{initial}/{package}/{package}_{version}_amd64.deb")
    }

    fn test_config(cache_dir: &Path) -> Config {
        let mut config = Config::default();
        config.paths.cache_dir = Some(cache_dir.to_path_buf());
        config.probe.jitter_min_ms = 5;
        config.probe.jitter_max_ms = 10;
        config.probe.mirrors_per_component = 0;
        config
    }

    fn test_client(timeout: Duration) -> NetClient {
        NetClient::new(NetConfig {
            timeout,
            connect_timeout: timeout,
            ..NetConfig::default()
        })
        .unwrap()
    }

    fn test_engine(config: &Config, mirrors: Vec<String>) -> ResolutionEngine {
        let mut registry = MirrorRegistry::empty();
        registry.insert("debian", mirrors);
        ResolutionEngine::with_client(test_client(Duration::from_secs(5)), registry, config)
    }

    fn debian() -> Vec<RepositoryDescriptor> {
        vec![RepositoryDescriptor::new("debian", "bookworm", "amd64")]
    }

    fn task(mirror: &str, package: &str) -> ProbeTask {
        ProbeTask {
            mirror_url: mirror.to_string(),
            release: "bookworm".into(),
            arch: "amd64".into(),
            package_name: package.into(),
            component: "main".into(),
        }
    }

    fn fast_prober(timeout: Duration) -> MetadataProber {
        MetadataProber::new(
            test_client(timeout),
            MetadataCache::new(),
            RetryPolicy {
                attempts: 3,
                jitter_min: Duration::from_millis(5),
                jitter_max: Duration::from_millis(10),
            },
        )
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message.event);
        }
        events
    }

    #[tokio::test]
    async fn test_newest_version_wins_regardless_of_arrival() {
        let mirror_a = MockServer::start();
        let mirror_b = MockServer::start();

        // A answers last but carries the newer version
        mirror_a.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200)
                .delay(Duration::from_millis(300))
                .body(index_for("foo", "1:2.0-1"));
        });
        mirror_b.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body(index_for("foo", "1:1.9-3"));
        });
        let deb_a = mirror_a.mock(|when, then| {
            when.method(GET).path(deb_path("foo", "1:2.0-1"));
            then.status(200).body("deb from a");
        });
        let deb_b = mirror_b.mock(|when, then| {
            when.method(GET).path(deb_path("foo", "1:1.9-3"));
            then.status(200).body("deb from b");
        });

        let temp = tempdir().unwrap();
        let config = test_config(temp.path());
        let engine = test_engine(&config, vec![mirror_a.base_url(), mirror_b.base_url()]);
        let dest = temp.path().join("debs");

        let outcome = engine
            .resolve("foo", &debian(), &dest)
            .await
            .unwrap()
            .unwrap();
        let versions: Vec<_> = outcome
            .candidates()
            .iter()
            .map(|c| c.version_string.as_str())
            .collect();
        assert_eq!(versions, vec!["1:2.0-1", "1:1.9-3"]);

        let artifact = engine.fetch("foo", &debian(), &dest).await.unwrap().unwrap();
        assert_eq!(artifact.version, "1:2.0-1");
        assert_eq!(artifact.pass, 1);
        assert_eq!(artifact.path, dest.join("foo.deb"));
        assert_eq!(std::fs::read_to_string(&artifact.path).unwrap(), "deb from a");
        deb_a.assert_hits(1);
        deb_b.assert_hits(0);
    }

    #[tokio::test]
    async fn test_timeouts_retried_three_times() {
        let server = MockServer::start();
        let index = server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200)
                .delay(Duration::from_secs(2))
                .body(index_for("foo", "1.0-1"));
        });

        let prober = MetadataProber::new(
            test_client(Duration::from_millis(200)),
            MetadataCache::new(),
            RetryPolicy::default(),
        );

        let started = Instant::now();
        let report = prober.probe(&task(&server.base_url(), "foo")).await;

        assert_eq!(
            report.result,
            ProbeResult::Failed {
                kind: FailureKind::Timeout,
                attempts: 3
            }
        );
        index.assert_hits(3);
        // Two jittered pauses of at least 200ms each
        assert!(started.elapsed() >= Duration::from_millis(400));
        assert!(report
            .status_message()
            .unwrap()
            .contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_not_found_status_is_retried() {
        let server = MockServer::start();
        let index = server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(404);
        });

        let report = fast_prober(Duration::from_secs(5))
            .probe(&task(&server.base_url(), "foo"))
            .await;

        assert_eq!(
            report.result,
            ProbeResult::Failed {
                kind: FailureKind::HttpStatus { code: 404 },
                attempts: 3
            }
        );
        index.assert_hits(3);
    }

    #[tokio::test]
    async fn test_cached_index_fetched_once() {
        let server = MockServer::start();
        let index = server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body(index_for("foo", "1.0-1"));
        });

        let prober = fast_prober(Duration::from_secs(5));
        let first = prober.probe(&task(&server.base_url(), "foo")).await;
        let second = prober.probe(&task(&server.base_url(), "foo")).await;
        // Same index, different package
        let other = prober.probe(&task(&server.base_url(), "other")).await;

        assert_eq!(first.result, second.result);
        assert_eq!(first.result.entry().unwrap().version, "1.0-1");
        assert_eq!(other.result.entry().unwrap().version, "0.1-1");
        index.assert_hits(1);
        assert_eq!(prober.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_decompress_failure_not_retried_or_cached() {
        let server = MockServer::start();
        let index = server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body("definitely not gzip");
        });

        let prober = fast_prober(Duration::from_secs(5));
        let report = prober.probe(&task(&server.base_url(), "foo")).await;

        assert!(matches!(report.result, ProbeResult::DecompressFailed { .. }));
        index.assert_hits(1);
        assert!(prober.cache().is_empty());
        assert!(matches!(
            report_event(&report),
            Some(ProbeEvent::DecompressFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_pool_reports_every_task() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body(index_for("foo", "1.0-1"));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/dists/bookworm/contrib/binary-amd64/Packages.gz");
            then.status(200).body(gzip("Package: bar\nVersion: 1\nFilename: x\n"));
        });

        let mut contrib = task(&server.base_url(), "foo");
        contrib.component = "contrib".into();
        let tasks = vec![task(&server.base_url(), "foo"), contrib];

        let (tx, mut rx) = nbs_events::channel();
        let reports = probe_all(&fast_prober(Duration::from_secs(5)), tasks, 1, &tx)
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports.iter().filter(|r| r.result.entry().is_some()).count(), 1);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            AppEvent::Probe(ProbeEvent::NoMetadata { .. })
        ));
    }

    fn candidate(url: String, version: &str, destination: &Path) -> Candidate {
        Candidate {
            version: DebVersion::parse(version).unwrap(),
            version_string: version.to_string(),
            url,
            destination: destination.to_path_buf(),
            source: "test [main]".to_string(),
        }
    }

    #[tokio::test]
    async fn test_download_falls_back_in_order() {
        let server = MockServer::start();
        let deb = server.mock(|when, then| {
            when.method(GET).path("/pool/foo_1.0-1_amd64.deb");
            then.status(200).body("payload");
        });

        let temp = tempdir().unwrap();
        let destination = temp.path().join("foo.deb");
        let outcome = ResolutionOutcome::new(vec![
            candidate("http://127.0.0.1:1/pool/foo.deb".into(), "2.0-1", &destination),
            candidate("http://127.0.0.1:1/pool/foo2.deb".into(), "2.0-1", &destination),
            candidate(server.url("/pool/foo_1.0-1_amd64.deb"), "1.0-1", &destination),
        ]);

        let (tx, mut rx) = nbs_events::channel();
        let engine = RetrievalEngine::new(test_client(Duration::from_secs(5)), 2);
        let artifact = engine.retrieve("foo", &outcome, &tx).await.unwrap();

        assert_eq!(artifact.pass, 1);
        assert_eq!(artifact.version, "1.0-1");
        assert_eq!(artifact.size, 7);
        assert_eq!(std::fs::read(&destination).unwrap(), b"payload");
        deb.assert_hits(1);

        let failures: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                AppEvent::Download(DownloadEvent::AttemptFailed { kind, .. }) => Some(kind),
                _ => None,
            })
            .collect();
        assert_eq!(failures, vec![FailureKind::ConnectionFailed; 2]);
    }

    #[tokio::test]
    async fn test_all_mirrors_failed_lists_every_attempt() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path("/a.deb");
            then.status(503);
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/b.deb");
            then.status(500);
        });

        let temp = tempdir().unwrap();
        let destination = temp.path().join("foo.deb");
        let outcome = ResolutionOutcome::new(vec![
            candidate(server.url("/a.deb"), "1.0-1", &destination),
            candidate(server.url("/b.deb"), "1.0-1", &destination),
        ]);

        let engine = RetrievalEngine::new(test_client(Duration::from_secs(5)), 2);
        let err = engine
            .retrieve("foo", &outcome, &None::<nbs_events::EventSender>)
            .await
            .unwrap_err();

        first.assert_hits(2);
        second.assert_hits(2);
        assert!(!destination.exists());
        let message = err.to_string();
        assert!(message.contains(&server.url("/a.deb")));
        assert!(message.contains(&server.url("/b.deb")));
        match err {
            Error::Resolve(ResolveError::AllMirrorsFailed { attempts, .. }) => {
                assert_eq!(attempts.len(), 4);
                assert_eq!(
                    attempts.iter().map(|a| a.pass).collect::<Vec<_>>(),
                    vec![1, 1, 2, 2]
                );
                assert_eq!(attempts[0].kind, FailureKind::HttpStatus { code: 503 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_skips_descriptor() {
        let temp = tempdir().unwrap();
        let config = test_config(temp.path());
        let (tx, mut rx) = nbs_events::channel();
        let engine = test_engine(&config, vec!["http://127.0.0.1:1".into()]).with_event_sender(tx);

        let repos = vec![RepositoryDescriptor::new("debian", "bookworm", "")];
        let outcome = engine.resolve("foo", &repos, temp.path()).await.unwrap();

        assert!(outcome.is_none());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            AppEvent::Probe(ProbeEvent::RepositorySkipped { reason, .. }) => {
                assert!(reason.contains("arch"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_repositories_rejected() {
        let temp = tempdir().unwrap();
        let engine = test_engine(&test_config(temp.path()), vec![]);

        let err = engine.resolve("foo", &[], temp.path()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Resolve(ResolveError::NoRepositories { .. })
        ));
    }

    #[tokio::test]
    async fn test_package_not_found_counts_probes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body(index_for("foo", "1.0-1"));
        });

        let temp = tempdir().unwrap();
        let engine = test_engine(&test_config(temp.path()), vec![server.base_url()]);

        let err = engine
            .resolve("missing", &debian(), temp.path())
            .await
            .unwrap_err();
        match err {
            Error::Resolve(ResolveError::PackageNotFound { package, probes }) => {
                assert_eq!(package, "missing");
                assert_eq!(probes, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_diagnostics_released_grouped() {
        let good = MockServer::start();
        let broken = MockServer::start();
        good.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body(index_for("foo", "1.0-1"));
        });
        broken.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body("garbage");
        });

        let temp = tempdir().unwrap();
        let (tx, mut rx) = nbs_events::channel();
        let engine = test_engine(&test_config(temp.path()), vec![good.base_url(), broken.base_url()])
            .with_event_sender(tx);
        let repos = vec![
            RepositoryDescriptor::new("debian", "bookworm", "amd64"),
            RepositoryDescriptor::new("nowhere", "x", "amd64"),
        ];

        engine.resolve("missing", &repos, temp.path()).await.unwrap_err();

        let kinds: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                AppEvent::Probe(ProbeEvent::RepositorySkipped { .. }) => Some("skipped"),
                AppEvent::Probe(ProbeEvent::DecompressFailed { .. }) => Some("decompress"),
                AppEvent::Probe(ProbeEvent::NoMetadata { .. }) => Some("no_metadata"),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["skipped", "decompress", "no_metadata"]);
    }

    #[tokio::test]
    async fn test_quiet_discards_diagnostics() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body(index_for("foo", "1.0-1"));
        });

        let temp = tempdir().unwrap();
        let mut config = test_config(temp.path());
        config.general.quiet = true;
        let (tx, mut rx) = nbs_events::channel();
        let engine = test_engine(&config, vec![server.base_url()]).with_event_sender(tx);

        engine.resolve("missing", &debian(), temp.path()).await.unwrap_err();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_ppa_probed_under_custom_base() {
        let server = MockServer::start();
        let index = server.mock(|when, then| {
            when.method(GET)
                .path("/nitrux/tools/ubuntu/dists/noble/main/binary-amd64/Packages.gz");
            then.status(200).body(gzip(
                "Package: foo\nVersion: 3.1-0ubuntu1\nFilename: pool/main/f/foo/foo_3.1_amd64.deb\n",
            ));
        });
        let deb = server.mock(|when, then| {
            when.method(GET)
                .path("/nitrux/tools/ubuntu/pool/main/f/foo/foo_3.1_amd64.deb");
            then.status(200).body("ppa build");
        });

        let temp = tempdir().unwrap();
        let mut config = test_config(temp.path());
        config.probe.ppa_base = server.base_url();
        let engine = test_engine(&config, vec![]);
        let repos = vec![RepositoryDescriptor::ppa("nitrux/tools", "noble", "amd64")];

        let artifact = engine
            .fetch("foo", &repos, &temp.path().join("debs"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(artifact.version, "3.1-0ubuntu1");
        index.assert_hits(1);
        deb.assert_hits(1);
    }

    struct RejectingSink;

    #[async_trait]
    impl ArtifactSink for RejectingSink {
        async fn accept(&mut self, _artifact: &FetchedArtifact) -> Result<(), Error> {
            Err(Error::internal("unpack failed"))
        }
    }

    #[tokio::test]
    async fn test_batch_partitions_packages() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(200).body(index_for("foo", "1.0-1"));
        });
        server.mock(|when, then| {
            when.method(GET).path(deb_path("foo", "1.0-1"));
            then.status(200).body("foo");
        });

        let temp = tempdir().unwrap();
        let (tx, mut rx) = nbs_events::channel();
        let engine =
            test_engine(&test_config(temp.path()), vec![server.base_url()]).with_event_sender(tx);
        let packages = vec!["foo".to_string(), "missing".to_string()];

        let mut sink: Vec<FetchedArtifact> = Vec::new();
        let summary = engine
            .fetch_packages(&packages, &debian(), "bootstrap", &mut sink)
            .await;

        assert_eq!(summary.success, vec!["foo"]);
        assert_eq!(summary.failed, vec!["missing"]);
        assert!(summary.skipped.is_empty());
        assert_eq!(sink.len(), 1);
        assert!(sink[0]
            .path
            .starts_with(temp.path().join("bootstrap").join("debs")));

        let batch = drain(&mut rx).into_iter().find_map(|event| match event {
            AppEvent::Resolution(ResolutionEvent::BatchCompleted {
                success,
                failed,
                skipped,
            }) => Some((success, failed, skipped)),
            _ => None,
        });
        assert_eq!(batch, Some((1, 1, 0)));

        // Unusable descriptors skip; a failing sink fails
        let bad_repos = vec![RepositoryDescriptor::new("nowhere", "x", "amd64")];
        let summary = engine
            .fetch_packages(&packages, &bad_repos, "bootstrap", &mut sink)
            .await;
        assert_eq!(summary.skipped, packages);

        let summary = engine
            .fetch_packages(&packages[..1], &debian(), "bootstrap", &mut RejectingSink)
            .await;
        assert_eq!(summary.failed, vec!["foo"]);

        let summary = engine
            .fetch_packages(&packages[..1], &[], "bootstrap", &mut sink)
            .await;
        assert_eq!(summary.failed, vec!["foo"]);
        assert_eq!(summary.total(), 1);
    }
}
