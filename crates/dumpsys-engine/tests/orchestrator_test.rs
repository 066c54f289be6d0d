//! Orchestrator + renderer tests against in-memory registries
//!
//! Each test scripts the two registries, runs one `TargetSpec` through
//! [`Dumpsys`] and asserts on the rendered stdout/stderr text.

use std::sync::Arc;
use std::time::Duration;

use dumpsys_core::testing::{MockHardwareServiceManager, MockService, MockServiceManager};
use dumpsys_core::{DumpError, RegistryError, SkipSet};
use dumpsys_engine::{DumpOptions, Dumpsys, Renderer, SkipPolicy, TargetSpec};
use pretty_assertions::assert_eq;

/// Scripted registries plus the captured output of the last run
struct DumpsysTest {
    sm: Arc<MockServiceManager>,
    hm: Arc<MockHardwareServiceManager>,
    options: DumpOptions,
    stdout: String,
    stderr: String,
}

impl DumpsysTest {
    fn new() -> Self {
        Self {
            sm: Arc::new(MockServiceManager::new()),
            hm: Arc::new(MockHardwareServiceManager::new()),
            options: DumpOptions::default(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    async fn run(&mut self, target: TargetSpec) -> Result<(), RegistryError> {
        let dumpsys =
            Dumpsys::new(self.sm.clone(), self.hm.clone()).with_options(self.options.clone());
        let report = dumpsys.run(&target).await?;

        let mut renderer = Renderer::new(Vec::new(), Vec::new());
        renderer.render(&report).expect("render to memory");
        let (out, err) = renderer.into_inner();
        self.stdout = String::from_utf8(out).expect("utf-8 stdout");
        self.stderr = String::from_utf8(err).expect("utf-8 stderr");
        Ok(())
    }

    fn assert_running_services(&self, services: &[&str], title: &str) {
        let mut expected = format!("{}\n", title);
        for service in services {
            expected.push_str(&format!("  {}\n", service));
        }
        assert!(
            self.stdout.contains(&expected),
            "stdout {:?} does not contain {:?}",
            self.stdout,
            expected
        );
    }

    fn assert_dumped(&self, service: &str, dump: &str) {
        let expected = format!("DUMP OF SERVICE {}:\n{}", service, dump);
        assert!(
            self.stdout.contains(&expected),
            "missing dump block for {}",
            service
        );
    }

    fn assert_not_dumped(&self, text: &str) {
        assert!(!self.stdout.contains(text), "unexpected {:?} in stdout", text);
    }

    fn assert_stopped(&self, service: &str) {
        assert!(self
            .stderr
            .contains(&format!("Can't find service: {}\n", service)));
    }
}

fn skip(names: &[&str]) -> SkipSet {
    names.iter().copied().collect()
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_list_hw_services() {
    let mut t = DumpsysTest::new();
    t.hm.expect_list(["Locksmith", "Valet"]);

    t.run(TargetSpec::AllHardwareServices).await.unwrap();

    t.assert_running_services(
        &["Locksmith", "Valet"],
        "Currently running hardware services:",
    );
    assert_eq!(t.sm.list_calls(), 0);
    assert!(t.sm.checked().is_empty());
}

#[tokio::test]
async fn test_list_all_services() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["Locksmith", "Valet"]);
    t.sm.expect_dump("Locksmith", "");
    t.sm.expect_dump("Valet", "");

    t.run(TargetSpec::ListServices { skip: SkipSet::new() })
        .await
        .unwrap();

    t.assert_running_services(&["Locksmith", "Valet"], "Currently running services:");
}

#[tokio::test]
async fn test_list_running_services() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["Locksmith", "Valet"]);
    t.sm.expect_dump("Locksmith", "");
    t.sm.expect_stopped("Valet");

    t.run(TargetSpec::ListServices { skip: SkipSet::new() })
        .await
        .unwrap();

    t.assert_running_services(&["Locksmith"], "Currently running services:");
    t.assert_not_dumped("Valet");
    t.assert_stopped("Valet");
}

#[tokio::test]
async fn test_dump_running_service() {
    let mut t = DumpsysTest::new();
    t.sm.expect_dump("Valet", "Here's your car");

    t.run(TargetSpec::single("Valet", vec![])).await.unwrap();

    assert_eq!(t.stdout, "Here's your car");
    assert!(t.stderr.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dump_running_service_timeout() {
    let mut t = DumpsysTest::new();
    let valet = t.sm.add_service(
        "Valet",
        MockService::new("Here's your car").with_delay(Duration::from_secs(2)),
    );
    t.options.timeout = Duration::from_secs(1);

    t.run(TargetSpec::single("Valet", vec![])).await.unwrap();

    assert!(t
        .stdout
        .contains("SERVICE 'Valet' DUMP TIMEOUT (1s) EXPIRED"));
    t.assert_not_dumped("Here's your car");

    // The abandoned dump finishes later without reaching the output
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(valet.completed(), 1);
    t.assert_not_dumped("Here's your car");
}

#[tokio::test]
async fn test_dump_with_args_running_service() {
    let mut t = DumpsysTest::new();
    let service = t.sm.expect_dump("SERVICE", "I DO!");

    let forwarded = args(&["Y", "U", "NO", "HANDLE", "ARGS"]);
    t.run(TargetSpec::single("SERVICE", forwarded.clone()))
        .await
        .unwrap();

    assert_eq!(t.stdout, "I DO!");
    assert_eq!(service.calls(), vec![forwarded]);
}

#[tokio::test]
async fn test_dump_multiple_services() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["running1", "stopped2", "running3"]);
    t.sm.expect_dump("running1", "dump1");
    t.sm.expect_stopped("stopped2");
    t.sm.expect_dump("running3", "dump3");

    t.run(TargetSpec::AllServices).await.unwrap();

    t.assert_running_services(&["running1", "running3"], "Currently running services:");
    t.assert_dumped("running1", "dump1");
    t.assert_stopped("stopped2");
    t.assert_dumped("running3", "dump3");
    t.assert_not_dumped("DUMP OF SERVICE stopped2");
}

#[tokio::test]
async fn test_dump_with_skip_annotates_summary() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["running1", "stopped2", "skipped3", "running4", "skipped5"]);
    t.sm.expect_dump("running1", "dump1");
    t.sm.expect_stopped("stopped2");
    t.sm.expect_dump("skipped3", "dump3");
    t.sm.expect_dump("running4", "dump4");
    t.sm.expect_dump("skipped5", "dump5");

    t.run(TargetSpec::all(skip(&["skipped3", "skipped5"])))
        .await
        .unwrap();

    t.assert_running_services(
        &[
            "running1",
            "running4",
            "skipped3 (skipped)",
            "skipped5 (skipped)",
        ],
        "Currently running services:",
    );
    t.assert_dumped("running1", "dump1");
    t.assert_dumped("running4", "dump4");
    t.assert_stopped("stopped2");
    // Skip-set members are still dumped
    t.assert_dumped("skipped3", "dump3");
    t.assert_dumped("skipped5", "dump5");
}

#[tokio::test]
async fn test_dump_with_skip_suppressed() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["running1", "stopped2", "skipped3", "running4", "skipped5"]);
    t.sm.expect_dump("running1", "dump1");
    t.sm.expect_stopped("stopped2");
    let skipped3 = t.sm.expect_dump("skipped3", "dump3");
    t.sm.expect_dump("running4", "dump4");
    let skipped5 = t.sm.expect_dump("skipped5", "dump5");
    t.options.skip_policy = SkipPolicy::Suppress;

    t.run(TargetSpec::all(skip(&["skipped3", "skipped5"])))
        .await
        .unwrap();

    t.assert_running_services(
        &[
            "running1",
            "running4",
            "skipped3 (skipped)",
            "skipped5 (skipped)",
        ],
        "Currently running services:",
    );
    t.assert_not_dumped("dump3");
    t.assert_not_dumped("dump5");
    assert_eq!(skipped3.call_count() + skipped5.call_count(), 0);
}

#[tokio::test]
async fn test_dump_blocks_follow_registry_order() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["zeta", "alpha", "mu"]);
    t.sm.expect_dump("zeta", "z");
    t.sm.expect_dump("alpha", "a");
    t.sm.expect_dump("mu", "m");

    t.run(TargetSpec::AllServices).await.unwrap();

    let position = |name: &str| {
        t.stdout
            .find(&format!("DUMP OF SERVICE {}:", name))
            .expect("dump block present")
    };
    assert!(position("zeta") < position("alpha"));
    assert!(position("alpha") < position("mu"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_does_not_stop_the_batch() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["slow", "fast"]);
    t.sm.add_service(
        "slow",
        MockService::new("late").with_delay(Duration::from_secs(30)),
    );
    t.sm.expect_dump("fast", "quick");
    t.options.timeout = Duration::from_secs(2);

    t.run(TargetSpec::AllServices).await.unwrap();

    assert!(t
        .stdout
        .contains("DUMP OF SERVICE slow:\n*** SERVICE 'slow' DUMP TIMEOUT (2s) EXPIRED ***\n"));
    t.assert_dumped("fast", "quick");
    t.assert_not_dumped("late");
}

#[tokio::test]
async fn test_dump_failure_keeps_partial_output() {
    let mut t = DumpsysTest::new();
    t.sm.expect_list(["Locksmith", "Valet"]);
    t.sm.add_service(
        "Locksmith",
        MockService::new("partial line 1\npartial line 2\n")
            .with_error(DumpError::Transport("connection reset".to_string())),
    );
    t.sm.expect_dump("Valet", "Here's your car");

    t.run(TargetSpec::AllServices).await.unwrap();

    t.assert_running_services(&["Locksmith", "Valet"], "Currently running services:");
    t.assert_dumped("Locksmith", "partial line 1\npartial line 2\n---------");
    t.assert_dumped("Valet", "Here's your car");
    assert_eq!(
        t.stderr,
        "Error dumping service info: (Transport error: connection reset) Locksmith\n"
    );
}

#[tokio::test]
async fn test_unavailable_registry_is_reported() {
    let mut t = DumpsysTest::new();
    t.sm.set_unavailable(true);

    let err = t.run(TargetSpec::AllServices).await.unwrap_err();

    assert!(matches!(err, RegistryError::Unavailable(_)));
    assert!(t.stdout.is_empty());
}

#[tokio::test]
async fn test_single_service_ignores_hardware_registry() {
    let mut t = DumpsysTest::new();
    t.hm.add_service("Valet", MockService::new("hardware valet"));

    t.run(TargetSpec::single("Valet", vec![])).await.unwrap();

    assert!(t.stdout.is_empty());
    t.assert_stopped("Valet");
    assert_eq!(t.hm.get_calls(), 0);
}
