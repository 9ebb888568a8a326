//! Drives the command line from `init` through `monitor`.

use camino::Utf8PathBuf;
use slapd_stats_lib::{Host, run};
use std::io::Write;

#[derive(Debug, Default)]
struct CapturingHost {
    output: Vec<u8>,
    error: Vec<u8>,
    exit_code: Option<i32>,
}

impl CapturingHost {
    fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.error).into_owned()
    }
}

impl Host for CapturingHost {
    fn output(&mut self) -> impl Write {
        &mut self.output
    }

    fn error(&mut self) -> impl Write {
        &mut self.error
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

fn workdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

fn fixture() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/monitor.yml")
}

#[tokio::test]
async fn test_init_compile_monitor() {
    let (_dir, root) = workdir();
    let config = root.join("slapd-stats.yml");
    let measurements = root.join("measurements.jsonl");

    let mut host = CapturingHost::default();
    run(&mut host, ["slapd-stats", "init", config.as_str()]).await.unwrap();
    assert!(host.output_text().contains("Generated default configuration file"));

    let mut host = CapturingHost::default();
    run(&mut host, ["slapd-stats", "compile", "-c", config.as_str(), "--format", "json"])
        .await
        .unwrap();
    let defs: Vec<serde_json::Value> = serde_json::from_str(&host.output_text()).unwrap();
    assert_eq!(defs.len(), 26);
    assert_eq!(defs[0]["target"], "slapd");

    let mut host = CapturingHost::default();
    run(
        &mut host,
        [
            "slapd-stats",
            "monitor",
            "-c",
            config.as_str(),
            "--snapshot",
            fixture().as_str(),
            "--json",
            measurements.as_str(),
            "--cycles",
            "1",
            "--log-level",
            "none",
        ],
    )
    .await
    .unwrap();

    let summary = host.output_text();
    assert!(summary.contains("slapd: 1 cycles (0 failed, 0 degraded)"), "{summary}");
    assert!(summary.contains("1: 1 cycles (0 failed, 0 degraded)"), "{summary}");
    assert!(summary.contains("2: 1 cycles (0 failed, 0 degraded)"), "{summary}");

    let lines = std::fs::read_to_string(&measurements).unwrap();
    let batches: Vec<serde_json::Value> = lines.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(batches.len(), 3);

    let db1 = batches.iter().find(|b| b["tags"]["database"] == "1").unwrap();
    let names: Vec<_> = db1["measurements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        names,
        [
            "openldap/databases/db1/olmMDBEntries",
            "openldap/databases/db1/olmMDBPagesUsed",
            "openldap/databases/db1/olmMDBReadersUsed",
        ]
    );
}

#[tokio::test]
async fn test_compile_failure_exits_with_error() {
    let (_dir, root) = workdir();
    let config = root.join("broken.yml");
    std::fs::write(&config, "objects:\n  rdn: cn=Monitor\n  children:\n    - attribute: x\n      databases: []\n").unwrap();

    let mut host = CapturingHost::default();
    let result = run(&mut host, ["slapd-stats", "compile", "-c", config.as_str()]).await;

    assert!(result.is_err());
    assert_eq!(host.exit_code, Some(1));
    assert!(host.error_text().contains("Compilation failed"));
    assert!(host.output.is_empty());
}
