use super::Host;
use super::common::{LogLevel, init_logging};
use super::config::Config;
use crate::Result;
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ohno::IntoAppError;
use std::io::Write;

/// Format used to print compiled output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Path to configuration file
    #[arg(long, short = 'c', value_name = "PATH", default_value = "slapd-stats.yml")]
    pub config: Utf8PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "yaml")]
    pub format: OutputFormat,

    /// Print the whole compiled tree instead of the statistic definitions
    #[arg(long)]
    pub tree: bool,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

fn render(args: &CompileArgs, config: &Config) -> Result<String> {
    if args.tree {
        let tree = config.compile_tree().into_app_err("compiling the monitoring tree")?.to_yaml();
        return match args.format {
            OutputFormat::Yaml => serde_yaml::to_string(&tree).into_app_err("formatting compiled tree"),
            OutputFormat::Json => serde_json::to_string_pretty(&tree).into_app_err("formatting compiled tree"),
        };
    }

    let defs = config.compile().into_app_err("compiling the monitoring tree")?;
    match args.format {
        OutputFormat::Yaml => serde_yaml::to_string(&defs).into_app_err("formatting statistic definitions"),
        OutputFormat::Json => serde_json::to_string_pretty(&defs).into_app_err("formatting statistic definitions"),
    }
}

/// Compile a configuration file and print the result
pub fn compile_config<H: Host>(host: &mut H, args: &CompileArgs) -> Result<()> {
    init_logging(args.log_level);

    match Config::load(&args.config).and_then(|config| render(args, &config)) {
        Ok(text) => {
            let _ = writeln!(host.output(), "{}", text.trim_end());
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Compilation failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    fn write_config(dir: &tempfile::TempDir, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("config.yml")).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    fn args(config: Utf8PathBuf, format: OutputFormat, tree: bool) -> CompileArgs {
        CompileArgs {
            config,
            format,
            tree,
            log_level: LogLevel::None,
        }
    }

    const CONFIG: &str = "metric_prefix: ldap\nobjects:\n  rdn: ou=db1\n  children:\n    - attribute: numEntries\n";

    #[test]
    fn test_prints_definitions_as_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = TestHost::new();
        compile_config(&mut host, &args(write_config(&dir, CONFIG), OutputFormat::Yaml, false)).unwrap();

        let out = host.output_text();
        assert!(out.contains("metric_name: ldap/ou=db1/numEntries"));
        assert!(out.contains("query_dn: ou=db1"));
        assert_eq!(host.exit_code, None);
    }

    #[test]
    fn test_prints_definitions_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = TestHost::new();
        compile_config(&mut host, &args(write_config(&dir, CONFIG), OutputFormat::Json, false)).unwrap();

        let defs: serde_json::Value = serde_json::from_str(&host.output_text()).unwrap();
        assert_eq!(defs[0]["attribute"], "numEntries");
        assert_eq!(defs[0]["kind"], "gauge");
        assert_eq!(defs[0]["target"], "default");
    }

    #[test]
    fn test_prints_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = TestHost::new();
        compile_config(&mut host, &args(write_config(&dir, CONFIG), OutputFormat::Yaml, true)).unwrap();

        let out = host.output_text();
        assert!(out.contains("computed_dn: ou=db1"));
        assert!(out.contains("children:"));
    }

    #[test]
    fn test_compile_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(&dir, "objects:\n  attribute: x\n  name: '{nowhere}'\n");
        let mut host = TestHost::new();

        let _ = compile_config(&mut host, &args(config, OutputFormat::Yaml, false)).unwrap_err();
        assert!(host.error_text().contains("nowhere"));
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    fn test_missing_config_is_reported() {
        let mut host = TestHost::new();
        let _ = compile_config(&mut host, &args("/nonexistent/config.yml".into(), OutputFormat::Yaml, false)).unwrap_err();
        assert_eq!(host.exit_code, Some(1));
    }
}
