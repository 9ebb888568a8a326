use super::Host;
use super::config::Config;
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::bail;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path
    #[arg(value_name = "PATH", default_value = "slapd-stats.yml")]
    pub output: Utf8PathBuf,

    /// Overwrite the file if it already exists
    #[arg(long)]
    pub force: bool,
}

pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!("'{}' already exists; use --force to overwrite it", args.output);
    }

    Config::save_default(&args.output)?;
    let _ = writeln!(host.output(), "Generated default configuration file: {}", args.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    fn args(dir: &tempfile::TempDir, force: bool) -> InitArgs {
        InitArgs {
            output: Utf8PathBuf::from_path_buf(dir.path().join("slapd-stats.yml")).unwrap(),
            force,
        }
    }

    #[test]
    fn test_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = TestHost::new();
        init_config(&mut host, &args(&dir, false)).unwrap();

        assert!(host.output_text().contains("Generated default configuration file"));
        let _ = Config::load(&args(&dir, false).output).unwrap();
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slapd-stats.yml"), "keep me").unwrap();

        let mut host = TestHost::new();
        let err = init_config(&mut host, &args(&dir, false)).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(dir.path().join("slapd-stats.yml")).unwrap(), "keep me");

        init_config(&mut host, &args(&dir, true)).unwrap();
        assert_ne!(std::fs::read_to_string(dir.path().join("slapd-stats.yml")).unwrap(), "keep me");
    }
}
