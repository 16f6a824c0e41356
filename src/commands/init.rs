use super::Host;
use super::config::{Config, DEFAULT_CONFIG_FILE};
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path
    #[arg(value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub output: Utf8PathBuf,
}

pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    Config::save_default(&args.output)?;
    let _ = writeln!(host.output(), "Generated default configuration file: {}", args.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::DEFAULT_CONFIG_TOML;
    use crate::commands::host::TestHost;
    use std::fs;

    #[test]
    fn test_init_writes_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        let output = Utf8PathBuf::from_path_buf(tmp.path().join("harvest.toml")).unwrap();
        let mut host = TestHost::new();

        init_config(&mut host, &InitArgs { output: output.clone() }).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), DEFAULT_CONFIG_TOML);
        let printed = String::from_utf8(host.output_buf).unwrap();
        assert!(printed.contains("Generated default configuration file"));
    }

    #[test]
    fn test_init_into_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let output = Utf8PathBuf::from_path_buf(tmp.path().join("missing").join("harvest.toml")).unwrap();

        assert!(init_config(&mut TestHost::new(), &InitArgs { output }).is_err());
    }
}
