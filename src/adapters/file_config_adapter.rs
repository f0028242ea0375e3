//! INI file configuration adapter.

use crate::domain::error::AxiomError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AxiomError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AxiomError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Adapter with no sections; every lookup returns its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[database]
backend = sqlite

[sqlite]
path = /tmp/axiomquant.db

[backtest]
short_window = 50
long_window = 200
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("database", "backend"),
            Some("sqlite".to_string())
        );
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/tmp/axiomquant.db".to_string())
        );
        assert_eq!(adapter.get_int("backtest", "long_window", 0), 200);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nshort_window = 5\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_string_treats_blank_as_missing() {
        let adapter = FileConfigAdapter::from_string("[ingest]\ndata_dir =\n").unwrap();
        assert_eq!(adapter.get_string("ingest", "data_dir"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "short_window", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nshort_window = abc\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "short_window", 42), 42);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100000.5\n").unwrap();
        assert_eq!(
            adapter.get_double("backtest", "initial_capital", 0.0),
            100000.5
        );
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nrisk_free_rate = lots\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "risk_free_rate", 0.01), 0.01);
    }

    #[test]
    fn empty_adapter_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("database", "backend"), None);
        assert_eq!(adapter.get_int("backtest", "short_window", 50), 50);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[web]\nlisten = 0.0.0.0:8000\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("web", "listen"),
            Some("0.0.0.0:8000".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(AxiomError::ConfigParse { .. })));
    }
}
