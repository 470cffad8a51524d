use std::path::PathBuf;
use std::time::Duration;

use flashcards_core::dataset::{self, read_workbook_bytes};
use flashcards_core::{DatasetError, LayoutConfig, Level, LoadReport, PhraseRecord, SheetSelector};
use tracing::{debug, info};

use crate::config::{env_parse, env_string};

const DEFAULT_DATASET_PATH: &str = "./public/Thai_Basic.xlsx";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Where the workbook is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(String),
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub source: DatasetSource,
    pub layout: LayoutConfig,
    pub timeout: Duration,
}

impl DatasetConfig {
    pub fn from_env() -> Self {
        let source = match env_string("DATASET_URL") {
            Some(url) => DatasetSource::Url(url),
            None => DatasetSource::Path(PathBuf::from(
                env_string("DATASET_PATH").unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string()),
            )),
        };

        let defaults = LayoutConfig::default();
        let layout = LayoutConfig {
            main_sheet: env_string("DATASET_MAIN_SHEET")
                .map(|v| SheetSelector::parse(&v))
                .unwrap_or(defaults.main_sheet),
            basic_sheet: env_string("DATASET_BASIC_SHEET")
                .map(|v| SheetSelector::parse(&v))
                .unwrap_or(defaults.basic_sheet),
            basic_header_rows: env_parse::<u32>("DATASET_BASIC_HEADER_ROWS")
                .unwrap_or(defaults.basic_header_rows),
        };

        let timeout =
            Duration::from_millis(env_parse::<u64>("DATASET_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS));

        Self {
            source,
            layout,
            timeout,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DatasetSource::Path(path.into()),
            layout: LayoutConfig::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Reads the phrase workbook on every call; the sheet is edited externally,
/// so nothing is cached.
#[derive(Clone)]
pub struct DatasetService {
    config: DatasetConfig,
    client: reqwest::Client,
}

impl DatasetService {
    pub fn new(config: DatasetConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(DatasetConfig::from_env())
    }

    pub fn source(&self) -> &DatasetSource {
        &self.config.source
    }

    /// Records for `level`, or an empty list when anything goes wrong.
    pub async fn load(&self, level: Level) -> Vec<PhraseRecord> {
        dataset::load_or_empty(self.try_load(level).await, level)
    }

    pub async fn try_load(&self, level: Level) -> Result<LoadReport, DatasetError> {
        let bytes = self.fetch().await?;
        let layout = self.config.layout.clone();

        let report = tokio::task::spawn_blocking(move || read_workbook_bytes(bytes, level, &layout))
            .await
            .map_err(|e| DatasetError::Io(std::io::Error::other(e)))??;

        info!(
            level = %level,
            source = %self.config.source,
            records = report.records.len(),
            skipped = report.skipped_rows,
            "dataset loaded"
        );
        Ok(report)
    }

    async fn fetch(&self) -> Result<Vec<u8>, DatasetError> {
        match &self.config.source {
            DatasetSource::Path(path) => {
                debug!(path = %path.display(), "reading workbook");
                Ok(tokio::fs::read(path).await?)
            }
            DatasetSource::Url(url) => {
                debug!(url = %url, "fetching workbook");
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| DatasetError::Fetch(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(DatasetError::Fetch(format!("HTTP {status}")));
                }
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| DatasetError::Fetch(e.to_string()))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let service = DatasetService::new(DatasetConfig::from_path("/no/such/workbook.xlsx"));
        assert!(matches!(
            service.try_load(Level::Basic).await,
            Err(DatasetError::Io(_))
        ));
        assert!(service.load(Level::Basic).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_url_loads_nothing() {
        let service = DatasetService::new(DatasetConfig {
            source: DatasetSource::Url("http://127.0.0.1:9/Thai_Basic.xlsx".to_string()),
            layout: LayoutConfig::default(),
            timeout: Duration::from_millis(500),
        });
        assert!(matches!(
            service.try_load(Level::Quiz).await,
            Err(DatasetError::Fetch(_))
        ));
        assert!(service.load(Level::Quiz).await.is_empty());
    }
}
