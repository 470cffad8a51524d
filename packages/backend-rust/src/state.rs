use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::services::dataset::DatasetService;
use crate::services::sessions::SessionStore;
use crate::services::tts::TtsClient;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    dataset: Arc<DatasetService>,
    tts: Arc<TtsClient>,
    sessions: Arc<SessionStore>,
    speech_max_chunk_chars: usize,
}

impl AppState {
    pub fn new(config: &Config, dataset: DatasetService, tts: TtsClient) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            dataset: Arc::new(dataset),
            tts: Arc::new(tts),
            sessions: Arc::new(SessionStore::new(
                config.session_ttl,
                config.speech_max_chunk_chars,
            )),
            speech_max_chunk_chars: config.speech_max_chunk_chars,
        }
    }

    pub fn from_env(config: &Config) -> Self {
        Self::new(config, DatasetService::from_env(), TtsClient::from_env())
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn dataset(&self) -> Arc<DatasetService> {
        Arc::clone(&self.dataset)
    }

    pub fn tts(&self) -> Arc<TtsClient> {
        Arc::clone(&self.tts)
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn speech_max_chunk_chars(&self) -> usize {
        self.speech_max_chunk_chars
    }
}
