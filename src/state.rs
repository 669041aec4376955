use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::services::livekit::LiveKitService;
use crate::services::llm_provider::LLMProvider;
use crate::services::supabase::SupabaseClient;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    supabase: SupabaseClient,
    llm: Arc<LLMProvider>,
    livekit: Arc<LiveKitService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let supabase = SupabaseClient::new(&config.supabase);
        let llm = Arc::new(LLMProvider::new(config.llm.clone()));
        let livekit = Arc::new(LiveKitService::new(config.livekit.clone()));

        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            supabase,
            llm,
            livekit,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn supabase(&self) -> &SupabaseClient {
        &self.supabase
    }

    pub fn llm(&self) -> Arc<LLMProvider> {
        Arc::clone(&self.llm)
    }

    pub fn livekit(&self) -> Arc<LiveKitService> {
        Arc::clone(&self.livekit)
    }
}
