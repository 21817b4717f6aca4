use researchdesk_agent::ResearchFacade;
use researchdesk_config::Config;
use std::sync::Arc;

/// Shared by every handler; the facade is read-only after construction
#[derive(Clone)]
pub struct AppState {
    facade: Arc<ResearchFacade>,
}

impl AppState {
    pub fn new(facade: ResearchFacade) -> Self {
        Self {
            facade: Arc::new(facade),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ResearchFacade::from_config(config))
    }

    pub fn facade(&self) -> Arc<ResearchFacade> {
        self.facade.clone()
    }
}
