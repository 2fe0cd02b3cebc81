use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::shared::models::{Analyst, Reason, Support, Ticket};
use crate::directory::IdentityProvider;
use crate::security::auth_api::GateConfig;
use crate::security::session::{InMemorySessionStore, SessionManager};
#[cfg(feature = "postgres")]
use crate::store::PgStore;
use crate::store::{CachedRepository, MemoryRepository, Repository, TicketQuery};

/// One repository per collection plus the ticket filter query.
#[derive(Clone)]
pub struct Stores {
    pub analysts: Arc<dyn Repository<Analyst>>,
    pub supports: Arc<dyn Repository<Support>>,
    pub reasons: Arc<dyn Repository<Reason>>,
    pub tickets: Arc<dyn Repository<Ticket>>,
    pub ticket_query: Arc<dyn TicketQuery>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let tickets = Arc::new(MemoryRepository::<Ticket>::new());
        Self {
            analysts: Arc::new(MemoryRepository::<Analyst>::new()),
            supports: Arc::new(MemoryRepository::<Support>::new()),
            reasons: Arc::new(MemoryRepository::<Reason>::new()),
            tickets: tickets.clone(),
            ticket_query: tickets,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            analysts: store.clone(),
            supports: store.clone(),
            reasons: store.clone(),
            tickets: store.clone(),
            ticket_query: store,
        }
    }

    /// Wraps the reference collections in snapshot caches. Tickets always hit the backend.
    pub fn cached(self) -> Self {
        Self {
            analysts: Arc::new(CachedRepository::new(self.analysts)),
            supports: Arc::new(CachedRepository::new(self.supports)),
            reasons: Arc::new(CachedRepository::new(self.reasons)),
            tickets: self.tickets,
            ticket_query: self.ticket_query,
        }
    }
}

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analysts: Arc<dyn Repository<Analyst>>,
    pub supports: Arc<dyn Repository<Support>>,
    pub reasons: Arc<dyn Repository<Reason>>,
    pub tickets: Arc<dyn Repository<Ticket>>,
    pub ticket_query: Arc<dyn TicketQuery>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<SessionManager<InMemorySessionStore>>,
    pub gate: Arc<GateConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores, identity: Arc<dyn IdentityProvider>) -> Self {
        let sessions = SessionManager::new(InMemorySessionStore::new(), config.auth.session.clone());

        Self {
            config: Arc::new(config),
            analysts: stores.analysts,
            supports: stores.supports,
            reasons: stores.reasons,
            tickets: stores.tickets,
            ticket_query: stores.ticket_query,
            identity,
            sessions: Arc::new(sessions),
            gate: Arc::new(GateConfig::default()),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("analysts", &"Arc<dyn Repository<Analyst>>")
            .field("supports", &"Arc<dyn Repository<Support>>")
            .field("reasons", &"Arc<dyn Repository<Reason>>")
            .field("tickets", &"Arc<dyn Repository<Ticket>>")
            .field("identity", &self.identity.name())
            .field("sessions", &"Arc<SessionManager>")
            .field("gate", &self.gate)
            .finish()
    }
}
