//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod leaderboard;
pub mod members;
pub mod ratings;
pub mod reconcile;
pub mod sessions;
pub mod tickets;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub reconcile: reconcile::ReconcileService,
    pub circulation: circulation::CirculationService,
    pub catalog: catalog::CatalogService,
    pub tickets: tickets::TicketsService,
    pub leaderboard: leaderboard::LeaderboardService,
    pub members: members::MembersService,
    pub ratings: ratings::RatingsService,
    pub sessions: sessions::SessionService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let sessions = sessions::SessionService::new(config.auth.session_timeout_hours);
        Self {
            reconcile: reconcile::ReconcileService::new(repository.clone()),
            circulation: circulation::CirculationService::new(
                repository.clone(),
                config.circulation.clone(),
            ),
            catalog: catalog::CatalogService::new(repository.clone()),
            tickets: tickets::TicketsService::new(
                repository.clone(),
                config.circulation.ticket_ttl_minutes,
            ),
            leaderboard: leaderboard::LeaderboardService::new(repository.clone()),
            members: members::MembersService::new(repository.clone(), sessions.clone()),
            ratings: ratings::RatingsService::new(repository, sessions.clone()),
            sessions,
        }
    }
}
