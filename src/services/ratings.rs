//! Service-rating feedback: a global switch, one rating per member.

use uuid::Uuid;

use crate::{
    datetime,
    error::{AppError, AppResult},
    models::{normalize_id, same_id, Rating},
    repository::Repository,
    services::sessions::SessionService,
};

/// Whether the rating prompt should be shown to a member, and why not.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct RatingEligibility {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct RatingsService {
    repository: Repository,
    sessions: SessionService,
}

impl RatingsService {
    pub fn new(repository: Repository, sessions: SessionService) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Flip the global rating switch; returns the new state.
    pub async fn toggle(&self) -> AppResult<bool> {
        let _guard = self.repository.write_guard().await;
        let mut system = self.repository.system.load().await;
        system.rating_enabled = !system.rating_enabled;
        system.last_modified = Some(datetime::now().format(datetime::MINUTE_FORMAT).to_string());
        self.repository.system.save(&system).await?;
        Ok(system.rating_enabled)
    }

    /// A member may rate once, and only while the switch is on.
    pub async fn eligibility(&self, school_id: &str) -> RatingEligibility {
        let system = self.repository.system.load().await;
        if !system.rating_enabled {
            return RatingEligibility {
                show: false,
                reason: Some("System Closed".to_string()),
            };
        }
        let ratings = self.repository.ratings.load_all().await;
        let already_done = ratings.iter().any(|r| same_id(&r.school_id, school_id));
        RatingEligibility {
            show: !already_done,
            reason: None,
        }
    }

    /// Record feedback; the submission must carry a valid session token.
    pub async fn submit(
        &self,
        school_id: &str,
        token: &str,
        stars: u8,
        feedback: &str,
        platform: &str,
    ) -> AppResult<()> {
        let school_id = normalize_id(school_id);
        if !self.sessions.validate(&school_id, token) {
            return Err(AppError::Authentication(
                "Security Handshake Failed".to_string(),
            ));
        }

        let _guard = self.repository.write_guard().await;
        let mut ratings = self.repository.ratings.load_all().await;
        let rating_id: String = Uuid::new_v4().to_string().chars().take(10).collect();
        ratings.push(Rating {
            rating_id,
            timestamp: datetime::now().format(datetime::TIMESTAMP_FORMAT).to_string(),
            school_id,
            stars: stars.min(5),
            feedback: if feedback.trim().is_empty() {
                "N/A".to_string()
            } else {
                feedback.to_string()
            },
            platform: platform.to_string(),
        });
        self.repository.ratings.save_all(&ratings).await?;
        Ok(())
    }

    /// Raw feed for the analysis dashboard.
    pub async fn summary(&self) -> Vec<Rating> {
        self.repository.ratings.load_all().await
    }
}
