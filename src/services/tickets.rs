//! Password-reset ticket workflow.
//!
//! A short-lived, staff-approved one-time-code handshake decoupled from the
//! normal login flow: request → poll → staff list → staff approve →
//! finalize. One active ticket per member; tickets live five minutes and
//! are consumed on successful finalization.

use rand::Rng;

use crate::{
    datetime,
    error::{AppError, AppResult},
    models::{normalize_id, same_id, Ticket, TicketStatus},
    repository::Repository,
    services::reconcile::ReconcileService,
};

/// Charset for reset codes: uppercase alphanumeric, no uniqueness guarantee
/// needed since codes are consumed immediately.
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Poll response for the requesting device
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct TicketPoll {
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Clone)]
pub struct TicketsService {
    repository: Repository,
    reconcile: ReconcileService,
    ttl_minutes: i64,
}

impl TicketsService {
    pub fn new(repository: Repository, ttl_minutes: i64) -> Self {
        let reconcile = ReconcileService::new(repository.clone());
        Self {
            repository,
            reconcile,
            ttl_minutes,
        }
    }

    /// Step 1: a member requests a reset ticket. Any prior ticket for the
    /// same identity is discarded first.
    pub async fn request_ticket(&self, school_id: &str) -> AppResult<()> {
        let school_id = normalize_id(school_id);
        if school_id.is_empty() {
            return Err(AppError::Validation("school_id is required".to_string()));
        }
        if !self.identity_exists(&school_id).await {
            return Err(AppError::NotFound("ID not found".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        let mut tickets = self.repository.tickets.load_all().await;
        tickets.retain(|t| !same_id(&t.school_id, &school_id));
        let expiry = datetime::now() + chrono::Duration::minutes(self.ttl_minutes);
        tickets.push(Ticket {
            school_id,
            status: TicketStatus::Pending,
            code: None,
            expiry: expiry.format(datetime::TIMESTAMP_FORMAT).to_string(),
        });
        self.repository.tickets.save_all(&tickets).await?;
        Ok(())
    }

    /// Step 2: the requesting device polls for approval. A missing or
    /// not-yet-approved ticket reads as pending.
    pub async fn poll_ticket(&self, school_id: &str) -> TicketPoll {
        let school_id = normalize_id(school_id);
        let _guard = self.repository.write_guard().await;
        self.reconcile.run_locked().await;

        let tickets = self.repository.tickets.load_all().await;
        let ticket = tickets.iter().find(|t| same_id(&t.school_id, &school_id));
        match ticket {
            Some(t) if t.status == TicketStatus::Approved && t.code.is_some() => TicketPoll {
                status: TicketStatus::Approved,
                code: t.code.clone(),
            },
            _ => TicketPoll {
                status: TicketStatus::Pending,
                code: None,
            },
        }
    }

    /// Step 3: staff retrieve all open tickets.
    pub async fn list_tickets(&self) -> Vec<Ticket> {
        let _guard = self.repository.write_guard().await;
        self.reconcile.run_locked().await;
        self.repository.tickets.load_all().await
    }

    /// Step 4: staff approve a ticket and assign a fresh one-time code.
    pub async fn approve_ticket(&self, school_id: &str) -> AppResult<String> {
        let school_id = normalize_id(school_id);
        let _guard = self.repository.write_guard().await;
        self.reconcile.run_locked().await;

        let mut tickets = self.repository.tickets.load_all().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| same_id(&t.school_id, &school_id))
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

        let code = generate_code();
        ticket.status = TicketStatus::Approved;
        ticket.code = Some(code.clone());
        self.repository.tickets.save_all(&tickets).await?;
        tracing::info!(school_id = %school_id, "reset ticket approved");
        Ok(code)
    }

    /// Step 5: the member supplies identity + code; the new password is
    /// written to every registry where the identity exists and the ticket
    /// is consumed. Registries are saved before the ticket file, so a
    /// failed save leaves the ticket usable for a retry rather than
    /// half-applying the reset.
    pub async fn finalize_reset(
        &self,
        school_id: &str,
        code: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let school_id = normalize_id(school_id);
        let code = code.trim();
        if new_password.is_empty() {
            return Err(AppError::Validation("new_password is required".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        self.reconcile.run_locked().await;

        let mut tickets = self.repository.tickets.load_all().await;
        let matched = tickets
            .iter()
            .any(|t| same_id(&t.school_id, &school_id) && t.code.as_deref() == Some(code));
        if !matched {
            return Err(AppError::InvalidResetCode);
        }

        for registry in [&self.repository.students, &self.repository.staff] {
            let mut members = registry.load_all().await;
            let mut updated = false;
            for member in members
                .iter_mut()
                .filter(|m| same_id(&m.school_id, &school_id))
            {
                member.password = new_password.to_string();
                updated = true;
            }
            if updated {
                registry.save_all(&members).await?;
            }
        }

        tickets.retain(|t| !same_id(&t.school_id, &school_id));
        self.repository.tickets.save_all(&tickets).await?;
        tracing::info!(school_id = %school_id, "password reset finalized");
        Ok(())
    }

    async fn identity_exists(&self, school_id: &str) -> bool {
        let staff = self.repository.staff.load_all().await;
        if staff.iter().any(|m| same_id(&m.school_id, school_id)) {
            return true;
        }
        let students = self.repository.students.load_all().await;
        students.iter().any(|m| same_id(&m.school_id, school_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Member, MemberStatus};

    async fn fixture() -> (tempfile::TempDir, TicketsService, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).await.unwrap();
        let students = vec![Member {
            name: "Alice".to_string(),
            school_id: "alice".to_string(),
            password: "old-pw".to_string(),
            category: "Student".to_string(),
            photo: Member::default_photo(),
            status: MemberStatus::Approved,
            created_at: None,
        }];
        repo.students.save_all(&students).await.unwrap();
        let service = TicketsService::new(repo.clone(), 5);
        (dir, service, repo)
    }

    #[test]
    fn codes_are_six_uppercase_alphanumerics() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| CODE_CHARS.contains(&b)));
        }
    }

    #[tokio::test]
    async fn unknown_identity_cannot_request_a_ticket() {
        let (_dir, service, _repo) = fixture().await;
        let err = service.request_ticket("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn a_second_request_replaces_the_first_ticket() {
        let (_dir, service, repo) = fixture().await;
        service.request_ticket("alice").await.unwrap();
        service.request_ticket("  ALICE ").await.unwrap();

        let tickets = repo.tickets.load_all().await;
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].status, TicketStatus::Pending);
        assert!(tickets[0].code.is_none());
    }

    #[tokio::test]
    async fn poll_reads_pending_until_staff_approve() {
        let (_dir, service, _repo) = fixture().await;
        service.request_ticket("alice").await.unwrap();
        assert_eq!(service.poll_ticket("alice").await.status, TicketStatus::Pending);

        let code = service.approve_ticket("alice").await.unwrap();
        let poll = service.poll_ticket("alice").await;
        assert_eq!(poll.status, TicketStatus::Approved);
        assert_eq!(poll.code.as_deref(), Some(code.as_str()));
    }

    #[tokio::test]
    async fn finalize_rejects_a_mismatched_code() {
        let (_dir, service, repo) = fixture().await;
        service.request_ticket("alice").await.unwrap();
        service.approve_ticket("alice").await.unwrap();

        let err = service
            .finalize_reset("alice", "WRONG1", "new-pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidResetCode));

        // Nothing changed: ticket still there, password untouched.
        assert_eq!(repo.tickets.load_all().await.len(), 1);
        assert_eq!(repo.students.load_all().await[0].password, "old-pw");
    }

    #[tokio::test]
    async fn finalize_updates_every_registry_and_consumes_the_ticket() {
        let (_dir, service, repo) = fixture().await;
        // The same identity also exists in the staff registry.
        let mut staff = repo.staff.load_all().await;
        staff.push(Member {
            name: "Alice (staff)".to_string(),
            school_id: "ALICE".to_string(),
            password: "old-pw".to_string(),
            category: "Staff".to_string(),
            photo: Member::default_photo(),
            status: MemberStatus::Approved,
            created_at: None,
        });
        repo.staff.save_all(&staff).await.unwrap();

        service.request_ticket("alice").await.unwrap();
        let code = service.approve_ticket("alice").await.unwrap();
        service.finalize_reset("alice", &code, "new-pw").await.unwrap();

        assert_eq!(repo.students.load_all().await[0].password, "new-pw");
        let staff = repo.staff.load_all().await;
        let alice_staff = staff.iter().find(|m| m.school_id == "ALICE").unwrap();
        assert_eq!(alice_staff.password, "new-pw");
        assert!(repo.tickets.load_all().await.is_empty());

        // Single use: the consumed code no longer works.
        let err = service
            .finalize_reset("alice", &code, "other")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidResetCode));
    }

    #[tokio::test]
    async fn expired_tickets_are_invisible_to_the_workflow() {
        let (_dir, service, repo) = fixture().await;
        repo.tickets
            .save_all(&[Ticket {
                school_id: "alice".to_string(),
                status: TicketStatus::Approved,
                code: Some("ABC123".to_string()),
                expiry: "2020-01-01 00:00:00".to_string(),
            }])
            .await
            .unwrap();

        assert_eq!(service.poll_ticket("alice").await.status, TicketStatus::Pending);
        assert!(service.list_tickets().await.is_empty());
        let err = service
            .finalize_reset("alice", "ABC123", "new-pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidResetCode));
    }
}
