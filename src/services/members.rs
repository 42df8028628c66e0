//! Member registry service: registration, login, approval workflow.
//!
//! Students self-register as pending and wait for staff approval; staff
//! accounts are approved on creation. Credentials are stored as-is in the
//! registries (a known limitation inherited from the original system, see
//! DESIGN.md).

use crate::{
    datetime,
    error::{AppError, AppResult},
    models::{normalize_id, same_id, Member, MemberProfile, MemberStatus},
    repository::Repository,
    services::sessions::SessionService,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
    sessions: SessionService,
}

impl MembersService {
    pub fn new(repository: Repository, sessions: SessionService) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Look an identity up across both registries, staff first.
    pub async fn find_any(&self, school_id: &str) -> Option<MemberProfile> {
        let school_id = normalize_id(school_id);
        if school_id.is_empty() {
            return None;
        }
        let staff = self.repository.staff.load_all().await;
        if let Some(member) = staff.iter().find(|m| same_id(&m.school_id, &school_id)) {
            return Some(MemberProfile::from_member(member, true));
        }
        let students = self.repository.students.load_all().await;
        students
            .iter()
            .find(|m| same_id(&m.school_id, &school_id))
            .map(|m| MemberProfile::from_member(m, false))
    }

    /// Register a student account; it stays pending until staff approve it.
    pub async fn register_student(
        &self,
        name: &str,
        school_id: &str,
        password: &str,
    ) -> AppResult<()> {
        self.register(name, school_id, password, false).await
    }

    /// Register a staff account; staff are approved immediately.
    pub async fn register_staff(
        &self,
        name: &str,
        school_id: &str,
        password: &str,
    ) -> AppResult<()> {
        self.register(name, school_id, password, true).await
    }

    async fn register(
        &self,
        name: &str,
        school_id: &str,
        password: &str,
        is_staff: bool,
    ) -> AppResult<()> {
        let name = name.trim();
        let school_id = normalize_id(school_id);
        if name.is_empty() || school_id.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }
        if self.find_any(&school_id).await.is_some() {
            return Err(AppError::Conflict("ID Exists".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        let registry = if is_staff {
            &self.repository.staff
        } else {
            &self.repository.students
        };
        let mut members = registry.load_all().await;
        members.push(Member {
            name: name.to_string(),
            school_id: school_id.clone(),
            password: password.to_string(),
            category: if is_staff { "Staff" } else { "Student" }.to_string(),
            photo: Member::default_photo(),
            status: if is_staff {
                MemberStatus::Approved
            } else {
                MemberStatus::Pending
            },
            created_at: Some(datetime::now().format(datetime::MINUTE_FORMAT).to_string()),
        });
        registry.save_all(&members).await?;
        tracing::info!(school_id = %school_id, staff = is_staff, "member registered");
        Ok(())
    }

    /// Authenticate and open a session. Pending accounts cannot log in.
    pub async fn login(&self, school_id: &str, password: &str) -> AppResult<(String, MemberProfile)> {
        let profile = self
            .find_any(school_id)
            .await
            .ok_or_else(|| AppError::NotFound("ID not found".to_string()))?;
        if profile.status == MemberStatus::Pending {
            return Err(AppError::AccountPending);
        }

        let registry = if profile.is_staff {
            &self.repository.staff
        } else {
            &self.repository.students
        };
        let members = registry.load_all().await;
        let matches = members
            .iter()
            .any(|m| same_id(&m.school_id, school_id) && m.password == password);
        if !matches {
            return Err(AppError::Authentication("Invalid Password".to_string()));
        }

        let token = self.sessions.issue(&profile.school_id);
        Ok((token, profile))
    }

    /// Close whichever session owns this token.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions.revoke_token(token)
    }

    /// Whether the identity belongs to the staff registry.
    pub async fn is_staff(&self, school_id: &str) -> bool {
        matches!(self.find_any(school_id).await, Some(p) if p.is_staff)
    }

    pub async fn list_students(&self) -> Vec<Member> {
        self.repository.students.load_all().await
    }

    pub async fn list_staff(&self) -> Vec<Member> {
        self.repository.staff.load_all().await
    }

    /// Approve a pending student account.
    pub async fn approve_student(&self, school_id: &str) -> AppResult<()> {
        let _guard = self.repository.write_guard().await;
        let mut students = self.repository.students.load_all().await;
        let student = students
            .iter_mut()
            .find(|m| same_id(&m.school_id, school_id))
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        student.status = MemberStatus::Approved;
        self.repository.students.save_all(&students).await?;
        Ok(())
    }

    /// Reject (remove) a pending student registration.
    pub async fn reject_student(&self, school_id: &str) -> AppResult<()> {
        let _guard = self.repository.write_guard().await;
        let mut students = self.repository.students.load_all().await;
        students.retain(|m| !same_id(&m.school_id, school_id));
        self.repository.students.save_all(&students).await?;
        Ok(())
    }

    /// Rename a member in the chosen registry.
    pub async fn update_member(&self, school_id: &str, name: &str, is_staff: bool) -> AppResult<()> {
        let name = name.trim();
        let school_id = normalize_id(school_id);
        if school_id.is_empty() || name.is_empty() {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        let registry = if is_staff {
            &self.repository.staff
        } else {
            &self.repository.students
        };
        let mut members = registry.load_all().await;
        let member = members
            .iter_mut()
            .find(|m| same_id(&m.school_id, &school_id))
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        member.name = name.to_string();
        registry.save_all(&members).await?;
        Ok(())
    }

    /// Remove a member from the chosen registry.
    pub async fn delete_member(&self, school_id: &str, is_staff: bool) -> AppResult<()> {
        let school_id = normalize_id(school_id);
        if school_id.is_empty() {
            return Err(AppError::Validation("Missing school_id".to_string()));
        }

        let _guard = self.repository.write_guard().await;
        let registry = if is_staff {
            &self.repository.staff
        } else {
            &self.repository.students
        };
        let mut members = registry.load_all().await;
        let before = members.len();
        members.retain(|m| !same_id(&m.school_id, &school_id));
        if members.len() == before {
            return Err(AppError::NotFound("Member not found".to_string()));
        }
        registry.save_all(&members).await?;
        Ok(())
    }
}
