//! Class invitations.
//!
//! Invites are issued and redeemed by an external service. [`InviteService`] is the async
//! seam, [`InMemoryInviteService`] a local implementation, and [`InviteAcceptor`] the
//! client-side guard that refuses a second acceptance while one is still in flight.

use crate::constants::{
    INVITE_CODE_ALPHABET, INVITE_CODE_LEN, INVITE_TOKEN_LEN, MAX_INVITE_EXPIRATION_DAYS,
};
use crate::config::CoreConfig;
use crate::context::AccountContext;
use crate::{AuthoringError, AuthoringResult};
use chrono::{DateTime, Duration, Utc};
use medsim_uuid::AssetId;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Active,
    Expired,
    Revoked,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: AssetId,
    pub class_id: String,
    /// Secret embedded in invite links.
    pub token: String,
    /// Short code a student can type in.
    pub invite_code: String,
    pub expires_at: DateTime<Utc>,
    /// `None` means unlimited.
    pub max_uses: Option<u32>,
    pub current_uses: u32,
    pub status: InviteStatus,
}

impl Invite {
    fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.current_uses >= max)
    }
}

#[allow(async_fn_in_trait)]
pub trait InviteService {
    async fn create_invite(
        &self,
        class_id: &str,
        expiration_days: u32,
        max_uses: Option<u32>,
    ) -> AuthoringResult<Invite>;

    async fn get_invite_by_token(&self, token: &str) -> AuthoringResult<Option<Invite>>;

    /// Redeems an invite for `user_id`. Returns `false` when the invite is unknown, expired,
    /// revoked, used up, or was already accepted by this user.
    async fn accept_invite(&self, token: &str, user_id: &str) -> AuthoringResult<bool>;
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Default)]
struct InviteState {
    by_token: HashMap<String, Invite>,
    acceptances: HashSet<(String, String)>,
}

/// In-memory invite service.
pub struct InMemoryInviteService {
    state: Mutex<InviteState>,
    clock: Clock,
}

impl Default for InMemoryInviteService {
    fn default() -> Self {
        Self {
            state: Mutex::new(InviteState::default()),
            clock: Arc::new(Utc::now),
        }
    }
}

impl std::fmt::Debug for InMemoryInviteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryInviteService").finish_non_exhaustive()
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| char::from(INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())]))
        .collect()
}

fn poisoned<E>(_: E) -> AuthoringError {
    AuthoringError::Store("invite state lock poisoned".into())
}

impl InMemoryInviteService {
    /// Uses `clock` instead of the system time when checking expiry.
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            state: Mutex::new(InviteState::default()),
            clock: Arc::new(clock),
        }
    }

    /// Revokes an invite. Returns `false` if the token is unknown.
    pub fn revoke(&self, token: &str) -> AuthoringResult<bool> {
        let mut state = self.state.lock().map_err(poisoned)?;
        match state.by_token.get_mut(token) {
            Some(invite) => {
                invite.status = InviteStatus::Revoked;
                tracing::info!(invite_id = %invite.id, "invite revoked");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn refresh_status(&self, invite: &mut Invite) {
        if invite.status == InviteStatus::Active && (self.clock)() >= invite.expires_at {
            invite.status = InviteStatus::Expired;
        }
    }
}

impl InviteService for InMemoryInviteService {
    async fn create_invite(
        &self,
        class_id: &str,
        expiration_days: u32,
        max_uses: Option<u32>,
    ) -> AuthoringResult<Invite> {
        if class_id.trim().is_empty() {
            return Err(AuthoringError::InvalidInput("class id cannot be empty".into()));
        }
        if !(1..=MAX_INVITE_EXPIRATION_DAYS).contains(&expiration_days) {
            return Err(AuthoringError::InvalidInput(format!(
                "invite expiration must be between 1 and {} days, got {}",
                MAX_INVITE_EXPIRATION_DAYS, expiration_days
            )));
        }
        if max_uses == Some(0) {
            return Err(AuthoringError::InvalidInput(
                "max uses must be at least 1 when set".into(),
            ));
        }

        let invite = Invite {
            id: AssetId::new(),
            class_id: class_id.trim().to_string(),
            token: generate_token(),
            invite_code: generate_code(),
            expires_at: (self.clock)() + Duration::days(i64::from(expiration_days)),
            max_uses,
            current_uses: 0,
            status: InviteStatus::Active,
        };

        let mut state = self.state.lock().map_err(poisoned)?;
        state.by_token.insert(invite.token.clone(), invite.clone());
        tracing::info!(invite_id = %invite.id, class_id = %invite.class_id, "invite created");
        Ok(invite)
    }

    async fn get_invite_by_token(&self, token: &str) -> AuthoringResult<Option<Invite>> {
        let mut state = self.state.lock().map_err(poisoned)?;
        Ok(state.by_token.get_mut(token).map(|invite| {
            self.refresh_status(invite);
            invite.clone()
        }))
    }

    async fn accept_invite(&self, token: &str, user_id: &str) -> AuthoringResult<bool> {
        let mut state = self.state.lock().map_err(poisoned)?;
        let InviteState {
            by_token,
            acceptances,
        } = &mut *state;

        let Some(invite) = by_token.get_mut(token) else {
            tracing::warn!("invite token not recognised");
            return Ok(false);
        };
        self.refresh_status(invite);
        if invite.status != InviteStatus::Active {
            tracing::warn!(invite_id = %invite.id, status = ?invite.status, "invite not active");
            return Ok(false);
        }
        if invite.is_exhausted() {
            tracing::warn!(invite_id = %invite.id, "invite has no uses left");
            return Ok(false);
        }
        if !acceptances.insert((token.to_string(), user_id.to_string())) {
            tracing::warn!(invite_id = %invite.id, user_id, "invite already accepted by user");
            return Ok(false);
        }

        invite.current_uses += 1;
        tracing::info!(invite_id = %invite.id, user_id, uses = invite.current_uses, "invite accepted");
        Ok(true)
    }
}

/// Issues an invite for a class on behalf of `ctx`.
///
/// `expiration_days` defaults to the configured invite lifetime when `None`.
pub async fn create_class_invite<S>(
    service: &S,
    ctx: &AccountContext,
    config: &CoreConfig,
    class_id: &str,
    expiration_days: Option<u32>,
    max_uses: Option<u32>,
) -> AuthoringResult<Invite>
where
    S: InviteService + ?Sized,
{
    ctx.require_invite_management()?;
    let expiration_days = expiration_days.unwrap_or_else(|| config.invite_expiration_days());
    service
        .create_invite(class_id, expiration_days, max_uses)
        .await
}

struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Accepts invites one at a time.
#[derive(Debug)]
pub struct InviteAcceptor<S> {
    service: S,
    processing: AtomicBool,
}

impl<S: InviteService> InviteAcceptor<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            processing: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Accepts an invite, or fails with [`AuthoringError::AlreadyProcessing`] if another
    /// acceptance through this acceptor has not finished. The flag is cleared when the
    /// acceptance completes or its future is dropped.
    pub async fn accept(&self, token: &str, user_id: &str) -> AuthoringResult<bool> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(user_id, "invite acceptance already in progress");
            return Err(AuthoringError::AlreadyProcessing);
        }
        let _guard = ProcessingGuard(&self.processing);
        self.service.accept_invite(token, user_id).await
    }
}
