use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use {courier_store::AccountStatus, courier_transport::TransportConnection, tokio::task::JoinHandle};

use crate::{Error, Result};

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

struct SessionInner {
    account_id: String,
    status: RwLock<AccountStatus>,
    qr_code: RwLock<Option<String>>,
    phone_number: RwLock<Option<String>>,
    connection: RwLock<Option<Arc<dyn TransportConnection>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// In-memory state of one live session.
///
/// Status, QR code, and phone number are read-through caches of the
/// persisted account record; the store stays the source of truth.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    pub(crate) fn new(account_id: &str) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                account_id: account_id.to_string(),
                status: RwLock::new(AccountStatus::Initializing),
                qr_code: RwLock::new(None),
                phone_number: RwLock::new(None),
                connection: RwLock::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.inner.account_id
    }

    #[must_use]
    pub fn status(&self) -> AccountStatus {
        *read(&self.inner.status)
    }

    #[must_use]
    pub fn qr_code(&self) -> Option<String> {
        read(&self.inner.qr_code).clone()
    }

    #[must_use]
    pub fn phone_number(&self) -> Option<String> {
        read(&self.inner.phone_number).clone()
    }

    pub(crate) fn set_status(&self, status: AccountStatus) {
        *write(&self.inner.status) = status;
    }

    pub(crate) fn set_qr_code(&self, code: Option<String>) {
        *write(&self.inner.qr_code) = code;
    }

    pub(crate) fn set_phone_number(&self, phone: Option<String>) {
        *write(&self.inner.phone_number) = phone;
    }

    pub(crate) fn set_connection(&self, connection: Arc<dyn TransportConnection>) {
        *write(&self.inner.connection) = Some(connection);
    }

    pub(crate) fn connection(&self) -> Option<Arc<dyn TransportConnection>> {
        read(&self.inner.connection).clone()
    }

    pub(crate) fn set_task(&self, task: JoinHandle<()>) {
        *guard(&self.inner.task) = Some(task);
    }

    pub(crate) fn take_task(&self) -> Option<JoinHandle<()>> {
        guard(&self.inner.task).take()
    }
}

/// Registry of live sessions, keyed by account id.
///
/// The map lock is never held across an await; all mutable per-session
/// state lives inside the handle, so operations stay per-key atomic.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the account id. Fails when a session is already live.
    pub fn insert(&self, handle: SessionHandle) -> Result<()> {
        let mut sessions = write(&self.sessions);
        if sessions.contains_key(handle.account_id()) {
            return Err(Error::already_exists(handle.account_id()));
        }
        sessions.insert(handle.account_id().to_string(), handle);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, account_id: &str) -> Option<SessionHandle> {
        read(&self.sessions).get(account_id).cloned()
    }

    /// Release the account id. Returns the handle if one was live.
    pub fn remove(&self, account_id: &str) -> Option<SessionHandle> {
        write(&self.sessions).remove(account_id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        read(&self.sessions).keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.sessions).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        read(&self.sessions).is_empty()
    }
}
