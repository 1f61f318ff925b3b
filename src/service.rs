//! Session lifecycle orchestration.
//!
//! [`RangingService`] ties the registry to a ranging backend: it opens
//! sessions, drives start/stop through the native reference recorded by the
//! Opened callback, and handles close — including cancelling an open that
//! never completed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, UwbBridgeError};
use crate::ranging::{
    CancelGuard, NativeSession, ParamsBundle, RangingBackend, SessionCallbacks, SessionConfig,
};
use crate::session::{SessionHandle, SessionRegistry};

/// Facade over the registry and the platform backend.
pub struct RangingService {
    registry: Arc<SessionRegistry>,
    backend: Arc<dyn RangingBackend>,
    /// Cancellation guards for sessions whose Opened callback is still
    /// outstanding.
    pending_opens: Mutex<HashMap<SessionHandle, CancelGuard>>,
}

impl RangingService {
    pub fn new(registry: Arc<SessionRegistry>, backend: Arc<dyn RangingBackend>) -> Self {
        Self {
            registry,
            backend,
            pending_opens: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying session registry.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Open a new ranging session.
    ///
    /// Registers a handle immediately and asks the backend to open the
    /// session; the outcome (Opened or OpenFailed) arrives later through
    /// the callback path. The handle is valid for subscribe/query calls
    /// as soon as this returns.
    pub fn open_session(&self, config: &SessionConfig) -> Result<SessionHandle> {
        let handle = self.registry.create();
        let callbacks = Arc::clone(&self.registry) as Arc<dyn SessionCallbacks>;

        let guard = match self.backend.open_session(handle, config, callbacks) {
            Ok(guard) => guard,
            Err(e) => {
                // The backend never took the request; roll the handle back.
                let _ = self.registry.close(handle);
                return Err(e);
            }
        };

        if let Ok(mut pending) = self.pending_opens.lock() {
            pending.insert(handle, guard);
        }

        tracing::info!(%handle, "ranging session open requested");
        Ok(handle)
    }

    /// Begin ranging on an opened session.
    pub fn start_session(&self, handle: SessionHandle) -> Result<()> {
        let native = self.native(handle)?;
        // Opened has arrived; the pending-open guard is obsolete.
        if let Ok(mut pending) = self.pending_opens.lock() {
            pending.remove(&handle);
        }
        native.start(ParamsBundle::new());
        Ok(())
    }

    /// Stop ranging on an opened session.
    pub fn stop_session(&self, handle: SessionHandle) -> Result<()> {
        self.native(handle)?.stop();
        Ok(())
    }

    /// Close a session and remove it from the registry.
    ///
    /// If the session never opened, the pending open is cancelled instead
    /// of closed. The handle is invalid afterwards.
    pub fn close_session(&self, handle: SessionHandle) -> Result<()> {
        let opened = self
            .registry
            .with_record(handle, |r| r.native().is_some())?;

        let guard = self
            .pending_opens
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(&handle));

        self.registry.close(handle)?;

        if !opened {
            if let Some(guard) = guard {
                guard.cancel();
            }
        }

        tracing::info!(%handle, "ranging session close requested");
        Ok(())
    }

    fn native(&self, handle: SessionHandle) -> Result<Arc<dyn NativeSession>> {
        self.registry
            .with_record(handle, |r| r.native().cloned())?
            .ok_or_else(|| UwbBridgeError::NotOpened(handle.to_string()))
    }
}
