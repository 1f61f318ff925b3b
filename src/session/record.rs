//! Per-session mutable state.

use std::sync::Arc;

use super::event::EventMask;
use crate::ranging::{NativeSession, ParamsBundle, RangingReport, ReasonCode, SessionCallback};

/// The mutable record kept for each open ranging session.
///
/// Every callback overwrites its field wholesale; only the most recent value
/// of each category is retained (last-write-wins, even if a previous value
/// was never read). Storage is unconditional — the subscription mask gates
/// republishing only, so a late subscriber can still query state recorded
/// while its bit was unset.
pub struct SessionRecord {
    /// Native session reference; present only after the Opened callback.
    native: Option<Arc<dyn NativeSession>>,
    /// Bundle from the most recent terminal or failure callback.
    last_params: Option<ParamsBundle>,
    /// Reason code from the most recent terminal or failure callback.
    last_reason: Option<ReasonCode>,
    /// Session-info bundle from the most recent Started callback.
    session_info: Option<ParamsBundle>,
    /// Most recent ranging report.
    report: Option<RangingReport>,
    /// Subscribed-event mask.
    mask: EventMask,
}

impl SessionRecord {
    /// Create a record with the given initial subscription mask.
    pub fn new(mask: EventMask) -> Self {
        Self {
            native: None,
            last_params: None,
            last_reason: None,
            session_info: None,
            report: None,
            mask,
        }
    }

    /// Apply a callback to the record, overwriting the matching field.
    pub fn apply(&mut self, callback: SessionCallback) {
        match callback {
            SessionCallback::Opened(session) => {
                self.native = Some(session);
            }
            SessionCallback::Started(info) => {
                self.session_info = Some(info);
            }
            SessionCallback::Reconfigured(params) => {
                self.session_info = Some(params);
            }
            SessionCallback::OpenFailed(reason, params)
            | SessionCallback::StartFailed(reason, params)
            | SessionCallback::ReconfigureFailed(reason, params)
            | SessionCallback::Stopped(reason, params)
            | SessionCallback::StopFailed(reason, params)
            | SessionCallback::Closed(reason, params)
            | SessionCallback::CloseFailed(reason, params) => {
                self.last_reason = Some(reason);
                self.last_params = Some(params);
            }
            SessionCallback::ReportReceived(report) => {
                self.report = Some(report);
            }
        }
    }

    /// The native session, if Opened has arrived.
    pub fn native(&self) -> Option<&Arc<dyn NativeSession>> {
        self.native.as_ref()
    }

    /// Bundle from the latest terminal/failure callback.
    pub fn last_params(&self) -> Option<&ParamsBundle> {
        self.last_params.as_ref()
    }

    /// Reason from the latest terminal/failure callback.
    pub fn last_reason(&self) -> Option<ReasonCode> {
        self.last_reason
    }

    /// Session-info bundle from the latest Started/Reconfigured callback.
    pub fn session_info(&self) -> Option<&ParamsBundle> {
        self.session_info.as_ref()
    }

    /// The latest ranging report.
    pub fn report(&self) -> Option<&RangingReport> {
        self.report.as_ref()
    }

    /// The current subscription mask.
    pub fn mask(&self) -> EventMask {
        self.mask
    }

    /// Mutable access to the subscription mask.
    pub fn mask_mut(&mut self) -> &mut EventMask {
        &mut self.mask
    }
}
