// SPDX-License-Identifier: GPL-3.0-only

//! Device capability detection
//!
//! Decides whether the session is mobile and whether camera access is
//! possible at all. When the app runs inside an embedding host (a Farcaster
//! mini app client), the host's permission surface is consulted first; the
//! browser permission flow is only used when no host is present.

use crate::constants::device::{MOBILE_USER_AGENTS, WEB_PLATFORM};
use crate::errors::CameraError;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Error returned by the embedding host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError(pub String);

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Host error: {}", self.0)
    }
}

impl std::error::Error for HostError {}

/// Capability snapshot reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContextInfo {
    /// `web`, `mobile`, ... ; `None` when the host did not say
    pub platform_type: Option<String>,
    pub camera_and_microphone_granted: bool,
}

/// Optional embedding host
pub trait HostContext: Send + Sync {
    fn is_embedded(&self) -> BoxFuture<'_, bool>;

    fn context(&self) -> BoxFuture<'_, Result<HostContextInfo, HostError>>;

    /// Ask the host to show its native camera+microphone prompt
    fn request_camera_and_microphone_access(&self) -> BoxFuture<'_, Result<(), HostError>>;
}

/// Result of probing for an embedding host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostProbe {
    NotEmbedded,
    EmbeddedGranted { platform_type: Option<String> },
    EmbeddedUngranted { platform_type: Option<String> },
}

impl HostProbe {
    /// Probe `host`; an unreachable or failing host counts as not embedded
    pub async fn run(host: Option<&dyn HostContext>) -> Self {
        let Some(host) = host else {
            return HostProbe::NotEmbedded;
        };

        if !host.is_embedded().await {
            return HostProbe::NotEmbedded;
        }

        match host.context().await {
            Ok(info) if info.camera_and_microphone_granted => HostProbe::EmbeddedGranted {
                platform_type: info.platform_type,
            },
            Ok(info) => HostProbe::EmbeddedUngranted {
                platform_type: info.platform_type,
            },
            Err(e) => {
                debug!(error = %e, "Host context unavailable, treating as not embedded");
                HostProbe::NotEmbedded
            }
        }
    }
}

/// Detection outcome consumed by the stream manager
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub is_mobile: bool,
    pub host_restricted: bool,
    pub permission_denied: bool,
    /// Set whenever live capture is impossible
    pub error: Option<CameraError>,
}

impl DeviceCapabilities {
    /// Whether the stream manager may go on and acquire cameras
    pub fn camera_available(&self) -> bool {
        self.error.is_none()
    }

    /// User-facing explanation, if capture is unavailable
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

/// Runtime environment inspected by the detector
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    pub user_agent: String,
    /// Local/dev builds may use the camera inside a web host
    pub local_environment: bool,
}

/// Check a user-agent string against known mobile signatures
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    MOBILE_USER_AGENTS.iter().any(|sig| ua.contains(sig))
}

/// Device capability detector
pub struct CapabilityDetector {
    config: DetectorConfig,
}

impl CapabilityDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run detection, possibly triggering the host's native permission prompt
    pub async fn detect(&self, host: Option<&dyn HostContext>) -> DeviceCapabilities {
        let probe = HostProbe::run(host).await;
        debug!(?probe, "Host probe finished");

        let mut is_mobile = false;

        match (&probe, host) {
            (HostProbe::NotEmbedded, _) => {}
            (HostProbe::EmbeddedGranted { platform_type }, _) => {
                is_mobile = platform_type
                    .as_deref()
                    .is_some_and(|platform| platform != WEB_PLATFORM);
            }
            (HostProbe::EmbeddedUngranted { platform_type }, _)
                if platform_type.as_deref() == Some(WEB_PLATFORM)
                    && !self.config.local_environment =>
            {
                info!("Camera unavailable inside web host");
                return DeviceCapabilities {
                    is_mobile: false,
                    host_restricted: true,
                    permission_denied: false,
                    error: Some(CameraError::HostRestricted),
                };
            }
            (HostProbe::EmbeddedUngranted { .. }, Some(host)) => {
                match host.request_camera_and_microphone_access().await {
                    Ok(()) => is_mobile = true,
                    Err(e) => {
                        warn!(error = %e, "Host denied camera access");
                        return DeviceCapabilities {
                            is_mobile: false,
                            host_restricted: false,
                            permission_denied: true,
                            error: Some(CameraError::PermissionDenied),
                        };
                    }
                }
            }
            (HostProbe::EmbeddedUngranted { .. }, None) => {}
        }

        if !is_mobile {
            is_mobile = is_mobile_user_agent(&self.config.user_agent);
        }

        DeviceCapabilities {
            is_mobile,
            ..DeviceCapabilities::default()
        }
    }
}

/// Host with a fixed context, for the CLI and tests
#[derive(Debug, Default)]
pub struct StaticHostContext {
    pub embedded: bool,
    pub info: HostContextInfo,
    /// Outcome of the permission prompt
    pub grant_on_request: bool,
    requests: AtomicUsize,
}

impl StaticHostContext {
    pub fn new(info: HostContextInfo, grant_on_request: bool) -> Self {
        Self {
            embedded: true,
            info,
            grant_on_request,
            requests: AtomicUsize::new(0),
        }
    }

    /// How many times the permission prompt was shown
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl HostContext for StaticHostContext {
    fn is_embedded(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move { self.embedded })
    }

    fn context(&self) -> BoxFuture<'_, Result<HostContextInfo, HostError>> {
        Box::pin(async move { Ok(self.info.clone()) })
    }

    fn request_camera_and_microphone_access(&self) -> BoxFuture<'_, Result<(), HostError>> {
        Box::pin(async move {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.grant_on_request {
                Ok(())
            } else {
                Err(HostError("camera access denied".to_string()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(ua: &str) -> CapabilityDetector {
        CapabilityDetector::new(DetectorConfig {
            user_agent: ua.to_string(),
            local_environment: false,
        })
    }

    fn host(platform: &str, granted: bool, grant_on_request: bool) -> StaticHostContext {
        StaticHostContext::new(
            HostContextInfo {
                platform_type: Some(platform.to_string()),
                camera_and_microphone_granted: granted,
            },
            grant_on_request,
        )
    }

    #[test]
    fn recognizes_mobile_user_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        ));
        assert!(is_mobile_user_agent("Opera/9.80 (J2ME/MIDP; Opera Mini/9)"));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0"
        ));
    }

    #[tokio::test]
    async fn no_host_falls_back_to_user_agent() {
        let caps = detector("Linux; Android 14").detect(None).await;
        assert!(caps.is_mobile);
        assert!(caps.camera_available());
    }

    #[tokio::test]
    async fn granted_mobile_host_is_mobile() {
        let h = host("mobile", true, false);
        let caps = detector("desktop").detect(Some(&h)).await;
        assert!(caps.is_mobile);
        assert_eq!(h.request_count(), 0);
    }

    #[tokio::test]
    async fn ungranted_web_host_is_restricted() {
        let h = host("web", false, true);
        let caps = detector("desktop").detect(Some(&h)).await;
        assert!(caps.host_restricted);
        assert_eq!(caps.error, Some(CameraError::HostRestricted));
        assert_eq!(h.request_count(), 0);
    }

    #[tokio::test]
    async fn local_environment_requests_access_in_web_host() {
        let h = host("web", false, true);
        let caps = CapabilityDetector::new(DetectorConfig {
            user_agent: String::new(),
            local_environment: true,
        })
        .detect(Some(&h))
        .await;
        assert!(caps.camera_available());
        assert_eq!(h.request_count(), 1);
    }

    #[tokio::test]
    async fn denied_mobile_host_reports_permission_denied() {
        let h = host("mobile", false, false);
        let caps = detector("").detect(Some(&h)).await;
        assert!(caps.permission_denied);
        assert_eq!(caps.message().as_deref(), Some("Camera permission denied"));
    }
}
