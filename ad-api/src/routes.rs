//! Endpoint identifiers and the path table a client is built with.
//!
//! The table is an immutable value owned by each `ApiClient`. It starts from
//! the service's documented paths and can be overridden per endpoint from
//! configuration.

use std::collections::{BTreeMap, HashMap};

use reqwest::Method;

use ad_core::error::{AdError, AdResult};

/// Every endpoint the client can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Ping,
    PinGet,
    PinCheck,
    User,
    LinkUnlock,
    LinkStreaming,
    LinkDelayed,
    MagnetUpload,
    MagnetUploadFile,
    MagnetStatus,
    MagnetDelete,
    MagnetRestart,
    MagnetInstant,
    SavedLinks,
    SaveLink,
    DeleteSavedLink,
    History,
    PurgeHistory,
}

impl Endpoint {
    /// All endpoints, in documentation order.
    pub const ALL: [Endpoint; 18] = [
        Endpoint::Ping,
        Endpoint::PinGet,
        Endpoint::PinCheck,
        Endpoint::User,
        Endpoint::LinkUnlock,
        Endpoint::LinkStreaming,
        Endpoint::LinkDelayed,
        Endpoint::MagnetUpload,
        Endpoint::MagnetUploadFile,
        Endpoint::MagnetStatus,
        Endpoint::MagnetDelete,
        Endpoint::MagnetRestart,
        Endpoint::MagnetInstant,
        Endpoint::SavedLinks,
        Endpoint::SaveLink,
        Endpoint::DeleteSavedLink,
        Endpoint::History,
        Endpoint::PurgeHistory,
    ];

    /// Configuration key of this endpoint.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Ping => "ping",
            Endpoint::PinGet => "pin_get",
            Endpoint::PinCheck => "pin_check",
            Endpoint::User => "user",
            Endpoint::LinkUnlock => "link_unlock",
            Endpoint::LinkStreaming => "link_streaming",
            Endpoint::LinkDelayed => "link_delayed",
            Endpoint::MagnetUpload => "magnet_upload",
            Endpoint::MagnetUploadFile => "magnet_upload_file",
            Endpoint::MagnetStatus => "magnet_status",
            Endpoint::MagnetDelete => "magnet_delete",
            Endpoint::MagnetRestart => "magnet_restart",
            Endpoint::MagnetInstant => "magnet_instant",
            Endpoint::SavedLinks => "saved_links",
            Endpoint::SaveLink => "save_link",
            Endpoint::DeleteSavedLink => "delete_saved_link",
            Endpoint::History => "history",
            Endpoint::PurgeHistory => "purge_history",
        }
    }

    /// Look up an endpoint by its configuration key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Path relative to the API base URL.
    pub fn default_path(&self) -> &'static str {
        match self {
            Endpoint::Ping => "ping",
            Endpoint::PinGet => "pin/get",
            Endpoint::PinCheck => "pin/check",
            Endpoint::User => "user",
            Endpoint::LinkUnlock => "link/unlock",
            Endpoint::LinkStreaming => "link/streaming",
            Endpoint::LinkDelayed => "link/delayed",
            Endpoint::MagnetUpload => "magnet/upload",
            Endpoint::MagnetUploadFile => "magnet/upload/file",
            Endpoint::MagnetStatus => "magnet/status",
            Endpoint::MagnetDelete => "magnet/delete",
            Endpoint::MagnetRestart => "magnet/restart",
            Endpoint::MagnetInstant => "magnet/instant",
            Endpoint::SavedLinks => "user/links",
            Endpoint::SaveLink => "user/links/save",
            Endpoint::DeleteSavedLink => "user/links/delete",
            Endpoint::History => "user/history",
            Endpoint::PurgeHistory => "user/history/delete",
        }
    }

    /// HTTP method used for this endpoint.
    pub fn method(&self) -> Method {
        match self {
            Endpoint::MagnetUpload
            | Endpoint::MagnetUploadFile
            | Endpoint::MagnetInstant
            | Endpoint::SaveLink
            | Endpoint::DeleteSavedLink => Method::POST,
            _ => Method::GET,
        }
    }

    /// Whether the call needs the API key.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Endpoint::Ping | Endpoint::PinGet | Endpoint::PinCheck)
    }

    /// Whether repeating the call has no remote side effect.
    ///
    /// Only idempotent endpoints are retried on transport failures. Unlocking
    /// a link or requesting a stream can count against per-host quotas.
    pub fn is_idempotent(&self) -> bool {
        matches!(
            self,
            Endpoint::Ping
                | Endpoint::PinCheck
                | Endpoint::User
                | Endpoint::LinkDelayed
                | Endpoint::MagnetStatus
                | Endpoint::MagnetInstant
                | Endpoint::SavedLinks
                | Endpoint::History
        )
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable endpoint → path mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    paths: HashMap<Endpoint, String>,
}

impl Default for EndpointTable {
    fn default() -> Self {
        let paths = Endpoint::ALL
            .into_iter()
            .map(|e| (e, e.default_path().to_string()))
            .collect();
        Self { paths }
    }
}

impl EndpointTable {
    /// Build a table from the defaults plus named overrides.
    ///
    /// Unknown endpoint names and empty paths are configuration errors.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> AdResult<Self> {
        let mut table = Self::default();
        for (name, path) in overrides {
            let endpoint = Endpoint::from_name(name)
                .ok_or_else(|| AdError::Config(format!("unknown endpoint '{name}'")))?;
            let path = path.trim().trim_matches('/');
            if path.is_empty() {
                return Err(AdError::Config(format!("empty path for endpoint '{name}'")));
            }
            table.paths.insert(endpoint, path.to_string());
        }
        Ok(table)
    }

    /// Path of an endpoint relative to the base URL.
    pub fn path(&self, endpoint: Endpoint) -> &str {
        self.paths
            .get(&endpoint)
            .map(String::as_str)
            .unwrap_or_else(|| endpoint.default_path())
    }
}
