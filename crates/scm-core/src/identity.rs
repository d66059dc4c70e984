//! Datanode identity and network address (§3 DATA MODEL).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Immutable UUID plus a current `(hostName, ipAddress)` pair. The UUID never
/// changes; both address parts are mutable across re-registrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatanodeIdentity {
    /// The datanode's stable UUID, assigned once at first registration.
    pub uuid: Uuid,
    /// Current reported hostname.
    pub host_name: String,
    /// Current reported IP address.
    pub ip_address: String,
}

impl DatanodeIdentity {
    /// Builds a new identity.
    pub fn new(uuid: Uuid, host_name: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            uuid,
            host_name: host_name.into(),
            ip_address: ip_address.into(),
        }
    }

    /// Selects the address to use for resolver lookups and secondary-index
    /// keys, per the `useHostname` configuration flag (§4.5 step 2).
    pub fn selected_address(&self, use_hostname: bool) -> &str {
        if use_hostname {
            &self.host_name
        } else {
            &self.ip_address
        }
    }
}

impl fmt::Display for DatanodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.uuid, self.host_name, self.ip_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_hostname_or_ip() {
        let id = DatanodeIdentity::new(Uuid::nil(), "dn1", "10.0.0.1");
        assert_eq!(id.selected_address(true), "dn1");
        assert_eq!(id.selected_address(false), "10.0.0.1");
    }
}
