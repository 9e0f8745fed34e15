//! Best-effort device classification from a User-Agent string.
//!
//! The result is display metadata for the session list ("Chrome on macOS",
//! mobile/tablet/desktop) and is fixed at session creation. It is never used
//! for authentication or authorization decisions.

use serde::{Deserialize, Serialize};

/// Coarse device category derived from the User-Agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceType {
    /// Database / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable device label plus coarse type, derived once at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub device_name: String,
    pub device_type: DeviceType,
}

/// Classify a User-Agent header value into a [`DeviceDescriptor`].
///
/// Substring heuristics only: "mobile" wins over "tablet"/"ipad" for the
/// type, and the name is `"<browser> on <os>"` from the first matching
/// token of each. A missing header yields `("Unknown Device", Unknown)`.
pub fn parse_user_agent(user_agent: Option<&str>) -> DeviceDescriptor {
    let Some(ua) = user_agent.filter(|ua| !ua.is_empty()) else {
        return DeviceDescriptor {
            device_name: "Unknown Device".to_string(),
            device_type: DeviceType::Unknown,
        };
    };

    let ua_lower = ua.to_lowercase();
    let contains = |needle: &str| ua_lower.contains(needle);

    let device_type = if contains("mobile") {
        DeviceType::Mobile
    } else if contains("tablet") || contains("ipad") {
        DeviceType::Tablet
    } else {
        DeviceType::Desktop
    };

    // Chrome-based UAs also advertise Safari; Edge advertises both. Order
    // and the exclusion checks below mirror that quirk.
    let browser = if contains("edg") {
        "Edge"
    } else if contains("chrome") {
        "Chrome"
    } else if contains("safari") {
        "Safari"
    } else if contains("firefox") {
        "Firefox"
    } else {
        "Unknown"
    };

    let os = if contains("windows") {
        "Windows"
    } else if contains("macintosh") || contains("mac os x") {
        "macOS"
    } else if contains("android") {
        "Android"
    } else if contains("iphone") || contains("ipad") || contains("ipod") {
        "iOS"
    } else if contains("linux") {
        "Linux"
    } else {
        "Unknown"
    };

    DeviceDescriptor {
        device_name: format!("{browser} on {os}"),
        device_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/604.1";

    #[test]
    fn test_missing_user_agent() {
        let desc = parse_user_agent(None);
        assert_eq!(desc.device_name, "Unknown Device");
        assert_eq!(desc.device_type, DeviceType::Unknown);

        let desc = parse_user_agent(Some(""));
        assert_eq!(desc.device_type, DeviceType::Unknown);
    }

    #[test]
    fn test_desktop_chrome_on_mac() {
        let desc = parse_user_agent(Some(CHROME_MAC));
        assert_eq!(desc.device_type, DeviceType::Desktop);
        assert_eq!(desc.device_name, "Chrome on macOS");
    }

    #[test]
    fn test_mobile_safari_on_iphone() {
        let desc = parse_user_agent(Some(SAFARI_IPHONE));
        assert_eq!(desc.device_type, DeviceType::Mobile);
        assert_eq!(desc.device_name, "Safari on iOS");
    }

    #[test]
    fn test_tablet_ipad() {
        let desc = parse_user_agent(Some(SAFARI_IPAD));
        assert_eq!(desc.device_type, DeviceType::Tablet);
        assert_eq!(desc.device_name, "Safari on iOS");
    }

    #[test]
    fn test_firefox_on_linux() {
        let desc = parse_user_agent(Some(FIREFOX_LINUX));
        assert_eq!(desc.device_type, DeviceType::Desktop);
        assert_eq!(desc.device_name, "Firefox on Linux");
    }

    #[test]
    fn test_edge_not_misread_as_chrome() {
        // Edge UAs contain "chrome" and "safari"; "edg" must win.
        let desc = parse_user_agent(Some(EDGE_WINDOWS));
        assert_eq!(desc.device_name, "Edge on Windows");
        assert_eq!(desc.device_type, DeviceType::Desktop);
    }

    #[test]
    fn test_type_serializes_lowercase() {
        assert_eq!(DeviceType::Mobile.as_str(), "mobile");
        assert_eq!(
            serde_json::to_string(&DeviceType::Tablet).unwrap(),
            "\"tablet\""
        );
    }
}
