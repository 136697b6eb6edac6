//! The demo's own writes into the browser environment

use super::EnvironmentProbe;
use crate::models::CookieEntry;

pub const TRACKING_COOKIE: &str = "tracking";
pub const TRACKING_COOKIE_VALUE: &str = "true";
pub const USER_ID_KEY: &str = "userID";
pub const USER_ID_VALUE: &str = "1234";

/// Set `tracking=true` as a session cookie with no Secure/HttpOnly flags
pub fn plant_tracking_cookie(probe: &dyn EnvironmentProbe) {
    probe.set_cookie(CookieEntry::session(TRACKING_COOKIE, TRACKING_COOKIE_VALUE));
}

/// Write `userID` = `"1234"` into localStorage
pub fn plant_user_id(probe: &dyn EnvironmentProbe) {
    probe.set_local_storage_item(USER_ID_KEY, USER_ID_VALUE);
}

/// Whether a previous visit left the tracking cookie behind
pub fn seen_before(probe: &dyn EnvironmentProbe) -> bool {
    probe.cookies().iter().any(|c| c.name == TRACKING_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MemoryProbe;

    #[test]
    fn test_tracking_cookie_marks_visitor() {
        let probe = MemoryProbe::new();
        assert!(!seen_before(&probe));

        plant_tracking_cookie(&probe);
        assert!(seen_before(&probe));

        let cookie = &probe.cookies()[0];
        assert!(cookie.session);
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
    }

    #[test]
    fn test_user_id_written() {
        let probe = MemoryProbe::new();
        plant_user_id(&probe);
        let storage = probe.local_storage();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage[0].key, "userID");
        assert_eq!(storage[0].value, "1234");
    }
}
