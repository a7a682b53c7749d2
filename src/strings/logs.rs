pub const STARTING: &str = "Starting arraysays...";
pub const CACHE_EXPIRED: &str = "Cache expired! Re-fetching quote DB...";
pub const AUTHENTICATING: &str = "Authenticating...";
pub const SYNC_LOOP_START: &str = "Starting sync loop...";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn config_loaded(user: &str, url: &str) -> String {
    format!("Loaded configuration for user {user} (quotes from {url})")
}

pub fn log_level(level: &str) -> String {
    format!("Log level {level}.")
}

pub fn cache_refreshed(count: usize, source: &str, elapsed_ms: u128) -> String {
    format!("Fetched {count} quotes from {source} in {elapsed_ms} ms.")
}

pub fn cache_refresh_failed(err: &str) -> String {
    format!("Cache refresh failed! {err}")
}

pub fn auth_success(elapsed_ms: u128) -> String {
    format!("Authenticated successfully in {elapsed_ms} ms.")
}

pub fn auth_failed(elapsed_ms: u128, err: &str) -> String {
    format!("Authentication failed after {elapsed_ms} ms: {err}")
}

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id}")
}

pub fn join_invite_fail(room_id: &str, err: &str) -> String {
    format!("Failed to join room {room_id} after invite: {err}")
}

pub fn handle_failed(room_id: &str, err: &str) -> String {
    format!("Failed to handle message in {room_id}: {err}")
}
