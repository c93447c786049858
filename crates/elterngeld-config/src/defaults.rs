//! Default values shared by the configuration components

/// Period of the stream flusher tick, in milliseconds
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 25;

/// Margin kept above an anchored user message, in layout units
pub const DEFAULT_TOP_OFFSET: f64 = 16.0;

/// Animation frames to wait for message elements to mount before giving up
pub const DEFAULT_MAX_MOUNT_ATTEMPTS: u32 = 6;

/// Smallest spacer change worth applying, in layout units
pub const DEFAULT_NOISE_THRESHOLD: f64 = 1.0;

/// Consecutive non-positive spacer readings that end tracking
pub const DEFAULT_ZERO_STREAK: u32 = 2;

/// Distance from the bottom beyond which an upward scroll disables auto-follow
pub const DEFAULT_DISENGAGE_DISTANCE: f64 = 100.0;

/// Distance from the bottom under which auto-follow is re-enabled
pub const DEFAULT_ENGAGE_DISTANCE: f64 = 50.0;

/// Chat endpoint used when none is configured
pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:54321/functions/v1/chat";

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the application directory inside the platform config directory
pub const APP_DIR_NAME: &str = "elterngeld";
