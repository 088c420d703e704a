/// API host used when the environment is "development".
pub const DEVELOPMENT_API_HOST: &str = "http://localhost:8080";

/// API host used for every other environment.
pub const PRODUCTION_API_HOST: &str = "https://api.calendar.prayujt.com";

/// Prefix of environment variables layered over the config file
/// (`CALGRID_ENVIRONMENT` overrides `environment`).
pub const ENV_PREFIX: &str = "CALGRID";

/// Calendar sorted first by `get_calendars_array`.
pub const PERSONAL_CALENDAR_NAME: &str = "Personal";

/// Shortest duration (in minutes) an event is drawn with on the grid.
pub const MIN_EVENT_MINUTES: i64 = 15;

pub const MINUTES_PER_DAY: i64 = 24 * 60;
