use std::env;

pub const DEFAULT_COUNTER_ID: &str = "visitors";
pub const DEFAULT_COUNTER_TABLE: &str = "visitors";

/// Which record the service counts against. Injected into the router so the
/// handler stays free of env lookups.
#[derive(Clone, Debug)]
pub struct CounterConfig {
    pub counter_id: String,
}

impl CounterConfig {
    /// Reads `COUNTER_ID`, defaulting to `visitors`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let counter_id = env::var("COUNTER_ID").unwrap_or_else(|_| DEFAULT_COUNTER_ID.into());
        Self { counter_id }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            counter_id: DEFAULT_COUNTER_ID.into(),
        }
    }
}

/// Reads `COUNTER_TABLE`, defaulting to `visitors`. The name is spliced into
/// SQL as an identifier, so anything beyond alphanumerics, `_` and `-` is
/// rejected here.
pub fn table_from_env() -> String {
    dotenvy::dotenv().ok();
    let table = env::var("COUNTER_TABLE").unwrap_or_else(|_| DEFAULT_COUNTER_TABLE.into());
    assert!(
        !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        "COUNTER_TABLE may only contain ascii alphanumerics, '_' or '-'"
    );
    table
}
