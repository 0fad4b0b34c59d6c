//! Key-value store database schema.

/// SQL to create the key-value table.
///
/// Rows are scoped by `namespace` so several raffles can share one database
/// file without seeing each other's keys.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS raffle_kv (
    namespace   TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (namespace, key)
);
";
