//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs are stored as strings; record ids
//! reuse the same UUID so `type::record('<table>', $id)` addresses a row
//! directly.

use surrealdb::{Connection, Surreal};
use tracing::{debug, info};

use crate::error::DbError;

/// Ledger of applied migrations, one row per version.
const LEDGER_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Members
-- =======================================================================
DEFINE TABLE member SCHEMAFULL;
DEFINE FIELD name ON TABLE member TYPE string;
DEFINE FIELD email ON TABLE member TYPE string;
DEFINE FIELD password_hash ON TABLE member TYPE string;
DEFINE FIELD created_at ON TABLE member TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_member_email ON TABLE member \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD invite_code ON TABLE organization TYPE string \
    ASSERT string::len($value) = 10 AND string::is_alphanum($value);
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_invite_code ON TABLE organization \
    COLUMNS invite_code UNIQUE;

-- =======================================================================
-- Clients (organization scope)
-- =======================================================================
DEFINE TABLE client SCHEMAFULL;
DEFINE FIELD name ON TABLE client TYPE string;
DEFINE FIELD thumbnail ON TABLE client TYPE option<string>;
DEFINE FIELD organization_id ON TABLE client TYPE string;
DEFINE FIELD created_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_client_organization ON TABLE client \
    COLUMNS organization_id;

-- =======================================================================
-- Sessions (member scope)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD member_id ON TABLE session TYPE string;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_member ON TABLE session \
    COLUMNS member_id;
DEFINE INDEX idx_session_expires ON TABLE session \
    COLUMNS expires_at;

-- =======================================================================
-- Trackers (member scope)
-- =======================================================================
DEFINE TABLE tracker SCHEMAFULL;
DEFINE FIELD client_id ON TABLE tracker TYPE string;
DEFINE FIELD member_id ON TABLE tracker TYPE string;
DEFINE FIELD is_toggled_on ON TABLE tracker TYPE bool DEFAULT false;
DEFINE FIELD last_toggled_on ON TABLE tracker TYPE datetime;
DEFINE FIELD created_for ON TABLE tracker TYPE datetime;
DEFINE FIELD before_duration ON TABLE tracker TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD created_at ON TABLE tracker TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tracker TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tracker_member_day ON TABLE tracker \
    COLUMNS member_id, created_for;
DEFINE INDEX idx_tracker_client ON TABLE tracker \
    COLUMNS client_id;

-- =======================================================================
-- Graph edges
-- =======================================================================

-- Member -> Organization membership
DEFINE TABLE member_of TYPE RELATION IN member OUT organization SCHEMAFULL;
DEFINE INDEX idx_member_of_unique ON TABLE member_of \
    COLUMNS in, out UNIQUE;
";

/// Bring the schema up to date.
///
/// Each pending migration runs in its own transaction together with its
/// `_migration` ledger entry, so a failed migration leaves no partial
/// schema behind. Returns the number of migrations applied.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<usize, DbError> {
    db.query(LEDGER_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current = current_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current)
        .collect();
    if pending.is_empty() {
        debug!(version = current, "Schema up to date");
        return Ok(0);
    }

    for migration in &pending {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        let script = format!(
            "BEGIN TRANSACTION;\n{}\n\
             CREATE _migration SET version = $version, name = $name;\n\
             COMMIT TRANSACTION;",
            migration.sql
        );
        db.query(&script)
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "v{} {}: {e}",
                    migration.version, migration.name
                ))
            })?;
    }

    info!(applied = pending.len(), "Schema migrated");
    Ok(pending.len())
}

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT VALUE version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let versions: Vec<u32> = result.take(0)?;
    Ok(versions.first().copied().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_every_table() {
        for table in ["member", "organization", "client", "session", "tracker", "member_of"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} ")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
