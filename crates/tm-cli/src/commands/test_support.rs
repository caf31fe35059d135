//! Project fixtures shared by command tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tm_core::{PlatformFamily, Version};
use tm_db::{Database, DuckDbBackend};
use tm_ledger::Ledger;

use crate::cli::GlobalArgs;
use crate::context::ProjectContext;

pub(crate) const CONFIG: &str = r#"
name: shop
target_version: "11.0"
database:
  path: tidemark.duckdb
"#;

pub(crate) fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Project with three pgsql migrations across two versions.
pub(crate) fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tidemark.yml", CONFIG);
    write(
        dir.path(),
        "migrations/pgsql/10.0/001-create-orders.sql",
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, note VARCHAR);\n\
         INSERT INTO orders VALUES (1, 'first; order');\n",
    );
    write(
        dir.path(),
        "migrations/pgsql/10.0/002-create-items.sql",
        "CREATE TABLE items (id INTEGER);\n",
    );
    write(
        dir.path(),
        "migrations/pgsql/11.0/001-add-status.sql",
        "-- Order status\nALTER TABLE orders ADD COLUMN status VARCHAR;\n",
    );
    dir
}

pub(crate) fn global(root: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: root.to_path_buf(),
        config: None,
        database: None,
    }
}

pub(crate) fn context(root: &Path) -> ProjectContext {
    ProjectContext::load(&global(root)).unwrap()
}

pub(crate) fn open_db(root: &Path) -> DuckDbBackend {
    DuckDbBackend::from_path(&root.join("tidemark.duckdb")).unwrap()
}

pub(crate) fn ledger() -> Ledger {
    Ledger::new(PlatformFamily::Pgsql, Version::parse("11.0").unwrap())
}

/// Applied short names, sorted.
pub(crate) fn applied(db: &DuckDbBackend) -> Vec<String> {
    let mut names: Vec<String> = ledger()
        .applied_records(db)
        .unwrap()
        .into_iter()
        .map(|record| record.short_name.into_inner())
        .collect();
    names.sort();
    names
}

pub(crate) fn table_exists(db: &DuckDbBackend, name: &str) -> bool {
    let sql = format!("SELECT table_name FROM information_schema.tables WHERE table_name = '{name}'");
    !db.query_text(&sql, 1).unwrap().is_empty()
}

pub(crate) fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}
