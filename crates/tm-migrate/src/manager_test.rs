use super::*;
use crate::target::{LiveTarget, SqlOnlyTarget};
use std::cell::RefCell;
use tempfile::TempDir;
use tm_db::{Database, DbError, DbResult, DuckDbBackend};
use tm_ledger::{AppliedRecord, Ledger};

// ── Helpers ────────────────────────────────────────────────────────────

/// Target that records every call it receives.
#[derive(Default)]
struct RecordingTarget {
    calls: RefCell<Vec<String>>,
    applied: Vec<&'static str>,
    failed: Vec<&'static str>,
    fail_on: Option<&'static str>,
}

impl RecordingTarget {
    fn with_applied(applied: Vec<&'static str>) -> Self {
        Self {
            applied,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl MigrationTarget for RecordingTarget {
    fn prepare_ledger(&self) -> MigrateResult<String> {
        self.calls.borrow_mut().push("prepare".to_string());
        Ok(String::new())
    }

    fn applied_records(&self) -> MigrateResult<Vec<AppliedRecord>> {
        Ok(self
            .applied
            .iter()
            .map(|name| AppliedRecord {
                short_name: ShortName::try_new(*name).unwrap(),
                target_version: Version::zero(),
                applied_at: None,
            })
            .collect())
    }

    fn failed_migrations(&self) -> MigrateResult<Vec<ShortName>> {
        Ok(self
            .failed
            .iter()
            .map(|name| ShortName::try_new(*name).unwrap())
            .collect())
    }

    fn record_event(&self, event: &AuditEvent) -> MigrateResult<String> {
        self.calls
            .borrow_mut()
            .push(format!("event {} {}", event.short_name, event.phase));
        Ok(format!("log {};\n", event.phase))
    }

    fn execute(&self, statement: &str) -> DbResult<String> {
        if self.fail_on == Some(statement) {
            return Err(DbError::ExecutionError("boom".to_string()));
        }
        self.calls.borrow_mut().push(format!("execute {statement}"));
        Ok(format!("execute {statement};\n"))
    }

    fn consolidate(&self, short_name: &ShortName) -> MigrateResult<String> {
        self.calls
            .borrow_mut()
            .push(format!("consolidate {short_name}"));
        Ok(format!("cleanup {short_name};\n"))
    }
}

fn touch(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

/// Migration tree with three version directories for the pgsql family.
fn setup() -> (TempDir, MigrationManager) {
    let dir = TempDir::new().unwrap();
    let family = dir.path().join("pgsql");
    touch(&family, "9.0/001-bar.sql", "create table bar (id integer);");
    touch(&family, "9.0/002-baz.sql", "create table baz (id integer);");
    touch(
        &family,
        "10.0/001-foo.sql",
        "create table foo (id integer);\ninsert into foo values (1);\n",
    );
    touch(&family, "10.0/002-foo.sql", "alter table foo add column label varchar;");
    touch(&family, "10.0/003-foo.sql", "insert into foo values (2, 'it''s; ok');");
    touch(&family, "11.0/001-baz.sql", "drop table baz;");

    let manager = MigrationManager::new(MigrationLoader::new(dir.path()), "postgres").unwrap();
    (dir, manager)
}

fn short_names(manager: &MigrationManager, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| manager.short_name(p).unwrap().into_inner())
        .collect()
}

// ── Discovery ──────────────────────────────────────────────────────────

#[test]
fn test_pending_migrations_directory_then_file_order() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::default();

    let pending = manager.pending_migrations(&v("9.0"), &target).unwrap();
    assert_eq!(
        short_names(&manager, &pending),
        vec![
            "9.0/001-bar.sql",
            "9.0/002-baz.sql",
            "10.0/001-foo.sql",
            "10.0/002-foo.sql",
            "10.0/003-foo.sql",
            "11.0/001-baz.sql",
        ]
    );
}

#[test]
fn test_pending_migrations_exclude_applied() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::with_applied(vec!["9.0/001-bar.sql", "10.0/002-foo.sql"]);

    let pending = manager.pending_migrations(&v("9.0"), &target).unwrap();
    assert_eq!(
        short_names(&manager, &pending),
        vec![
            "9.0/002-baz.sql",
            "10.0/001-foo.sql",
            "10.0/003-foo.sql",
            "11.0/001-baz.sql",
        ]
    );
}

#[test]
fn test_pending_migrations_respect_baseline() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::default();

    let pending = manager.pending_migrations(&v("10.1"), &target).unwrap();
    assert_eq!(short_names(&manager, &pending), vec!["11.0/001-baz.sql"]);

    assert!(manager
        .pending_migrations(&v("11.2"), &target)
        .unwrap()
        .is_empty());
}

#[test]
fn test_pending_migrations_is_repeatable() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::with_applied(vec!["9.0/001-bar.sql"]);

    let first = manager.pending_migrations(&v("9.0"), &target).unwrap();
    let second = manager.pending_migrations(&v("9.0"), &target).unwrap();
    assert_eq!(first, second);
    assert!(target.calls().is_empty());
}

#[test]
fn test_unknown_platform_fails_before_discovery() {
    let (dir, _manager) = setup();
    let err = MigrationManager::new(MigrationLoader::new(dir.path()), "sqlite").unwrap_err();
    assert!(matches!(err, MigrateError::Config(_)));
}

#[test]
fn test_infer_baseline_uses_newest_fully_applied_directory() {
    let (_dir, manager) = setup();

    let target = RecordingTarget::with_applied(vec![
        "9.0/001-bar.sql",
        "9.0/002-baz.sql",
        "10.0/001-foo.sql",
        "10.0/002-foo.sql",
        "10.0/003-foo.sql",
    ]);
    assert_eq!(
        manager.infer_baseline_version(&target, &v("0.0")).unwrap(),
        v("10.0")
    );

    let target = RecordingTarget::with_applied(vec![
        "9.0/001-bar.sql",
        "9.0/002-baz.sql",
        "10.0/001-foo.sql",
    ]);
    assert_eq!(
        manager.infer_baseline_version(&target, &v("0.0")).unwrap(),
        v("9.0")
    );
}

#[test]
fn test_infer_baseline_falls_back_to_default() {
    let (_dir, manager) = setup();

    let empty = RecordingTarget::default();
    assert_eq!(
        manager.infer_baseline_version(&empty, &v("8.1")).unwrap(),
        v("8.1")
    );

    let partial = RecordingTarget::with_applied(vec!["9.0/001-bar.sql"]);
    assert_eq!(
        manager.infer_baseline_version(&partial, &v("8.1")).unwrap(),
        v("8.1")
    );
}

#[test]
fn test_status_classifies_each_migration() {
    let (_dir, manager) = setup();
    let target = RecordingTarget {
        applied: vec!["10.0/001-foo.sql"],
        failed: vec!["10.0/002-foo.sql"],
        ..RecordingTarget::default()
    };

    let status = manager.status(&v("10.0"), &target).unwrap();
    let states: Vec<_> = status
        .iter()
        .map(|s| (s.short_name.as_str(), s.state))
        .collect();
    assert_eq!(
        states,
        vec![
            ("10.0/001-foo.sql", MigrationState::Applied),
            ("10.0/002-foo.sql", MigrationState::Failed),
            ("10.0/003-foo.sql", MigrationState::Pending),
            ("11.0/001-baz.sql", MigrationState::Pending),
        ]
    );

    let json = serde_json::to_value(&status[1]).unwrap();
    assert_eq!(json["short_name"], "10.0/002-foo.sql");
    assert_eq!(json["state"], "failed");
}

// ── Short names ────────────────────────────────────────────────────────

#[test]
fn test_short_name_strips_exact_root() {
    let (_dir, manager) = setup();
    let path = manager.family_root().join("10.0").join("001-foo.sql");
    assert_eq!(manager.short_name(&path).unwrap(), "10.0/001-foo.sql");
}

#[test]
fn test_short_name_rejects_sibling_prefix() {
    let (_dir, manager) = setup();
    let root = manager.family_root().to_string_lossy().into_owned();
    let sibling = PathBuf::from(format!("{root}extra/10.0/001-foo.sql"));
    assert!(matches!(
        manager.short_name(&sibling),
        Err(MigrateError::OutsideRoot { .. })
    ));
}

#[test]
fn test_resolve_short_name() {
    let (_dir, manager) = setup();
    let path = manager.resolve("10.0/002-foo.sql").unwrap();
    assert_eq!(manager.short_name(&path).unwrap(), "10.0/002-foo.sql");

    assert!(matches!(
        manager.resolve("10.0/999-missing.sql"),
        Err(MigrateError::UnknownMigration { .. })
    ));
    assert!(matches!(
        manager.resolve("../pgsql/10.0/001-foo.sql"),
        Err(MigrateError::UnknownMigration { .. })
    ));
}

// ── Application ────────────────────────────────────────────────────────

#[test]
fn test_apply_one_event_and_execute_sequence() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::default();
    let path = manager.resolve("10.0/001-foo.sql").unwrap();

    let output = manager.apply_one(&path, &target).unwrap();

    assert_eq!(
        target.calls(),
        vec![
            "event 10.0/001-foo.sql start",
            "event 10.0/001-foo.sql chunk[0]",
            "execute create table foo (id integer)",
            "event 10.0/001-foo.sql chunk[1]",
            "execute insert into foo values (1)",
            "event 10.0/001-foo.sql success",
            "consolidate 10.0/001-foo.sql",
        ]
    );
    assert_eq!(target.count("event"), 4);
    assert_eq!(target.count("execute"), 2);
    assert_eq!(target.count("consolidate"), 1);
    assert_eq!(
        output,
        "log start;\n\
         log chunk[0];\n\
         execute create table foo (id integer);\n\
         log chunk[1];\n\
         execute insert into foo values (1);\n\
         log success;\n\
         cleanup 10.0/001-foo.sql;\n"
    );
}

#[test]
fn test_apply_one_keeps_literal_semicolons() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::default();
    let path = manager.resolve("10.0/003-foo.sql").unwrap();

    manager.apply_one(&path, &target).unwrap();
    assert_eq!(target.count("execute"), 1);
    assert!(target
        .calls()
        .contains(&"execute insert into foo values (2, 'it''s; ok')".to_string()));
}

#[test]
fn test_apply_one_failure_stops_before_success() {
    let (_dir, manager) = setup();
    let target = RecordingTarget {
        fail_on: Some("insert into foo values (1)"),
        ..RecordingTarget::default()
    };
    let path = manager.resolve("10.0/001-foo.sql").unwrap();

    let err = manager.apply_one(&path, &target).unwrap_err();
    match err {
        MigrateError::Statement {
            short_name, index, ..
        } => {
            assert_eq!(short_name, "10.0/001-foo.sql");
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        target.calls().last().map(String::as_str),
        Some("event 10.0/001-foo.sql chunk[1]")
    );
    assert_eq!(target.count("consolidate"), 0);
}

#[test]
fn test_apply_all_concatenates_in_order() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::default();
    let pending = manager.pending_migrations(&v("11.0"), &target).unwrap();
    let mut seen = Vec::new();

    let output = manager
        .apply_all_with_progress(&pending, &target, |p| seen.push(p.to_path_buf()))
        .unwrap();

    assert_eq!(seen, pending);
    assert_eq!(
        output,
        "log start;\nlog chunk[0];\nexecute drop table baz;\nlog success;\ncleanup 11.0/001-baz.sql;\n"
    );
}

#[test]
fn test_apply_all_aborts_on_first_failure() {
    let (_dir, manager) = setup();
    let target = RecordingTarget {
        fail_on: Some("create table baz (id integer)"),
        ..RecordingTarget::default()
    };
    let pending = manager.pending_migrations(&v("9.0"), &target).unwrap();

    assert!(manager.apply_all(&pending, &target).is_err());
    assert_eq!(target.count("consolidate"), 1);
    assert!(!target
        .calls()
        .iter()
        .any(|c| c.contains("10.0/") || c.contains("11.0/")));
}

#[test]
fn test_mark_applied_executes_nothing() {
    let (_dir, manager) = setup();
    let target = RecordingTarget::default();
    let path = manager.resolve("9.0/002-baz.sql").unwrap();

    manager.mark_applied(&path, &target).unwrap();
    assert_eq!(
        target.calls(),
        vec!["event 9.0/002-baz.sql success", "consolidate 9.0/002-baz.sql"]
    );
}

// ── Live and sql-only runs ─────────────────────────────────────────────

fn ledger(manager: &MigrationManager) -> Ledger {
    Ledger::new(manager.family(), v("11.0"))
}

fn table_exists(db: &DuckDbBackend, name: &str) -> bool {
    let sql = format!("SELECT table_name FROM information_schema.tables WHERE table_name = '{name}'");
    !db.query_text(&sql, 1).unwrap().is_empty()
}

#[test]
fn test_live_and_sql_only_render_identical_text() {
    let (_dir, manager) = setup();
    let db = DuckDbBackend::in_memory().unwrap();
    let live = LiveTarget::new(&db, ledger(&manager));
    let preview = SqlOnlyTarget::offline(ledger(&manager));

    let pending = manager.pending_migrations(&v("9.0"), &preview).unwrap();

    let preview_text = format!(
        "{}{}",
        preview.prepare_ledger().unwrap(),
        manager.apply_all(&pending, &preview).unwrap()
    );
    let live_text = format!(
        "{}{}",
        live.prepare_ledger().unwrap(),
        manager.apply_all(&pending, &live).unwrap()
    );
    assert_eq!(preview_text, live_text);
    assert!(preview_text.contains("insert into foo values (2, 'it''s; ok');\n"));
}

#[test]
fn test_live_run_is_idempotent() {
    let (_dir, manager) = setup();
    let db = DuckDbBackend::in_memory().unwrap();
    let live = LiveTarget::new(&db, ledger(&manager));
    live.prepare_ledger().unwrap();

    let pending = manager.pending_migrations(&v("9.0"), &live).unwrap();
    assert_eq!(pending.len(), 6);
    manager.apply_all(&pending, &live).unwrap();

    assert!(manager
        .pending_migrations(&v("9.0"), &live)
        .unwrap()
        .is_empty());
    assert_eq!(
        manager.infer_baseline_version(&live, &v("0.0")).unwrap(),
        v("11.0")
    );
    assert!(!table_exists(&db, "baz"));
    assert!(table_exists(&db, "foo"));
}

#[test]
fn test_sql_only_preview_with_trailing_comments_replays_as_executed() {
    let dir = TempDir::new().unwrap();
    touch(
        &dir.path().join("pgsql"),
        "1.0/001-commented.sql",
        "create table first_t (id integer) -- first table\n;\n\
         create table second_t (id integer); -- done\n",
    );
    let manager = MigrationManager::new(MigrationLoader::new(dir.path()), "duckdb").unwrap();
    let preview = SqlOnlyTarget::offline(ledger(&manager));
    let pending = manager.pending_migrations(&v("0.0"), &preview).unwrap();

    let text = manager.apply_all(&pending, &preview).unwrap();
    assert!(text.contains("create table first_t (id integer);\n"));
    assert!(!text.contains("-- first table"));

    // start, two chunk events, two statements, success, three consolidation statements
    let replayed = manager
        .loader
        .split_into_statements(&text, manager.family());
    assert_eq!(replayed.len(), 9);
    assert!(replayed.contains(&"create table first_t (id integer)".to_string()));
    assert!(replayed.contains(&"create table second_t (id integer)".to_string()));

    let db = DuckDbBackend::in_memory().unwrap();
    let live = LiveTarget::new(&db, ledger(&manager));
    live.prepare_ledger().unwrap();
    assert_eq!(manager.apply_all(&pending, &live).unwrap(), text);
    assert!(table_exists(&db, "first_t"));
    assert!(table_exists(&db, "second_t"));
}

#[test]
fn test_live_failure_leaves_migration_pending_and_failed() {
    let dir = TempDir::new().unwrap();
    let family = dir.path().join("pgsql");
    touch(
        &family,
        "1.0/001-broken.sql",
        "create table ok_table (id integer);\ninsert into missing_table values (1);",
    );
    let manager = MigrationManager::new(MigrationLoader::new(dir.path()), "duckdb").unwrap();
    let db = DuckDbBackend::in_memory().unwrap();
    let live = LiveTarget::new(&db, ledger(&manager));
    live.prepare_ledger().unwrap();

    let pending = manager.pending_migrations(&v("0.0"), &live).unwrap();
    let err = manager.apply_all(&pending, &live).unwrap_err();
    assert!(matches!(err, MigrateError::Statement { index: 1, .. }));

    assert_eq!(manager.pending_migrations(&v("0.0"), &live).unwrap(), pending);
    assert_eq!(
        manager.failed_migrations(&live).unwrap(),
        vec![ShortName::try_new("1.0/001-broken.sql").unwrap()]
    );
    let phases = db
        .query_text(
            "SELECT phase FROM tidemark_migration_events ORDER BY id",
            1,
        )
        .unwrap();
    let phases: Vec<_> = phases.into_iter().map(|r| r[0].clone().unwrap()).collect();
    assert_eq!(phases, vec!["start", "chunk[0]", "chunk[1]"]);
}

#[test]
fn test_live_mark_applied_then_skip() {
    let (_dir, manager) = setup();
    let db = DuckDbBackend::in_memory().unwrap();
    let live = LiveTarget::new(&db, ledger(&manager));
    live.prepare_ledger().unwrap();

    let path = manager.resolve("11.0/001-baz.sql").unwrap();
    manager.mark_applied(&path, &live).unwrap();

    let pending = manager.pending_migrations(&v("11.0"), &live).unwrap();
    assert!(pending.is_empty());
    assert!(manager.failed_migrations(&live).unwrap().is_empty());
}
