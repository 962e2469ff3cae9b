use quarry_std_core::{CODE_INVALID_ARGUMENT, Item, ModuleContext, Record};
use quarry_std_sqlite3::{MODULE_URI, SqliteConfig, SqliteModule};

fn context() -> ModuleContext<SqliteModule> {
    ModuleContext::new(SqliteModule::default())
}

fn call_item(ctx: &mut ModuleContext<SqliteModule>, name: &str, args: &[Item]) -> Item {
    ctx.call(name, args).unwrap().into_item().unwrap()
}

fn call_records(ctx: &mut ModuleContext<SqliteModule>, name: &str, args: &[Item]) -> Vec<Item> {
    ctx.call(name, args).unwrap().into_items().unwrap()
}

fn field(record: &Item, key: &str) -> Item {
    record.as_record().unwrap()[key].clone()
}

fn s(value: &str) -> Item {
    Item::from(value)
}

#[test]
fn test_state_created_on_first_call() {
    let mut ctx = context();
    assert!(!ctx.has_state());
    let token = call_item(&mut ctx, "connect", &[s("")]);
    assert!(ctx.has_state());
    assert_eq!(call_item(&mut ctx, "is-connected", &[token]), Item::Boolean(true));
}

#[test]
fn test_query_scenario_through_dispatch() {
    let mut ctx = context();
    let a = call_item(&mut ctx, "connect", &[s("")]);

    let created = call_records(&mut ctx, "execute-query", &[a.clone(), s("CREATE TABLE t(x INT)")]);
    assert_eq!(field(&created[0], "Affected Rows"), Item::Integer(0));

    let inserted = call_records(&mut ctx, "execute", &[a.clone(), s("INSERT INTO t VALUES (5)")]);
    assert_eq!(field(&inserted[0], "Affected Rows"), Item::Integer(1));

    let rows = call_records(&mut ctx, "execute-query", &[a.clone(), s("SELECT x FROM t")]);
    assert_eq!(rows.len(), 1);
    assert_eq!(field(&rows[0], "x"), Item::Integer(5));

    assert_eq!(
        call_item(&mut ctx, "execute-update", &[a, s("UPDATE t SET x = 6")]),
        Item::Integer(1)
    );
}

#[test]
fn test_prepared_scenario_through_dispatch() {
    let mut ctx = context();
    let a = call_item(&mut ctx, "connect", &[s("")]);
    let stmt = call_item(&mut ctx, "prepare-statement", &[a, s("SELECT ? AS v")]);

    let result = ctx.call("set-numeric", &[stmt.clone(), Item::Integer(1), Item::Integer(42)]);
    assert!(result.unwrap().into_items().unwrap().is_empty());

    let rows = call_records(&mut ctx, "execute-query-prepared", &[stmt.clone()]);
    assert_eq!(field(&rows[0], "v"), Item::Integer(42));

    ctx.call("set-string", &[stmt.clone(), s("1"), s("text")]).unwrap();
    let rows = call_records(&mut ctx, "execute-prepared", &[stmt.clone()]);
    assert_eq!(field(&rows[0], "v"), s("text"));

    ctx.call("set-null", &[stmt.clone(), Item::Integer(1)]).unwrap();
    let rows = call_records(&mut ctx, "execute-prepared", &[stmt.clone()]);
    assert_eq!(field(&rows[0], "v"), Item::Null);

    ctx.call("close-prepared", &[stmt.clone()]).unwrap();
    let err = ctx.call("execute-prepared", &[stmt]).unwrap_err();
    assert_eq!(err.namespace, MODULE_URI);
    assert_eq!(err.code, "INVALID-HANDLE");
}

#[test]
fn test_set_value_rejects_unbindable_kinds() {
    let mut ctx = context();
    let a = call_item(&mut ctx, "connect", &[s("")]);
    let stmt = call_item(&mut ctx, "prepare-statement", &[a, s("SELECT ?")]);
    let err = ctx
        .call("set-value", &[stmt.clone(), Item::Integer(1), Item::Binary(vec![1])])
        .unwrap_err();
    assert_eq!(err.code, "INVALID-VALUE");

    let err = ctx
        .call("set-boolean", &[stmt, Item::Integer(1), Item::Integer(1)])
        .unwrap_err();
    assert_eq!(err.code, "INVALID-VALUE");
}

#[test]
fn test_connect_options_through_dispatch() {
    let mut ctx = context();
    let mut options = Record::new();
    options.insert("frobnicate".to_string(), Item::Boolean(true));
    let err = ctx.call("connect", &[s(""), Item::Object(options)]).unwrap_err();
    assert_eq!(err.code, "UNKNOWN-OPTION");
    assert_eq!(ctx.state().connection_count(), 0);

    let err = ctx.call("connect", &[s(""), Item::Integer(3)]).unwrap_err();
    assert_eq!(err.code, CODE_INVALID_ARGUMENT);

    let token = call_item(&mut ctx, "connect", &[s(""), Item::Null]);
    assert!(token.as_str().is_some());
}

#[test]
fn test_close_alias_and_cascade() {
    let mut ctx = context();
    let a = call_item(&mut ctx, "connect", &[s("")]);
    let stmt = call_item(&mut ctx, "prepare-statement", &[a.clone(), s("SELECT 1")]);

    assert_eq!(call_item(&mut ctx, "close", &[a.clone()]), a);
    assert_eq!(call_item(&mut ctx, "is-connected", &[a.clone()]), Item::Boolean(false));
    let err = ctx.call("clear-params", &[stmt]).unwrap_err();
    assert_eq!(err.code, "INVALID-HANDLE");
    let err = ctx.call("commit", &[a]).unwrap_err();
    assert_eq!(err.code, "INVALID-HANDLE");
}

#[test]
fn test_arity_is_checked() {
    let mut ctx = context();
    let err = ctx.call("execute-query", &[s("")]).unwrap_err();
    assert_eq!(err.code, CODE_INVALID_ARGUMENT);
    let err = ctx.call("set-null", &[s("x"), Item::Integer(1), Item::Null]).unwrap_err();
    assert_eq!(err.code, CODE_INVALID_ARGUMENT);
}

#[test]
fn test_metadata_unavailable_when_disabled() {
    let config = SqliteConfig {
        metadata: false,
        ..SqliteConfig::default()
    };
    let mut ctx = ModuleContext::new(SqliteModule::new(config));
    let err = ctx.call("metadata", &[s("whatever")]).unwrap_err();
    assert_eq!(err.code, "UNAVAILABLE-METADATA");
}

#[test]
fn test_teardown_releases_session() {
    let mut ctx = context();
    call_item(&mut ctx, "connect", &[s("")]);
    ctx.teardown();
    assert!(!ctx.has_state());
    assert_eq!(ctx.state().connection_count(), 0);
}
