use toml::{Table, Value};

/// Folds imported documents underneath `main`.
///
/// Later imports override earlier ones and `main` overrides them all. The
/// `imports` key itself never survives a merge.
pub(super) fn merge_imports(imports: Vec<Value>, main: Value) -> Value {
    let merged = imports
        .into_iter()
        .chain(std::iter::once(main))
        .fold(Value::Table(Table::new()), overlay);

    match merged {
        Value::Table(mut table) => {
            table.remove("imports");
            Value::Table(table)
        }
        other => other,
    }
}

/// Deep merge where `top` wins. Tables merge key by key; every other value
/// in `top` replaces the one in `bottom` outright.
pub(super) fn overlay(bottom: Value, top: Value) -> Value {
    match (bottom, top) {
        (Value::Table(mut below), Value::Table(above)) => {
            for (key, value) in above {
                let combined = match below.remove(&key) {
                    Some(existing) => overlay(existing, value),
                    None => value,
                };
                below.insert(key, combined);
            }
            Value::Table(below)
        }
        (_, top) => top,
    }
}
