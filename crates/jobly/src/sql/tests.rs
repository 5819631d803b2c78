use super::*;
use crate::models::{COMPANY_FILTERS, JOB_FILTERS};
use crate::types::SqlValue;

fn debug_params(q: &Sql) -> Vec<String> {
    q.params_ref().iter().map(|p| format!("{p:?}")).collect()
}

// ==================== Sql builder ====================

#[test]
fn builds_placeholders_in_order() {
    let mut q = sql("SELECT * FROM users WHERE a = ");
    q.push_bind(1).push(" AND b = ").push_bind("x");

    assert_eq!(q.to_sql(), "SELECT * FROM users WHERE a = $1 AND b = $2");
    assert_eq!(q.params_ref().len(), 2);
}

#[test]
fn can_compose_fragments() {
    let mut w = Sql::empty();
    w.push(" WHERE id = ").push_bind(42);

    let mut q = sql("SELECT * FROM jobs");
    q.push_sql(w);

    assert_eq!(q.to_sql(), "SELECT * FROM jobs WHERE id = $1");
    assert_eq!(q.params_ref().len(), 1);
}

#[test]
fn push_where_skips_empty_fragment() {
    let mut q = sql("SELECT * FROM jobs");
    q.push_where(Sql::empty()).push(" ORDER BY id");
    assert_eq!(q.to_sql(), "SELECT * FROM jobs ORDER BY id");
}

#[test]
fn bind_does_not_render_placeholders() {
    let q = sql("DELETE FROM jobs WHERE id = $1").bind(7);
    assert_eq!(q.to_sql(), "DELETE FROM jobs WHERE id = $1");
    assert_eq!(q.param_count(), 1);
}

#[test]
fn empty_builder_is_empty() {
    assert!(Sql::empty().is_empty());
    assert!(sql("").is_empty());
    assert!(!sql("SELECT 1").is_empty());
}

// ==================== sql_for_partial_update ====================

const COMPANY_COLUMNS: ColumnMap =
    ColumnMap::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

#[test]
fn partial_update_maps_columns_and_numbers_placeholders() {
    let payload = UpdatePayload::new()
        .set("name", "NewCo")
        .set("description", "A company..")
        .set("numEmployees", 35);

    let update = sql_for_partial_update(&payload, &ColumnMap::new(&[("numEmployees", "num_employees")]))
        .unwrap();

    assert_eq!(
        update.assignments,
        [r#""name"=$1"#, r#""description"=$2"#, r#""num_employees"=$3"#]
    );
    assert_eq!(
        update.values,
        [
            SqlValue::from("NewCo"),
            SqlValue::from("A company.."),
            SqlValue::Int(35)
        ]
    );
    assert_eq!(update.set_cols(), r#""name"=$1, "description"=$2, "num_employees"=$3"#);
    assert_eq!(update.next_placeholder(), 4);
}

#[test]
fn partial_update_with_empty_map_is_identity() {
    let payload = UpdatePayload::new()
        .set("title", "New")
        .set("salary", 100)
        .set("equity", None::<f64>);

    let update = sql_for_partial_update(&payload, &ColumnMap::empty()).unwrap();

    assert_eq!(update.assignments.len(), payload.len());
    assert_eq!(update.assignments.len(), update.values.len());
    for (i, assignment) in update.assignments.iter().enumerate() {
        assert!(assignment.ends_with(&format!("=${}", i + 1)));
    }
    assert_eq!(update.values[2], SqlValue::Null);
}

#[test]
fn partial_update_keeps_unmapped_names_verbatim() {
    let payload = UpdatePayload::new()
        .set("name", "NewCo")
        .set("numEmployees", 100);

    // Only logoUrl is mapped; numEmployees passes through unchanged.
    let update =
        sql_for_partial_update(&payload, &ColumnMap::new(&[("logoUrl", "logo_url")])).unwrap();
    assert_eq!(update.set_cols(), r#""name"=$1, "numEmployees"=$2"#);

    let update = sql_for_partial_update(&payload, &COMPANY_COLUMNS).unwrap();
    assert_eq!(update.set_cols(), r#""name"=$1, "num_employees"=$2"#);
}

#[test]
fn partial_update_rejects_empty_payload() {
    let err = sql_for_partial_update(&UpdatePayload::new(), &COMPANY_COLUMNS).unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("No data"));
}

#[test]
fn partial_update_values_follow_replaced_keys() {
    let payload = UpdatePayload::new()
        .set("a", 1)
        .set("b", 2)
        .set("a", 3);
    let update = sql_for_partial_update(&payload, &ColumnMap::empty()).unwrap();
    assert_eq!(update.set_cols(), r#""a"=$1, "b"=$2"#);
    assert_eq!(update.values, [SqlValue::Int(3), SqlValue::Int(2)]);
}

#[test]
fn partial_update_composes_with_key_parameter() {
    let payload = UpdatePayload::new().set("title", "T9");
    let update = sql_for_partial_update(&payload, &ColumnMap::empty()).unwrap();

    let q = sql(format!(
        "UPDATE jobs SET {} WHERE id = ${}",
        update.set_cols(),
        update.next_placeholder()
    ))
    .bind(update.values[0].clone())
    .bind(7);

    assert_eq!(q.to_sql(), r#"UPDATE jobs SET "title"=$1 WHERE id = $2"#);
    assert_eq!(q.param_count(), 2);
}

// ==================== sql_for_variable_where ====================

#[test]
fn variable_where_company_scenario() {
    let filters = FilterPayload::new()
        .with("name", "NewCo")
        .with("minEmployees", 10)
        .with("maxEmployees", 100);

    let fragment = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap();

    assert_eq!(
        fragment.to_sql(),
        r#""name" ILIKE $1 AND "num_employees" >= $2 AND "num_employees" <= $3"#
    );
    assert_eq!(
        debug_params(&fragment),
        [r#"Text("%NewCo%")"#, "Int(10)", "Int(100)"]
    );
}

#[test]
fn variable_where_follows_input_order() {
    let filters = FilterPayload::new()
        .with("maxEmployees", 100)
        .with("name", "net");

    let fragment = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap();
    assert_eq!(
        fragment.to_sql(),
        r#""num_employees" <= $1 AND "name" ILIKE $2"#
    );
}

#[test]
fn variable_where_empty_or_missing_is_empty_string() {
    let empty = FilterPayload::new();
    assert_eq!(
        sql_for_variable_where(Some(&empty), &COMPANY_FILTERS)
            .unwrap()
            .to_sql(),
        ""
    );
    assert_eq!(
        sql_for_variable_where(None, &COMPANY_FILTERS).unwrap().to_sql(),
        ""
    );
}

#[test]
fn variable_where_rejects_unsupported_filter_wholesale() {
    let filters = FilterPayload::new()
        .with("name", "net")
        .with("unsupported", 1);

    let err = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("Unsupported filter"));
    assert!(err.to_string().contains("unsupported"));
}

#[test]
fn variable_where_tables_are_independent() {
    let filters = FilterPayload::new().with("title", "eng");
    assert!(sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).is_err());
    assert_eq!(
        sql_for_variable_where(Some(&filters), &JOB_FILTERS)
            .unwrap()
            .to_sql(),
        r#""title" ILIKE $1"#
    );
}

#[test]
fn variable_where_rejects_min_above_max() {
    let filters = FilterPayload::new()
        .with("minEmployees", 100)
        .with("maxEmployees", 10);
    let err = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("'minEmployees' must be less than or equal to 'maxEmployees'"));
}

#[test]
fn variable_where_parses_query_string_numbers() {
    let filters = FilterPayload::from_query_pairs([("minSalary", "15000")]);
    let fragment = sql_for_variable_where(Some(&filters), &JOB_FILTERS).unwrap();
    assert_eq!(fragment.to_sql(), r#""salary" >= $1"#);
    assert_eq!(debug_params(&fragment), ["Int(15000)"]);

    let bad = FilterPayload::from_query_pairs([("minSalary", "lots")]);
    assert!(
        sql_for_variable_where(Some(&bad), &JOB_FILTERS)
            .unwrap_err()
            .is_bad_request()
    );
}

#[test]
fn variable_where_rejects_integers_outside_column_range() {
    let filters = FilterPayload::new().with("minEmployees", 3_000_000_000_i64);
    let err = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("Invalid value for filter 'minEmployees'"));

    let filters = FilterPayload::from_query_pairs([("minSalary", "-9999999999")]);
    let err = sql_for_variable_where(Some(&filters), &JOB_FILTERS).unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("Invalid value for filter 'minSalary'"));

    let filters = FilterPayload::new().with("maxEmployees", i64::from(i32::MAX));
    let fragment = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap();
    assert_eq!(debug_params(&fragment), [format!("Int({})", i32::MAX)]);
}

#[test]
fn variable_where_has_equity_true_requires_positive_equity() {
    let filters = FilterPayload::new()
        .with("minSalary", 15000)
        .with("hasEquity", true);
    let fragment = sql_for_variable_where(Some(&filters), &JOB_FILTERS).unwrap();
    assert_eq!(fragment.to_sql(), r#""salary" >= $1 AND "equity" > 0"#);
    assert_eq!(fragment.param_count(), 1);
}

#[test]
fn variable_where_has_equity_false_adds_no_condition() {
    let filters = FilterPayload::new()
        .with("title", "t")
        .with("hasEquity", false)
        .with("minSalary", 10001);
    let fragment = sql_for_variable_where(Some(&filters), &JOB_FILTERS).unwrap();
    assert_eq!(fragment.to_sql(), r#""title" ILIKE $1 AND "salary" >= $2"#);

    let only_false = FilterPayload::from_query_pairs([("hasEquity", "false")]);
    assert!(
        sql_for_variable_where(Some(&only_false), &JOB_FILTERS)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn variable_where_escapes_like_wildcards() {
    let filters = FilterPayload::new().with("name", "100%_real");
    let fragment = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap();
    assert_eq!(debug_params(&fragment), [r#"Text("%100\\%\\_real%")"#]);
}

#[test]
fn variable_where_values_never_reach_sql_text() {
    let filters = FilterPayload::new().with("name", "x'; DROP TABLE companies; --");
    let fragment = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap();
    assert_eq!(fragment.to_sql(), r#""name" ILIKE $1"#);
}

#[test]
fn variable_where_numbering_continues_after_prefix() {
    let filters = FilterPayload::new().with("minEmployees", 2);
    let mut q = sql("SELECT handle FROM companies WHERE handle <> ");
    q.push_bind("c1");
    q.push(" AND ");
    q.push_sql(sql_for_variable_where(Some(&filters), &COMPANY_FILTERS).unwrap());
    assert_eq!(
        q.to_sql(),
        r#"SELECT handle FROM companies WHERE handle <> $1 AND "num_employees" >= $2"#
    );
}
