//! Relational trees converted to Trino SQL

mod common;

use common::*;
use relsql::builder::*;
use relsql::operators::{self, Operator};
use relsql::rel::{
    CorrelationId, DataType, FieldCollation, FieldName, JoinType, RelNode, SetOpKind,
};
use relsql::{convert, convert_json, convert_with, DialectType, Error, GeneratorConfig, RexNode};

fn icol() -> RexNode {
    field(0, DataType::Integer)
}

fn scol() -> RexNode {
    field(2, DataType::varchar())
}

fn project_icol(builder: RelBuilder) -> RelNode {
    builder.project(vec![(icol(), FieldName::unquoted("icol"))]).build()
}

fn assert_unsupported(rel: &RelNode) {
    match convert(rel, DialectType::Trino) {
        Err(Error::UnsupportedConstruct { .. }) => {}
        other => panic!("expected an unsupported construct, got {:?}", other),
    }
}

#[test]
fn test_project_and_filter() {
    let rel = project_icol(table_one().filter(lt(icol(), int(5))));
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nWHERE \"tableOne\".\"icol\" < 5"
    );
}

#[test]
fn test_array_element() {
    let item = call(
        operators::ITEM,
        vec![field(4, DataType::array(DataType::Integer)), int(10)],
        DataType::Integer,
    );
    let rel = table_one().project(vec![(item, FieldName::Derived)]).build();
    assert_eq!(
        trino(&rel),
        "SELECT element_at(\"tableOne\".\"acol\", 10)\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_distinct_is_group_by() {
    let rel = table_one()
        .project(vec![(icol(), FieldName::unquoted("icol"))])
        .distinct()
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nGROUP BY \"tableOne\".\"icol\""
    );
}

#[test]
fn test_cast_to_float_is_real() {
    let rel = table_one()
        .project(vec![(cast(field(1, DataType::Double), DataType::Float), FieldName::unquoted("d"))])
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT CAST(\"tableOne\".\"dcol\" AS REAL) AS \"D\"\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_binary_columns_cast_to_varbinary() {
    let rel = table_three()
        .project(vec![(
            cast(field(0, DataType::Binary { length: Some(8) }), DataType::Binary { length: Some(8) }),
            FieldName::Derived,
        )])
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT CAST(\"tableThree\".\"binaryfield\" AS VARBINARY)\nFROM \"tableThree\" AS \"tableThree\""
    );
}

#[test]
fn test_count_distinct() {
    let rel = table_one()
        .project(vec![
            (scol(), FieldName::unquoted("scol")),
            (icol(), FieldName::unquoted("icol")),
        ])
        .aggregate(
            vec![0],
            vec![agg(operators::COUNT, vec![1], true, FieldName::Derived, DataType::BigInt)],
        )
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"scol\" AS \"SCOL\", COUNT(DISTINCT \"tableOne\".\"icol\")\nFROM \"tableOne\" AS \"tableOne\"\nGROUP BY \"tableOne\".\"scol\""
    );
}

#[test]
fn test_count_star() {
    let rel = table_one()
        .aggregate(vec![], vec![agg(operators::COUNT, vec![], false, FieldName::unquoted("n"), DataType::BigInt)])
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT COUNT(*) AS \"N\"\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_truncate_to_scale() {
    let truncate = call(
        Operator::named_function("TRUNCATE"),
        vec![field(1, DataType::Double), int(2)],
        DataType::Double,
    );
    let rel = table_one().project(vec![(truncate, FieldName::Derived)]).build();
    assert_eq!(
        trino(&rel),
        "SELECT TRUNCATE(\"tableOne\".\"dcol\" * POWER(10, 2)) / POWER(10, 2)\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_map_value_struct_access() {
    let map_type = TABLE_FOUR.fields[2].data_type.clone();
    let item = call(
        operators::ITEM,
        vec![field(2, map_type), field(1, DataType::varchar())],
        STRUCT.clone(),
    );
    let rel = table_four()
        .project(vec![(field_access(item, "IFIELD"), FieldName::unquoted("mapStructAccess"))])
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT element_at(\"tableFour\".\"mcol\", \"tableFour\".\"scol\").\"IFIELD\" AS \"MAPSTRUCTACCESS\"\nFROM \"tableFour\" AS \"tableFour\""
    );
}

#[test]
fn test_equality_with_literal_of_other_family() {
    let rel = project_icol(table_one().filter(eq(scol(), int(0))));
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nWHERE CAST(\"tableOne\".\"scol\" AS INTEGER) = 0"
    );

    let rel = project_icol(table_one().filter(eq(scol(), boolean(true))));
    assert!(trino(&rel).ends_with("WHERE CAST(\"tableOne\".\"scol\" AS BOOLEAN) = TRUE"));

    let rel = project_icol(table_one().filter(ne(scol(), int(0))));
    assert!(trino(&rel).ends_with("WHERE CAST(\"tableOne\".\"scol\" AS INTEGER) <> 0"));
}

#[test]
fn test_case_with_null_branch() {
    let case = call(
        operators::CASE,
        vec![eq(icol(), int(0)), scol(), literal_null(DataType::varchar())],
        DataType::varchar(),
    );
    let rel = table_one().project(vec![(case, FieldName::unquoted("c"))]).build();
    assert_eq!(
        trino(&rel),
        "SELECT CASE WHEN \"tableOne\".\"icol\" = 0 THEN CAST(\"tableOne\".\"scol\" AS VARCHAR) ELSE NULL END AS \"C\"\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_substring() {
    let from = call(operators::SUBSTRING, vec![scol(), int(1)], DataType::varchar());
    let rel = table_one().project(vec![(from, FieldName::Derived)]).build();
    assert_eq!(
        trino(&rel),
        "SELECT \"SUBSTR\"(\"tableOne\".\"scol\", 1)\nFROM \"tableOne\" AS \"tableOne\""
    );

    let from_for = call(operators::SUBSTRING, vec![scol(), icol(), int(3)], DataType::varchar());
    let rel = table_one().project(vec![(from_for, FieldName::Derived)]).build();
    assert_eq!(
        trino(&rel),
        "SELECT \"SUBSTR\"(\"tableOne\".\"scol\", \"tableOne\".\"icol\", 3)\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_truncate_without_scale() {
    let truncate = call(
        Operator::named_function("TRUNCATE"),
        vec![field(1, DataType::Double)],
        DataType::Double,
    );
    let rel = table_one().project(vec![(truncate, FieldName::Derived)]).build();
    assert_eq!(
        trino(&rel),
        "SELECT TRUNCATE(\"tableOne\".\"dcol\")\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_random() {
    let random = call(Operator::named_function("RAND"), vec![], DataType::Double);
    let rel = table_one()
        .project(vec![
            (icol(), FieldName::unquoted("icol")),
            (random, FieldName::Derived),
        ])
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\", \"RANDOM\"()\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_random_integer() {
    let random = call(Operator::named_function("RAND_INTEGER"), vec![icol()], DataType::Integer);
    let rel = project_icol(table_one().filter(gt(random, int(10))));
    assert!(trino(&rel).ends_with("WHERE \"RANDOM\"(\"tableOne\".\"icol\") > 10"));
}

#[test]
fn test_current_timestamp_uses_configured_precision() {
    let now = call(operators::CURRENT_TIMESTAMP, vec![], DataType::Timestamp { precision: None });
    let rel = table_one().project(vec![(now, FieldName::Derived)]).build();
    let config = GeneratorConfig {
        current_timestamp_precision: 6,
        ..Default::default()
    };
    assert_eq!(
        convert_with(&rel, DialectType::Trino, config).unwrap(),
        "SELECT CAST(CURRENT_TIMESTAMP AS TIMESTAMP(6)) AS \"CURRENT_TIMESTAMP\"\nFROM \"tableOne\" AS \"tableOne\""
    );
}

#[test]
fn test_union() {
    let right = table_two()
        .project(vec![(field(0, DataType::Integer), FieldName::unquoted("ifield"))])
        .build();
    let rel = table_one()
        .project(vec![(icol(), FieldName::unquoted("icol"))])
        .union(false, right)
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nUNION\nSELECT \"tableTwo\".\"ifield\" AS \"IFIELD\"\nFROM \"tableTwo\" AS \"tableTwo\""
    );
}

#[test]
fn test_intersect_all_and_except() {
    let intersect = table_one()
        .set_op(SetOpKind::Intersect, true, table_one().build())
        .build();
    assert_eq!(
        trino(&intersect),
        "SELECT *\nFROM \"tableOne\" AS \"tableOne\"\nINTERSECT ALL\nSELECT *\nFROM \"tableOne\" AS \"tableOne\""
    );
    let except = table_one()
        .set_op(SetOpKind::Except, false, table_one().build())
        .build();
    assert!(trino(&except).contains("\nEXCEPT\n"));
}

#[test]
fn test_joins() {
    let cases = [
        (JoinType::Inner, "INNER JOIN"),
        (JoinType::Left, "LEFT JOIN"),
        (JoinType::Right, "RIGHT JOIN"),
        (JoinType::Full, "FULL JOIN"),
    ];
    for (join_type, keyword) in cases {
        let rel = table_one()
            .join(table_two().build(), join_type, eq(icol(), field(5, DataType::Integer)))
            .project(vec![
                (icol(), FieldName::unquoted("icol")),
                (field(7, DataType::varchar()), FieldName::unquoted("sfield")),
            ])
            .build();
        assert_eq!(
            trino(&rel),
            format!(
                "SELECT \"tableOne\".\"icol\" AS \"ICOL\", \"tableTwo\".\"sfield\" AS \"SFIELD\"\nFROM \"tableOne\" AS \"tableOne\"\n{} \"tableTwo\" AS \"tableTwo\" ON \"tableOne\".\"icol\" = \"tableTwo\".\"ifield\"",
                keyword
            )
        );
    }
}

#[test]
fn test_inner_join_on_true_is_cross() {
    let rel = project_icol(table_one().join(table_two().build(), JoinType::Inner, boolean(true)));
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nCROSS JOIN \"tableTwo\" AS \"tableTwo\""
    );
}

#[test]
fn test_join_without_projection_lists_columns() {
    let rel = RelBuilder::scan("a", vec![relsql::rel::Field::new("x", DataType::Integer)])
        .join(
            RelBuilder::scan("b", vec![relsql::rel::Field::new("y", DataType::Integer)]).build(),
            JoinType::Left,
            eq(field(0, DataType::Integer), field(1, DataType::Integer)),
        )
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT \"a\".\"x\" AS \"x\", \"b\".\"y\" AS \"y\"\nFROM \"a\" AS \"a\"\nLEFT JOIN \"b\" AS \"b\" ON \"a\".\"x\" = \"b\".\"y\""
    );
}

#[test]
fn test_sort_and_limit_after_projection() {
    let rel = table_one()
        .project(vec![
            (icol(), FieldName::unquoted("icol")),
            (scol(), FieldName::unquoted("scol")),
        ])
        .sort(vec![FieldCollation::asc(1)])
        .limit(None, Some(10))
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\", \"tableOne\".\"scol\" AS \"SCOL\"\nFROM \"tableOne\" AS \"tableOne\"\nORDER BY \"tableOne\".\"scol\"\nLIMIT 10"
    );
}

#[test]
fn test_exists() {
    let sub = table_two()
        .filter(gt(field(1, DataType::Double), decimal("32.00")))
        .project(vec![(field(0, DataType::Integer), FieldName::unquoted("ifield"))])
        .build();
    let rel = project_icol(table_one().filter(exists(sub)));
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nLEFT JOIN (SELECT MIN(TRUE) AS \"$f0\"\nFROM \"tableTwo\" AS \"tableTwo\"\nWHERE \"tableTwo\".\"dfield\" > 32.00) AS \"t1\" ON TRUE\nWHERE \"t1\".\"$f0\" IS NOT NULL"
    );
}

#[test]
fn test_not_exists() {
    let rel = project_icol(table_one().filter(not(exists(table_two().build()))));
    assert!(trino(&rel).ends_with("WHERE NOT \"t1\".\"$f0\" IS NOT NULL"));
}

#[test]
fn test_exists_keeps_other_conjuncts() {
    let condition = and(vec![lt(icol(), int(5)), exists(table_two().build())]);
    let rel = project_icol(table_one().filter(condition));
    assert!(trino(&rel).ends_with("WHERE \"tableOne\".\"icol\" < 5 AND \"t1\".\"$f0\" IS NOT NULL"));
}

#[test]
fn test_correlated_exists() {
    let id = CorrelationId(0);
    let cor = correl(id, &TABLE_ONE);
    let sub = table_two()
        .filter(and(vec![
            eq(field(0, DataType::Integer), field_access(cor, "icol")),
            gt(field(1, DataType::Double), decimal("1.5")),
        ]))
        .project(vec![(field(0, DataType::Integer), FieldName::Derived)])
        .build();
    let rel = project_icol(table_one().filter(correlated_exists(sub, id)));
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nLEFT JOIN (SELECT \"tableTwo\".\"ifield\" AS \"$f0\", MIN(TRUE) AS \"$f1\"\nFROM \"tableTwo\" AS \"tableTwo\"\nWHERE \"tableTwo\".\"dfield\" > 1.5\nGROUP BY \"tableTwo\".\"ifield\") AS \"t1\" ON \"tableOne\".\"icol\" = \"t1\".\"$f0\"\nWHERE \"t1\".\"$f1\" IS NOT NULL"
    );
}

#[test]
fn test_in_subquery() {
    let sub = table_two()
        .project(vec![(field(0, DataType::Integer), FieldName::unquoted("ifield"))])
        .build();
    let rel = project_icol(table_one().filter(in_subquery(vec![icol()], sub)));
    assert_eq!(
        trino(&rel),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\"\nFROM \"tableOne\" AS \"tableOne\"\nINNER JOIN (SELECT \"tableTwo\".\"ifield\" AS \"IFIELD\"\nFROM \"tableTwo\" AS \"tableTwo\"\nGROUP BY \"tableTwo\".\"ifield\") AS \"t1\" ON \"tableOne\".\"icol\" = \"t1\".\"IFIELD\""
    );
}

#[test]
fn test_scalar_subquery() {
    let max = table_two()
        .aggregate(vec![], vec![agg(operators::MAX, vec![0], false, FieldName::Derived, DataType::Integer)])
        .build();
    let rel = project_icol(table_one().filter(gt(icol(), scalar_subquery(max))));
    assert!(trino(&rel).ends_with(
        "WHERE \"tableOne\".\"icol\" > (SELECT MAX(\"tableTwo\".\"ifield\")\nFROM \"tableTwo\" AS \"tableTwo\")"
    ));
}

#[test]
fn test_lateral_unnest() {
    let id = CorrelationId(0);
    let elements = field_access(correl(id, &TABLE_ONE), "acol");
    let right = RelBuilder::one_row()
        .project(vec![(elements, FieldName::quoted("acol"))])
        .uncollect(false)
        .project(vec![(field(0, DataType::Integer), FieldName::unquoted("acol_elem"))])
        .build();
    let rel = table_one()
        .correlate(right, id, JoinType::Inner)
        .project(vec![
            (icol(), FieldName::unquoted("icol")),
            (field(5, DataType::Integer), FieldName::unquoted("acol_elem")),
        ])
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT \"$cor0\".\"icol\" AS \"ICOL\", \"t1\".\"ACOL_ELEM\" AS \"ACOL_ELEM\"\nFROM \"tableOne\" AS \"$cor0\"\nCROSS JOIN LATERAL (SELECT \"t0\".\"acol\" AS \"ACOL_ELEM\"\nFROM UNNEST(\"$cor0\".\"acol\") AS \"t0\" (\"acol\")) AS \"t1\""
    );
}

#[test]
fn test_unnest_of_constant_array() {
    let array = call(
        operators::ARRAY_VALUE_CONSTRUCTOR,
        vec![int(1), int(2)],
        DataType::array(DataType::Integer),
    );
    let rel = RelBuilder::one_row()
        .project(vec![(array, FieldName::Derived)])
        .uncollect(true)
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT *\nFROM UNNEST(ARRAY[1, 2]) WITH ORDINALITY AS \"t0\" (\"EXPR$0\", \"ORDINALITY\")"
    );
}

#[test]
fn test_chained_lateral_views() {
    let first = CorrelationId(0);
    let second = CorrelationId(1);
    let plus_one = RelBuilder::one_row()
        .project(vec![(
            arithmetic(operators::PLUS, field_access(correl(first, &TABLE_ONE), "icol"), int(1)),
            FieldName::unquoted("i_plusOne"),
        )])
        .build();
    let left = table_one().correlate(plus_one, first, JoinType::Inner);
    let scope = left.row_type();
    let plus_ten = RelBuilder::one_row()
        .project(vec![(
            arithmetic(operators::PLUS, field_access(correl(second, &scope), "dcol"), int(10)),
            FieldName::unquoted("d_plusTen"),
        )])
        .build();
    let rel = left
        .correlate(plus_ten, second, JoinType::Inner)
        .project(vec![
            (icol(), FieldName::unquoted("icol")),
            (field(5, DataType::Integer), FieldName::unquoted("i_plusOne")),
            (field(6, DataType::Double), FieldName::unquoted("d_plusTen")),
        ])
        .build();
    // Lateral views chain as joins of one FROM clause, so the second view reads
    // the first table through "$cor0" rather than a nested "$cor1" block.
    assert_eq!(
        trino(&rel),
        "SELECT \"$cor0\".\"icol\" AS \"ICOL\", \"t0\".\"I_PLUSONE\" AS \"I_PLUSONE\", \"t1\".\"D_PLUSTEN\" AS \"D_PLUSTEN\"\n\
         FROM \"tableOne\" AS \"$cor0\"\n\
         CROSS JOIN LATERAL (SELECT \"$cor0\".\"icol\" + 1 AS \"I_PLUSONE\"\n\
         FROM (VALUES  (0)) AS \"t\" (\"ZERO\")) AS \"t0\"\n\
         CROSS JOIN LATERAL (SELECT \"$cor0\".\"dcol\" + 10 AS \"D_PLUSTEN\"\n\
         FROM (VALUES  (0)) AS \"t\" (\"ZERO\")) AS \"t1\""
    );
}

#[test]
fn test_constant_selections() {
    let cases = [
        (date("2017-10-21"), "DATE '2017-10-21'"),
        (time("13:45:21.011"), "TIME '13:45:21.011'"),
        (
            call(
                operators::ARRAY_VALUE_CONSTRUCTOR,
                vec![int(1), int(2), int(3)],
                DataType::array(DataType::Integer),
            ),
            "ARRAY[1, 2, 3]",
        ),
    ];
    for (value, printed) in cases {
        let rel = RelBuilder::one_row().project(vec![(value, FieldName::Derived)]).build();
        assert_eq!(
            trino(&rel),
            format!("SELECT {}\nFROM (VALUES  (0)) AS \"t\" (\"ZERO\")", printed)
        );
    }
}

#[test]
fn test_values() {
    let rel = RelBuilder::one_row()
        .project(vec![(int(1), FieldName::unquoted("one"))])
        .build();
    assert_eq!(
        trino(&rel),
        "SELECT 1 AS \"ONE\"\nFROM (VALUES  (0)) AS \"t\" (\"ZERO\")"
    );
}

#[test]
fn test_conversion_is_repeatable() {
    let rel = project_icol(table_one().filter(exists(table_two().build())));
    assert_eq!(trino(&rel), trino(&rel));

    let json = rel.to_json().unwrap();
    assert_eq!(convert_json(&json, DialectType::Trino).unwrap(), trino(&rel));
}

#[test]
fn test_compact_output() {
    let rel = project_icol(table_one().filter(lt(icol(), int(5))));
    let config = GeneratorConfig {
        pretty: false,
        ..Default::default()
    };
    assert_eq!(
        convert_with(&rel, DialectType::Trino, config).unwrap(),
        "SELECT \"tableOne\".\"icol\" AS \"ICOL\" FROM \"tableOne\" AS \"tableOne\" WHERE \"tableOne\".\"icol\" < 5"
    );
}

#[test]
fn test_hive_is_not_a_target() {
    let rel = table_one().build();
    assert!(matches!(
        convert(&rel, DialectType::Hive),
        Err(Error::UnsupportedConstruct { .. })
    ));
}

#[test]
fn test_malformed_json_is_a_deserialize_error() {
    assert!(matches!(
        convert_json("{\"rel\": \"table_scan\"}", DialectType::Trino),
        Err(Error::Deserialize(_))
    ));
}

#[test]
fn test_unsupported_constructs() {
    let sub = table_two()
        .project(vec![(field(0, DataType::Integer), FieldName::Derived)])
        .build();

    // NOT IN
    assert_unsupported(&project_icol(
        table_one().filter(not(in_subquery(vec![icol()], sub.clone()))),
    ));

    // EXISTS below OR
    let or = call(
        operators::OR,
        vec![lt(icol(), int(5)), exists(sub.clone())],
        DataType::Boolean,
    );
    assert_unsupported(&project_icol(table_one().filter(or)));

    // EXISTS in a select list
    assert_unsupported(
        &table_one()
            .project(vec![(exists(sub.clone()), FieldName::Derived)])
            .build(),
    );

    // correlated comparison other than equality
    let id = CorrelationId(0);
    let correlated = table_two()
        .filter(gt(field(0, DataType::Integer), field_access(correl(id, &TABLE_ONE), "icol")))
        .build();
    assert_unsupported(&project_icol(
        table_one().filter(correlated_exists(correlated, id)),
    ));

    // correlated scalar subquery
    let max = table_two()
        .filter(eq(field(0, DataType::Integer), field_access(correl(id, &TABLE_ONE), "icol")))
        .aggregate(vec![], vec![agg(operators::MAX, vec![0], false, FieldName::Derived, DataType::Integer)])
        .build();
    let mut correlated_scalar = scalar_subquery(max);
    if let RexNode::SubQuery(sub) = &mut correlated_scalar {
        sub.correlation = Some(id);
    }
    assert_unsupported(&project_icol(table_one().filter(gt(icol(), correlated_scalar))));

    // right lateral join
    assert_unsupported(&table_one().correlate(sub, id, JoinType::Right).build());

    // unnest of a table column without a correlate
    assert_unsupported(
        &table_one()
            .project(vec![(field(4, DataType::array(DataType::Integer)), FieldName::Derived)])
            .uncollect(false)
            .build(),
    );

    // date arithmetic has no Trino spelling here
    let plus = call(
        operators::DATETIME_PLUS,
        vec![field(3, DataType::Timestamp { precision: None }), int(1)],
        DataType::Timestamp { precision: None },
    );
    assert_unsupported(&table_one().project(vec![(plus, FieldName::Derived)]).build());
}
