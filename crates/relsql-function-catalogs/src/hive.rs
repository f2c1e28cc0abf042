//! Hive built-in functions.
//!
//! Names are registered in the case the Hive function registry reports them.
//! Entries that map onto a standard operator reuse its definition; the rest are
//! plain built-ins printed under their canonical name.

use crate::{CatalogSink, FunctionBinding, FunctionEntry, FunctionNameCase, FunctionSignature};

const CATALOG: &str = "hive";

const fn operator(name: &'static str, target: &'static str, signature: FunctionSignature) -> FunctionEntry {
    FunctionEntry {
        name,
        binding: FunctionBinding::StandardOperator(target),
        signature,
    }
}

const fn builtin(name: &'static str, canonical: &'static str, signature: FunctionSignature) -> FunctionEntry {
    FunctionEntry {
        name,
        binding: FunctionBinding::Builtin(canonical),
        signature,
    }
}

const ENTRIES: &[FunctionEntry] = &[
    // string
    operator("substr", "SUBSTRING", FunctionSignature::range(2, 3)),
    operator("substring", "SUBSTRING", FunctionSignature::range(2, 3)),
    operator("lower", "LOWER", FunctionSignature::exact(1)),
    operator("lcase", "LOWER", FunctionSignature::exact(1)),
    operator("upper", "UPPER", FunctionSignature::exact(1)),
    operator("ucase", "UPPER", FunctionSignature::exact(1)),
    operator("length", "CHAR_LENGTH", FunctionSignature::exact(1)),
    builtin("concat", "CONCAT", FunctionSignature::variadic(1)),
    builtin("concat_ws", "CONCAT_WS", FunctionSignature::variadic(2)),
    builtin("instr", "INSTR", FunctionSignature::exact(2)),
    builtin("split", "SPLIT", FunctionSignature::exact(2)),
    builtin("regexp_extract", "REGEXP_EXTRACT", FunctionSignature::range(2, 3)),
    builtin("get_json_object", "GET_JSON_OBJECT", FunctionSignature::exact(2)),
    operator("rlike", "RLIKE", FunctionSignature::exact(2)),
    operator("regexp", "REGEXP", FunctionSignature::exact(2)),
    // math
    operator("abs", "ABS", FunctionSignature::exact(1)),
    operator("floor", "FLOOR", FunctionSignature::exact(1)),
    operator("ceil", "CEIL", FunctionSignature::exact(1)),
    operator("ceiling", "CEIL", FunctionSignature::exact(1)),
    operator("pow", "POWER", FunctionSignature::exact(2)),
    operator("power", "POWER", FunctionSignature::exact(2)),
    operator("pmod", "MOD", FunctionSignature::exact(2)),
    builtin("round", "ROUND", FunctionSignature::range(1, 2)),
    builtin("truncate", "TRUNCATE", FunctionSignature::range(1, 2)),
    builtin("rand", "RAND", FunctionSignature::range(0, 1)),
    builtin("rand_integer", "RAND_INTEGER", FunctionSignature::range(1, 2)),
    // conditional
    operator("coalesce", "COALESCE", FunctionSignature::variadic(1)),
    builtin("nvl", "NVL", FunctionSignature::exact(2)),
    builtin("if", "IF", FunctionSignature::exact(3)),
    // collections
    builtin("size", "SIZE", FunctionSignature::exact(1)),
    builtin("array_contains", "ARRAY_CONTAINS", FunctionSignature::exact(2)),
    builtin("map_keys", "MAP_KEYS", FunctionSignature::exact(1)),
    builtin("map_values", "MAP_VALUES", FunctionSignature::exact(1)),
    // date/time
    operator("current_date", "CURRENT_DATE", FunctionSignature::exact(0)),
    operator("current_timestamp", "CURRENT_TIMESTAMP", FunctionSignature::exact(0)),
    operator("current_user", "CURRENT_USER", FunctionSignature::exact(0)),
    builtin("to_date", "TO_DATE", FunctionSignature::exact(1)),
    builtin("to_date", "TO_DATE", FunctionSignature::exact(2)),
    builtin("date_format", "DATE_FORMAT", FunctionSignature::exact(2)),
    builtin("from_unixtime", "FROM_UNIXTIME", FunctionSignature::range(1, 2)),
    builtin("unix_timestamp", "UNIX_TIMESTAMP", FunctionSignature::range(0, 2)),
    builtin("datediff", "DATEDIFF", FunctionSignature::exact(2)),
    builtin("date_add", "DATE_ADD", FunctionSignature::exact(2)),
    builtin("date_sub", "DATE_SUB", FunctionSignature::exact(2)),
    // aggregates
    operator("count", "COUNT", FunctionSignature::variadic(0)),
    operator("sum", "SUM", FunctionSignature::exact(1)),
    operator("min", "MIN", FunctionSignature::exact(1)),
    operator("max", "MAX", FunctionSignature::exact(1)),
    operator("avg", "AVG", FunctionSignature::exact(1)),
    builtin("collect_list", "COLLECT_LIST", FunctionSignature::exact(1)),
    builtin("collect_set", "COLLECT_SET", FunctionSignature::exact(1)),
];

pub(crate) fn register<S: CatalogSink>(sink: &mut S) {
    sink.set_catalog_name_case(CATALOG, FunctionNameCase::Insensitive);
    for entry in ENTRIES {
        sink.register(CATALOG, *entry);
    }
}
