//! User-defined function classes available to catalog-driven views.
//!
//! These are registered under their implementation class name. Table
//! properties map view-scoped function names onto these classes.

use crate::{CatalogSink, FunctionBinding, FunctionEntry, FunctionNameCase, FunctionSignature};

const CATALOG: &str = "udfs";

const fn udf(
    class_name: &'static str,
    dependencies: &'static [&'static str],
    signature: FunctionSignature,
) -> FunctionEntry {
    FunctionEntry {
        name: class_name,
        binding: FunctionBinding::UserDefined {
            class_name,
            dependencies,
        },
        signature,
    }
}

const DATE_UDFS: &[&str] = &["ivy://org.relsql.udf:date-udfs:1.2.0"];
const STRING_UDFS: &[&str] = &["ivy://org.relsql.udf:string-udfs:0.4.1"];

const ENTRIES: &[FunctionEntry] = &[
    udf("org.relsql.udf.date.DateFormatToEpoch", DATE_UDFS, FunctionSignature::exact(3)),
    udf("org.relsql.udf.date.EpochToDateFormat", DATE_UDFS, FunctionSignature::exact(3)),
    udf("org.relsql.udf.string.UrnExtractor", STRING_UDFS, FunctionSignature::exact(1)),
    udf("org.relsql.udf.string.LessThanHundred", &[], FunctionSignature::exact(1)),
    udf("org.relsql.udf.math.FuncSquare", &[], FunctionSignature::exact(1)),
];

pub(crate) fn register<S: CatalogSink>(sink: &mut S) {
    sink.set_catalog_name_case(CATALOG, FunctionNameCase::Sensitive);
    for entry in ENTRIES {
        sink.register(CATALOG, *entry);
    }
}
