//! End-to-end formula behaviour through the public `Sheet` API.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tabula::{CellError, FunctionRegistry, Sheet, SheetConfig, SheetError, Value};

fn value(sheet: &Sheet, address: &str) -> Value {
    sheet.get_cell(address).unwrap().computed
}

#[test]
fn test_address_codec() {
    assert_eq!(tabula::encode_address(0, 0), "A1");
    assert_eq!(tabula::encode_address(0, 25), "Z1");
    assert_eq!(tabula::encode_address(0, 26), "AA1");
    assert_eq!(tabula::encode_address(9, 701), "ZZ10");
    assert_eq!(tabula::decode_address("AB12").unwrap(), (11, 27));
    assert!(tabula::decode_address("a1").is_err());
    assert!(tabula::decode_address("A0").is_err());
}

#[test]
fn test_dependent_updates_on_write() {
    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "5").unwrap();
    sheet.set_cell_text("B1", "=A1+3").unwrap();
    assert_eq!(value(&sheet, "B1"), Value::Number(8.0));

    sheet.set_cell_text("A1", "10").unwrap();
    assert_eq!(value(&sheet, "B1"), Value::Number(13.0));
}

#[test]
fn test_transitive_chain() {
    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "1").unwrap();
    sheet.set_cell_text("A2", "=A1*2").unwrap();
    sheet.set_cell_text("A3", "=A2*2").unwrap();
    sheet.set_cell_text("A4", "=SUM(A1:A3)").unwrap();
    assert_eq!(value(&sheet, "A4"), Value::Number(7.0));

    sheet.set_cell_text("A1", "2").unwrap();
    assert_eq!(value(&sheet, "A3"), Value::Number(8.0));
    assert_eq!(value(&sheet, "A4"), Value::Number(14.0));
}

#[test]
fn test_mutual_reference_is_circular() {
    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "=B1").unwrap();
    sheet.set_cell_text("B1", "=A1").unwrap();
    assert_eq!(value(&sheet, "A1"), Value::Error(CellError::Circular));
    assert_eq!(value(&sheet, "B1"), Value::Error(CellError::Circular));
    assert_eq!(sheet.display("A1").unwrap(), "#CIRCULAR!");
}

#[test]
fn test_range_sum_and_missing_reference() {
    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "1").unwrap();
    sheet.set_cell_text("A2", "2").unwrap();
    sheet.set_cell_text("A3", "3").unwrap();
    sheet.set_cell_text("B1", "=SUM(A1:A3)").unwrap();
    sheet.set_cell_text("B2", "=A1+Z99").unwrap();

    assert_eq!(value(&sheet, "B1"), Value::Number(6.0));
    assert_eq!(value(&sheet, "B2"), Value::Error(CellError::Ref));
    assert_eq!(sheet.display("B2").unwrap(), "#REF!");
}

#[test]
fn test_expression_faults_are_in_band() {
    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "=1/0").unwrap();
    sheet.set_cell_text("A2", "=A1+1").unwrap();
    sheet.set_cell_text("A3", "=2*(3+").unwrap();
    sheet.set_cell_text("A4", "=NOPE(1)").unwrap();

    assert_eq!(value(&sheet, "A1"), Value::Error(CellError::Error));
    assert_eq!(value(&sheet, "A2"), Value::Error(CellError::Error));
    assert_eq!(value(&sheet, "A3"), Value::Error(CellError::Error));
    assert_eq!(sheet.display("A4").unwrap(), "#ERROR: Unknown function NOPE");
}

#[test]
fn test_text_formulas() {
    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "Hello").unwrap();
    sheet.set_cell_text("A2", "  spaced  ").unwrap();
    sheet.set_cell_text("B1", "=A1+\" world\"").unwrap();
    sheet.set_cell_text("B2", "=TRIM(A2)").unwrap();
    sheet.set_cell_text("B3", "=UPPER(A1)").unwrap();
    sheet.set_cell_text("B4", "=LOWER(\"MiXeD\")").unwrap();

    assert_eq!(value(&sheet, "B1"), Value::Text("Hello world".into()));
    assert_eq!(value(&sheet, "B2"), Value::Text("spaced".into()));
    assert_eq!(value(&sheet, "B3"), Value::Text("HELLO".into()));
    assert_eq!(value(&sheet, "B4"), Value::Text("mixed".into()));
}

#[test]
fn test_aggregates_over_mixed_range() {
    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "4").unwrap();
    sheet.set_cell_text("A2", "label").unwrap();
    sheet.set_cell_text("A3", "8").unwrap();
    sheet.set_cell_text("B1", "=AVERAGE(A1:A4)").unwrap();
    sheet.set_cell_text("B2", "=COUNT(A1:A4)").unwrap();
    sheet.set_cell_text("B3", "=MAX(A1:A4, 10)").unwrap();
    sheet.set_cell_text("B4", "=MIN(C1:C3)").unwrap();

    assert_eq!(value(&sheet, "B1"), Value::Number(6.0));
    assert_eq!(value(&sheet, "B2"), Value::Number(2.0));
    assert_eq!(value(&sheet, "B3"), Value::Number(10.0));
    assert_eq!(value(&sheet, "B4"), Value::Null);
}

#[test]
fn test_registered_function_after_recalculation() {
    fn triple(args: &[Value]) -> Value {
        args.first()
            .and_then(Value::as_number)
            .map_or(Value::Null, |n| Value::Number(n * 3.0))
    }

    let mut sheet = Sheet::new();
    sheet.set_cell_text("A1", "=TRIPLE(2)").unwrap();
    assert!(matches!(
        value(&sheet, "A1"),
        Value::Error(CellError::UnknownFunction(_))
    ));

    sheet.functions_mut().register("triple", triple);
    sheet.recalculate_all();
    assert_eq!(value(&sheet, "A1"), Value::Number(6.0));
}

#[test]
fn test_empty_registry_knows_no_functions() {
    let sheet = Sheet::with_functions(SheetConfig::default(), FunctionRegistry::empty());
    let mut sheet = sheet.unwrap();
    sheet.set_cell_text("A1", "=SUM(1,2)").unwrap();
    assert_eq!(
        value(&sheet, "A1"),
        Value::Error(CellError::UnknownFunction("SUM".into()))
    );
}

#[test]
fn test_config_from_toml() {
    let config = SheetConfig::from_toml_str("rows = 10\ncolumns = 4\n").unwrap();
    let sheet = Sheet::with_config(config).unwrap();
    assert_eq!(sheet.row_height(9), Some(25));
    assert_eq!(sheet.row_height(10), None);
    assert_eq!(sheet.column_width(3), Some(100));

    let err = SheetConfig::from_toml_str("rows = 0").unwrap_err();
    assert!(matches!(err, SheetError::InvalidDimension(_)));
}

#[test]
fn test_invalid_address_is_an_error() {
    let mut sheet = Sheet::new();
    assert!(matches!(
        sheet.set_cell_text("1A", "x"),
        Err(SheetError::InvalidAddress(_))
    ));
    assert!(sheet.get_cell("").is_err());
    assert!(sheet.is_empty());
}

proptest! {
    #[test]
    fn prop_sum_matches_column(values in prop::collection::vec(-1000i32..1000, 1..20)) {
        let mut sheet = Sheet::new();
        for (i, v) in values.iter().enumerate() {
            sheet.set_cell_text(&format!("A{}", i + 1), &v.to_string()).unwrap();
        }
        sheet.set_cell_text("B1", &format!("=SUM(A1:A{})", values.len())).unwrap();

        let expected: i32 = values.iter().sum();
        prop_assert_eq!(value(&sheet, "B1"), Value::Number(expected as f64));
    }

    #[test]
    fn prop_rewrite_keeps_dependent_current(first in -500i32..500, second in -500i32..500) {
        let mut sheet = Sheet::new();
        sheet.set_cell_text("A1", &first.to_string()).unwrap();
        sheet.set_cell_text("B1", "=A1*2").unwrap();
        sheet.set_cell_text("C1", "=B1-A1").unwrap();
        sheet.set_cell_text("A1", &second.to_string()).unwrap();

        prop_assert_eq!(value(&sheet, "C1"), Value::Number(second as f64));
    }
}
