//! End-to-end tests over the full storage type catalogue: every storage type
//! round-trips its representable values, NA included, through a constructed
//! column.

use colbuf_codecs::datetime::{self, DateTimeFields};
use colbuf_codecs::element::FixedElement;
use colbuf_codecs::{Column, ObjectHandle};
use colbuf_common::error::ErrorKind;
use colbuf_types::na::{NA_F32, NA_F64, NA_I8, NA_I16, NA_I32, NA_I64, is_na_f32, is_na_f64};
use colbuf_types::{DecimalMetadata, LogicalType, StorageType};

fn check_fixed<T: FixedElement>(storage_type: StorageType, values: &[T], na_rows: &[usize]) {
    let column = Column::from_elements(storage_type, values).expect("column construction");
    assert_eq!(column.row_count(), values.len());
    for (i, value) in values.iter().enumerate() {
        // Bit-exact element comparison; IEEE equality would miss the float
        // NA sentinel, which is itself a NaN.
        let expected = colbuf_codecs::element::elements_to_bytes(std::slice::from_ref(value));
        assert_eq!(
            column.element(i).unwrap(),
            &expected[..],
            "{storage_type} row {i}"
        );
        assert_eq!(
            column.is_na(i).unwrap(),
            na_rows.contains(&i),
            "{storage_type} row {i} NA"
        );
    }
}

#[test]
fn test_boolean_and_integer_round_trips() {
    colbuf_types::initialize();
    check_fixed(StorageType::BooleanI8, &[1i8, 0, NA_I8, 1], &[2]);
    check_fixed(StorageType::IntegerI8, &[127i8, -127, NA_I8], &[2]);
    check_fixed(StorageType::IntegerI16, &[32767i16, NA_I16, -32767], &[1]);
    check_fixed(StorageType::IntegerI32, &[5i32, NA_I32, i32::MAX], &[1]);
    check_fixed(StorageType::IntegerI64, &[NA_I64, 0, i64::MAX], &[0]);
}

#[test]
fn test_real_round_trips_preserve_nan_payloads() {
    check_fixed(
        StorageType::RealF32,
        &[1.5f32, NA_F32, f32::INFINITY],
        &[1],
    );
    check_fixed(
        StorageType::RealF64,
        &[-0.0f64, NA_F64, f64::NEG_INFINITY],
        &[1],
    );

    // An adversarial NaN payload survives the column byte-exactly and is
    // never reclassified as NA.
    let planted = f32::from_bits(0x7FC0_1234);
    let column = Column::from_elements(StorageType::RealF32, &[planted, NA_F32]).unwrap();
    assert!(!column.is_na(0).unwrap());
    assert!(column.is_na(1).unwrap());
    assert_eq!(column.element_as::<f32>(0).unwrap().to_bits(), 0x7FC0_1234);
    assert!(is_na_f32(column.element_as::<f32>(1).unwrap()));
    assert!(!is_na_f64(f64::NAN));
}

#[test]
fn test_decimal_round_trips() {
    let meta = DecimalMetadata { scale: 2, currency: 0x20AC };
    let rows = [Some(7.11), None, Some(-0.01)];
    let column = Column::decimal::<i16>(rows.iter().copied(), meta).unwrap();
    let view = column.decimal_view::<i16>().unwrap();
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(view.get(i).unwrap(), *row);
    }
    assert_eq!(view.stored(0), 711);

    let column = Column::decimal::<i32>(rows.iter().copied(), meta).unwrap();
    assert_eq!(column.decimal_view::<i32>().unwrap().get(0).unwrap(), Some(7.11));
    let column = Column::decimal::<i64>(rows.iter().copied(), meta).unwrap();
    assert_eq!(column.decimal_view::<i64>().unwrap().get(2).unwrap(), Some(-0.01));
}

#[test]
fn test_string_family_round_trips() {
    let rows = [None, Some("hello"), Some(""), Some("a\0b"), Some("日本語")];

    let column = Column::varchar::<i32>(rows.iter().copied()).unwrap();
    let view = column.varchar_view::<i32>().unwrap();
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(view.get(i).unwrap().as_deref(), *row);
    }

    let column = Column::varchar::<i64>(rows.iter().copied()).unwrap();
    let view = column.varchar_view::<i64>().unwrap();
    assert_eq!(view.get(4).unwrap().as_deref(), Some("日本語"));

    let column = Column::fixchar(rows.iter().copied(), 16).unwrap();
    let view = column.fixchar_view().unwrap();
    for (i, row) in rows.iter().enumerate() {
        // A present empty string reads back as NA for fixed-width cells.
        let expected = (*row).filter(|t| !t.is_empty());
        assert_eq!(view.get(i).unwrap().as_deref(), expected);
    }

    let column = Column::dictionary::<u8>(rows.iter().copied()).unwrap();
    let view = column.enum_view::<u8>().unwrap();
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(view.get(i).unwrap(), *row);
    }
}

#[test]
fn test_datetime_round_trips() {
    check_fixed(
        StorageType::DateTimeMicros,
        &[0i64, NA_I64, 63_082_281_600_000_000],
        &[1],
    );
    check_fixed(StorageType::TimeOfDayMillis, &[0i32, NA_I32, 86_399_999], &[1]);
    check_fixed(StorageType::DateDays, &[NA_I32, 739_066, -1], &[0]);
    check_fixed(StorageType::YearMonth, &[NA_I16, 0, 24_270], &[0]);

    let fields = DateTimeFields {
        year: 2023,
        month: 6,
        day: 15,
        hour: 12,
        minute: 34,
        second: 56,
        millisecond: 789,
        microsecond: 12,
    };
    let packed = datetime::pack(&fields).unwrap();
    check_fixed(StorageType::DateTimePacked, &[packed, NA_I64], &[1]);
    assert_eq!(datetime::unpack(packed), fields);
}

#[test]
fn test_object_round_trip() {
    let handles = [ObjectHandle::from_raw(0x1000).into_raw(), ObjectHandle::NA.into_raw()];
    let column = Column::from_elements(StorageType::ObjectPtr, &handles).unwrap();
    assert!(!column.is_na(0).unwrap());
    assert!(column.is_na(1).unwrap());
    assert_eq!(column.logical_type(), LogicalType::Object);
}

#[test]
fn test_registry_agrees_with_construction() {
    // requires_metadata exactly predicts whether a constructed column carries
    // metadata.
    let columns = [
        Column::from_elements(StorageType::IntegerI32, &[1i32]).unwrap(),
        Column::varchar::<i32>([Some("x")]).unwrap(),
        Column::fixchar([Some("x")], 2).unwrap(),
        Column::dictionary::<u16>([Some("x")]).unwrap(),
        Column::decimal::<i64>([Some(1.0)], DecimalMetadata { scale: 0, currency: 0 }).unwrap(),
    ];
    for column in &columns {
        assert_eq!(
            column.metadata().is_some(),
            column.storage_type().requires_metadata()
        );
    }
}

#[test]
fn test_capacity_errors_surface_unchanged() {
    let wide = "x".repeat(10);
    let err = Column::fixchar([Some(wide.as_str())], 4).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::CapacityExceeded { .. }));

    let meta = DecimalMetadata { scale: 2, currency: 0 };
    let err = Column::decimal::<i16>([Some(400.0)], meta).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::CapacityExceeded { .. }));
}
