#![no_main]

use libfuzzer_sys::fuzz_target;
use objscope::{
    encoding::{parse_object_type, parse_type_encoding, parse_type_encoding_with, EncodingOptions},
    metadata::{parse_attribute_string, PropertyInfo},
    runtime::PropertyHandle,
};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let ty = parse_type_encoding(text);
    let _ = parse_type_encoding_with(text, &EncodingOptions::lp64());
    let _ = parse_object_type(text);
    assert_eq!(objscope::encoding::EncodingType::from_bits(ty.bits()), ty);

    let property = PropertyInfo::from_attributes(
        PropertyHandle::new(1),
        "fuzzed",
        &parse_attribute_string(text),
        &EncodingOptions::default(),
        |_| None,
    );
    assert!(property.getter.is_some() && property.setter.is_some());
});
