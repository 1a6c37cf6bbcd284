use crate::encoding::{
    EncodingOptions, EncodingType, LongWidth, Scanner, TypeKind, TypeQualifiers,
};

/// The class and protocols named by an object type encoding such as `@"Foo<Bar><Baz>"`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectTypeRef {
    /// The quoted class name, if one is present and non-empty
    pub class_name: Option<String>,
    /// Protocol names in declaration order
    pub protocols: Vec<String>,
}

/// Parser for a single type encoding
///
/// # Example
///
/// ```rust
/// use objscope::encoding::{EncodingParser, EncodingOptions, TypeKind};
///
/// let options = EncodingOptions::default();
/// let ty = EncodingParser::new("r*", &options).parse_type();
/// assert_eq!(ty.kind, TypeKind::CString);
/// ```
///
/// ## Notes:
/// - A parser instance consumes its input. Create a new one for every encoding.
pub struct EncodingParser<'a> {
    scanner: Scanner<'a>,
    options: &'a EncodingOptions,
}

impl<'a> EncodingParser<'a> {
    /// Create a new `EncodingParser` over `encoding`
    ///
    /// ## Arguments
    /// * 'encoding' - The type encoding to read
    /// * 'options'  - Classifier options
    #[must_use]
    pub fn new(encoding: &'a str, options: &'a EncodingOptions) -> Self {
        EncodingParser {
            scanner: Scanner::new(encoding),
            options,
        }
    }

    /// Consume the qualifier prefix (`r n N o O R V`), in any order and with repeats
    fn parse_qualifiers(&mut self) -> TypeQualifiers {
        let (qualifiers, _) = self.scanner.scan_while(
            TypeQualifiers::empty(),
            TypeQualifiers::from_char,
            |acc, flag| acc | flag,
        );
        qualifiers
    }

    /// Map the first non-qualifier character to a kind
    fn parse_kind(&mut self) -> TypeKind {
        let Some(first) = self.scanner.peek_byte() else {
            return TypeKind::Unknown;
        };

        match first {
            b'v' => TypeKind::Void,
            b'B' => TypeKind::Bool,
            b'c' => TypeKind::Int8,
            b'C' => TypeKind::UInt8,
            b's' => TypeKind::Int16,
            b'S' => TypeKind::UInt16,
            b'i' => TypeKind::Int32,
            b'I' => TypeKind::UInt32,
            b'l' => match self.options.long_width {
                LongWidth::Bits32 => TypeKind::Int32,
                LongWidth::Bits64 => TypeKind::Int64,
            },
            b'L' => match self.options.long_width {
                LongWidth::Bits32 => TypeKind::UInt32,
                LongWidth::Bits64 => TypeKind::UInt64,
            },
            b'q' => TypeKind::Int64,
            b'Q' => TypeKind::UInt64,
            b'f' => TypeKind::Float,
            b'd' => TypeKind::Double,
            b'D' => TypeKind::LongDouble,
            b'#' => TypeKind::Class,
            b':' => TypeKind::Selector,
            b'*' => TypeKind::CString,
            b'^' => TypeKind::Pointer,
            b'[' => TypeKind::CArray,
            b'(' => TypeKind::Union,
            b'{' => TypeKind::Struct,
            // only the exact two-character `@?` is a block, `@?<...>` stays an object
            b'@' if self.scanner.remaining() == "@?" => TypeKind::Block,
            b'@' => TypeKind::Object,
            _ => TypeKind::Unknown,
        }
    }

    /// Classify the encoding.
    ///
    /// Never fails: unrecognized input yields [`TypeKind::Unknown`] together with whatever
    /// qualifiers preceded it.
    pub fn parse_type(&mut self) -> EncodingType {
        if self.scanner.is_empty() {
            return EncodingType::UNKNOWN;
        }

        let qualifiers = self.parse_qualifiers();
        let kind = self.parse_kind();

        EncodingType::new(kind, qualifiers)
    }

    /// Read the class name and protocol list of an object encoding.
    ///
    /// Returns `None` unless the encoding starts with `@"`. The class name runs up to the
    /// next `"` or `<`; an optional closing `"` is skipped, then every `<Name>` group adds a
    /// protocol. Empty names are dropped.
    pub fn parse_object_type(&mut self) -> Option<ObjectTypeRef> {
        if !self.scanner.scan_literal("@\"") {
            return None;
        }

        let mut object = ObjectTypeRef {
            class_name: self
                .scanner
                .scan_up_to(b"\"<")
                .map(ToString::to_string),
            protocols: Vec::new(),
        };

        self.scanner.scan_byte(b'"');

        while self.scanner.scan_byte(b'<') {
            match self.scanner.scan_up_to(b">") {
                Some(protocol) => {
                    object.protocols.push(protocol.to_string());
                    self.scanner.scan_byte(b'>');
                }
                None => {
                    // `<>` - skip the empty group
                    if !self.scanner.scan_byte(b'>') {
                        break;
                    }
                }
            }
        }

        Some(object)
    }
}
