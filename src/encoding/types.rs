use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Bitmask for the kind byte of a packed encoding type
pub const TYPE_KIND_MASK: u32 = 0x0000_00FF;
/// Bitmask for the qualifier byte of a packed encoding type
pub const TYPE_QUALIFIER_MASK: u32 = 0x0000_FF00;
/// Bitmask for the property attribute byte of a packed encoding type
pub const PROPERTY_FLAG_MASK: u32 = 0x00FF_0000;

/// The storage kind described by a type encoding.
///
/// Exactly one kind applies to an encoding. The discriminants are the values stored in the
/// low byte of the packed form (see [`EncodingType::bits`]).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    EnumCount,
    FromRepr,
    IntoStaticStr,
    Display,
)]
#[repr(u8)]
pub enum TypeKind {
    /// Not recognized, or no encoding at all
    #[default]
    Unknown = 0,
    /// `v` - void
    Void = 1,
    /// `B` - C++ bool / C99 `_Bool`
    Bool = 2,
    /// `c` - char / BOOL
    Int8 = 3,
    /// `C` - unsigned char
    UInt8 = 4,
    /// `s` - short
    Int16 = 5,
    /// `S` - unsigned short
    UInt16 = 6,
    /// `i` - int (and `l` on 32-bit `long` layouts)
    Int32 = 7,
    /// `I` - unsigned int (and `L` on 32-bit `long` layouts)
    UInt32 = 8,
    /// `q` - long long
    Int64 = 9,
    /// `Q` - unsigned long long
    UInt64 = 10,
    /// `f` - float
    Float = 11,
    /// `d` - double
    Double = 12,
    /// `D` - long double
    LongDouble = 13,
    /// `@` - object reference
    Object = 14,
    /// `#` - class object
    Class = 15,
    /// `:` - method selector
    Selector = 16,
    /// `@?` - block
    Block = 17,
    /// `^` - pointer
    Pointer = 18,
    /// `{` - struct
    Struct = 19,
    /// `(` - union
    Union = 20,
    /// `*` - char *
    CString = 21,
    /// `[` - fixed size C array
    CArray = 22,
}

impl TypeKind {
    /// Returns true for the integer kinds (including bool)
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeKind::Bool
                | TypeKind::Int8
                | TypeKind::UInt8
                | TypeKind::Int16
                | TypeKind::UInt16
                | TypeKind::Int32
                | TypeKind::UInt32
                | TypeKind::Int64
                | TypeKind::UInt64
        )
    }

    /// Returns true for the floating-point kinds
    #[must_use]
    pub fn is_floating_point(&self) -> bool {
        matches!(
            self,
            TypeKind::Float | TypeKind::Double | TypeKind::LongDouble
        )
    }

    /// Returns true for every kind a number can be stored in
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating_point()
    }

    /// Returns true for object references, class objects and blocks
    #[must_use]
    pub fn is_object_like(&self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Class | TypeKind::Block)
    }

    /// Returns true for raw C storage (pointers, aggregates, C strings and arrays)
    #[must_use]
    pub fn is_c_type(&self) -> bool {
        matches!(
            self,
            TypeKind::Pointer
                | TypeKind::Struct
                | TypeKind::Union
                | TypeKind::CString
                | TypeKind::CArray
        )
    }
}

bitflags! {
    /// Method type qualifiers, accumulated from the prefix of an encoding
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeQualifiers: u32 {
        /// `r` - const
        const CONST = 1 << 8;
        /// `n` - in
        const IN = 1 << 9;
        /// `N` - inout
        const INOUT = 1 << 10;
        /// `o` - out
        const OUT = 1 << 11;
        /// `O` - bycopy
        const BYCOPY = 1 << 12;
        /// `R` - byref
        const BYREF = 1 << 13;
        /// `V` - oneway
        const ONEWAY = 1 << 14;
    }
}

impl TypeQualifiers {
    /// Maps one qualifier prefix character to its flag
    #[must_use]
    pub fn from_char(c: u8) -> Option<Self> {
        match c {
            b'r' => Some(TypeQualifiers::CONST),
            b'n' => Some(TypeQualifiers::IN),
            b'N' => Some(TypeQualifiers::INOUT),
            b'o' => Some(TypeQualifiers::OUT),
            b'O' => Some(TypeQualifiers::BYCOPY),
            b'R' => Some(TypeQualifiers::BYREF),
            b'V' => Some(TypeQualifiers::ONEWAY),
            _ => None,
        }
    }
}

bitflags! {
    /// Declared property attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u32 {
        /// `R` - readonly
        const READONLY = 1 << 16;
        /// `C` - copy
        const COPY = 1 << 17;
        /// `&` - retain / strong
        const RETAIN = 1 << 18;
        /// `N` - nonatomic
        const NONATOMIC = 1 << 19;
        /// `W` - weak
        const WEAK = 1 << 20;
        /// `G` - getter=
        const CUSTOM_GETTER = 1 << 21;
        /// `S` - setter=
        const CUSTOM_SETTER = 1 << 22;
        /// `D` - @dynamic
        const DYNAMIC = 1 << 23;
    }
}

/// The classification of a type encoding.
///
/// Kind, qualifiers and property attributes are kept apart: a kind is a single value, while
/// qualifiers and property attributes combine freely.
///
/// # Examples
///
/// ```rust
/// use objscope::encoding::{parse_type_encoding, TypeKind, TypeQualifiers};
///
/// let ty = parse_type_encoding("rn^v");
/// assert_eq!(ty.kind, TypeKind::Pointer);
/// assert_eq!(ty.qualifiers, TypeQualifiers::CONST | TypeQualifiers::IN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EncodingType {
    /// The storage kind
    pub kind: TypeKind,
    /// Qualifiers from the encoding prefix
    pub qualifiers: TypeQualifiers,
    /// Property attributes (only set on property members)
    pub property: PropertyFlags,
}

impl EncodingType {
    /// The classification of an empty or missing encoding
    pub const UNKNOWN: EncodingType = EncodingType {
        kind: TypeKind::Unknown,
        qualifiers: TypeQualifiers::empty(),
        property: PropertyFlags::empty(),
    };

    /// Create a classification with a kind and qualifiers
    #[must_use]
    pub fn new(kind: TypeKind, qualifiers: TypeQualifiers) -> Self {
        EncodingType {
            kind,
            qualifiers,
            property: PropertyFlags::empty(),
        }
    }

    /// Returns true if neither a kind nor any flag is set
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Returns a copy with the given property attributes added
    #[must_use]
    pub fn with_property(mut self, flags: PropertyFlags) -> Self {
        self.property |= flags;
        self
    }

    /// Packs the classification into a single integer.
    ///
    /// The kind occupies the low byte ([`TYPE_KIND_MASK`]), the qualifiers the next one
    /// ([`TYPE_QUALIFIER_MASK`]) and the property attributes the third ([`PROPERTY_FLAG_MASK`]).
    #[must_use]
    pub fn bits(&self) -> u32 {
        u32::from(self.kind as u8) | self.qualifiers.bits() | self.property.bits()
    }

    /// Unpacks a value produced by [`EncodingType::bits`].
    ///
    /// An unknown kind byte decodes to [`TypeKind::Unknown`]; undefined flag bits are dropped.
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let kind = TypeKind::from_repr((bits & TYPE_KIND_MASK) as u8).unwrap_or_default();

        EncodingType {
            kind,
            qualifiers: TypeQualifiers::from_bits_truncate(bits & TYPE_QUALIFIER_MASK),
            property: PropertyFlags::from_bits_truncate(bits & PROPERTY_FLAG_MASK),
        }
    }
}

impl From<TypeKind> for EncodingType {
    fn from(kind: TypeKind) -> Self {
        EncodingType::new(kind, TypeQualifiers::empty())
    }
}

/// Width of the C `long` type assumed when classifying `l` and `L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LongWidth {
    /// `l`/`L` classify as [`TypeKind::Int32`]/[`TypeKind::UInt32`]
    #[default]
    Bits32,
    /// `l`/`L` classify as [`TypeKind::Int64`]/[`TypeKind::UInt64`]
    Bits64,
}

/// Options for the type-encoding classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EncodingOptions {
    /// How `l` and `L` are classified
    pub long_width: LongWidth,
}

impl EncodingOptions {
    /// Options that classify `long` as a 64-bit integer
    #[must_use]
    pub fn lp64() -> Self {
        EncodingOptions {
            long_width: LongWidth::Bits64,
        }
    }
}
