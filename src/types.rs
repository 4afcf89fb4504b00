//! Oracle type classification

use crate::oci::*;

/// Oracle data types as the crate reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleTypeNum {
    Varchar         = 2001,
    NVarchar        = 2002,
    Char            = 2003,
    NChar           = 2004,
    Rowid           = 2005,
    Raw             = 2006,
    NativeFloat     = 2007,
    NativeDouble    = 2008,
    NativeInt       = 2009,
    Number          = 2010,
    Date            = 2011,
    Timestamp       = 2012,
    TimestampTz     = 2013,
    TimestampLtz    = 2014,
    IntervalDs      = 2015,
    IntervalYm      = 2016,
    Clob            = 2017,
    NClob           = 2018,
    Blob            = 2019,
    BFile           = 2020,
    Stmt            = 2021,
    Boolean         = 2022,
    Object          = 2023,
    LongVarchar     = 2024,
    LongRaw         = 2025,
    NativeUint      = 2026,
}

/// Native representations a value of an Oracle type can be fetched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeTypeNum {
    Int64       = 3000,
    Uint64      = 3001,
    Float       = 3002,
    Double      = 3003,
    Bytes       = 3004,
    Timestamp   = 3005,
    IntervalDs  = 3006,
    IntervalYm  = 3007,
    Lob         = 3008,
    Object      = 3009,
    Stmt        = 3010,
    Boolean     = 3011,
    Rowid       = 3012,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct OracleType {
    pub(crate) oracle_type_num: OracleTypeNum,
    pub(crate) default_native_type_num: NativeTypeNum,
}

macro_rules! oracle_type {
    ($oracle:ident, $native:ident) => {
        Some(&OracleType {
            oracle_type_num: OracleTypeNum::$oracle,
            default_native_type_num: NativeTypeNum::$native,
        })
    };
}

/// Classifies the type code of an object attribute. `None` for unsupported type codes.
pub(crate) fn from_type_code(type_code: u16) -> Option<&'static OracleType> {
    match type_code {
        OCI_TYPECODE_VARCHAR | OCI_TYPECODE_VARCHAR2 => oracle_type!(Varchar, Bytes),
        OCI_TYPECODE_CHAR           => oracle_type!(Char, Bytes),
        OCI_TYPECODE_NCHAR          => oracle_type!(NChar, Bytes),
        OCI_TYPECODE_NVARCHAR2      => oracle_type!(NVarchar, Bytes),
        OCI_TYPECODE_NUMBER
        | OCI_TYPECODE_INTEGER
        | OCI_TYPECODE_FLOAT
        | OCI_TYPECODE_DECIMAL
        | OCI_TYPECODE_SMALLINT
        | OCI_TYPECODE_REAL
        | OCI_TYPECODE_DOUBLE       => oracle_type!(Number, Double),
        OCI_TYPECODE_BFLOAT         => oracle_type!(NativeFloat, Float),
        OCI_TYPECODE_BDOUBLE        => oracle_type!(NativeDouble, Double),
        OCI_TYPECODE_DATE           => oracle_type!(Date, Timestamp),
        OCI_TYPECODE_TIMESTAMP      => oracle_type!(Timestamp, Timestamp),
        OCI_TYPECODE_TIMESTAMP_TZ   => oracle_type!(TimestampTz, Timestamp),
        OCI_TYPECODE_TIMESTAMP_LTZ  => oracle_type!(TimestampLtz, Timestamp),
        OCI_TYPECODE_INTERVAL_DS    => oracle_type!(IntervalDs, IntervalDs),
        OCI_TYPECODE_INTERVAL_YM    => oracle_type!(IntervalYm, IntervalYm),
        OCI_TYPECODE_RAW            => oracle_type!(Raw, Bytes),
        OCI_TYPECODE_CLOB           => oracle_type!(Clob, Lob),
        OCI_TYPECODE_NCLOB          => oracle_type!(NClob, Lob),
        OCI_TYPECODE_BLOB           => oracle_type!(Blob, Lob),
        OCI_TYPECODE_BFILE          => oracle_type!(BFile, Lob),
        OCI_TYPECODE_OBJECT
        | OCI_TYPECODE_NAMEDCOLLECTION => oracle_type!(Object, Object),
        OCI_TYPECODE_BOOLEAN        => oracle_type!(Boolean, Boolean),
        _ => None,
    }
}
