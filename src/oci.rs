//! Oracle OCI

#![allow(dead_code)]

use libc::c_void;

pub(crate) mod ptr;
pub(crate) mod attr;
pub(crate) mod param;
pub(crate) mod handle;
pub(crate) mod desc;

#[cfg(feature="link-oci")]
#[cfg_attr(docsrs, doc(cfg(feature="link-oci")))]
mod ffi;

#[cfg(feature="link-oci")]
pub use ffi::ClientLib;

pub(crate) use ptr::Ptr;
pub(crate) use handle::Handle;
pub(crate) use desc::Descriptor;

pub(crate) const OCI_DEFAULT                : u32 = 0;

// OCI Error Codes
pub const OCI_SUCCESS                       : i32 = 0;
pub const OCI_SUCCESS_WITH_INFO             : i32 = 1;
pub const OCI_NEED_DATA                     : i32 = 99;
pub const OCI_NO_DATA                       : i32 = 100;
pub const OCI_ERROR                         : i32 = -1;
pub const OCI_INVALID_HANDLE                : i32 = -2;
pub const OCI_STILL_EXECUTING               : i32 = -3123;

// Handle Types
pub const OCI_HTYPE_ENV                     : u32 = 1;
pub const OCI_HTYPE_ERROR                   : u32 = 2;

// Descriptor Types
pub const OCI_DTYPE_PARAM                   : u32 = 53;  // a parameter descriptor obtained from ocigparm
pub const OCI_DTYPE_AQENQ_OPTIONS           : u32 = 57;  // enqueue options

// Handle Definitions
#[repr(C)] pub struct OCIEnv                { _private: [u8; 0] }
#[repr(C)] pub struct OCIError              { _private: [u8; 0] }

// Descriptor Definitions
#[repr(C)] pub struct OCIParam              { _private: [u8; 0] }
#[repr(C)] pub struct OCIAQEnqOptions       { _private: [u8; 0] }

/// Marker trait for OCI handles and descriptors
pub trait OCIStruct {}

macro_rules! mark_as_oci {
    ($($t:ty),+) => {
        $(
            impl OCIStruct for $t {}
        )+
    };
}

mark_as_oci!(OCIEnv, OCIError, OCIParam, OCIAQEnqOptions);

// Attributes common to Columns and Stored Procs
pub const OCI_ATTR_NAME                     : u32 = 4;   // the name of the column/argument
pub const OCI_ATTR_TYPE_NAME                : u32 = 8;   // name of the named data type or a package name for package private types
pub const OCI_ATTR_SCHEMA_NAME              : u32 = 9;   // the schema name

// AQ enqueue options
pub const OCI_ATTR_VISIBILITY               : u32 = 47;  // visibility
pub const OCI_ATTR_TRANSFORMATION           : u32 = 196; // AQ message transformation
pub const OCI_ATTR_MSG_DELIVERY_MODE        : u32 = 407; // msg delivery mode

// Type describe attributes
pub const OCI_ATTR_TYPECODE                 : u32 = 216; // object or collection
pub const OCI_ATTR_NUM_TYPE_ATTRS           : u32 = 228; // number of attribute types
pub const OCI_ATTR_LIST_TYPE_ATTRS          : u32 = 229; // list of type attributes

// Transaction Guard
pub const OCI_ATTR_ERROR_IS_RECOVERABLE     : u32 = 472;

pub(crate) const OCI_ERROR_MAXMSG_SIZE      : usize = 3072;

// Visibility flags
pub(crate) const OCI_ENQ_IMMEDIATE          : u32 = 1;
pub(crate) const OCI_ENQ_ON_COMMIT          : u32 = 2;

// Message delivery modes
pub(crate) const OCI_MSG_PERSISTENT         : u16 = 1;
pub(crate) const OCI_MSG_BUFFERED           : u16 = 2;
pub(crate) const OCI_MSG_PERSISTENT_OR_BUFFERED : u16 = 3;

// Initialization Modes
pub(crate) const OCI_THREADED               : u32 = 1;
pub(crate) const OCI_OBJECT                 : u32 = 2;

// Character Sets
pub(crate) const AL32UTF8                   : u16 = 873;
pub(crate) const OCI_UTF16ID                : u16 = 1000;

// Type Codes
pub const OCI_TYPECODE_VARCHAR              : u16 = 1;
pub const OCI_TYPECODE_NUMBER               : u16 = 2;
pub const OCI_TYPECODE_INTEGER              : u16 = 3;
pub const OCI_TYPECODE_FLOAT                : u16 = 4;
pub const OCI_TYPECODE_DECIMAL              : u16 = 7;
pub const OCI_TYPECODE_VARCHAR2             : u16 = 9;
pub const OCI_TYPECODE_DATE                 : u16 = 12;
pub const OCI_TYPECODE_REAL                 : u16 = 21;
pub const OCI_TYPECODE_DOUBLE               : u16 = 22;
pub const OCI_TYPECODE_RAW                  : u16 = 95;
pub const OCI_TYPECODE_CHAR                 : u16 = 96;
pub const OCI_TYPECODE_BFLOAT               : u16 = 100;
pub const OCI_TYPECODE_BDOUBLE              : u16 = 101;
pub const OCI_TYPECODE_OBJECT               : u16 = 108;
pub const OCI_TYPECODE_CLOB                 : u16 = 112;
pub const OCI_TYPECODE_BLOB                 : u16 = 113;
pub const OCI_TYPECODE_BFILE                : u16 = 114;
pub const OCI_TYPECODE_NAMEDCOLLECTION      : u16 = 122;
pub const OCI_TYPECODE_TIMESTAMP            : u16 = 187;
pub const OCI_TYPECODE_TIMESTAMP_TZ         : u16 = 188;
pub const OCI_TYPECODE_INTERVAL_YM          : u16 = 189;
pub const OCI_TYPECODE_INTERVAL_DS          : u16 = 190;
pub const OCI_TYPECODE_TIMESTAMP_LTZ        : u16 = 232;
pub const OCI_TYPECODE_SMALLINT             : u16 = 246;
pub const OCI_TYPECODE_BOOLEAN              : u16 = 252;
pub const OCI_TYPECODE_NCHAR                : u16 = 286;
pub const OCI_TYPECODE_NVARCHAR2            : u16 = 287;
pub const OCI_TYPECODE_NCLOB                : u16 = 288;

/**
    The native call boundary.

    Every call the crate makes into the Oracle client library goes through this trait. Each
    method mirrors the OCI function of the same name, takes the same arguments and returns
    the raw `sword` status. Implementations must not interpret the status; that is the job of
    the error context that receives it.

    `ClientLib` (behind the `link-oci` feature) forwards to `libclntsh`. Other implementations,
    for example a dynamically loaded client or a test double, can be passed to
    [`Environment::with_native`](crate::Environment::with_native).

    # Safety

    All methods take raw pointers straight from the crate's native handles and descriptors and
    must treat them exactly as the corresponding OCI function does.
*/
pub trait Oci: Send + Sync {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-0B6911A9-4B46-476C-BC5E-B87581666CD9
    unsafe fn env_nls_create(
        &self,
        envhpp:     *mut *mut OCIEnv,
        mode:       u32,
        charset:    u16,
        ncharset:   u16
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-C5BF55F7-A110-4CB5-9663-5056590F12B5
    unsafe fn handle_alloc(
        &self,
        parenth:    *const OCIEnv,
        hndlpp:     *mut *mut c_void,
        hndl_type:  u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-E87E9F91-D3DC-4F35-BE7C-F1EFBFEEBA0A
    unsafe fn handle_free(
        &self,
        hndlp:      *mut c_void,
        hnd_type:   u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-E9EF2766-E078-49A7-B1D1-738E4BA4814F
    unsafe fn descriptor_alloc(
        &self,
        parenth:    *const OCIEnv,
        descpp:     *mut *mut c_void,
        desc_type:  u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-A32BF051-3DC1-491C-AAFD-A46034DD1629
    unsafe fn descriptor_free(
        &self,
        descp:      *mut c_void,
        desc_type:  u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-FA199A99-4D7A-42C2-BB0A-C20047B95DF9
    unsafe fn attr_get(
        &self,
        trgthndlp:  *const c_void,
        trghndltyp: u32,
        attributep: *mut c_void,
        sizep:      *mut u32,
        attrtype:   u32,
        errhp:      *mut OCIError
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-3741D7BD-7652-4D7A-8813-AC2AEA8D3B03
    unsafe fn attr_set(
        &self,
        trgthndlp:  *mut c_void,
        trghndltyp: u32,
        attributep: *const c_void,
        size:       u32,
        attrtype:   u32,
        errhp:      *mut OCIError
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-35D2FF91-139B-4A5C-97C8-8BC29866CCA4
    unsafe fn param_get(
        &self,
        hndlp:      *const c_void,
        htype:      u32,
        errhp:      *mut OCIError,
        parmdpp:    *mut *mut c_void,
        pos:        u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-4B99087C-74F6-498A-8310-D6645172390A
    unsafe fn error_get(
        &self,
        hndlp:      *const c_void,
        recordno:   u32,
        errcodep:   *mut i32,
        bufp:       *mut u8,
        bufsiz:     u32,
        hnd_type:   u32
    ) -> i32;
}
