//! Typed access to native attributes

use crate::{Result, conn::ConnData, err::ErrorContext};
use super::*;
use libc::c_void;
use std::mem;

pub(crate) trait AttrGet {
    type ValueType;
    fn new(val: Self::ValueType, len: usize) -> Self;
}

pub(crate) trait AttrSet {
    fn as_ptr(&self) -> *const c_void;
    fn len(&self) -> usize { 0 }
}

/**
    Reads attribute `attr_type` of the native object `obj`. The status of the native call is
    routed through the error context, with `conn` as the connection to mark dead when the
    failure is session-fatal.
*/
pub(crate) fn get<A>(ctx: &mut ErrorContext, conn: Option<&ConnData>, obj: *const c_void, obj_type: u32, attr_type: u32, action: &'static str) -> Result<A>
where A: AttrGet
{
    let mut attr_val  = mem::MaybeUninit::<A::ValueType>::uninit();
    let mut attr_size = 0u32;
    let res = unsafe {
        ctx.oci().attr_get(obj, obj_type, attr_val.as_mut_ptr() as _, &mut attr_size, attr_type, ctx.error_handle())
    };
    ctx.check(res, conn, action)?;
    Ok( AttrGet::new( unsafe { attr_val.assume_init() }, attr_size as usize) )
}

pub(crate) fn set<A>(ctx: &mut ErrorContext, conn: Option<&ConnData>, obj: *mut c_void, obj_type: u32, attr_type: u32, attr_val: A, action: &'static str) -> Result<()>
where A: AttrSet
{
    let res = unsafe {
        ctx.oci().attr_set(obj, obj_type, attr_val.as_ptr(), attr_val.len() as u32, attr_type, ctx.error_handle())
    };
    ctx.check(res, conn, action)
}

macro_rules! impl_int_attr {
    ($($t:ty),+) => {
        $(
            impl AttrGet for $t {
                type ValueType = $t;
                fn new(val: $t, _len: usize) -> Self {
                    val
                }
            }
            impl AttrSet for $t {
                fn as_ptr(&self) -> *const c_void {
                    self as *const $t as _
                }
            }
        )+
    };
}

impl_int_attr!{ u8, u16, u32, i32, u64 }

/// Text attributes are returned as a pointer into OCI-owned memory plus a length.
impl AttrGet for Vec<u8> {
    type ValueType = *const u8;
    fn new(ptr: *const u8, len: usize) -> Self {
        if ptr.is_null() || len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
        }
    }
}

impl AttrSet for &[u8] {
    fn as_ptr(&self) -> *const c_void {
        (*self).as_ptr() as _
    }
    fn len(&self) -> usize {
        (*self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::StubOci;

    #[test]
    fn integer_attributes_keep_native_width() -> Result<()> {
        let stub = StubOci::new();
        let env = stub.env();
        let mut ctx = ErrorContext::new(&env, "attr::tests");
        let obj = stub.new_ptr();

        set(&mut ctx, None, obj, OCI_DTYPE_AQENQ_OPTIONS, OCI_ATTR_MSG_DELIVERY_MODE, 0x0102u16, "set attribute value")?;
        assert_eq!(stub.raw_attr(obj, OCI_ATTR_MSG_DELIVERY_MODE), Some(0x0102u16.to_ne_bytes().to_vec()));

        let mode : u16 = get(&mut ctx, None, obj, OCI_DTYPE_AQENQ_OPTIONS, OCI_ATTR_MSG_DELIVERY_MODE, "get attribute value")?;
        assert_eq!(mode, 0x0102);
        Ok(())
    }

    #[test]
    fn text_attributes() -> Result<()> {
        let stub = StubOci::new();
        let env = stub.env();
        let mut ctx = ErrorContext::new(&env, "attr::tests");
        let obj = stub.new_ptr();

        let unset : Vec<u8> = get(&mut ctx, None, obj, OCI_DTYPE_PARAM, OCI_ATTR_NAME, "get name")?;
        assert!(unset.is_empty());

        set(&mut ctx, None, obj, OCI_DTYPE_PARAM, OCI_ATTR_NAME, "EMP_T".as_bytes(), "set name")?;
        let name : Vec<u8> = get(&mut ctx, None, obj, OCI_DTYPE_PARAM, OCI_ATTR_NAME, "get name")?;
        assert_eq!(name, b"EMP_T");
        Ok(())
    }

    #[test]
    fn failed_native_call_is_reported() {
        let stub = StubOci::new();
        let env = stub.env();
        let mut ctx = ErrorContext::new(&env, "attr::tests");
        let obj = stub.new_ptr();
        stub.fail_attr(OCI_ATTR_VISIBILITY);
        stub.script_error(24328, "ORA-24328: illegal attribute value");

        let res : Result<u32> = get(&mut ctx, None, obj, OCI_DTYPE_AQENQ_OPTIONS, OCI_ATTR_VISIBILITY, "get attribute value");
        let err = res.unwrap_err();
        assert_eq!(err.code(), 24328);
        assert_eq!(err.info().action, "get attribute value");
        assert_eq!(err.to_string(), "ORA-24328: illegal attribute value");
    }
}
