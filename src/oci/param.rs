//! OCI Parameter descriptor functions

use crate::{Result, conn::ConnData, err::{ErrorContext, ErrorKind}};
use super::*;

/// Returns the parameter descriptor at position `pos` (1-based) of the described object `obj`.
/// The descriptor belongs to its parent and must not be freed.
pub(crate) fn get(ctx: &mut ErrorContext, conn: Option<&ConnData>, obj: Ptr<OCIParam>, obj_type: u32, pos: u32) -> Result<Ptr<OCIParam>> {
    let mut param = Ptr::<OCIParam>::null();
    let res = unsafe {
        ctx.oci().param_get(obj.get() as _, obj_type, ctx.error_handle(), param.as_mut_ptr() as _, pos)
    };
    ctx.check(res, conn, "get parameter")?;
    if param.is_null() {
        return Err( ctx.set("get parameter", ErrorKind::NullHandle("parameter")) );
    }
    Ok( param )
}
