//! Native calls into the Oracle client library.

use super::*;
use libc::{size_t, c_void};
use std::ptr;

extern "C" {
    fn OCIEnvNlsCreate(
        envhpp:     *mut *mut  OCIEnv,
        mode:       u32,
        ctxp:       *const c_void,
        malocfp:    *const c_void,
        ralocfp:    *const c_void,
        mfreefp:    *const c_void,
        xtramemsz:  size_t,
        usrmempp:   *const c_void,
        charset:    u16,
        ncharset:   u16
    ) -> i32;

    fn OCIHandleAlloc(
        parenth:    *const OCIEnv,
        hndlpp:     *mut *mut  c_void,
        hndl_type:  u32,
        xtramem_sz: size_t,
        usrmempp:   *const c_void
    ) -> i32;

    fn OCIHandleFree(
        hndlp:      *mut c_void,
        hnd_type:   u32
    ) -> i32;

    fn OCIDescriptorAlloc(
        parenth:    *const OCIEnv,
        descpp:     *mut *mut  c_void,
        desc_type:  u32,
        xtramem_sz: size_t,
        usrmempp:   *const c_void
    ) -> i32;

    fn OCIDescriptorFree(
        descp:      *mut c_void,
        desc_type:  u32
    ) -> i32;

    fn OCIAttrGet(
        trgthndlp:  *const c_void,
        trghndltyp: u32,
        attributep: *mut c_void,
        sizep:      *mut u32,
        attrtype:   u32,
        errhp:      *mut OCIError
    ) -> i32;

    fn OCIAttrSet(
        trgthndlp:  *mut c_void,
        trghndltyp: u32,
        attributep: *const c_void,
        size:       u32,
        attrtype:   u32,
        errhp:      *mut OCIError
    ) -> i32;

    fn OCIParamGet(
        hndlp:      *const c_void,
        htype:      u32,
        errhp:      *mut OCIError,
        descr:      *mut *mut c_void,
        pos:        u32
    ) -> i32;

    fn OCIErrorGet(
        hndlp:      *const c_void,
        recordno:   u32,
        sqlstate:   *const c_void,
        errcodep:   *mut i32,
        bufp:       *mut u8,
        bufsiz:     u32,
        hnd_type:   u32,
    ) -> i32;
}

/**
    The Oracle client library linked at build time (`libclntsh`, or `oci.dll` on Windows).

    # Example

    ```no_run
    use std::sync::Arc;
    use oradpi::{Environment, EnvConfig, oci::ClientLib};

    let env = Environment::with_native(Arc::new(ClientLib), EnvConfig::default())?;
    # Ok::<(),oradpi::Error>(())
    ```
*/
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientLib;

impl Oci for ClientLib {
    unsafe fn env_nls_create(&self, envhpp: *mut *mut OCIEnv, mode: u32, charset: u16, ncharset: u16) -> i32 {
        OCIEnvNlsCreate(
            envhpp, mode,
            ptr::null(), ptr::null(), ptr::null(), ptr::null(), 0, ptr::null(),
            charset, ncharset
        )
    }

    unsafe fn handle_alloc(&self, parenth: *const OCIEnv, hndlpp: *mut *mut c_void, hndl_type: u32) -> i32 {
        OCIHandleAlloc(parenth, hndlpp, hndl_type, 0, ptr::null())
    }

    unsafe fn handle_free(&self, hndlp: *mut c_void, hnd_type: u32) -> i32 {
        OCIHandleFree(hndlp, hnd_type)
    }

    unsafe fn descriptor_alloc(&self, parenth: *const OCIEnv, descpp: *mut *mut c_void, desc_type: u32) -> i32 {
        OCIDescriptorAlloc(parenth, descpp, desc_type, 0, ptr::null())
    }

    unsafe fn descriptor_free(&self, descp: *mut c_void, desc_type: u32) -> i32 {
        OCIDescriptorFree(descp, desc_type)
    }

    unsafe fn attr_get(&self, trgthndlp: *const c_void, trghndltyp: u32, attributep: *mut c_void, sizep: *mut u32, attrtype: u32, errhp: *mut OCIError) -> i32 {
        OCIAttrGet(trgthndlp, trghndltyp, attributep, sizep, attrtype, errhp)
    }

    unsafe fn attr_set(&self, trgthndlp: *mut c_void, trghndltyp: u32, attributep: *const c_void, size: u32, attrtype: u32, errhp: *mut OCIError) -> i32 {
        OCIAttrSet(trgthndlp, trghndltyp, attributep, size, attrtype, errhp)
    }

    unsafe fn param_get(&self, hndlp: *const c_void, htype: u32, errhp: *mut OCIError, parmdpp: *mut *mut c_void, pos: u32) -> i32 {
        OCIParamGet(hndlp, htype, errhp, parmdpp, pos)
    }

    unsafe fn error_get(&self, hndlp: *const c_void, recordno: u32, errcodep: *mut i32, bufp: *mut u8, bufsiz: u32, hnd_type: u32) -> i32 {
        OCIErrorGet(hndlp, recordno, ptr::null(), errcodep, bufp, bufsiz, hnd_type)
    }
}
