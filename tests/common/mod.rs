//! Native layer stand-in for the integration tests

#![allow(dead_code)]

use std::{collections::{HashMap, HashSet}, ptr, sync::{Arc, atomic::{AtomicUsize, Ordering}}};
use libc::c_void;
use parking_lot::Mutex;
use oradpi::{Environment, EnvConfig, oci::*};

/// Keeps scalar attributes and tracks live descriptors. Freeing a descriptor twice panics.
#[derive(Default)]
pub struct Native {
    next_ptr: AtomicUsize,
    attrs: Mutex<HashMap<(usize, u32), u64>>,
    descriptors: Mutex<HashSet<usize>>,
    descriptors_freed: AtomicUsize,
    error: Mutex<Option<i32>>,
}

impl Native {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { next_ptr: AtomicUsize::new(0x10_000), ..Self::default() })
    }

    pub fn env(self: &Arc<Self>) -> Arc<Environment> {
        Environment::with_native(self.clone(), EnvConfig::default()).expect("environment")
    }

    /// Every following attribute call fails with the native error `code`.
    pub fn fail_with(&self, code: i32) {
        *self.error.lock() = Some(code);
    }

    pub fn live_descriptors(&self) -> usize {
        self.descriptors.lock().len()
    }

    pub fn descriptors_freed(&self) -> usize {
        self.descriptors_freed.load(Ordering::SeqCst)
    }

    fn new_ptr(&self) -> *mut c_void {
        self.next_ptr.fetch_add(16, Ordering::Relaxed) as *mut c_void
    }
}

fn width(attr: u32) -> usize {
    match attr {
        OCI_ATTR_MSG_DELIVERY_MODE => 2,
        _ => 4,
    }
}

impl Oci for Native {
    unsafe fn env_nls_create(&self, envhpp: *mut *mut OCIEnv, _mode: u32, _charset: u16, _ncharset: u16) -> i32 {
        *envhpp = self.new_ptr() as _;
        OCI_SUCCESS
    }

    unsafe fn handle_alloc(&self, _parenth: *const OCIEnv, hndlpp: *mut *mut c_void, _hndl_type: u32) -> i32 {
        *hndlpp = self.new_ptr();
        OCI_SUCCESS
    }

    unsafe fn handle_free(&self, _hndlp: *mut c_void, _hnd_type: u32) -> i32 {
        OCI_SUCCESS
    }

    unsafe fn descriptor_alloc(&self, _parenth: *const OCIEnv, descpp: *mut *mut c_void, _desc_type: u32) -> i32 {
        let desc = self.new_ptr();
        self.descriptors.lock().insert(desc as usize);
        *descpp = desc;
        OCI_SUCCESS
    }

    unsafe fn descriptor_free(&self, descp: *mut c_void, _desc_type: u32) -> i32 {
        assert!(self.descriptors.lock().remove(&(descp as usize)), "descriptor {:p} is not live", descp);
        self.descriptors_freed.fetch_add(1, Ordering::SeqCst);
        OCI_SUCCESS
    }

    unsafe fn attr_get(&self, trgthndlp: *const c_void, _trghndltyp: u32, attributep: *mut c_void, _sizep: *mut u32, attrtype: u32, _errhp: *mut OCIError) -> i32 {
        if attrtype != OCI_ATTR_ERROR_IS_RECOVERABLE && self.error.lock().is_some() {
            return OCI_ERROR;
        }
        let value = self.attrs.lock().get(&(trgthndlp as usize, attrtype)).copied().unwrap_or(0);
        let bytes = value.to_ne_bytes();
        #[cfg(target_endian = "big")]
        let bytes = &bytes[8 - width(attrtype)..];
        ptr::copy_nonoverlapping(bytes.as_ptr(), attributep as *mut u8, width(attrtype));
        OCI_SUCCESS
    }

    unsafe fn attr_set(&self, trgthndlp: *mut c_void, _trghndltyp: u32, attributep: *const c_void, _size: u32, attrtype: u32, _errhp: *mut OCIError) -> i32 {
        if self.error.lock().is_some() {
            return OCI_ERROR;
        }
        let value = match width(attrtype) {
            2 => *(attributep as *const u16) as u64,
            _ => *(attributep as *const u32) as u64,
        };
        self.attrs.lock().insert((trgthndlp as usize, attrtype), value);
        OCI_SUCCESS
    }

    unsafe fn param_get(&self, _hndlp: *const c_void, _htype: u32, _errhp: *mut OCIError, _parmdpp: *mut *mut c_void, _pos: u32) -> i32 {
        OCI_ERROR
    }

    unsafe fn error_get(&self, _hndlp: *const c_void, _recordno: u32, errcodep: *mut i32, bufp: *mut u8, _bufsiz: u32, _hnd_type: u32) -> i32 {
        let code = self.error.lock().unwrap_or(0);
        let message = format!("ORA-{:05}: scripted failure\0", code);
        ptr::copy_nonoverlapping(message.as_ptr(), bufp, message.len());
        *errcodep = code;
        OCI_SUCCESS
    }
}
