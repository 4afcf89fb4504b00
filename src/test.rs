//! Unittest helpers

use std::{cmp, mem, ptr, sync::{Arc, atomic::{AtomicUsize, Ordering}}};
use std::collections::{HashMap, HashSet};
use libc::c_void;
use parking_lot::Mutex;

use crate::{Environment, EnvConfig, oci::*};

#[derive(Default)]
struct State {
    attrs: HashMap<(usize, u32), Box<[u8]>>,
    params: HashMap<(usize, u32), usize>,
    failing_attrs: HashSet<u32>,
    missing_attrs: HashSet<(usize, u32)>,
    failing_params: HashSet<u32>,
    error: Option<(i32, Vec<u8>)>,
    error_get_status: i32,
    recoverable: i32,
    fail_env_create: bool,
    fail_handle_alloc: bool,
    fail_descriptor_alloc: bool,
}

/**
    Native layer stand-in. Stores attributes with the widths OCI uses, hands out fake
    pointers, counts allocations and reports a scripted error.
*/
pub(crate) struct StubOci {
    state: Mutex<State>,
    next_ptr: AtomicUsize,
    native_calls: AtomicUsize,
    error_get_calls: AtomicUsize,
    handles_allocated: AtomicUsize,
    handles_freed: AtomicUsize,
    descriptors_allocated: AtomicUsize,
    descriptors_freed: AtomicUsize,
}

fn is_text(attr: u32) -> bool {
    matches!(attr, OCI_ATTR_TRANSFORMATION | OCI_ATTR_NAME | OCI_ATTR_TYPE_NAME | OCI_ATTR_SCHEMA_NAME)
}

fn width(attr: u32) -> usize {
    match attr {
        OCI_ATTR_MSG_DELIVERY_MODE | OCI_ATTR_TYPECODE | OCI_ATTR_NUM_TYPE_ATTRS => 2,
        OCI_ATTR_LIST_TYPE_ATTRS => mem::size_of::<usize>(),
        _ => 4,
    }
}

impl StubOci {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
            next_ptr: AtomicUsize::new(0x1000),
            native_calls: AtomicUsize::new(0),
            error_get_calls: AtomicUsize::new(0),
            handles_allocated: AtomicUsize::new(0),
            handles_freed: AtomicUsize::new(0),
            descriptors_allocated: AtomicUsize::new(0),
            descriptors_freed: AtomicUsize::new(0),
        })
    }

    pub(crate) fn env(self: &Arc<Self>) -> Arc<Environment> {
        self.env_with(EnvConfig::default())
    }

    pub(crate) fn env_with(self: &Arc<Self>, config: EnvConfig) -> Arc<Environment> {
        Environment::with_native(self.clone(), config).expect("stub environment")
    }

    /// Returns a fresh non-null pointer that can stand for any native object.
    pub(crate) fn new_ptr(&self) -> *mut c_void {
        self.next_ptr.fetch_add(16, Ordering::Relaxed) as *mut c_void
    }

    pub(crate) fn raw_attr(&self, obj: *mut c_void, attr: u32) -> Option<Vec<u8>> {
        self.state.lock().attrs.get(&(obj as usize, attr)).map(|value| value.to_vec())
    }

    pub(crate) fn set_raw_attr(&self, obj: *mut c_void, attr: u32, value: &[u8]) {
        self.state.lock().attrs.insert((obj as usize, attr), value.into());
    }

    pub(crate) fn set_text(&self, obj: *mut c_void, attr: u32, text: &str) {
        self.set_raw_attr(obj, attr, text.as_bytes());
    }

    pub(crate) fn set_u16(&self, obj: *mut c_void, attr: u32, value: u16) {
        self.set_raw_attr(obj, attr, &value.to_ne_bytes());
    }

    /// Makes `list` the attribute list of `obj`, with `params` at positions 1 to n.
    pub(crate) fn set_param_list(&self, obj: *mut c_void, list: *mut c_void, params: &[*mut c_void]) {
        self.set_raw_attr(obj, OCI_ATTR_LIST_TYPE_ATTRS, &(list as usize).to_ne_bytes());
        let mut state = self.state.lock();
        for (i, &param) in params.iter().enumerate() {
            state.params.insert((list as usize, i as u32 + 1), param as usize);
        }
    }

    /// Makes every get and set of `attr` fail with `OCI_ERROR`.
    pub(crate) fn fail_attr(&self, attr: u32) {
        self.state.lock().failing_attrs.insert(attr);
    }

    /// Makes `obj` reject `attr` with `OCI_ERROR`, the way OCI rejects attributes a
    /// parameter of that kind does not have.
    pub(crate) fn reject_attr(&self, obj: *mut c_void, attr: u32) {
        self.state.lock().missing_attrs.insert((obj as usize, attr));
    }

    /// Makes parameter retrieval at `pos` fail with `OCI_ERROR`.
    pub(crate) fn fail_param(&self, pos: u32) {
        self.state.lock().failing_params.insert(pos);
    }

    pub(crate) fn set_recoverable(&self, recoverable: bool) {
        self.set_recoverable_raw(recoverable as i32);
    }

    /// Sets the `boolean` (C `int`) OCI reports for the recoverability of the scripted error.
    pub(crate) fn set_recoverable_raw(&self, value: i32) {
        self.state.lock().recoverable = value;
    }

    pub(crate) fn script_error(&self, code: i32, message: &str) {
        self.script_error_bytes(code, message.as_bytes());
    }

    /// Scripts the error reported by `OCIErrorGet`. The message is copied as is.
    pub(crate) fn script_error_bytes(&self, code: i32, message: &[u8]) {
        self.state.lock().error = Some((code, message.to_vec()));
    }

    pub(crate) fn fail_error_get(&self, status: i32) {
        self.state.lock().error_get_status = status;
    }

    pub(crate) fn fail_error_handle_alloc(&self) {
        self.state.lock().fail_handle_alloc = true;
    }

    pub(crate) fn fail_env_create(&self) {
        self.state.lock().fail_env_create = true;
    }

    pub(crate) fn fail_descriptor_alloc(&self) {
        self.state.lock().fail_descriptor_alloc = true;
    }

    pub(crate) fn native_calls(&self) -> usize {
        self.native_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn error_get_calls(&self) -> usize {
        self.error_get_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn handles_allocated(&self) -> usize {
        self.handles_allocated.load(Ordering::SeqCst)
    }

    pub(crate) fn handles_freed(&self) -> usize {
        self.handles_freed.load(Ordering::SeqCst)
    }

    pub(crate) fn descriptors_allocated(&self) -> usize {
        self.descriptors_allocated.load(Ordering::SeqCst)
    }

    pub(crate) fn descriptors_freed(&self) -> usize {
        self.descriptors_freed.load(Ordering::SeqCst)
    }

    fn called(&self) {
        self.native_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Oci for StubOci {
    unsafe fn env_nls_create(&self, envhpp: *mut *mut OCIEnv, _mode: u32, _charset: u16, _ncharset: u16) -> i32 {
        self.called();
        if self.state.lock().fail_env_create {
            return OCI_ERROR;
        }
        *envhpp = self.new_ptr() as _;
        OCI_SUCCESS
    }

    unsafe fn handle_alloc(&self, _parenth: *const OCIEnv, hndlpp: *mut *mut c_void, _hndl_type: u32) -> i32 {
        self.called();
        if self.state.lock().fail_handle_alloc {
            return OCI_ERROR;
        }
        self.handles_allocated.fetch_add(1, Ordering::SeqCst);
        *hndlpp = self.new_ptr();
        OCI_SUCCESS
    }

    unsafe fn handle_free(&self, _hndlp: *mut c_void, _hnd_type: u32) -> i32 {
        self.called();
        self.handles_freed.fetch_add(1, Ordering::SeqCst);
        OCI_SUCCESS
    }

    unsafe fn descriptor_alloc(&self, _parenth: *const OCIEnv, descpp: *mut *mut c_void, _desc_type: u32) -> i32 {
        self.called();
        if self.state.lock().fail_descriptor_alloc {
            return OCI_ERROR;
        }
        self.descriptors_allocated.fetch_add(1, Ordering::SeqCst);
        *descpp = self.new_ptr();
        OCI_SUCCESS
    }

    unsafe fn descriptor_free(&self, _descp: *mut c_void, _desc_type: u32) -> i32 {
        self.called();
        self.descriptors_freed.fetch_add(1, Ordering::SeqCst);
        OCI_SUCCESS
    }

    unsafe fn attr_get(&self, trgthndlp: *const c_void, _trghndltyp: u32, attributep: *mut c_void, sizep: *mut u32, attrtype: u32, _errhp: *mut OCIError) -> i32 {
        self.called();
        let state = self.state.lock();
        if state.failing_attrs.contains(&attrtype) || state.missing_attrs.contains(&(trgthndlp as usize, attrtype)) {
            return OCI_ERROR;
        }
        if attrtype == OCI_ATTR_ERROR_IS_RECOVERABLE {
            *(attributep as *mut i32) = state.recoverable;
            return OCI_SUCCESS;
        }
        let value = state.attrs.get(&(trgthndlp as usize, attrtype));
        if is_text(attrtype) {
            let (text, len) = value.map_or((ptr::null(), 0), |value| (value.as_ptr(), value.len()));
            *(attributep as *mut *const u8) = text;
            if !sizep.is_null() {
                *sizep = len as u32;
            }
        } else {
            let width = width(attrtype);
            let dst = attributep as *mut u8;
            ptr::write_bytes(dst, 0, width);
            if let Some( value ) = value {
                ptr::copy_nonoverlapping(value.as_ptr(), dst, cmp::min(width, value.len()));
            }
            if !sizep.is_null() {
                *sizep = width as u32;
            }
        }
        OCI_SUCCESS
    }

    unsafe fn attr_set(&self, trgthndlp: *mut c_void, _trghndltyp: u32, attributep: *const c_void, size: u32, attrtype: u32, _errhp: *mut OCIError) -> i32 {
        self.called();
        let mut state = self.state.lock();
        if state.failing_attrs.contains(&attrtype) {
            return OCI_ERROR;
        }
        let len = if is_text(attrtype) { size as usize } else { width(attrtype) };
        let value = std::slice::from_raw_parts(attributep as *const u8, len);
        state.attrs.insert((trgthndlp as usize, attrtype), value.into());
        OCI_SUCCESS
    }

    unsafe fn param_get(&self, hndlp: *const c_void, _htype: u32, _errhp: *mut OCIError, parmdpp: *mut *mut c_void, pos: u32) -> i32 {
        self.called();
        let state = self.state.lock();
        if state.failing_params.contains(&pos) {
            return OCI_ERROR;
        }
        match state.params.get(&(hndlp as usize, pos)) {
            Some( &param ) => {
                *parmdpp = param as *mut c_void;
                OCI_SUCCESS
            }
            None => OCI_ERROR,
        }
    }

    unsafe fn error_get(&self, _hndlp: *const c_void, _recordno: u32, errcodep: *mut i32, bufp: *mut u8, bufsiz: u32, _hnd_type: u32) -> i32 {
        self.called();
        self.error_get_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if state.error_get_status != OCI_SUCCESS {
            return state.error_get_status;
        }
        let (code, message) = state.error.as_ref().map_or((0, &[][..]), |(code, message)| (*code, message.as_slice()));
        let len = cmp::min(message.len(), bufsiz as usize - 1);
        ptr::copy_nonoverlapping(message.as_ptr(), bufp, len);
        *bufp.add(len) = 0;
        *errcodep = code;
        OCI_SUCCESS
    }
}
