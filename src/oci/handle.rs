//! OCI handles.

use super::*;
use std::sync::Arc;
use log::debug;

pub(crate) trait HandleType : OCIStruct {
    fn get_type() -> u32;
}

macro_rules! impl_handle_type {
    ($($oci_handle:ty => $id:ident),+) => {
        $(
            impl HandleType for $oci_handle {
                fn get_type() -> u32 { $id }
            }
        )+
    };
}

impl_handle_type!{
    OCIEnv      => OCI_HTYPE_ENV,
    OCIError    => OCI_HTYPE_ERROR
}

/// Owner of a native handle. The handle is freed exactly once, when the owner is dropped.
pub(crate) struct Handle<T: HandleType> {
    ptr: Ptr<T>,
    oci: Arc<dyn Oci>,
}

impl<T: HandleType> Drop for Handle<T> {
    fn drop(&mut self) {
        let ptr = self.ptr.take();
        if !ptr.is_null() {
            let res = unsafe {
                self.oci.handle_free(ptr as _, T::get_type())
            };
            debug!("freed handle {:p} of type {} (status {})", ptr, T::get_type(), res);
        }
    }
}

impl<T: HandleType> Handle<T> {
    /// Allocates a new handle in the environment. Returns the native status on failure.
    pub(crate) fn alloc(env: &Handle<OCIEnv>) -> std::result::Result<Self, i32> {
        let oci = env.oci.clone();
        let mut handle_ptr = Ptr::<T>::null();
        let res = unsafe {
            oci.handle_alloc(env.get(), handle_ptr.as_mut_ptr() as _, T::get_type())
        };
        if res != OCI_SUCCESS {
            return Err(res);
        }
        if handle_ptr.is_null() {
            return Err(OCI_INVALID_HANDLE);
        }
        debug!("allocated handle {:?} of type {}", handle_ptr, T::get_type());
        Ok( Self { ptr: handle_ptr, oci } )
    }

    // Some handles (like OCIEnv) are allocated by their respective OCI*Create* APIs.
    // But we need to dispose of them (as handles) when it is time to drop them.
    pub(crate) fn from(handle_ptr: Ptr<T>, oci: Arc<dyn Oci>) -> Self {
        Self { ptr: handle_ptr, oci }
    }

    pub(crate) fn get(&self) -> *mut T {
        self.ptr.get()
    }

    pub(crate) fn oci(&self) -> &dyn Oci {
        self.oci.as_ref()
    }
}
