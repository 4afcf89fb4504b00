//! OCI descriptors

use crate::{Result, Environment, conn::ConnData, err::{ErrorContext, ErrorKind}};
use super::*;
use std::sync::Arc;
use log::debug;

pub(crate) trait DescriptorType : OCIStruct {
    fn get_type() -> u32;
}

macro_rules! impl_descr_type {
    ($($oci_desc:ident => $id:ident),+) => {
        $(
            impl DescriptorType for $oci_desc {
                fn get_type() -> u32 { $id }
            }
        )+
    };
}

impl_descr_type!{
    OCIAQEnqOptions => OCI_DTYPE_AQENQ_OPTIONS
}

/**
    Single owner of a native descriptor.

    Descriptors can only be moved, never copied, and the native descriptor is released
    exactly once when its owner is dropped. The environment is kept alive for as long as
    the descriptor exists.
*/
pub(crate) struct Descriptor<T: DescriptorType> {
    ptr: Ptr<T>,
    env: Arc<Environment>,
}

impl<T: DescriptorType> Drop for Descriptor<T> {
    fn drop(&mut self) {
        let ptr = self.ptr.take();
        if !ptr.is_null() {
            let res = unsafe {
                self.env.oci().descriptor_free(ptr as _, T::get_type())
            };
            debug!("freed descriptor {:p} of type {} (status {})", ptr, T::get_type(), res);
        }
    }
}

impl<T: DescriptorType> Descriptor<T> {
    pub(crate) fn new(env: &Arc<Environment>, ctx: &mut ErrorContext, conn: Option<&ConnData>) -> Result<Self> {
        let mut desc = Ptr::<T>::null();
        let res = unsafe {
            env.oci().descriptor_alloc(env.env_ptr(), desc.as_mut_ptr() as _, T::get_type())
        };
        ctx.check(res, conn, "allocate descriptor")?;
        if desc.is_null() {
            return Err( ctx.set("allocate descriptor", ErrorKind::NullHandle("descriptor")) );
        }
        debug!("allocated descriptor {:?} of type {}", desc, T::get_type());
        Ok( Self { ptr: desc, env: env.clone() } )
    }

    pub(crate) fn get(&self) -> *mut T {
        self.ptr.get()
    }

    pub(crate) fn get_attr<V: attr::AttrGet>(&self, attr_type: u32, ctx: &mut ErrorContext, conn: Option<&ConnData>, action: &'static str) -> Result<V> {
        attr::get::<V>(ctx, conn, self.get() as _, T::get_type(), attr_type, action)
    }

    pub(crate) fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V, ctx: &mut ErrorContext, conn: Option<&ConnData>, action: &'static str) -> Result<()> {
        attr::set::<V>(ctx, conn, self.get() as _, T::get_type(), attr_type, attr_val, action)
    }
}
