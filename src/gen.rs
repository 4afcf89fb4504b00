//! Generic handles
//!
//! Every resource handed out to callers lives in a process-wide arena of tagged, reference
//! counted entries. Callers hold a [`HandleId`], which is an arena index plus the generation
//! of the slot at the time the entry was stored. Destroying an entry bumps its slot's
//! generation, so an id that outlived its entry is recognized as invalid without ever
//! reaching the entry's native resources.

use std::{fmt, mem, ops::Deref, ptr, sync::{Arc, atomic::{AtomicU32, Ordering}}};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use log::{debug, trace, error};

use crate::{
    Environment, Error, Result,
    err::{ErrorContext, ErrorKind},
    conn::ConnData,
    object_type::ObjectTypeData,
    object_attr::ObjectAttrData,
    enq_options::EnqOptionsData,
};

/// Kind of resource a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Connection,
    ObjectType,
    ObjectAttr,
    EnqOptions,
}

impl HandleKind {
    pub fn name(&self) -> &'static str {
        match self {
            HandleKind::Connection => "Connection",
            HandleKind::ObjectType => "ObjectType",
            HandleKind::ObjectAttr => "ObjectAttr",
            HandleKind::EnqOptions => "EnqOptions",
        }
    }
}

/// Identifies a generic handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId {
    index: u32,
    generation: u32,
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

pub(crate) enum Object {
    Connection(Arc<ConnData>),
    ObjectType(Arc<ObjectTypeData>),
    ObjectAttr(Arc<ObjectAttrData>),
    EnqOptions(Arc<EnqOptionsData>),
}

impl Object {
    fn kind(&self) -> HandleKind {
        match self {
            Object::Connection(_) => HandleKind::Connection,
            Object::ObjectType(_) => HandleKind::ObjectType,
            Object::ObjectAttr(_) => HandleKind::ObjectAttr,
            Object::EnqOptions(_) => HandleKind::EnqOptions,
        }
    }
}

/// Kind-specific data stored in a generic handle.
///
/// The data's `Drop` is the kind's destructor. It releases the native resources the data
/// owns and the references it holds to other handles.
pub(crate) trait Resource : Sized + Send + Sync + 'static {
    const KIND: HandleKind;
    fn into_object(data: Arc<Self>) -> Object;
    fn from_object(object: &Object) -> Option<Arc<Self>>;
}

macro_rules! impl_resource {
    ($($data:ty => $kind:ident),+) => {
        $(
            impl Resource for $data {
                const KIND: HandleKind = HandleKind::$kind;

                fn into_object(data: Arc<Self>) -> Object {
                    Object::$kind(data)
                }

                fn from_object(object: &Object) -> Option<Arc<Self>> {
                    match object {
                        Object::$kind(data) => Some(data.clone()),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_resource!{
    ConnData        => Connection,
    ObjectTypeData  => ObjectType,
    ObjectAttrData  => ObjectAttr,
    EnqOptionsData  => EnqOptions
}

struct Generic {
    ref_count: AtomicU32,
    env: Arc<Environment>,
    object: Object,
}

impl Generic {
    /// Applies `delta` to the reference count unless the count already reached 0.
    /// Returns the new count, or `None` when the change was refused.
    fn update_ref_count(&self, delta: i32) -> Option<u32> {
        let res = self.ref_count.fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
            if count == 0 {
                None
            } else if delta >= 0 {
                count.checked_add(delta as u32)
            } else {
                count.checked_sub(delta.unsigned_abs())
            }
        });
        res.ok().map(|prev| {
            if delta >= 0 { prev + delta as u32 } else { prev - delta.unsigned_abs() }
        })
    }
}

struct Slot {
    generation: u32,
    entry: Option<Arc<Generic>>,
}

struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Arena {
    fn get(&self, id: HandleId) -> Option<Arc<Generic>> {
        self.slots.get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.clone())
    }

    /// Stores the entry. Hands it back when the arena cannot grow.
    fn insert(&mut self, entry: Arc<Generic>) -> std::result::Result<HandleId, Arc<Generic>> {
        if let Some( index ) = self.free.pop() {
            if let Some( slot ) = self.slots.get_mut(index as usize) {
                slot.entry = Some(entry);
                return Ok( HandleId { index, generation: slot.generation } );
            }
        }
        let index = self.slots.len();
        if index >= u32::MAX as usize || self.slots.try_reserve(1).is_err() || self.free.try_reserve(index + 1).is_err() {
            return Err(entry);
        }
        self.slots.push(Slot { generation: 0, entry: Some(entry) });
        Ok( HandleId { index: index as u32, generation: 0 } )
    }

    /// Removes the entry and retires its id.
    fn detach(&mut self, id: HandleId) -> Option<Arc<Generic>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        entry
    }
}

static ARENA : Lazy<RwLock<Arena>> = Lazy::new(|| RwLock::new(Arena { slots: Vec::new(), free: Vec::new() }));

fn invalid_handle(kind: HandleKind, fn_name: &'static str) -> Error {
    Error::new(fn_name, "check handle", ErrorKind::InvalidHandle(kind.name()))
}

/// Finds a live entry of the expected kind.
fn lookup(id: HandleId, kind: HandleKind, fn_name: &'static str) -> Result<Arc<Generic>> {
    let entry = ARENA.read().get(id).ok_or_else(|| invalid_handle(kind, fn_name))?;
    if entry.ref_count.load(Ordering::Acquire) == 0 {
        return Err( invalid_handle(kind, fn_name) );
    }
    let found = entry.object.kind();
    if found != kind {
        return Err( Error::new(fn_name, "check handle", ErrorKind::WrongHandleKind { expected: kind.name(), found: found.name() }) );
    }
    Ok( entry )
}

/// Runs the destructor of an entry whose count dropped to 0.
fn destroy(id: HandleId, entry: Arc<Generic>) {
    let kind = entry.object.kind();
    drop(entry);
    // The detached entry must be dropped after the arena lock is released as its
    // destructor releases other handles.
    let detached = ARENA.write().detach(id);
    debug!("destroyed {} handle {}", kind.name(), id);
    drop(detached);
}

/// Stores new resource data. The returned reference holds the initial count of 1.
pub(crate) fn allocate<T: Resource>(env: &Arc<Environment>, data: T, fn_name: &'static str) -> Result<OwnedRef<T>> {
    let data = Arc::new(data);
    let entry = Arc::new(Generic {
        ref_count: AtomicU32::new(1),
        env: env.clone(),
        object: T::into_object(data.clone()),
    });
    let res = ARENA.write().insert(entry);
    match res {
        Ok( id ) => {
            debug!("allocated {} handle {}", T::KIND.name(), id);
            Ok( OwnedRef { id, data } )
        }
        Err( entry ) => {
            drop(entry);
            Err( Error::new(fn_name, "allocate handle", ErrorKind::NoMemory) )
        }
    }
}

/// Adds a reference to a handle of the given kind.
pub(crate) fn add_ref(id: HandleId, kind: HandleKind, fn_name: &'static str) -> Result<()> {
    let entry = lookup(id, kind, fn_name)?;
    match entry.update_ref_count(1) {
        Some( count ) => {
            trace!("{}: {} handle {} ref count {}", fn_name, kind.name(), id, count);
            Ok(())
        }
        None => Err( invalid_handle(kind, fn_name) ),
    }
}

/// Releases a reference to a handle of the given kind. The last release destroys the handle.
pub(crate) fn release(id: HandleId, kind: HandleKind, fn_name: &'static str) -> Result<()> {
    let entry = lookup(id, kind, fn_name)?;
    match entry.update_ref_count(-1) {
        Some( 0 ) => {
            trace!("{}: {} handle {} ref count 0", fn_name, kind.name(), id);
            destroy(id, entry);
            Ok(())
        }
        Some( count ) => {
            trace!("{}: {} handle {} ref count {}", fn_name, kind.name(), id, count);
            Ok(())
        }
        None => Err( invalid_handle(kind, fn_name) ),
    }
}

/// Changes the reference count of a handle of any kind. For references between handles.
pub(crate) fn set_ref_count(id: HandleId, delta: i32) -> Result<()> {
    const FN_NAME : &str = "set_ref_count";
    let entry = ARENA.read().get(id);
    let entry = match entry {
        Some( entry ) => entry,
        None => return Err( Error::new(FN_NAME, "check handle", ErrorKind::InvalidHandle("generic")) ),
    };
    let kind = entry.object.kind();
    match entry.update_ref_count(delta) {
        Some( 0 ) => {
            trace!("{} handle {} ref count 0", kind.name(), id);
            destroy(id, entry);
            Ok(())
        }
        Some( count ) => {
            trace!("{} handle {} ref count {}", kind.name(), id, count);
            Ok(())
        }
        None => Err( invalid_handle(kind, FN_NAME) ),
    }
}

/**
    Entry guard of every public operation.

    Validates the handle and returns its data together with a fresh error context scoped to
    the handle's environment. Nothing native is called when validation fails.
*/
pub(crate) fn start_public_fn<T: Resource>(id: HandleId, fn_name: &'static str) -> Result<(Arc<T>, ErrorContext)> {
    let entry = lookup(id, T::KIND, fn_name)?;
    let data = T::from_object(&entry.object).ok_or_else(|| invalid_handle(T::KIND, fn_name))?;
    let ctx = ErrorContext::new(&entry.env, fn_name);
    Ok( (data, ctx) )
}

/// Takes a counted reference to another handle.
pub(crate) fn retain<T: Resource>(id: HandleId, fn_name: &'static str) -> Result<OwnedRef<T>> {
    let entry = lookup(id, T::KIND, fn_name)?;
    let data = T::from_object(&entry.object).ok_or_else(|| invalid_handle(T::KIND, fn_name))?;
    if entry.update_ref_count(1).is_none() {
        return Err( invalid_handle(T::KIND, fn_name) );
    }
    trace!("{}: retained {} handle {}", fn_name, T::KIND.name(), id);
    Ok( OwnedRef { id, data } )
}

/// Current reference count. `None` once the handle is destroyed.
#[cfg(test)]
pub(crate) fn ref_count(id: HandleId) -> Option<u32> {
    ARENA.read().get(id).map(|entry| entry.ref_count.load(Ordering::Acquire))
}

/// A counted reference to a handle. Dropping it releases the reference.
pub(crate) struct OwnedRef<T: Resource> {
    id: HandleId,
    data: Arc<T>,
}

impl<T: Resource> OwnedRef<T> {
    pub(crate) fn handle(&self) -> HandleId {
        self.id
    }

    /// Hands the reference over to the caller, who is now responsible for releasing it.
    pub(crate) fn into_handle(self) -> HandleId {
        let mut this = mem::ManuallyDrop::new(self);
        let id = this.id;
        unsafe { ptr::drop_in_place(&mut this.data) };
        id
    }
}

impl<T: Resource> Deref for OwnedRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: Resource> Drop for OwnedRef<T> {
    fn drop(&mut self) {
        if let Err( err ) = set_ref_count(self.id, -1) {
            error!("cannot release {} handle {}: {}", T::KIND.name(), self.id, err);
        }
    }
}

/// Implements the reference counting part of a public handle wrapper.
macro_rules! impl_generic_handle {
    ($wrapper:ident, $data:ty) => {
        impl $wrapper {
            /// Adds a reference to the handle. Each added reference must be released with [`release`](Self::release).
            pub fn add_ref(&self) -> $crate::Result<()> {
                $crate::gen::add_ref(self.0, <$data as $crate::gen::Resource>::KIND, concat!(stringify!($wrapper), "::add_ref"))
            }

            /// Releases a reference to the handle. The handle is destroyed when its last reference is released.
            pub fn release(&self) -> $crate::Result<()> {
                $crate::gen::release(self.0, <$data as $crate::gen::Resource>::KIND, concat!(stringify!($wrapper), "::release"))
            }

            /// Returns the generic id of the handle.
            pub fn handle(&self) -> $crate::HandleId {
                self.0
            }

            /// Wraps a generic id. Does not add a reference.
            pub fn from_handle(id: $crate::HandleId) -> Self {
                Self(id)
            }
        }
    };
}
