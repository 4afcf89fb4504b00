//! AQ enqueue options

use std::convert::TryFrom;
use crate::{
    Connection, Result,
    conn::ConnData,
    err::ErrorKind,
    gen::{self, HandleId, OwnedRef},
    oci::*,
};

/// When an enqueued message becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The enqueue is its own transaction.
    Immediate,
    /// The enqueue is part of the current transaction.
    OnCommit,
}

impl Visibility {
    fn to_native(self) -> u32 {
        match self {
            Visibility::Immediate => OCI_ENQ_IMMEDIATE,
            Visibility::OnCommit  => OCI_ENQ_ON_COMMIT,
        }
    }
}

impl TryFrom<u32> for Visibility {
    type Error = ErrorKind;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            OCI_ENQ_IMMEDIATE => Ok(Visibility::Immediate),
            OCI_ENQ_ON_COMMIT => Ok(Visibility::OnCommit),
            _ => Err(ErrorKind::InvalidEnumValue { name: "Visibility", value }),
        }
    }
}

/// How messages are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDeliveryMode {
    Persistent,
    Buffered,
    PersistentOrBuffered,
}

impl MessageDeliveryMode {
    fn to_native(self) -> u16 {
        match self {
            MessageDeliveryMode::Persistent           => OCI_MSG_PERSISTENT,
            MessageDeliveryMode::Buffered             => OCI_MSG_BUFFERED,
            MessageDeliveryMode::PersistentOrBuffered => OCI_MSG_PERSISTENT_OR_BUFFERED,
        }
    }
}

impl TryFrom<u16> for MessageDeliveryMode {
    type Error = ErrorKind;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        match value {
            OCI_MSG_PERSISTENT             => Ok(MessageDeliveryMode::Persistent),
            OCI_MSG_BUFFERED               => Ok(MessageDeliveryMode::Buffered),
            OCI_MSG_PERSISTENT_OR_BUFFERED => Ok(MessageDeliveryMode::PersistentOrBuffered),
            _ => Err(ErrorKind::InvalidEnumValue { name: "MessageDeliveryMode", value: value as u32 }),
        }
    }
}

pub(crate) struct EnqOptionsData {
    // The descriptor must be freed before the connection is released.
    handle: Descriptor<OCIAQEnqOptions>,
    conn: OwnedRef<ConnData>,
}

impl EnqOptionsData {
    fn conn(&self) -> Option<&ConnData> {
        Some(&*self.conn)
    }
}

/**
    Options of an AQ enqueue operation.

    The options keep their connection alive until they are destroyed.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnqOptions(HandleId);

impl_generic_handle!(EnqOptions, EnqOptionsData);

impl EnqOptions {
    /// Creates new enqueue options for the connection.
    pub fn create(conn: Connection) -> Result<Self> {
        const FN_NAME : &str = "Connection::new_enq_options";
        let (_, mut ctx) = gen::start_public_fn::<ConnData>(conn.handle(), FN_NAME)?;
        let conn = gen::retain::<ConnData>(conn.handle(), FN_NAME)?;
        let env = ctx.env().clone();
        let handle = Descriptor::new(&env, &mut ctx, Some(&*conn))?;
        let opts = gen::allocate(&env, EnqOptionsData { handle, conn }, FN_NAME)?;
        Ok( Self(opts.into_handle()) )
    }

    /// Returns the transformation applied to messages before they are enqueued, if any.
    pub fn transformation(&self) -> Result<Option<String>> {
        let (opts, mut ctx) = gen::start_public_fn::<EnqOptionsData>(self.0, "EnqOptions::transformation")?;
        let bytes : Vec<u8> = opts.handle.get_attr(OCI_ATTR_TRANSFORMATION, &mut ctx, opts.conn(), "get attribute value")?;
        if bytes.is_empty() {
            Ok( None )
        } else {
            Ok( Some(ctx.env().decode(&bytes)) )
        }
    }

    /// Sets the transformation applied to messages before they are enqueued.
    pub fn set_transformation(&self, transformation: &str) -> Result<()> {
        let (opts, mut ctx) = gen::start_public_fn::<EnqOptionsData>(self.0, "EnqOptions::set_transformation")?;
        let bytes = ctx.env().encode(transformation);
        opts.handle.set_attr(OCI_ATTR_TRANSFORMATION, bytes.as_slice(), &mut ctx, opts.conn(), "set attribute value")
    }

    pub fn visibility(&self) -> Result<Visibility> {
        let (opts, mut ctx) = gen::start_public_fn::<EnqOptionsData>(self.0, "EnqOptions::visibility")?;
        let value : u32 = opts.handle.get_attr(OCI_ATTR_VISIBILITY, &mut ctx, opts.conn(), "get attribute value")?;
        Visibility::try_from(value).map_err(|kind| ctx.set("convert visibility", kind))
    }

    pub fn set_visibility(&self, visibility: Visibility) -> Result<()> {
        let (opts, mut ctx) = gen::start_public_fn::<EnqOptionsData>(self.0, "EnqOptions::set_visibility")?;
        opts.handle.set_attr(OCI_ATTR_VISIBILITY, visibility.to_native(), &mut ctx, opts.conn(), "set attribute value")
    }

    pub fn delivery_mode(&self) -> Result<MessageDeliveryMode> {
        let (opts, mut ctx) = gen::start_public_fn::<EnqOptionsData>(self.0, "EnqOptions::delivery_mode")?;
        let value : u16 = opts.handle.get_attr(OCI_ATTR_MSG_DELIVERY_MODE, &mut ctx, opts.conn(), "get attribute value")?;
        MessageDeliveryMode::try_from(value).map_err(|kind| ctx.set("convert delivery mode", kind))
    }

    pub fn set_delivery_mode(&self, mode: MessageDeliveryMode) -> Result<()> {
        let (opts, mut ctx) = gen::start_public_fn::<EnqOptionsData>(self.0, "EnqOptions::set_delivery_mode")?;
        opts.handle.set_attr(OCI_ATTR_MSG_DELIVERY_MODE, mode.to_native(), &mut ctx, opts.conn(), "set attribute value")
    }
}
