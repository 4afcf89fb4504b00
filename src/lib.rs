//! Reference-counted handles and structured error reporting over the Oracle Call Interface.
//!
//! Every resource the crate hands out (connections, object types and their attributes,
//! AQ enqueue options) is a generic handle: a small `Copy` id into a process-wide table of
//! reference-counted entries. A handle stays valid until its last reference is released.
//! Using it after that fails with an "invalid handle" error and never reaches the native
//! library.
//!
//! Native calls go through the [`oci::Oci`] trait. With the `link-oci` feature the crate
//! links `libclntsh` and provides [`oci::ClientLib`], which implements it.
//!
//! ```ignore
//! use oradpi::{Connection, Visibility, MessageDeliveryMode};
//!
//! let env = oradpi::env()?;
//! let conn = Connection::new(&env)?;
//! let opts = conn.new_enq_options()?;
//! opts.set_visibility(Visibility::Immediate)?;
//! opts.set_delivery_mode(MessageDeliveryMode::Buffered)?;
//! // ...
//! opts.release()?;
//! conn.release()?;
//! ```
//!
//! Failures carry a structured [`ErrorInfo`]. When a native error says the session is gone
//! the connection is flagged, which [`Connection::should_drop_session`] reports.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod oci;
mod err;
mod env;
#[macro_use]
mod gen;
mod conn;
mod types;
mod enq_options;
mod object_type;
mod object_attr;

#[cfg(test)]
mod test;

pub use err::{Error, ErrorInfo, ErrorKind};
pub use env::{Environment, EnvConfig, Charset};
pub use gen::{HandleId, HandleKind};
pub use conn::Connection;
pub use enq_options::{EnqOptions, Visibility, MessageDeliveryMode};
pub use object_type::{ObjectType, ObjectTypeInfo};
pub use object_attr::{ObjectAttr, ObjectAttrInfo};
pub use types::{OracleTypeNum, NativeTypeNum};

pub type Result<T> = std::result::Result<T, Error>;

/**
    Returns a new environment that uses the linked Oracle client library.

    While there can be multiple environments, most applications most likely will
    need only one. It might be created once and shared:

    ```ignore
    use oradpi::{Environment, Result};
    use once_cell::sync::OnceCell;
    use std::sync::Arc;

    fn oracle() -> Result<&'static Arc<Environment>> {
        static OCI_ENV: OnceCell<Arc<Environment>> = OnceCell::new();
        OCI_ENV.get_or_try_init(oradpi::env)
    }
    ```
*/
#[cfg(feature="link-oci")]
#[cfg_attr(docsrs, doc(cfg(feature="link-oci")))]
pub fn env() -> Result<std::sync::Arc<Environment>> {
    Environment::new()
}
