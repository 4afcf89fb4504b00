//! Database connection

use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use crate::{Environment, Result, EnqOptions, gen::{self, HandleId}};

/// Connection state shared by the handles that were created from the connection.
pub(crate) struct ConnData {
    drop_session: AtomicBool,
}

impl ConnData {
    pub(crate) fn new() -> Self {
        Self { drop_session: AtomicBool::new(false) }
    }

    pub(crate) fn is_marked_for_drop(&self) -> bool {
        self.drop_session.load(Ordering::Acquire)
    }

    /// Flags the session as unusable. It must not be returned to a pool.
    pub(crate) fn mark_for_drop(&self) {
        self.drop_session.store(true, Ordering::Release);
    }
}

/**
    Represents a connection to a database.

    A `Connection` is a reference-counted generic handle. Copying it does not add a
    reference; the caller that created it owns one reference and must release it.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection(HandleId);

impl_generic_handle!(Connection, ConnData);

impl Connection {
    /// Creates a new connection handle in the environment.
    pub fn new(env: &Arc<Environment>) -> Result<Self> {
        let conn = gen::allocate(env, ConnData::new(), "Connection::new")?;
        Ok( Self(conn.into_handle()) )
    }

    /**
        Reports whether the session was found unusable by a failed native call made
        through this connection or any handle created from it.
    */
    pub fn should_drop_session(&self) -> Result<bool> {
        let (conn, _ctx) = gen::start_public_fn::<ConnData>(self.0, "Connection::should_drop_session")?;
        Ok( conn.is_marked_for_drop() )
    }

    /// Creates new AQ enqueue options.
    pub fn new_enq_options(&self) -> Result<EnqOptions> {
        EnqOptions::create(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::StubOci;

    #[test]
    fn drop_flag() {
        let conn = ConnData::new();
        assert!(!conn.is_marked_for_drop());
        conn.mark_for_drop();
        assert!(conn.is_marked_for_drop());
    }

    #[test]
    fn new_connection_is_healthy() -> Result<()> {
        let stub = StubOci::new();
        let env = stub.env();
        let conn = Connection::new(&env)?;
        assert_eq!(gen::ref_count(conn.handle()), Some(1));
        assert!(!conn.should_drop_session()?);

        conn.add_ref()?;
        assert_eq!(gen::ref_count(conn.handle()), Some(2));
        conn.release()?;
        conn.release()?;
        assert_eq!(gen::ref_count(conn.handle()), None);
        Ok(())
    }
}
