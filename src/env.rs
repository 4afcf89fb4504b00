//! OCI environment

use std::sync::Arc;
use parking_lot::Mutex;
use log::debug;

use crate::{Error, Result, err::{ErrorKind, DPI_CHARSET_NAME_UTF8, DPI_CHARSET_NAME_UTF16}, oci::*};

/// Client character set of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    AL32UTF8,
    UTF16,
    /// Any other Oracle character set, given by its id and an encoding name for messages.
    Other { id: u16, name: &'static str },
}

impl Charset {
    pub fn id(&self) -> u16 {
        match self {
            Charset::AL32UTF8 => AL32UTF8,
            Charset::UTF16    => OCI_UTF16ID,
            Charset::Other { id, .. } => *id,
        }
    }

    /// Name of the encoding reported with error messages.
    pub fn encoding(&self) -> &'static str {
        match self {
            Charset::AL32UTF8 => DPI_CHARSET_NAME_UTF8,
            Charset::UTF16    => DPI_CHARSET_NAME_UTF16,
            Charset::Other { name, .. } => *name,
        }
    }

    pub(crate) fn is_utf16(&self) -> bool {
        self.id() == OCI_UTF16ID
    }
}

/**
    Environment creation parameters.

    # Example

    ```
    use oradpi::{EnvConfig, Charset};

    let config = EnvConfig::default().charset(Charset::UTF16).threaded(false);
    assert_eq!(config.get_charset(), Charset::UTF16);
    ```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvConfig {
    charset: Charset,
    ncharset: Charset,
    threaded: bool,
    object: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            charset: Charset::AL32UTF8,
            ncharset: Charset::AL32UTF8,
            threaded: true,
            object: true,
        }
    }
}

impl EnvConfig {
    /// Sets the client character set.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the client national character set.
    pub fn ncharset(mut self, ncharset: Charset) -> Self {
        self.ncharset = ncharset;
        self
    }

    /// Whether the environment is used from several threads (`OCI_THREADED`).
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    /// Whether object types are used (`OCI_OBJECT`).
    pub fn object(mut self, object: bool) -> Self {
        self.object = object;
        self
    }

    pub fn get_charset(&self) -> Charset {
        self.charset
    }

    pub fn get_ncharset(&self) -> Charset {
        self.ncharset
    }

    pub(crate) fn mode(&self) -> u32 {
        let mut mode = OCI_DEFAULT;
        if self.threaded {
            mode |= OCI_THREADED;
        }
        if self.object {
            mode |= OCI_OBJECT;
        }
        mode
    }
}

/**
    Represents an OCI environment.

    Every handle created by the crate is tied to an environment, which routes its native calls
    and keeps the native environment handle alive.
*/
pub struct Environment {
    // Error handles must be freed before the environment handle they were allocated from.
    error_handles: Mutex<Vec<Handle<OCIError>>>,
    env: Handle<OCIEnv>,
    config: EnvConfig,
}

impl Environment {
    /**
        Creates a new environment that makes its native calls through `oci`.

        # Example

        ```ignore
        let env = Environment::with_native(Arc::new(ClientLib), EnvConfig::default())?;
        ```
    */
    pub fn with_native(oci: Arc<dyn Oci>, config: EnvConfig) -> Result<Arc<Self>> {
        let mut env = Ptr::<OCIEnv>::null();
        let res = unsafe {
            oci.env_nls_create(env.as_mut_ptr(), config.mode(), config.charset.id(), config.ncharset.id())
        };
        if res != OCI_SUCCESS || env.is_null() {
            return Err( Error::new("Environment::with_native", "create environment", ErrorKind::CreateEnv) );
        }
        debug!("created environment {:?} with charset {}", env, config.charset.id());
        let env = Handle::from(env, oci);
        Ok( Arc::new(Self { error_handles: Mutex::new(Vec::new()), env, config }) )
    }

    /// Creates a new environment with the default configuration using the linked client library.
    #[cfg(feature="link-oci")]
    #[cfg_attr(docsrs, doc(cfg(feature="link-oci")))]
    pub fn new() -> Result<Arc<Self>> {
        Self::with_config(EnvConfig::default())
    }

    /// Creates a new environment using the linked client library.
    #[cfg(feature="link-oci")]
    #[cfg_attr(docsrs, doc(cfg(feature="link-oci")))]
    pub fn with_config(config: EnvConfig) -> Result<Arc<Self>> {
        Self::with_native(Arc::new(ClientLib), config)
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn charset(&self) -> Charset {
        self.config.charset
    }

    pub(crate) fn oci(&self) -> &dyn Oci {
        self.env.oci()
    }

    pub(crate) fn env_ptr(&self) -> *mut OCIEnv {
        self.env.get()
    }

    /// Hands out a native error handle for the exclusive use of one error context.
    /// `None` when a new handle cannot be allocated.
    pub(crate) fn checkout_error_handle(&self) -> Option<Handle<OCIError>> {
        if let Some( handle ) = self.error_handles.lock().pop() {
            return Some(handle);
        }
        match Handle::<OCIError>::alloc(&self.env) {
            Ok( handle ) => Some(handle),
            Err( status ) => {
                debug!("cannot allocate error handle (status {})", status);
                None
            }
        }
    }

    pub(crate) fn checkin_error_handle(&self, handle: Handle<OCIError>) {
        self.error_handles.lock().push(handle);
    }

    /// Converts text into the client character set.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        if self.config.charset.is_utf16() {
            text.encode_utf16().flat_map(|unit| unit.to_ne_bytes()).collect()
        } else {
            text.as_bytes().to_vec()
        }
    }

    /// Converts text in the client character set into a string.
    pub(crate) fn decode(&self, bytes: &[u8]) -> String {
        if self.config.charset.is_utf16() {
            let units : Vec<u16> = bytes.chunks_exact(2).map(|pair| u16::from_ne_bytes([pair[0], pair[1]])).collect();
            String::from_utf16_lossy(&units)
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::StubOci;

    #[test]
    fn default_mode() {
        let config = EnvConfig::default();
        assert_eq!(config.mode(), OCI_THREADED | OCI_OBJECT);
        assert_eq!(config.threaded(false).object(false).mode(), OCI_DEFAULT);
    }

    #[test]
    fn creation_failure() {
        let stub = StubOci::new();
        stub.fail_env_create();
        let res = Environment::with_native(stub.clone(), EnvConfig::default());
        let err = res.err().expect("environment creation should fail");
        assert_eq!(err.kind(), Some(&ErrorKind::CreateEnv));
        assert_eq!(err.info().fn_name, "Environment::with_native");
    }

    #[test]
    fn error_handles_are_reused() {
        let stub = StubOci::new();
        let env = stub.env();

        let first = env.checkout_error_handle().expect("error handle");
        let first_ptr = first.get();
        env.checkin_error_handle(first);
        let second = env.checkout_error_handle().expect("error handle");
        assert_eq!(second.get(), first_ptr);

        let third = env.checkout_error_handle().expect("error handle");
        assert_ne!(third.get(), first_ptr);
        assert_eq!(stub.handles_allocated(), 2);
    }

    #[test]
    fn native_handles_are_freed_with_environment() {
        let stub = StubOci::new();
        let env = stub.env();
        let handle = env.checkout_error_handle().expect("error handle");
        env.checkin_error_handle(handle);
        drop(env);
        // the error handle and the environment handle
        assert_eq!(stub.handles_freed(), 2);
    }

    #[test]
    fn text_conversion() {
        let stub = StubOci::new();
        let env = stub.env_with(EnvConfig::default().charset(Charset::UTF16));
        let bytes = env.encode("AQ\u{e9}");
        assert_eq!(bytes.len(), 6);
        assert_eq!(env.decode(&bytes), "AQ\u{e9}");

        let env = stub.env();
        assert_eq!(env.encode("AQ\u{e9}"), "AQ\u{e9}".as_bytes());
    }
}
