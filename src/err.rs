//! Error reporting
//!
//! Every public call owns an [`ErrorContext`] for its duration. Native call statuses are
//! routed through [`ErrorContext::check`], which fills the context's buffer from the native
//! error handle, and internally detected problems through [`ErrorContext::set`]. Either way
//! the caller receives an [`Error`] carrying a snapshot of the buffer.

use crate::{Environment, conn::ConnData, oci::*};
use std::{cmp, fmt, io, ptr, sync::Arc};
use log::warn;

pub(crate) const DPI_CHARSET_NAME_UTF8  : &str = "UTF-8";
pub(crate) const DPI_CHARSET_NAME_UTF16 : &str = "UTF-16";

/// Errors detected by the crate itself, before or instead of calling the native library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("DPI-1000: no error")]
    NoError,
    #[error("DPI-1001: out of memory")]
    NoMemory,
    #[error("DPI-1002: invalid {0} handle")]
    InvalidHandle(&'static str),
    #[error("DPI-1003: OCI error handle is not initialized")]
    ErrNotInitialized,
    #[error("DPI-1004: unable to get error message")]
    GetFailed,
    #[error("DPI-1005: unable to acquire Oracle environment handle")]
    CreateEnv,
    #[error("DPI-1006: expected {expected} handle but got {found} handle")]
    WrongHandleKind { expected: &'static str, found: &'static str },
    #[error("DPI-1007: OCI returned a null {0}")]
    NullHandle(&'static str),
    #[error("DPI-1045: invalid value for enumeration {name}: {value}")]
    InvalidEnumValue { name: &'static str, value: u32 },
    #[error("DPI-1070: object type {0} was not described")]
    NotDescribed(String),
}

impl ErrorKind {
    /// Returns the number of the error within the crate's own taxonomy.
    pub fn number(&self) -> u32 {
        match self {
            ErrorKind::NoError                  => 1000,
            ErrorKind::NoMemory                 => 1001,
            ErrorKind::InvalidHandle(_)         => 1002,
            ErrorKind::ErrNotInitialized        => 1003,
            ErrorKind::GetFailed                => 1004,
            ErrorKind::CreateEnv                => 1005,
            ErrorKind::WrongHandleKind { .. }   => 1006,
            ErrorKind::NullHandle(_)            => 1007,
            ErrorKind::InvalidEnumValue { .. }  => 1045,
            ErrorKind::NotDescribed(_)          => 1070,
        }
    }
}

/// Structured description of the last failure.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Native (ORA-) error code, 0 for errors detected by the crate itself.
    pub code: i32,
    pub offset: u16,
    pub message: String,
    /// Encoding the native library used for the message.
    pub encoding: &'static str,
    /// Public function that failed.
    pub fn_name: &'static str,
    /// Operation that was attempted when the failure occurred.
    pub action: &'static str,
    /// Five character SQLSTATE-like classification.
    pub sql_state: &'static str,
    /// Whether the failure can be recovered from (Transaction Guard).
    pub is_recoverable: bool,
    pub kind: Option<ErrorKind>,
}

impl ErrorInfo {
    /// Number of the crate's own error kind, 0 for native errors.
    pub fn dpi_error_num(&self) -> u32 {
        self.kind.as_ref().map_or(0, ErrorKind::number)
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Represents possible errors returned from oradpi
#[derive(Debug, Clone, thiserror::Error)]
#[error("{info}")]
pub struct Error {
    info: Box<ErrorInfo>
}

impl cmp::PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.info.code == other.info.code && self.info.kind == other.info.kind
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl From<ErrorInfo> for Error {
    fn from(info: ErrorInfo) -> Self {
        Error { info: Box::new(info) }
    }
}

impl Error {
    /// Builds an error that never reached the native library.
    pub(crate) fn new(fn_name: &'static str, action: &'static str, kind: ErrorKind) -> Self {
        let mut buffer = ErrorBuffer::new(fn_name);
        buffer.set(action, kind);
        Error::from(buffer.info())
    }

    /// Returns the structured error information.
    pub fn info(&self) -> &ErrorInfo {
        &self.info
    }

    pub fn code(&self) -> i32 {
        self.info.code
    }

    pub fn sql_state(&self) -> &'static str {
        self.info.sql_state
    }

    pub fn is_recoverable(&self) -> bool {
        self.info.is_recoverable
    }

    pub fn kind(&self) -> Option<&ErrorKind> {
        self.info.kind.as_ref()
    }
}

/// Native error codes after which the session cannot be used anymore.
pub(crate) fn is_session_fatal(code: i32) -> bool {
    matches!(code,
           22 // invalid session ID; access denied
        |  28 // your session has been killed
        |  31 // your session has been marked for kill
        |  45 // your session has been terminated with no replay
        | 378 // buffer pools cannot be created as specified
        | 602 // internal programming exception
        | 603 // ORACLE server session terminated by fatal error
        | 609 // could not attach to incoming connection
        | 1012 // not logged on
        | 1041 // internal error. hostdef extension doesn't exist
        | 1043 // user side memory corruption
        | 1089 // immediate shutdown or close in progress
        | 1092 // ORACLE instance terminated. Disconnection forced
        | 2396 // exceeded maximum idle time, please connect again
        | 3113 // end-of-file on communication channel
        | 3114 // not connected to ORACLE
        | 3122 // attempt to close ORACLE-side window on user side
        | 3135 // connection lost contact
        | 12153 // TNS:not connected
        | 12537 // TNS:connection closed
        | 12547 // TNS:lost contact
        | 12570 // TNS:packet reader failure
        | 12583 // TNS:no reader
        | 27146 // post/wait initialization failed
        | 28511 // lost RPC connection
    )
}

pub(crate) fn sql_state(code: i32, kind: Option<&ErrorKind>) -> &'static str {
    match code {
        12154 => "42S02", // TNS:could not resolve the connect identifier specified
        22 | 378 | 602 | 603 | 604 | 609 | 1012 | 1033 | 1041 | 1043 | 1089 | 1090 | 1092
        | 3113 | 3114 | 3122 | 3135 | 12153 | 27146 | 28511 => "01002",
        0 if kind.is_none() => "00000",
        _ => "HY000",
    }
}

fn is_c_space(c: u16) -> bool {
    matches!(c, 0x20 | 0x09..=0x0d)
}

/// Length in bytes of a UTF-16 message without its trailing whitespace.
/// Scanning stops at the first 0 code unit.
pub(crate) fn utf16_message_length(buf: &[u8]) -> u32 {
    let mut num_chars = 0;
    let units = buf.chunks_exact(2).map(|pair| u16::from_ne_bytes([pair[0], pair[1]]));
    for (i, unit) in units.enumerate() {
        if unit == 0 {
            break;
        }
        if unit > 127 || !is_c_space(unit) {
            num_chars = i + 1;
        }
    }
    (num_chars * 2) as u32
}

/// Length of a NUL-terminated single-byte message without its trailing whitespace.
/// The first byte is never trimmed.
pub(crate) fn text_message_length(buf: &[u8]) -> u32 {
    let mut len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    while len > 1 && is_c_space(buf[len - 1] as u16) {
        len -= 1;
    }
    len as u32
}

/// The last error of one error context. Overwritten by every failing call.
pub(crate) struct ErrorBuffer {
    pub(crate) code: i32,
    pub(crate) offset: u16,
    pub(crate) message: [u8; OCI_ERROR_MAXMSG_SIZE],
    pub(crate) message_length: u32,
    pub(crate) is_recoverable: bool,
    pub(crate) encoding: &'static str,
    pub(crate) fn_name: &'static str,
    pub(crate) action: &'static str,
    pub(crate) kind: Option<ErrorKind>,
}

impl ErrorBuffer {
    pub(crate) fn new(fn_name: &'static str) -> Box<Self> {
        Box::new(Self {
            code: 0,
            offset: 0,
            message: [0; OCI_ERROR_MAXMSG_SIZE],
            message_length: 0,
            is_recoverable: false,
            encoding: DPI_CHARSET_NAME_UTF8,
            fn_name,
            action: "",
            kind: None,
        })
    }

    fn reset(&mut self) {
        self.code = 0;
        self.offset = 0;
        self.message[0] = 0;
        self.message_length = 0;
        self.is_recoverable = false;
        self.encoding = DPI_CHARSET_NAME_UTF8;
        self.action = "";
        self.kind = None;
    }

    fn set(&mut self, action: &'static str, kind: ErrorKind) {
        self.code = 0;
        self.offset = 0;
        self.is_recoverable = false;
        self.encoding = DPI_CHARSET_NAME_UTF8;
        self.action = action;

        let text = kind.to_string();
        let mut len = cmp::min(text.len(), self.message.len() - 1);
        while !text.is_char_boundary(len) {
            len -= 1;
        }
        self.message[..len].copy_from_slice(&text.as_bytes()[..len]);
        self.message[len] = 0;
        self.message_length = len as u32;
        self.kind = Some(kind);
    }

    fn message_text(&self) -> String {
        let bytes = &self.message[..self.message_length as usize];
        if self.encoding == DPI_CHARSET_NAME_UTF16 {
            let units : Vec<u16> = bytes.chunks_exact(2).map(|pair| u16::from_ne_bytes([pair[0], pair[1]])).collect();
            String::from_utf16_lossy(&units)
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    pub(crate) fn info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code,
            offset: self.offset,
            message: self.message_text(),
            encoding: self.encoding,
            fn_name: self.fn_name,
            action: self.action,
            sql_state: sql_state(self.code, self.kind.as_ref()),
            is_recoverable: self.is_recoverable,
            kind: self.kind.clone(),
        }
    }
}

/**
    Error state of a single public call.

    A context is never shared between calls or threads. It borrows a native error handle from
    the environment for its lifetime and returns it when dropped.
*/
pub(crate) struct ErrorContext {
    buffer: Box<ErrorBuffer>,
    handle: Option<Handle<OCIError>>,
    env: Arc<Environment>,
}

impl Drop for ErrorContext {
    fn drop(&mut self) {
        if let Some( handle ) = self.handle.take() {
            self.env.checkin_error_handle(handle);
        }
    }
}

impl ErrorContext {
    pub(crate) fn new(env: &Arc<Environment>, fn_name: &'static str) -> Self {
        Self {
            buffer: ErrorBuffer::new(fn_name),
            handle: env.checkout_error_handle(),
            env: env.clone(),
        }
    }

    pub(crate) fn env(&self) -> &Arc<Environment> {
        &self.env
    }

    pub(crate) fn oci(&self) -> &dyn Oci {
        self.env.oci()
    }

    /// Native error handle to pass to OCI calls, null when none could be allocated.
    pub(crate) fn error_handle(&self) -> *mut OCIError {
        self.handle.as_ref().map_or(ptr::null_mut(), |handle| handle.get())
    }

    /**
        Checks the status of the last native call. Success (with or without info) clears the
        buffer. Anything else fills the buffer and fails. When `conn` is given and the native
        error code says the session is gone, the connection is flagged to be dropped.
    */
    pub(crate) fn check(&mut self, status: i32, conn: Option<&ConnData>, action: &'static str) -> crate::Result<()> {
        if status == OCI_SUCCESS || status == OCI_SUCCESS_WITH_INFO {
            self.buffer.reset();
            return Ok(());
        }
        if status == OCI_INVALID_HANDLE {
            return Err( self.set(action, ErrorKind::InvalidHandle("OCI")) );
        }
        let errhp = match &self.handle {
            Some( handle ) => handle.get(),
            None => return Err( self.set(action, ErrorKind::ErrNotInitialized) ),
        };

        let oci = self.env.oci();
        let is_utf16 = self.env.charset().is_utf16();
        let buffer = &mut *self.buffer;
        buffer.action = action;
        buffer.encoding = self.env.charset().encoding();
        buffer.offset = 0;
        buffer.kind = None;
        let res = unsafe {
            oci.error_get(
                errhp as _, 1, &mut buffer.code,
                buffer.message.as_mut_ptr(), buffer.message.len() as u32,
                OCI_HTYPE_ERROR
            )
        };
        if res != OCI_SUCCESS {
            return Err( self.set(action, ErrorKind::GetFailed) );
        }

        // A failed lookup leaves it false; its error would mask the one being reported.
        let mut is_recoverable : libc::c_int = 0;
        let res = unsafe {
            oci.attr_get(
                errhp as _, OCI_HTYPE_ERROR,
                &mut is_recoverable as *mut libc::c_int as _, ptr::null_mut(),
                OCI_ATTR_ERROR_IS_RECOVERABLE, errhp
            )
        };
        buffer.is_recoverable = res == OCI_SUCCESS && is_recoverable != 0;

        buffer.message_length = if is_utf16 {
            utf16_message_length(&buffer.message)
        } else {
            text_message_length(&buffer.message)
        };

        if let Some( conn ) = conn {
            if !conn.is_marked_for_drop() && is_session_fatal(buffer.code) {
                conn.mark_for_drop();
                warn!("{}: session is unusable after ORA-{:05} during {}", buffer.fn_name, buffer.code, action);
            }
        }
        Err( self.error() )
    }

    /// Records an error detected without the native library. Always returns the failure.
    pub(crate) fn set(&mut self, action: &'static str, kind: ErrorKind) -> Error {
        self.buffer.set(action, kind);
        self.error()
    }

    pub(crate) fn info(&self) -> ErrorInfo {
        self.buffer.info()
    }

    pub(crate) fn error(&self) -> Error {
        Error::from(self.info())
    }
}
