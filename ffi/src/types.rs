//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! enums with explicit discriminants. Buffers handed to C are boxed slices so
//! they can be rebuilt exactly from pointer and length when freed.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use fetchkit_core::{ClientError, ContentType, Headers, HttpMethod, HttpRequest, HttpResponse};

/// Opaque handle to an `HttpClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: fetchkit_core::HttpClient,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Delete => HttpMethod::Delete,
        }
    }
}

/// Request body encoding as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiContentType {
    Json = 0,
    FormUrlEncoded = 1,
    Multipart = 2,
}

impl From<FfiContentType> for ContentType {
    fn from(c: FfiContentType) -> Self {
        match c {
            FfiContentType::Json => ContentType::Json,
            FfiContentType::FormUrlEncoded => ContentType::FormUrlEncoded,
            FfiContentType::Multipart => ContentType::Multipart,
        }
    }
}

/// What the caller wants a response decoded into.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResultKind {
    /// Structured JSON, handed back as normalized JSON text.
    Json = 0,
    Text = 1,
    Bytes = 2,
}

// ---------------------------------------------------------------------------
// Request output (heap-allocated by us)
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `fk_build_request`. The C caller executes the request and passes
/// the response back through `fk_decode_response`. `body` is null when the
/// request has no body.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into its C form.
    pub(crate) fn from_core(req: HttpRequest) -> Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_vec()
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = leak_slice(headers);
        let (body, body_len) = match req.body {
            Some(body) => leak_slice(body),
            None => (std::ptr::null_mut(), 0),
        };

        FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body,
            body_len,
        }
    }

    /// Release every allocation this request owns.
    ///
    /// # Safety
    /// The fields must come from `from_core` and not have been freed yet.
    pub(crate) unsafe fn free_fields(&self) {
        free_c_string(self.url);
        for header in reclaim_slice(self.headers, self.headers_len).iter() {
            free_c_string(header.key);
            free_c_string(header.value);
        }
        drop(reclaim_slice(self.body, self.body_len));
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A response header supplied by the C caller.
#[repr(C)]
pub struct FfiResponseHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing a request, then passes a
/// pointer to `fk_decode_response`. The FFI layer reads but does not free
/// these fields. Null `headers` / `body` pointers mean "none".
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiResponseHeader,
    pub headers_len: u32,
    pub body: *const u8,
    pub body_len: u32,
}

impl FfiHttpResponse {
    /// Copy the caller's response into a core `HttpResponse`.
    ///
    /// Headers with null or non-UTF-8 keys or values are skipped.
    ///
    /// # Safety
    /// Non-null pointers must be valid for their stated lengths, and header
    /// strings must be NUL-terminated.
    pub(crate) unsafe fn to_core(&self) -> HttpResponse {
        let raw_headers: &[FfiResponseHeader] = if self.headers.is_null() || self.headers_len == 0 {
            &[]
        } else {
            std::slice::from_raw_parts(self.headers, self.headers_len as usize)
        };
        let headers: Headers = raw_headers
            .iter()
            .filter_map(|h| Some((borrow_str(h.key)?, borrow_str(h.value)?)))
            .collect();

        let body = if self.body.is_null() || self.body_len == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(self.body, self.body_len as usize).to_vec()
        };

        HttpResponse {
            status: self.status,
            headers,
            body,
            url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Encoding = 1,
    Transport = 2,
    Decode = 3,
    InvalidRequest = 4,
    Unknown = 5,
    Panic = 6,
    NullArg = 7,
}

/// Tag that tells `fk_free_result` what `FfiResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is an `FfiHttpRequest*`.
    Request = 1,
    /// `data` is a `char*` holding JSON text.
    Json = 2,
    /// `data` is a `char*` holding UTF-8 text.
    Text = 3,
    /// `data` is an `FfiBytes*`.
    Bytes = 4,
}

/// An owned byte buffer exposed to C.
#[repr(C)]
pub struct FfiBytes {
    pub data: *mut u8,
    pub len: u32,
}

/// Result envelope for every build and decode operation.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: c_string(msg),
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying a request.
    pub(crate) fn ok_request(req: HttpRequest) -> *mut Self {
        let ffi_req = Box::new(FfiHttpRequest::from_core(req));
        Self::ok(FfiDataTag::Request, Box::into_raw(ffi_req) as *mut std::ffi::c_void)
    }

    /// Build a success result carrying JSON text.
    pub(crate) fn ok_json(value: &serde_json::Value) -> *mut Self {
        Self::ok(FfiDataTag::Json, c_string(value.to_string()) as *mut std::ffi::c_void)
    }

    /// Build a success result carrying text. Text with an interior NUL
    /// cannot be a C string and is reported as a decode error.
    pub(crate) fn ok_text(text: String) -> *mut Self {
        match CString::new(text) {
            Ok(s) => Self::ok(FfiDataTag::Text, s.into_raw() as *mut std::ffi::c_void),
            Err(_) => Self::error(FfiErrorCode::Decode, "text body contains a NUL byte"),
        }
    }

    /// Build a success result carrying raw bytes.
    pub(crate) fn ok_bytes(bytes: Vec<u8>) -> *mut Self {
        let (data, len) = leak_slice(bytes);
        let ffi_bytes = Box::new(FfiBytes { data, len });
        Self::ok(FfiDataTag::Bytes, Box::into_raw(ffi_bytes) as *mut std::ffi::c_void)
    }

    /// Build an error result from a `ClientError`.
    pub(crate) fn from_error(err: ClientError) -> *mut Self {
        let code = match &err {
            ClientError::Encoding(_) => FfiErrorCode::Encoding,
            ClientError::Transport(_) => FfiErrorCode::Transport,
            ClientError::Decode { .. } => FfiErrorCode::Decode,
            ClientError::InvalidRequest { .. } => FfiErrorCode::InvalidRequest,
            ClientError::NoResponse { .. } => FfiErrorCode::Unknown,
        };
        Self::error(code, &err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }

    /// Release the payload `data` points to, according to `data_tag`.
    ///
    /// # Safety
    /// `data` must have been produced by one of the `ok_*` constructors.
    pub(crate) unsafe fn free_data(&self) {
        if self.data.is_null() {
            return;
        }
        match self.data_tag {
            FfiDataTag::Request => {
                let req = Box::from_raw(self.data as *mut FfiHttpRequest);
                req.free_fields();
            }
            FfiDataTag::Json | FfiDataTag::Text => free_c_string(self.data as *mut c_char),
            FfiDataTag::Bytes => {
                let bytes = Box::from_raw(self.data as *mut FfiBytes);
                drop(reclaim_slice(bytes.data, bytes.len));
            }
            FfiDataTag::None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Allocation helpers
// ---------------------------------------------------------------------------

/// Owned C string; strings with an interior NUL become empty.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// # Safety
/// `s` must be null or come from `CString::into_raw`.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Borrow a caller-owned C string as UTF-8. Null or invalid gives `None`.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string.
pub(crate) unsafe fn borrow_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

fn leak_slice<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// # Safety
/// `ptr`/`len` must come from `leak_slice` and not have been reclaimed.
unsafe fn reclaim_slice<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    if ptr.is_null() || len == 0 {
        return Box::new([]);
    }
    Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize))
}
