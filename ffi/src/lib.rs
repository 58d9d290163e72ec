//! C-ABI wrapper around `fetchkit-core`.
//!
//! # Overview
//! Exposes request building and response decoding through `extern "C"`
//! functions so a native host can run the actual HTTP exchange on its own
//! networking stack while reusing the encoding and decoding rules.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `fk_build_request` / `fk_decode_response` mirror the core client's
//!   `build_request` / `decode_response` halves 1:1.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `fk_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::catch_unwind;

use fetchkit_core::{ClientError, HeaderConfig, HttpClient, TransportOutcome, Url};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`, optionally sending
/// `Authorization: Bearer <bearer_token>` with every request.
///
/// Returns null if `base_url` is null, not UTF-8, or not a valid URL, or if
/// an internal panic occurs. `bearer_token` may be null.
/// The caller must free the returned pointer with `fk_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn fk_client_new(base_url: *const c_char, bearer_token: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        let Some(url) = (unsafe { borrow_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let Ok(base_url) = Url::parse(url) else {
            return std::ptr::null_mut();
        };
        let mut headers = HeaderConfig::new();
        if let Some(token) = unsafe { borrow_str(bearer_token) } {
            headers = headers.with_bearer_token(token);
        }
        let client = HttpClient::builder(base_url).headers(headers).build();
        Box::into_raw(Box::new(FfiClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `fk_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fk_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build the HTTP request for `method` against `path`.
///
/// `params_json` is the request parameters as JSON text, or null for none.
/// GET puts them in the query string; POST and PUT encode them as
/// `content_type`; DELETE always sends them as JSON.
///
/// Returns a result with `data_tag = Request` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fk_build_request(
    client: *const FfiClient,
    method: FfiHttpMethod,
    path: *const c_char,
    params_json: *const c_char,
    content_type: FfiContentType,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let client = unsafe { &*client };
        let Some(path) = (unsafe { borrow_str(path) }) else {
            return FfiResult::null_arg("path");
        };
        let params: serde_json::Value = match unsafe { borrow_str(params_json) } {
            Some(json) => match serde_json::from_str(json) {
                Ok(value) => value,
                Err(e) => return FfiResult::from_error(ClientError::Encoding(e.into())),
            },
            None => serde_json::Value::Null,
        };
        match client
            .inner
            .build_request(method.into(), path, &params, content_type.into())
        {
            Ok(req) => FfiResult::ok_request(req),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in fk_build_request"))
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode the response the host received for `url` into `expected`.
///
/// A null `response` means the host got neither a response nor an error and
/// yields an `Unknown` result. Use `fk_transport_failed` to report a network
/// error instead.
///
/// Returns a result tagged `Json`, `Text` or `Bytes` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fk_decode_response(
    client: *const FfiClient,
    url: *const c_char,
    response: *const FfiHttpResponse,
    expected: FfiResultKind,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let client = unsafe { &*client };
        let Some(url) = (unsafe { borrow_str(url) }) else {
            return FfiResult::null_arg("url");
        };
        let outcome = if response.is_null() {
            TransportOutcome::default()
        } else {
            TransportOutcome::completed(unsafe { (*response).to_core() })
        };

        let result = match expected {
            FfiResultKind::Json => client
                .inner
                .decode_response::<serde_json::Value>(outcome, url)
                .map(|value| FfiResult::ok_json(&value)),
            FfiResultKind::Text => client
                .inner
                .decode_response::<String>(outcome, url)
                .map(FfiResult::ok_text),
            FfiResultKind::Bytes => client
                .inner
                .decode_response::<Vec<u8>>(outcome, url)
                .map(FfiResult::ok_bytes),
        };
        result.unwrap_or_else(FfiResult::from_error)
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in fk_decode_response"))
}

/// Report a network failure the host observed as a `Transport` result, so
/// every outcome reaches the caller through the same envelope.
#[unsafe(no_mangle)]
pub extern "C" fn fk_transport_failed(message: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let message = unsafe { borrow_str(message) }.unwrap_or("unknown transport failure");
        FfiResult::from_error(ClientError::Transport(message.into()))
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in fk_transport_failed"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResult` returned by any `fk_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn fk_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            free_c_string(result.error_message);
            result.free_data();
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fk_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    fn new_client() -> *mut FfiClient {
        let url = CString::new("http://localhost:3000/api/").unwrap();
        let token = CString::new("abc").unwrap();
        let client = fk_client_new(url.as_ptr(), token.as_ptr());
        assert!(!client.is_null());
        client
    }

    fn message(r: &FfiResult) -> String {
        unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap().to_string()
    }

    fn header_pairs(req: &FfiHttpRequest) -> Vec<(String, String)> {
        let headers = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        headers
            .iter()
            .map(|h| unsafe {
                (
                    CStr::from_ptr(h.key).to_str().unwrap().to_string(),
                    CStr::from_ptr(h.value).to_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        fk_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(fk_client_new(std::ptr::null(), std::ptr::null()).is_null());
    }

    #[test]
    fn client_new_invalid_url_returns_null() {
        let url = CString::new("not a url").unwrap();
        assert!(fk_client_new(url.as_ptr(), std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        fk_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_get_with_query() {
        let client = new_client();
        let path = CString::new("search").unwrap();
        let params = CString::new(r#"{"q":["a","b"]}"#).unwrap();
        let result = fk_build_request(client, FfiHttpMethod::Get, path.as_ptr(), params.as_ptr(), FfiContentType::Json);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Request);

        let req = unsafe { &*(r.data as *const FfiHttpRequest) };
        assert_eq!(req.method, FfiHttpMethod::Get);
        let url = unsafe { CStr::from_ptr(req.url) }.to_str().unwrap();
        assert_eq!(url, "http://localhost:3000/api/search?q=a&q=b");
        assert!(req.body.is_null());
        assert_eq!(req.body_len, 0);
        assert_eq!(
            header_pairs(req),
            vec![
                ("Content-Type".to_string(), "application/json; charset=utf-8".to_string()),
                ("Authorization".to_string(), "Bearer abc".to_string()),
            ]
        );

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn build_post_form_body() {
        let client = new_client();
        let path = CString::new("users").unwrap();
        let params = CString::new(r#"{"name":"Ada Lovelace"}"#).unwrap();
        let result = fk_build_request(
            client,
            FfiHttpMethod::Post,
            path.as_ptr(),
            params.as_ptr(),
            FfiContentType::FormUrlEncoded,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);

        let req = unsafe { &*(r.data as *const FfiHttpRequest) };
        let body = unsafe { std::slice::from_raw_parts(req.body, req.body_len as usize) };
        assert_eq!(body, b"name=Ada+Lovelace");
        assert!(header_pairs(req).contains(&(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string()
        )));

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn build_with_null_params_has_no_body() {
        let client = new_client();
        let path = CString::new("users/1").unwrap();
        let result = fk_build_request(client, FfiHttpMethod::Delete, path.as_ptr(), std::ptr::null(), FfiContentType::Json);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        let req = unsafe { &*(r.data as *const FfiHttpRequest) };
        assert_eq!(req.method, FfiHttpMethod::Delete);
        assert!(req.body.is_null());

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn build_invalid_params_json_is_encoding_error() {
        let client = new_client();
        let path = CString::new("users").unwrap();
        let params = CString::new("{not json").unwrap();
        let result = fk_build_request(client, FfiHttpMethod::Post, path.as_ptr(), params.as_ptr(), FfiContentType::Json);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Encoding);
        assert!(r.data.is_null());

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn build_bad_multipart_field_is_encoding_error() {
        let client = new_client();
        let path = CString::new("avatar").unwrap();
        let params = CString::new(r#"{"photo":"***"}"#).unwrap();
        let result = fk_build_request(client, FfiHttpMethod::Post, path.as_ptr(), params.as_ptr(), FfiContentType::Multipart);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Encoding);
        assert!(message(r).contains("photo"));

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn build_null_client_returns_null_arg() {
        let path = CString::new("users").unwrap();
        let result = fk_build_request(std::ptr::null(), FfiHttpMethod::Get, path.as_ptr(), std::ptr::null(), FfiContentType::Json);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(message(r), "null argument: client");
        fk_free_result(result);
    }

    #[test]
    fn decode_json_response() {
        let client = new_client();
        let url = CString::new("http://localhost:3000/api/thing").unwrap();
        let key = CString::new("content-type").unwrap();
        let value = CString::new("application/json").unwrap();
        let headers = [FfiResponseHeader {
            key: key.as_ptr(),
            value: value.as_ptr(),
        }];
        let body = br#"{"a": 1}"#;
        let resp = FfiHttpResponse {
            status: 200,
            headers: headers.as_ptr(),
            headers_len: 1,
            body: body.as_ptr(),
            body_len: body.len() as u32,
        };
        let result = fk_decode_response(client, url.as_ptr(), &resp, FfiResultKind::Json);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Json);
        let json = unsafe { CStr::from_ptr(r.data as *const c_char) }.to_str().unwrap();
        assert_eq!(json, r#"{"a":1}"#);

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn decode_text_without_headers() {
        let client = new_client();
        let url = CString::new("http://localhost:3000/api/thing").unwrap();
        let body = b"hello";
        let resp = FfiHttpResponse {
            status: 200,
            headers: std::ptr::null(),
            headers_len: 0,
            body: body.as_ptr(),
            body_len: body.len() as u32,
        };
        let result = fk_decode_response(client, url.as_ptr(), &resp, FfiResultKind::Text);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Text);
        let text = unsafe { CStr::from_ptr(r.data as *const c_char) }.to_str().unwrap();
        assert_eq!(text, "hello");

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn decode_bytes() {
        let client = new_client();
        let url = CString::new("http://localhost:3000/api/blob").unwrap();
        let body = [0u8, 1, 255];
        let resp = FfiHttpResponse {
            status: 200,
            headers: std::ptr::null(),
            headers_len: 0,
            body: body.as_ptr(),
            body_len: 3,
        };
        let result = fk_decode_response(client, url.as_ptr(), &resp, FfiResultKind::Bytes);
        let r = unsafe { &*result };
        assert_eq!(r.data_tag, FfiDataTag::Bytes);
        let bytes = unsafe { &*(r.data as *const FfiBytes) };
        assert_eq!(unsafe { std::slice::from_raw_parts(bytes.data, bytes.len as usize) }, &body);

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn decode_invalid_utf8_text_is_decode_error() {
        let client = new_client();
        let url = CString::new("http://localhost:3000/api/thing").unwrap();
        let body = [0xffu8, 0xfe];
        let resp = FfiHttpResponse {
            status: 200,
            headers: std::ptr::null(),
            headers_len: 0,
            body: body.as_ptr(),
            body_len: 2,
        };
        let result = fk_decode_response(client, url.as_ptr(), &resp, FfiResultKind::Text);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Decode);
        assert!(message(r).contains("http://localhost:3000/api/thing"));

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn decode_null_response_is_unknown() {
        let client = new_client();
        let url = CString::new("http://localhost:3000/api/thing").unwrap();
        let result = fk_decode_response(client, url.as_ptr(), std::ptr::null(), FfiResultKind::Json);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Unknown);

        fk_free_result(result);
        fk_client_free(client);
    }

    #[test]
    fn transport_failure_envelope() {
        let msg = CString::new("connection reset").unwrap();
        let result = fk_transport_failed(msg.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert_eq!(message(r), "transport error: connection reset");
        fk_free_result(result);
    }

    #[test]
    fn free_result_null_is_safe() {
        fk_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        fk_free_string(std::ptr::null_mut());
    }

    #[test]
    fn header_is_generated_outside_the_source_tree() {
        let header = std::path::Path::new(env!("FETCHKIT_HEADER"));
        assert!(header.starts_with(env!("OUT_DIR")));
        assert!(!std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("include").exists());

        if let Ok(text) = std::fs::read_to_string(header) {
            assert!(text.contains("fk_build_request"));
            assert!(text.contains("fk_decode_response"));
        }
    }
}
