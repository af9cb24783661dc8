//! Classify libcurl failures and HTTP status codes into fetch error kinds.

use curl_sys::CURLcode;

use crate::error::FetchError;

/// `CURLE_FTP_COULDNT_SET_TYPE`: server refused `TYPE I`.
const CURLE_FTP_COULDNT_SET_TYPE: CURLcode = 17;
/// `CURLE_FTP_COULDNT_RETR_FILE`: negative reply to `RETR`.
const CURLE_FTP_COULDNT_RETR_FILE: CURLcode = 19;
/// `CURLE_REMOTE_FILE_NOT_FOUND`: FTP 550 on `SIZE`/`RETR`, or a missing `file://`.
const CURLE_REMOTE_FILE_NOT_FOUND: CURLcode = 78;

/// Curl codes that mean the server answered and said no.
const REMOTE_REJECTIONS: [CURLcode; 3] = [
    CURLE_FTP_COULDNT_SET_TYPE,
    CURLE_FTP_COULDNT_RETR_FILE,
    CURLE_REMOTE_FILE_NOT_FOUND,
];

/// True for HTTP 2xx.
pub fn is_http_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Classify a curl error. `response_code` is the last HTTP status or FTP
/// reply code libcurl saw, when there was one.
///
/// Explicit rejections by the server become `Remote`; everything else on the
/// wire (refused, unresolved, timed out, reset, short body) is `Transport`.
/// Write-callback and abort-callback failures are resolved by the caller,
/// which knows whether the disk or the cancel token was responsible.
pub fn classify_curl_error(e: &curl::Error, response_code: Option<u32>) -> FetchError {
    let code = response_code.filter(|c| *c != 0);
    if e.is_http_returned_error()
        || e.is_remote_access_denied()
        || e.is_login_denied()
        || e.is_too_many_redirects()
        || REMOTE_REJECTIONS.contains(&e.code())
    {
        return FetchError::Remote {
            code,
            cause: e.to_string(),
        };
    }
    if e.is_aborted_by_callback() {
        return FetchError::Cancelled;
    }
    FetchError::transport(e.to_string())
}
