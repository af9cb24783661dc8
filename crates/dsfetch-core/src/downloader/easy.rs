//! Shared libcurl handle setup and the streaming write path.

use curl::easy::Easy;
use url::Url;

use super::TransferOptions;
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::retry::classify_curl_error;
use crate::storage::PartFile;

/// Error while configuring a handle (before any network traffic).
pub(super) fn setup(e: curl::Error) -> FetchError {
    FetchError::transport(format!("curl setup: {}", e))
}

/// New handle for `url` with timeouts and progress callbacks enabled.
pub(super) fn new_easy(url: &Url, opts: &TransferOptions) -> Result<Easy, FetchError> {
    let mut easy = Easy::new();
    easy.url(url.as_str()).map_err(setup)?;
    easy.connect_timeout(opts.connect_timeout).map_err(setup)?;
    // Abort if throughput drops below the limit for the window; large files
    // on slow links are not killed by a hard timeout unless one is set.
    easy.low_speed_limit(opts.low_speed_limit).map_err(setup)?;
    easy.low_speed_time(opts.low_speed_time).map_err(setup)?;
    if let Some(t) = opts.timeout {
        easy.timeout(t).map_err(setup)?;
    }
    easy.progress(true).map_err(setup)?;
    Ok(easy)
}

/// Run the transfer, appending the body to `out`.
///
/// A failed disk write surfaces as `LocalIo`; a set cancel token aborts the
/// transfer from the write/progress callbacks and surfaces as `Cancelled`.
/// Other curl failures are classified using the last response code.
pub(super) fn perform_into(
    easy: &mut Easy,
    out: &mut PartFile,
    cancel: &CancelToken,
) -> Result<(), FetchError> {
    let temp_path = out.temp_path().to_path_buf();
    let mut write_error: Option<std::io::Error> = None;
    let result = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if cancel.is_cancelled() {
                    return Ok(0);
                }
                match out.write_chunk(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_error = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })
            .map_err(setup)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(setup)?;
        transfer.perform()
    };

    let e = match result {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    if let Some(io_err) = write_error {
        return Err(FetchError::local_io(
            format!("write {}", temp_path.display()),
            io_err,
        ));
    }
    if cancel.is_cancelled() && (e.is_write_error() || e.is_aborted_by_callback()) {
        return Err(FetchError::Cancelled);
    }
    let code = easy.response_code().ok();
    Err(classify_curl_error(&e, code))
}
