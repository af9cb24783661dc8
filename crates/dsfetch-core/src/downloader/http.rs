//! HTTP and HTTPS transport.

use url::Url;

use super::easy::{new_easy, perform_into, setup};
use super::{TransferOptions, Transport};
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::retry::is_http_success;
use crate::storage::PartFile;

/// Plain GET, following redirects; any final status outside 2xx is `Remote`.
pub struct HttpTransport {
    opts: TransferOptions,
}

impl HttpTransport {
    pub fn new(opts: TransferOptions) -> Self {
        Self { opts }
    }
}

impl Transport for HttpTransport {
    fn stream(&self, url: &Url, out: &mut PartFile, cancel: &CancelToken) -> Result<u64, FetchError> {
        let mut easy = new_easy(url, &self.opts)?;
        easy.follow_location(true).map_err(setup)?;
        easy.max_redirections(10).map_err(setup)?;
        // Stop at the status line on 4xx/5xx instead of saving an error page.
        easy.fail_on_error(true).map_err(setup)?;
        easy.useragent(&self.opts.user_agent).map_err(setup)?;

        perform_into(&mut easy, out, cancel)?;

        let code = easy.response_code().map_err(setup)?;
        if !is_http_success(code) {
            return Err(FetchError::Remote {
                code: Some(code),
                cause: format!("HTTP {} from {}", code, url),
            });
        }
        Ok(out.bytes_written())
    }
}
