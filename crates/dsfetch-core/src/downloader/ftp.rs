//! FTP transport.

use url::Url;

use super::easy::{new_easy, perform_into};
use super::{TransferOptions, Transport};
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::storage::PartFile;

/// Anonymous (or URL-credentialed) passive-mode binary RETR.
///
/// Negative replies (550 no such file, 530 login refused) come back from
/// libcurl as dedicated error codes and are classified as `Remote` with the
/// reply code attached.
pub struct FtpTransport {
    opts: TransferOptions,
}

impl FtpTransport {
    pub fn new(opts: TransferOptions) -> Self {
        Self { opts }
    }
}

impl Transport for FtpTransport {
    fn stream(&self, url: &Url, out: &mut PartFile, cancel: &CancelToken) -> Result<u64, FetchError> {
        let mut easy = new_easy(url, &self.opts)?;
        perform_into(&mut easy, out, cancel)?;
        Ok(out.bytes_written())
    }
}
