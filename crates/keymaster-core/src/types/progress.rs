//! Download progress reporting

/// Progress of an in-flight download
///
/// `total_bytes == 0` means the server did not advertise a length; percent
/// stays at 0 and observers should treat the transfer as indeterminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    /// Bytes written to disk so far
    pub bytes_read: u64,

    /// Advertised content length, 0 when unknown
    pub total_bytes: u64,

    /// Whole percent complete (0-100)
    pub percent: u8,
}

impl DownloadProgress {
    /// Create a new progress tracker
    pub fn new(total_bytes: u64) -> Self {
        Self {
            bytes_read: 0,
            total_bytes,
            percent: 0,
        }
    }

    /// Record the running byte count and recompute the floored percentage
    pub fn update(&mut self, bytes_read: u64) {
        self.bytes_read = bytes_read;
        self.percent = if self.total_bytes > 0 {
            let pct = u128::from(bytes_read) * 100 / u128::from(self.total_bytes);
            pct.min(100) as u8
        } else {
            0
        };
    }

    /// Whether the total length is known
    pub fn is_determinate(&self) -> bool {
        self.total_bytes > 0
    }

    /// Check if download is complete
    pub fn is_complete(&self) -> bool {
        self.is_determinate() && self.bytes_read >= self.total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_progress() {
        let mut progress = DownloadProgress::new(1000);
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_complete());

        progress.update(500);
        assert_eq!(progress.percent, 50);
        assert!(!progress.is_complete());

        progress.update(1000);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_percent_is_floored() {
        let mut progress = DownloadProgress::new(3);
        progress.update(1);
        assert_eq!(progress.percent, 33);
        progress.update(2);
        assert_eq!(progress.percent, 66);
    }

    #[test]
    fn test_unknown_length_is_indeterminate() {
        let mut progress = DownloadProgress::new(0);
        progress.update(8192);
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_determinate());
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_overrun_clamps_to_100() {
        let mut progress = DownloadProgress::new(10);
        progress.update(25);
        assert_eq!(progress.percent, 100);
    }
}
