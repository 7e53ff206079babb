use autoscale_cuckoo_filter::CuckooFilter;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Fast negative check for taken emails.
///
/// `might_exist == false` means the email is definitely free; `true` must be confirmed
/// against the directory. Emails are stored exactly as given (no case folding).
pub struct EmailFilter {
    inner: RwLock<CuckooFilter<String>>,
}

impl EmailFilter {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
        }
    }

    /// Check if an email might exist (false positives possible)
    pub fn might_exist(&self, email: &str) -> bool {
        self.inner
            .read()
            .expect("email filter poisoned")
            .contains(&email.to_string())
    }

    pub fn insert(&self, email: &str) {
        self.inner
            .write()
            .expect("email filter poisoned")
            .add(&email.to_string());
    }

    pub fn remove(&self, email: &str) {
        self.inner
            .write()
            .expect("email filter poisoned")
            .remove(&email.to_string());
    }

    /// Insert a batch of emails under one write lock
    pub fn insert_batch<'a>(&self, emails: impl IntoIterator<Item = &'a str>) {
        let mut filter = self.inner.write().expect("email filter poisoned");
        for email in emails {
            filter.add(&email.to_string());
        }
    }
}

impl Default for EmailFilter {
    fn default() -> Self {
        Self::new()
    }
}
