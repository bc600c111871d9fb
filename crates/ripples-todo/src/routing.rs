use std::cell::RefCell;

/// Stand-in for `window.location`; only the hash matters here.
#[derive(Debug, Default)]
pub struct Location {
    hash: RefCell<String>,
}

impl Location {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: RefCell::new(hash.into()),
        }
    }

    pub fn hash(&self) -> String {
        self.hash.borrow().clone()
    }

    pub fn set_hash(&self, hash: impl Into<String>) {
        let hash = hash.into();
        log::debug!("location hash -> {hash:?}");
        *self.hash.borrow_mut() = hash;
    }

    /// Follows an `href`: only same-page fragments change the hash.
    pub fn follow(&self, href: &str) {
        if href.starts_with('#') {
            self.set_hash(href);
        }
    }
}
