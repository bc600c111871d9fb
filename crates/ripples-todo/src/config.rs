/// Application options. `Default` matches the shipped page.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Key the todos and filter are persisted under.
    pub storage_key: String,
    /// Two label clicks closer together than this start editing.
    pub double_click_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: "todos-ripples".to_string(),
            double_click_ms: 300,
        }
    }
}

impl AppConfig {
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn double_click_ms(mut self, ms: u64) -> Self {
        self.double_click_ms = ms;
        self
    }
}
