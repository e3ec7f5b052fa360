/// Fixed-size paging budget, in cells, used when a caller passes none.
pub const DEFAULT_PAGE_SIZE: usize = 5000;

pub const ENV_DISABLE_AUTOMATION: &str = "XLBRIDGE_DISABLE_AUTOMATION";
pub const ENV_PAGE_SIZE: &str = "XLBRIDGE_PAGE_SIZE";

/// Controls how [`crate::BackendSelector`] acquires a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenOptions {
    /// Try the live host application before the direct-file engine.
    pub prefer_automation: bool,
    /// A missing file yields a new empty document instead of an error.
    pub create_if_missing: bool,
    pub page_size: usize,
    /// Make a freshly launched host application visible.
    pub show_host_application: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            prefer_automation: true,
            create_if_missing: true,
            page_size: DEFAULT_PAGE_SIZE,
            show_host_application: true,
        }
    }
}

impl OpenOptions {
    /// Never touch the host application.
    pub fn direct_file_only() -> Self {
        Self {
            prefer_automation: false,
            ..Self::default()
        }
    }

    /// Defaults overlaid with `XLBRIDGE_DISABLE_AUTOMATION` and `XLBRIDGE_PAGE_SIZE`.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(ENV_DISABLE_AUTOMATION) {
            let v = v.trim();
            if !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false") {
                self.prefer_automation = false;
            }
        }
        if let Some(n) = lookup(ENV_PAGE_SIZE).and_then(|v| v.trim().parse::<usize>().ok())
            && n > 0
        {
            self.page_size = n;
        }
        self
    }

    pub fn with_prefer_automation(mut self, prefer: bool) -> Self {
        self.prefer_automation = prefer;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Zero restores the default budget.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = effective_page_size(page_size);
        self
    }

    pub fn with_show_host_application(mut self, show: bool) -> Self {
        self.show_host_application = show;
        self
    }
}

/// A non-positive budget means "use the default".
pub fn effective_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}
