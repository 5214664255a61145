use crate::clipboard::{ClipboardError, ClipboardSink, CopyOutcome, copy_table};
use crate::downloader::{ExcelExport, ExcelSettings, export_to_excel};
use crate::notify::{LogNotifier, Notifier, Severity};
use crate::print::{PdfSettings, PrintDocument, export_to_pdf};
use crate::saving::{SavedRecord, Store, StoreConfig, StoreError};
use crate::table::Table;
use crate::theme::{Theme, ThemeError, ThemeStore};
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the preferences file inside the data directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// State shared by the page helpers, owned by the host application.
///
/// The store is opened on first use and kept until [`AppContext::close`],
/// [`AppContext::configure_db`] or drop.
pub struct AppContext {
    data_dir: PathBuf,
    store_config: StoreConfig,
    store: Option<Store>,
    theme_store: ThemeStore,
    theme: Theme,
    notifier: Box<dyn Notifier>,
}

impl AppContext {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let theme_store = ThemeStore::new(data_dir.join(PREFERENCES_FILE));
        Self {
            data_dir,
            store_config: StoreConfig::default(),
            store: None,
            theme_store,
            theme: Theme::default(),
            notifier: Box::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn notify(&self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    /// Switch to another database; an open connection is released.
    pub fn configure_db(&mut self, config: StoreConfig) {
        if self.store_config != config {
            debug!("store reconfigured to {}/{}", config.name, config.store_name);
        }
        self.store_config = config;
        self.store = None;
    }

    pub fn store_config(&self) -> &StoreConfig {
        &self.store_config
    }

    pub fn is_store_open(&self) -> bool {
        self.store.is_some()
    }

    /// The open store, opening it first if needed.
    pub fn store(&mut self) -> Result<&mut Store, StoreError> {
        let store = match self.store.take() {
            Some(store) => store,
            None => Store::open(&self.data_dir, self.store_config.clone())?,
        };
        Ok(self.store.insert(store))
    }

    pub fn save<T: Serialize + ?Sized>(
        &mut self,
        id: &str,
        data: &T,
    ) -> Result<SavedRecord, StoreError> {
        self.store()?.put(id, data)
    }

    pub fn load(&mut self, id: &str) -> Result<Option<SavedRecord>, StoreError> {
        Ok(self.store()?.get(id).cloned())
    }

    pub fn clear_saved(&mut self, id: &str) -> Result<bool, StoreError> {
        self.store()?.delete(id)
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.store()?.clear()
    }

    /// Release the store connection.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            debug!("store closed");
        }
    }

    /// Read the persisted theme and make it current.
    pub fn load_theme(&mut self) -> Result<Theme, ThemeError> {
        self.theme = self.theme_store.load()?;
        Ok(self.theme)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, ThemeError> {
        self.theme = self.theme_store.toggle(self.theme)?;
        Ok(self.theme)
    }

    pub fn copy_table(
        &self,
        table: &Table,
        sink: &mut dyn ClipboardSink,
    ) -> Result<CopyOutcome, ClipboardError> {
        copy_table(table, sink, self.notifier())
    }

    pub fn export_excel(&self, table: &Table, settings: &ExcelSettings) -> ExcelExport {
        export_to_excel(table, settings, self.notifier())
    }

    pub fn export_pdf(&self, table: &Table, settings: &PdfSettings) -> PrintDocument {
        export_to_pdf(table, settings, self.notifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NullNotifier;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn store_opens_lazily_and_reopens_after_close() {
        let dir = tempdir().unwrap();
        let mut ctx = AppContext::new(dir.path()).with_notifier(Box::new(NullNotifier));
        assert!(!ctx.is_store_open());

        ctx.save("savedState", &json!({"a": 1})).unwrap();
        assert!(ctx.is_store_open());

        ctx.close();
        assert!(!ctx.is_store_open());
        let record = ctx.load("savedState").unwrap().unwrap();
        assert_eq!(record.data::<serde_json::Value>().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn configure_db_switches_database() {
        let dir = tempdir().unwrap();
        let mut ctx = AppContext::new(dir.path());
        ctx.save("k", &1).unwrap();

        ctx.configure_db(StoreConfig::new("OtherDB", 1, "appData"));
        assert!(!ctx.is_store_open());
        assert!(ctx.load("k").unwrap().is_none());

        ctx.configure_db(StoreConfig::default());
        assert!(ctx.clear_saved("k").unwrap());
        ctx.clear_all().unwrap();
        assert!(ctx.store().unwrap().is_empty());
    }

    #[test]
    fn theme_round_trip() {
        let dir = tempdir().unwrap();
        let mut ctx = AppContext::new(dir.path());
        assert_eq!(ctx.load_theme().unwrap(), Theme::Dark);
        assert_eq!(ctx.toggle_theme().unwrap(), Theme::Light);

        let mut fresh = AppContext::new(dir.path());
        assert_eq!(fresh.load_theme().unwrap(), Theme::Light);
    }
}
