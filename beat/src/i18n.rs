use std::collections::HashMap;

/// Localized strings, looked up by key.
pub trait TextBundle {
    fn get(&self, key: &str) -> String;
}

/// Bundle backed by an in-memory table. Unknown keys come back unchanged.
#[derive(Clone, Debug, Default)]
pub struct MapBundle {
    entries: HashMap<String, String>,
}

impl MapBundle {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }
}

impl TextBundle for MapBundle {
    fn get(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(text) => text.clone(),
            None => {
                log::debug!("no translation for {key}");
                key.to_string()
            }
        }
    }
}
