use std::fmt;
use std::str::FromStr;

use os4_export_shared::ModelExt;
use serde_json::{Map, Value};

use super::OutputStore;

/// How the output store is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `{"<collection>": {"<id>": {...}}}`
    #[default]
    Index,
    /// `{"<collection>": [{...}, ...]}`
    List,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" => Ok(Self::Index),
            "list" => Ok(Self::List),
            other => Err(format!("Unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index"),
            Self::List => f.write_str("list"),
        }
    }
}

impl OutputStore {
    pub fn render(&self, format: OutputFormat) -> Value {
        match format {
            OutputFormat::Index => self.to_index_format(),
            OutputFormat::List => self.to_list_format(),
        }
    }

    pub fn to_index_format(&self) -> Value {
        let mut data = Map::new();
        for name in self.collection_names() {
            let models = self
                .iter(name)
                .map(|model| {
                    let id = model.id().unwrap_or_default();
                    (id.to_string(), Value::Object(model.clone()))
                })
                .collect();
            data.insert(name.to_string(), Value::Object(models));
        }
        Value::Object(data)
    }

    pub fn to_list_format(&self) -> Value {
        let mut data = Map::new();
        for name in self.collection_names() {
            let models = self
                .iter(name)
                .map(|model| Value::Object(model.clone()))
                .collect();
            data.insert(name.to_string(), Value::Array(models));
        }
        Value::Object(data)
    }
}
