use config::{Map, Source, Value, ValueKind};

/// A `config` source over a fixed set of environment-style variables.
///
/// Keys are filtered by prefix and rewritten into dotted paths:
/// with prefix `APP_`, `APP_SERVER_HOST` becomes `server.host`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    origin: Option<String>,
    vars: Vec<(String, String)>,
}

impl EnvSource {
    pub fn new<I>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            prefix: prefix.into(),
            origin: None,
            vars: vars.into_iter().collect(),
        }
    }

    /// Label attached to every value, shown in deserialization errors.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Maps a variable name to its config path, or `None` when the prefix
    /// does not match.
    pub fn config_key(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.to_lowercase().replace('_', "."))
    }
}

impl Source for EnvSource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    /// Keys come out sorted, so a leaf such as `a` is always set before a
    /// table under it (`a.b`) and the table wins within one source.
    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        let mut keyed: Vec<(String, &String)> = self
            .vars
            .iter()
            .filter_map(|(name, value)| Some((self.config_key(name)?, value)))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut collected = Map::new();
        for (key, value) in keyed {
            collected.insert(
                key,
                Value::new(self.origin.as_ref(), ValueKind::String(value.clone())),
            );
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_key_without_prefix() {
        let source = EnvSource::new("", Vec::new());
        assert_eq!(source.config_key("SERVER_HOST").as_deref(), Some("server.host"));
        assert_eq!(source.config_key("PORT").as_deref(), Some("port"));
    }

    #[test]
    fn test_config_key_with_prefix() {
        let source = EnvSource::new("APP_", Vec::new());
        assert_eq!(
            source.config_key("APP_SERVER_PORT").as_deref(),
            Some("server.port")
        );
        assert_eq!(source.config_key("SERVER_PORT"), None);
        assert_eq!(source.config_key("APP_"), None);
    }

    #[test]
    fn test_collect_filters_and_rewrites() {
        let source = EnvSource::new(
            "APP_",
            vars(&[("APP_SERVER_HOST", "localhost"), ("HOME", "/root")]),
        );

        let collected = source.collect().unwrap();
        assert_eq!(collected.len(), 1);
        assert_eq!(
            collected["server.host"].clone().into_string().unwrap(),
            "localhost"
        );
    }

    #[test]
    fn test_collect_orders_parent_before_child() {
        let source = EnvSource::new("", vars(&[("A_B", "2"), ("A", "1"), ("A_C", "3")]));

        let collected = source.collect().unwrap();
        let keys: Vec<&str> = collected.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "a.b", "a.c"]);
    }

    #[test]
    fn test_leaf_and_table_collision_keeps_table() {
        for pairs in [[("A", "1"), ("A_B", "2")], [("A_B", "2"), ("A", "1")]] {
            let config = config::Config::builder()
                .add_source(EnvSource::new("", vars(&pairs)))
                .build()
                .unwrap();

            assert_eq!(config.get::<u32>("a.b").unwrap(), 2, "vars: {pairs:?}");
        }
    }
}
