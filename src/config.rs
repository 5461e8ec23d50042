use std::str::FromStr;

use envconfig::Envconfig;

use crate::codec::{StaticSchemaResolver, WireFormat};
use crate::kafka::config::KafkaConfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(nested = true)]
    pub kafka: KafkaConfig,

    /// Comma-separated `topic:format` pairs. Each topic carries exactly one
    /// wire format for its lifetime; the bindings are immutable for the run.
    #[envconfig(
        default = "customer-events-wrapped:wrapper,customer-events:registry,customer-events-json:discriminator"
    )]
    pub topic_bindings: TopicBindings,

    /// Comma-separated `id:full-name` pairs mirroring the registry's
    /// registered writer schemas, used by the registry-resolved topics.
    #[envconfig(default = "1:commerce.events.PageView,2:commerce.events.Purchase")]
    pub schema_table: SchemaTable,

    #[envconfig(default = "customer-aggregates")]
    pub output_topic: String,

    #[envconfig(from = "BIND_HOST", default = "::")]
    pub host: String,

    #[envconfig(from = "BIND_PORT", default = "3301")]
    pub port: u16,
}

#[derive(Clone, Debug, Default)]
pub struct TopicBindings {
    bindings: Vec<(String, WireFormat)>,
}

impl TopicBindings {
    pub fn format_for(&self, topic: &str) -> Option<WireFormat> {
        self.bindings
            .iter()
            .find(|(name, _)| name == topic)
            .map(|(_, format)| *format)
    }

    pub fn topics(&self) -> Vec<&str> {
        self.bindings.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl FromStr for TopicBindings {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bindings = Vec::new();
        for pair in s.split(',').filter(|p| !p.trim().is_empty()) {
            let (topic, format) = pair
                .rsplit_once(':')
                .ok_or_else(|| format!("invalid topic binding: {pair}, expected topic:format"))?;
            let format: WireFormat = format.parse()?;
            bindings.push((topic.trim().to_string(), format));
        }
        if bindings.is_empty() {
            return Err("at least one topic binding is required".to_string());
        }
        Ok(Self { bindings })
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaTable {
    entries: Vec<(u32, String)>,
}

impl SchemaTable {
    pub fn resolver(&self) -> StaticSchemaResolver {
        StaticSchemaResolver::new(self.entries.iter().cloned())
    }
}

impl FromStr for SchemaTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for pair in s.split(',').filter(|p| !p.trim().is_empty()) {
            let (id, name) = pair
                .split_once(':')
                .ok_or_else(|| format!("invalid schema entry: {pair}, expected id:full-name"))?;
            let id: u32 = id
                .trim()
                .parse()
                .map_err(|_| format!("invalid schema id: {id}"))?;
            entries.push((id, name.trim().to_string()));
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_topic_bindings() {
        let bindings: TopicBindings = "a:wrapper,b:registry,c:discriminator".parse().unwrap();
        assert_eq!(bindings.format_for("a"), Some(WireFormat::Wrapper));
        assert_eq!(bindings.format_for("b"), Some(WireFormat::Registry));
        assert_eq!(bindings.format_for("c"), Some(WireFormat::Discriminator));
        assert_eq!(bindings.format_for("d"), None);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!("a:xml".parse::<TopicBindings>().is_err());
    }

    #[test]
    fn parses_schema_table() {
        let table: SchemaTable = "1:commerce.events.PageView".parse().unwrap();
        let resolver = table.resolver();
        use crate::codec::SchemaResolver;
        assert_eq!(
            resolver.full_name(1).as_deref(),
            Some("commerce.events.PageView")
        );
        assert_eq!(resolver.schema_id("commerce.events.PageView"), Some(1));
    }
}
