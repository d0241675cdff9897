use crate::core::Resolver;
use anyhow::Result;

struct RegistryEntry {
    hostname: String,
    resolver: Box<dyn Resolver>,
}

/// Ordered, immutable hostname to resolver bindings.
///
/// Built once through [`RegistryBuilder`]; there is no way to add or remove
/// entries afterwards. Iteration follows registration order.
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Resolver)> {
        self.entries
            .iter()
            .map(|entry| (entry.hostname.as_str(), entry.resolver.as_ref()))
    }

    /// Exact hostname lookup, no wildcard or suffix matching.
    pub fn get(&self, hostname: &str) -> Option<&dyn Resolver> {
        self.entries
            .iter()
            .find(|entry| entry.hostname == hostname)
            .map(|entry| entry.resolver.as_ref())
    }

    pub fn hostnames(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.hostname.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<RegistryEntry>,
}

impl RegistryBuilder {
    pub fn register(mut self, hostname: impl Into<String>, resolver: impl Resolver + 'static) -> Self {
        self.entries.push(RegistryEntry {
            hostname: hostname.into(),
            resolver: Box::new(resolver),
        });
        self
    }

    /// Fails when a hostname was registered twice.
    pub fn build(self) -> Result<Registry> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.hostname == entry.hostname) {
                anyhow::bail!("Hostname registered twice: {}", entry.hostname);
            }
        }

        Ok(Registry {
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MediaUrl, ResolveResult, ResolverError};
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl Resolver for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn resolve(&self, _url: &str) -> ResolveResult<MediaUrl> {
            Err(ResolverError::NotImplemented(self.0))
        }
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = Registry::builder()
            .register("b.example", Named("b"))
            .register("a.example", Named("a"))
            .register("c.example", Named("c"))
            .build()
            .unwrap();

        assert_eq!(registry.hostnames(), vec!["b.example", "a.example", "c.example"]);
        let names: Vec<&str> = registry.iter().map(|(_, r)| r.name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = Registry::builder()
            .register("mixdrop.co", Named("mixdrop"))
            .build()
            .unwrap();

        assert_eq!(registry.get("mixdrop.co").map(|r| r.name()), Some("mixdrop"));
        assert!(registry.get("www.mixdrop.co").is_none());
        assert!(registry.get("mixdrop").is_none());
    }

    #[test]
    fn test_duplicate_hostname_is_rejected() {
        let result = Registry::builder()
            .register("mixdrop.co", Named("first"))
            .register("mixdrop.co", Named("second"))
            .build();

        assert!(result.is_err());
    }
}
