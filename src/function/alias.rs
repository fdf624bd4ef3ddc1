//! Version Alias - named pointer with optional weighted traffic split

use crate::revision::new_revision_id;
use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Additional version an alias routes a share of traffic to.
///
/// `version_weights` maps the secondary qualifier to its share in `[0, 1]`;
/// the primary version receives the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRoutingConfig {
    /// Secondary qualifier -> traffic share
    pub version_weights: HashMap<String, f64>,
}

impl AliasRoutingConfig {
    /// Route `weight` of the traffic to `secondary`.
    #[must_use]
    pub fn weighted(secondary: impl Into<String>, weight: f64) -> Self {
        Self {
            version_weights: HashMap::from([(secondary.into(), weight)]),
        }
    }

    /// The single secondary version and its weight, if any.
    #[must_use]
    pub fn secondary(&self) -> Option<(&str, f64)> {
        self.version_weights
            .iter()
            .next()
            .map(|(qualifier, weight)| (qualifier.as_str(), *weight))
    }

    /// Check the weights invariants: at most one secondary, weight in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when an invariant is violated.
    pub fn validate(&self) -> Result<()> {
        if self.version_weights.len() > 1 {
            return Err(Error::Validation(format!(
                "Number of items in AdditionalVersionWeights must be at most 1, got {}",
                self.version_weights.len()
            )));
        }
        if let Some((qualifier, weight)) = self.secondary() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(Error::Validation(format!(
                    "Weight {weight} for version {qualifier} must be between 0.0 and 1.0"
                )));
            }
        }
        Ok(())
    }
}

/// A named, versioned pointer to one (or two) function versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionAlias {
    function_version: String,
    name: String,
    description: Option<String>,
    routing_configuration: Option<AliasRoutingConfig>,
    revision_id: String,
}

impl VersionAlias {
    /// Create an alias with a fresh revision id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        function_version: impl Into<String>,
        description: Option<String>,
        routing_configuration: Option<AliasRoutingConfig>,
    ) -> Self {
        Self {
            function_version: function_version.into(),
            name: name.into(),
            description,
            routing_configuration,
            revision_id: new_revision_id(),
        }
    }

    /// Get the alias name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the primary qualifier.
    #[must_use]
    pub fn function_version(&self) -> &str {
        &self.function_version
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the routing configuration, if any.
    #[must_use]
    pub const fn routing_configuration(&self) -> Option<&AliasRoutingConfig> {
        self.routing_configuration.as_ref()
    }

    /// Get the revision token.
    #[must_use]
    pub fn revision_id(&self) -> &str {
        &self.revision_id
    }

    /// Whether invocations through this alias may reach `qualifier`.
    #[must_use]
    pub fn routes_to(&self, qualifier: &str) -> bool {
        self.function_version == qualifier
            || self
                .routing_configuration
                .as_ref()
                .is_some_and(|routing| routing.version_weights.contains_key(qualifier))
    }

    /// Pick the qualifier for one invocation.
    ///
    /// Without a secondary version the primary is returned and `rng` is not
    /// touched. Otherwise a single sample `u` in `[0, 1)` is drawn and the
    /// secondary wins when `u < weight`, so weight `0.0` never and weight
    /// `1.0` always selects it.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        match self
            .routing_configuration
            .as_ref()
            .and_then(AliasRoutingConfig::secondary)
        {
            Some((secondary, weight)) => {
                let sample: f64 = rng.gen();
                if sample < weight {
                    secondary
                } else {
                    &self.function_version
                }
            }
            None => &self.function_version,
        }
    }
}

/// Desired state of an alias, passed to `Function::upsert_alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasRequest {
    pub(crate) function_version: String,
    pub(crate) description: Option<String>,
    pub(crate) routing: Option<AliasRoutingConfig>,
    pub(crate) expected_revision_id: Option<String>,
}

impl AliasRequest {
    /// Point the alias at `function_version`.
    #[must_use]
    pub fn new(function_version: impl Into<String>) -> Self {
        Self {
            function_version: function_version.into(),
            description: None,
            routing: None,
            expected_revision_id: None,
        }
    }

    /// Send `weight` of the traffic to `secondary`.
    #[must_use]
    pub fn weighted(mut self, secondary: impl Into<String>, weight: f64) -> Self {
        self.routing = Some(AliasRoutingConfig::weighted(secondary, weight));
        self
    }

    /// Use an explicit routing configuration.
    #[must_use]
    pub fn routing(mut self, routing: AliasRoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Only apply if the existing alias still carries `revision_id`.
    #[must_use]
    pub fn if_revision(mut self, revision_id: impl Into<String>) -> Self {
        self.expected_revision_id = Some(revision_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_routing_validation() {
        assert!(AliasRoutingConfig::weighted("1", 0.0).validate().is_ok());
        assert!(AliasRoutingConfig::weighted("1", 1.0).validate().is_ok());
        assert!(AliasRoutingConfig::weighted("1", 1.5).validate().is_err());
        assert!(AliasRoutingConfig::weighted("1", -0.1).validate().is_err());
        assert!(AliasRoutingConfig::weighted("1", f64::NAN).validate().is_err());

        let two = AliasRoutingConfig {
            version_weights: HashMap::from([("1".to_string(), 0.1), ("2".to_string(), 0.1)]),
        };
        assert!(two.validate().is_err());
    }

    #[test]
    fn test_select_without_routing() {
        let alias = VersionAlias::new("live", "3", None, None);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(alias.select(&mut rng), "3");
        }
    }

    #[test]
    fn test_select_is_reproducible() {
        let alias = VersionAlias::new("live", "1", None, Some(AliasRoutingConfig::weighted("2", 0.5)));
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50).map(|_| alias.select(&mut rng).to_string()).collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }

    #[test]
    fn test_routes_to() {
        let alias = VersionAlias::new("live", "1", None, Some(AliasRoutingConfig::weighted("2", 0.3)));
        assert!(alias.routes_to("1"));
        assert!(alias.routes_to("2"));
        assert!(!alias.routes_to("3"));
    }

    #[test]
    fn test_new_alias_gets_fresh_revision() {
        let a = VersionAlias::new("live", "1", None, None);
        let b = VersionAlias::new("live", "1", None, None);
        assert_ne!(a.revision_id(), b.revision_id());
    }
}
