mod resolver_config;

pub use resolver_config::{ConfigError, ConfigOverrides, PrefixRemoval, ResolverConfig};
