//! Worker configuration from environment variables

use std::env;

use crate::engine::EngineOptions;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Path to the UCI engine binary
    pub stockfish_path: String,

    /// Search depth used when the caller does not pass one
    pub depth: u8,

    /// Deepest search a caller may request
    pub max_depth: u8,

    /// Engine processes to run; defaults to one per CPU
    pub engines: usize,

    pub threads: u32,
    pub hash_mb: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            stockfish_path: "/usr/local/bin/stockfish".to_string(),
            depth: 12,
            max_depth: 30,
            engines: num_cpus::get(),
            threads: 1,
            hash_mb: 64,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let stockfish_path = env::var("STOCKFISH_PATH").unwrap_or(defaults.stockfish_path);
        let max_depth = parse_var("MAX_DEPTH").unwrap_or(defaults.max_depth).max(1);
        let depth = parse_var("ANALYSIS_DEPTH")
            .unwrap_or(defaults.depth)
            .clamp(1, max_depth);
        let engines = parse_var("ENGINE_POOL_SIZE")
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.engines);

        Self {
            stockfish_path,
            depth,
            max_depth,
            engines,
            threads: parse_var("ENGINE_THREADS").unwrap_or(defaults.threads),
            hash_mb: parse_var("ENGINE_HASH_MB").unwrap_or(defaults.hash_mb),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            threads: self.threads,
            hash_mb: self.hash_mb,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.depth, 12);
        assert_eq!(config.max_depth, 30);
        assert!(config.engines >= 1);
        assert_eq!(config.engine_options().hash_mb, 64);
    }
}
