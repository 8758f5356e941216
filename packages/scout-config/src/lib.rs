mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Engine, Providers, ReasoningProviderConfig, SearchProviderConfig, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	validate_engine(&cfg.engine)?;
	validate_reasoning(&cfg.providers.reasoning)?;
	validate_search(&cfg.providers.search)?;

	Ok(())
}

fn validate_engine(engine: &Engine) -> Result<()> {
	if engine.cache_max_size == 0 {
		return Err(Error::Validation {
			message: "engine.cache_max_size must be greater than zero.".to_string(),
		});
	}
	if engine.default_cache_duration_seconds <= 0 {
		return Err(Error::Validation {
			message: "engine.default_cache_duration_seconds must be greater than zero."
				.to_string(),
		});
	}
	if engine.max_queries_per_decision == 0 {
		return Err(Error::Validation {
			message: "engine.max_queries_per_decision must be greater than zero.".to_string(),
		});
	}
	if engine.max_results_returned == 0 {
		return Err(Error::Validation {
			message: "engine.max_results_returned must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("engine.decision_timeout_ms", engine.decision_timeout_ms),
		("engine.search_timeout_ms", engine.search_timeout_ms),
		("engine.optimize_interval_seconds", engine.optimize_interval_seconds),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn validate_reasoning(reasoning: &ReasoningProviderConfig) -> Result<()> {
	if !reasoning.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.reasoning.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&reasoning.temperature) {
		return Err(Error::Validation {
			message: "providers.reasoning.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if reasoning.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.reasoning.max_tokens must be greater than zero.".to_string(),
		});
	}
	if reasoning.enabled {
		for (label, value) in [
			("providers.reasoning.api_base", &reasoning.api_base),
			("providers.reasoning.api_key", &reasoning.api_key),
			("providers.reasoning.model", &reasoning.model),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}
	}

	Ok(())
}

fn validate_search(search: &SearchProviderConfig) -> Result<()> {
	if !matches!(search.safesearch.as_str(), "on" | "moderate" | "off") {
		return Err(Error::Validation {
			message: "providers.search.safesearch must be one of on, moderate, or off."
				.to_string(),
		});
	}
	if let Some(limit) = search.time_limit.as_deref()
		&& !matches!(limit, "d" | "w" | "m" | "y")
	{
		return Err(Error::Validation {
			message: "providers.search.time_limit must be one of d, w, m, or y.".to_string(),
		});
	}
	if search.max_results == 0 {
		return Err(Error::Validation {
			message: "providers.search.max_results must be greater than zero.".to_string(),
		});
	}
	if search.enabled && search.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.search.api_base must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.search
		.time_limit
		.as_deref()
		.map(|limit| limit.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.search.time_limit = None;
	}
	if let Some(limit) = cfg.providers.search.time_limit.as_mut() {
		*limit = limit.trim().to_lowercase();
	}
}
