use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::locale::LocaleTable;
use crate::navigator::SystemClock;

const CONFIG_ENV_VAR: &str =
  "CALGRID_CONFIG";
const CONFIG_DIR_NAME: &str = "calgrid";
const CONFIG_FILE_NAME: &str =
  "calgrid.toml";

fn config_default_version() -> u32 {
  1
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct CalGridConfig {
  #[serde(
    default = "config_default_version"
  )]
  pub version:  u32,
  /// IANA zone used only to decide which
  /// date is "today".
  pub timezone: Option<String>,
  #[serde(default)]
  pub policies: CalendarPolicies,
  #[serde(default)]
  pub locale:   LocaleTable
}

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Deserialize,
)]
pub struct CalendarPolicies {
  /// Explicit first day of the week,
  /// 0 = Sunday. Overrides the locale.
  #[serde(default)]
  pub first_day_of_week: Option<i64>
}

impl Default for CalGridConfig {
  fn default() -> Self {
    Self {
      version:  config_default_version(),
      timezone: None,
      policies: CalendarPolicies::default(
      ),
      locale:   LocaleTable::default()
    }
  }
}

impl CalGridConfig {
  /// Load from `path_override`, then
  /// `$CALGRID_CONFIG`, then the user
  /// config directory. A missing default
  /// file yields defaults; a named file
  /// that cannot be read is an error.
  #[tracing::instrument(skip(
    path_override
  ))]
  pub fn load(
    path_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let (path, explicit) =
      match resolve_config_path(
        path_override
      ) {
        | Some(found) => found,
        | None => {
          warn!(
            "no config directory \
             available; using defaults"
          );
          return Ok(Self::default());
        }
      };

    if !explicit && !path.exists() {
      info!(
        file = %path.display(),
        "config file not found; using defaults"
      );
      return Ok(Self::default());
    }

    let raw = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;

    Ok(Self::from_toml_str(
      &raw,
      &path.display().to_string()
    ))
  }

  /// Parse TOML text. Malformed input
  /// falls back to defaults.
  #[must_use]
  pub fn from_toml_str(
    raw: &str,
    source: &str
  ) -> Self {
    match toml::from_str::<Self>(raw) {
      | Ok(mut config) => {
        config.sanitize();
        info!(
          source,
          version = config.version,
          timezone = ?config.timezone,
          first_day_of_week = ?config.policies.first_day_of_week,
          "loaded calendar config"
        );
        config
      }
      | Err(error) => {
        tracing::error!(
          source,
          %error,
          "failed parsing calendar config; using defaults"
        );
        Self::default()
      }
    }
  }

  fn sanitize(&mut self) {
    if self
      .timezone
      .as_deref()
      .is_some_and(|raw| {
        raw.trim().is_empty()
      })
    {
      self.timezone = None;
    }

    if let Some(day) =
      self.policies.first_day_of_week
      && !(0..7).contains(&day)
    {
      debug!(
        day,
        "reducing first_day_of_week into 0..7"
      );
      self.policies.first_day_of_week =
        Some(day.rem_euclid(7));
    }
  }

  /// The configured zone, if it names a
  /// real IANA timezone.
  #[must_use]
  pub fn resolved_timezone(
    &self
  ) -> Option<Tz> {
    self
      .timezone
      .as_deref()
      .and_then(|raw| {
        parse_timezone(raw, "calgrid.toml")
      })
  }

  #[must_use]
  pub fn clock(&self) -> SystemClock {
    SystemClock::new(
      self.resolved_timezone()
    )
  }
}

fn resolve_config_path(
  path_override: Option<&Path>
) -> Option<(PathBuf, bool)> {
  if let Some(path) = path_override {
    return Some((
      path.to_path_buf(),
      true
    ));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some((
        PathBuf::from(trimmed),
        true
      ));
    }
  }

  dirs::config_dir().map(|dir| {
    (
      dir
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME),
      false
    )
  })
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(error) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %error,
        "invalid timezone id"
      );
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;
  use crate::locale::normalize_locale;

  #[test]
  fn empty_file_uses_defaults() {
    let config =
      CalGridConfig::from_toml_str(
        "", "test"
      );

    assert_eq!(
      config,
      CalGridConfig::default()
    );
    assert_eq!(
      config.locale.first_day_of_week,
      Some(6)
    );
  }

  #[test]
  fn parses_policies_and_locale() {
    let config =
      CalGridConfig::from_toml_str(
        r#"
version = 2
timezone = "Europe/Berlin"

[policies]
first_day_of_week = 8

[locale]
month_names = ["Januar", "Februar"]
day_names = ["Sonntag", "Montag"]
first_day_of_week = 0
"#,
        "test"
      );

    assert_eq!(config.version, 2);
    assert_eq!(
      config.resolved_timezone(),
      Some(chrono_tz::Europe::Berlin)
    );
    assert_eq!(
      config.policies.first_day_of_week,
      Some(1)
    );
    assert_eq!(
      config.locale.month_names,
      vec!["Januar", "Februar"]
    );
    assert!(
      config
        .locale
        .short_month_names
        .is_empty()
    );
  }

  #[test]
  fn non_integer_locale_first_day_keeps_labels(
  ) {
    let config =
      CalGridConfig::from_toml_str(
        r#"
[locale]
month_names = ["enero", "febrero", "marzo", "abril", "mayo", "junio",
               "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre"]
day_names = ["domingo", "lunes", "martes", "miércoles", "jueves", "viernes", "sábado"]
first_day_of_week = "lunes"
"#,
        "test"
      );

    assert_eq!(
      config.locale.first_day_of_week,
      None
    );
    let locale = normalize_locale(
      &config.locale,
      config.policies.first_day_of_week
    );
    assert_eq!(locale.first_day_of_week, 0);
    assert_eq!(
      locale.months[0].full_name,
      "enero"
    );
    assert_eq!(
      locale.days_of_week[0].full_name,
      "domingo"
    );
  }

  #[test]
  fn malformed_toml_falls_back_to_defaults(
  ) {
    let config =
      CalGridConfig::from_toml_str(
        "version = [",
        "test"
      );

    assert_eq!(
      config,
      CalGridConfig::default()
    );
  }

  #[test]
  fn blank_or_unknown_timezone_is_ignored(
  ) {
    let blank =
      CalGridConfig::from_toml_str(
        "timezone = \"  \"",
        "test"
      );
    assert_eq!(blank.timezone, None);

    let unknown =
      CalGridConfig::from_toml_str(
        "timezone = \"Mars/Olympus\"",
        "test"
      );
    assert_eq!(
      unknown.resolved_timezone(),
      None
    );
  }

  #[test]
  fn loads_explicit_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("cal.toml");
    fs::write(
      &path,
      "[policies]\nfirst_day_of_week = 1\n"
    )
    .expect("write config");

    let config =
      CalGridConfig::load(Some(&path))
        .expect("load config");

    assert_eq!(
      config.policies.first_day_of_week,
      Some(1)
    );
  }

  #[test]
  fn missing_explicit_file_is_an_error() {
    let temp = tempdir().expect("tempdir");
    let path =
      temp.path().join("missing.toml");

    let error =
      CalGridConfig::load(Some(&path))
        .expect_err("missing file");
    assert!(
      error
        .to_string()
        .contains("failed to read")
    );
  }
}
