//! Per-relationship capability flags.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

/// A named flag gating one category of cross-user data or signal flow.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
  ShareMoodData,
  AllowFlareSignals,
  ShareJournalEntries,
}

/// The full capability set of one relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
  pub share_mood_data:       bool,
  pub allow_flare_signals:   bool,
  pub share_journal_entries: bool,
}

impl Permissions {
  /// Applied to every relationship unless the deployment binds other
  /// defaults into the invite manager.
  pub const DEFAULT: Self = Self {
    share_mood_data:       true,
    allow_flare_signals:   true,
    share_journal_entries: false,
  };

  pub fn allows(&self, capability: Capability) -> bool {
    match capability {
      Capability::ShareMoodData => self.share_mood_data,
      Capability::AllowFlareSignals => self.allow_flare_signals,
      Capability::ShareJournalEntries => self.share_journal_entries,
    }
  }

  /// Apply the flags present in `patch`, leaving the rest untouched.
  pub fn merged(mut self, patch: &PermissionPatch) -> Self {
    if let Some(v) = patch.share_mood_data {
      self.share_mood_data = v;
    }
    if let Some(v) = patch.allow_flare_signals {
      self.allow_flare_signals = v;
    }
    if let Some(v) = patch.share_journal_entries {
      self.share_journal_entries = v;
    }
    self
  }
}

impl Default for Permissions {
  fn default() -> Self { Self::DEFAULT }
}

/// A partial update to [`Permissions`]. Only the enumerated capabilities are
/// accepted; any other key fails deserialisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionPatch {
  #[serde(default)]
  pub share_mood_data:       Option<bool>,
  #[serde(default)]
  pub allow_flare_signals:   Option<bool>,
  #[serde(default)]
  pub share_journal_entries: Option<bool>,
}

impl PermissionPatch {
  /// A patch that sets a single capability.
  pub fn set(capability: Capability, value: bool) -> Self {
    let mut patch = Self::default();
    match capability {
      Capability::ShareMoodData => patch.share_mood_data = Some(value),
      Capability::AllowFlareSignals => patch.allow_flare_signals = Some(value),
      Capability::ShareJournalEntries => {
        patch.share_journal_entries = Some(value)
      }
    }
    patch
  }

  pub fn is_empty(&self) -> bool {
    self.share_mood_data.is_none()
      && self.allow_flare_signals.is_none()
      && self.share_journal_entries.is_none()
  }

  /// Reject a patch that would change nothing.
  pub fn validate(&self) -> Result<()> {
    if self.is_empty() {
      return Err(Error::Validation(
        "permission update must set at least one capability".into(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn defaults_match_documented_values() {
    let p = Permissions::default();
    assert!(p.share_mood_data);
    assert!(p.allow_flare_signals);
    assert!(!p.share_journal_entries);
  }

  #[test]
  fn merge_only_touches_supplied_flags() {
    let patch = PermissionPatch::set(Capability::AllowFlareSignals, false);
    let merged = Permissions::DEFAULT.merged(&patch);
    assert!(!merged.allow_flare_signals);
    assert!(merged.share_mood_data);
    assert!(!merged.share_journal_entries);
  }

  #[test]
  fn patch_rejects_unknown_keys() {
    let err = serde_json::from_str::<PermissionPatch>(
      r#"{"allow_flare_signals": false, "is_admin": true}"#,
    );
    assert!(err.is_err());
  }

  #[test]
  fn empty_patch_is_invalid() {
    let patch: PermissionPatch = serde_json::from_str("{}").unwrap();
    assert!(matches!(patch.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn capability_names_round_trip() {
    for cap in Capability::iter() {
      assert_eq!(Capability::from_str(cap.as_ref()).unwrap(), cap);
    }
    assert_eq!(Capability::AllowFlareSignals.to_string(), "allow_flare_signals");
  }
}
