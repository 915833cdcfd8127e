use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::unit::{LangTag, Stage, UnitId};

/// Patches for the same unit must carry strictly increasing versions once
/// accepted; anything at or above `VERSION_ROLLOVER` is refused outright.
pub const VERSION_ROLLOVER: u32 = 1 << 31;

/// Upper bound on patch text, enforced at ingest (§4.6).
pub const MAX_TEXT_BYTES: usize = 16 * 1024;

/// The only ingest shape (§3). `op` is fixed at `replace` — there is no other
/// variant, so it is represented as a marker rather than a field callers could
/// set incorrectly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    #[serde(rename = "unitId")]
    pub unit_id: String,
    pub version: u32,
    pub stage: Stage,
    #[serde(default = "default_op")]
    pub op: String,
    pub text: String,
    #[serde(rename = "srcLang", default, skip_serializing_if = "Option::is_none")]
    pub src_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    #[serde(rename = "ttsFinal", default)]
    pub tts_final: bool,
}

fn default_op() -> String {
    "replace".to_string()
}

/// A [`Patch`] whose fields have all passed validation (§4.6). Downstream
/// code operates on this type exclusively so the checks never need repeating.
#[derive(Debug, Clone)]
pub struct ValidatedPatch {
    pub unit_id: UnitId,
    pub version: u32,
    pub stage: Stage,
    pub text: String,
    pub src_lang: Option<LangTag>,
    pub ts: Option<i64>,
    pub tts_final: bool,
}

impl Patch {
    pub fn validate(&self) -> Result<ValidatedPatch, ValidationError> {
        if self.op != "replace" {
            return Err(ValidationError::UnsupportedOp(self.op.clone()));
        }
        if self.version >= VERSION_ROLLOVER {
            return Err(ValidationError::VersionRollover(self.version));
        }
        if self.text.len() > MAX_TEXT_BYTES {
            return Err(ValidationError::TextTooLong(self.text.len()));
        }

        let unit_id = UnitId::parse(self.unit_id.clone())?;
        let src_lang = match &self.src_lang {
            Some(raw) => Some(LangTag::parse(raw.clone())?),
            None => None,
        };

        Ok(ValidatedPatch {
            unit_id,
            version: self.version,
            stage: self.stage,
            text: self.text.clone(),
            src_lang,
            ts: self.ts,
            tts_final: self.tts_final && self.stage.is_hard(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_patch() -> Patch {
        Patch {
            unit_id: "sess1|en-US|0".to_string(),
            version: 1,
            stage: Stage::Soft,
            op: "replace".to_string(),
            text: "hello".to_string(),
            src_lang: Some("en-US".to_string()),
            ts: Some(100),
            tts_final: false,
        }
    }

    #[test]
    fn validates_well_formed_patch() {
        let p = base_patch();
        let v = p.validate().unwrap();
        assert_eq!(v.version, 1);
        assert_eq!(v.unit_id.as_str(), "sess1|en-US|0");
    }

    #[test]
    fn version_zero_is_valid() {
        let mut p = base_patch();
        p.version = 0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_version_rollover() {
        let mut p = base_patch();
        p.version = VERSION_ROLLOVER;
        assert!(matches!(
            p.validate(),
            Err(ValidationError::VersionRollover(_))
        ));
    }

    #[test]
    fn rejects_oversized_text() {
        let mut p = base_patch();
        p.text = "a".repeat(MAX_TEXT_BYTES + 1);
        assert!(matches!(p.validate(), Err(ValidationError::TextTooLong(_))));
    }

    #[test]
    fn rejects_non_replace_op() {
        let mut p = base_patch();
        p.op = "append".to_string();
        assert!(matches!(
            p.validate(),
            Err(ValidationError::UnsupportedOp(_))
        ));
    }

    #[test]
    fn empty_text_is_accepted_for_erasure() {
        let mut p = base_patch();
        p.text = String::new();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn tts_final_is_cleared_for_soft_stage() {
        let mut p = base_patch();
        p.stage = Stage::Soft;
        p.tts_final = true;
        let v = p.validate().unwrap();
        assert!(!v.tts_final);
    }
}
