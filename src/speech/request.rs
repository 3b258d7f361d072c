//! Synthesis service wire payloads
//!
//! JSON request and response bodies for the `text:synthesize` endpoint.

use crate::speech::player::{VoiceOverrides, VoiceProfile};
use crate::speech::voice::Gender;
use serde::{Deserialize, Serialize};

/// Audio encoding requested from the service
const AUDIO_ENCODING: &str = "MP3";

/// Request body for one synthesis call
///
/// Built fresh per call from the player's voice profile plus any per-call
/// overrides; nothing here outlives the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub audio_config: AudioConfig,
    pub input: SynthesisInput,
    pub voice: VoiceSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: String,
    pub speaking_rate: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub language_code: String,
    pub ssml_gender: Gender,
}

/// Response body: base64-encoded MP3 bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResponse {
    pub audio_content: String,
}

impl SynthesisRequest {
    /// Build the request payload for one line of text
    pub fn build(profile: &VoiceProfile, text: &str, overrides: &VoiceOverrides) -> Self {
        let voice = overrides.voice.as_deref().unwrap_or(&profile.voice);

        Self {
            audio_config: AudioConfig {
                audio_encoding: AUDIO_ENCODING.to_string(),
                speaking_rate: overrides.speed.unwrap_or(profile.speed),
                pitch: overrides.pitch.unwrap_or(profile.pitch),
            },
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: service_language_code(&profile.locale),
                ssml_gender: Gender::for_voice(voice),
            },
        }
    }
}

/// Map a locale onto the service's language code
///
/// The service's male voice variant for Brazilian Portuguese only exists under
/// the European code, so pt-BR is rewritten to pt-PT. Everything else passes
/// through unchanged.
pub fn service_language_code(locale: &str) -> String {
    if locale == "pt-BR" {
        "pt-PT".to_string()
    } else {
        locale.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> VoiceProfile {
        VoiceProfile {
            locale: "vi-VN".to_string(),
            voice: "taichi".to_string(),
            speed: 1.2,
            pitch: -2.0,
            range: 1.0,
        }
    }

    #[test]
    fn test_language_code_substitution() {
        assert_eq!(service_language_code("pt-BR"), "pt-PT");
        assert_eq!(service_language_code("pt-PT"), "pt-PT");
        assert_eq!(service_language_code("vi-VN"), "vi-VN");
        assert_eq!(service_language_code("ja-JP"), "ja-JP");
    }

    #[test]
    fn test_build_from_profile() {
        let request = SynthesisRequest::build(&profile(), "xin chào", &VoiceOverrides::default());

        assert_eq!(request.input.text, "xin chào");
        assert_eq!(request.voice.language_code, "vi-VN");
        assert_eq!(request.voice.ssml_gender, Gender::Male);
        assert_eq!(request.audio_config.audio_encoding, "MP3");
        assert_eq!(request.audio_config.speaking_rate, 1.2);
        assert_eq!(request.audio_config.pitch, -2.0);
    }

    #[test]
    fn test_overrides_apply_to_request() {
        let overrides = VoiceOverrides {
            voice: Some("nozomi".to_string()),
            speed: Some(0.8),
            pitch: Some(3.0),
            ..VoiceOverrides::default()
        };
        let request = SynthesisRequest::build(&profile(), "hello", &overrides);

        assert_eq!(request.voice.ssml_gender, Gender::Female);
        assert_eq!(request.audio_config.speaking_rate, 0.8);
        assert_eq!(request.audio_config.pitch, 3.0);
    }

    #[test]
    fn test_wire_shape() {
        let request = SynthesisRequest::build(&profile(), "hi", &VoiceOverrides::default());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(json["voice"]["languageCode"], "vi-VN");
        assert_eq!(json["voice"]["ssmlGender"], "MALE");
        assert_eq!(json["input"]["text"], "hi");
    }
}
