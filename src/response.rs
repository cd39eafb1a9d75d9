use serde::{Deserialize, Deserializer};

/// One layer's numeric output, projected by the backend to a 2D grid plus
/// the original tensor shape. Rows may be ragged; nothing here may assume
/// rectangularity.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct ActivationTensor {
    pub shape: Vec<usize>,
    pub values: Vec<Vec<f32>>,
}

impl ActivationTensor {
    /// Shape caption for panel titles, e.g. "128 x 64".
    pub fn shape_label(&self) -> String {
        self.shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" x ")
    }
}

/// Pre-rendered waveform trace from the backend. `values.len()` need not
/// equal `sample_rate * duration` -- the trace may be downsampled.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct WaveformSignal {
    pub values: Vec<f32>,
    pub sample_rate: f32,
    /// Total playback duration in seconds.
    pub duration: f32,
}

/// A ranked class prediction. The backend sends these most-confident first
/// and that order is preserved.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct Prediction {
    #[serde(rename = "class")]
    pub class_name: String,
    /// Confidence in [0, 1].
    pub confidence: f32,
}

/// The full response of one inference call. Constructed once per successful
/// call and held immutable in the session until superseded; everything the
/// panels draw is re-derived from this snapshot.
///
/// Unknown fields in the payload are tolerated (serde's default behavior),
/// and no particular key order is assumed anywhere except that the
/// `visualization` object's own order is captured as-is.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct InferenceResult {
    pub predictions: Vec<Prediction>,
    /// Layer-name -> tensor entries in the order the backend emitted them.
    /// Deserialized into ordered pairs rather than a map so insertion order
    /// is an explicit guarantee, not incidental map behavior.
    #[serde(deserialize_with = "ordered_entries")]
    pub visualization: Vec<(String, ActivationTensor)>,
    pub input_spectrogram: ActivationTensor,
    pub waveform: WaveformSignal,
}

/// Deserialize a JSON object into a vec of pairs, preserving the order the
/// keys appear on the wire.
fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, ActivationTensor)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> serde::de::Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, ActivationTensor)>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a map of layer names to activation tensors")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, ActivationTensor>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

// ===========  Tests ===============
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "predictions": [
            {"class": "dog", "confidence": 0.82},
            {"class": "cat", "confidence": 0.11}
        ],
        "visualization": {
            "conv1": {"shape": [8, 4], "values": [[0.1, 0.2], [0.3, 0.4]]},
            "conv1.relu": {"shape": [8, 4], "values": [[0.1, 0.2]]},
            "fc": {"shape": [2, 2], "values": [[1.0]]}
        },
        "input_spectrogram": {"shape": [128, 44], "values": [[0.5]]},
        "waveform": {"values": [0.0, 0.5, -0.5], "sample_rate": 44100.0, "duration": 2.0},
        "model_version": "ignored-extra-field"
    }"#;

    #[test]
    fn test_full_response_decodes() {
        let result: InferenceResult = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(result.predictions.len(), 2);
        assert_eq!(result.predictions[0].class_name, "dog");
        assert!((result.predictions[0].confidence - 0.82).abs() < 1e-6);

        assert_eq!(result.input_spectrogram.shape, vec![128, 44]);
        assert_eq!(result.waveform.values.len(), 3);
        assert!((result.waveform.duration - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_prediction_rank_order_is_preserved() {
        let result: InferenceResult = serde_json::from_str(SAMPLE).unwrap();
        let names: Vec<&str> = result
            .predictions
            .iter()
            .map(|p| p.class_name.as_str())
            .collect();
        assert_eq!(names, vec!["dog", "cat"]);
    }

    #[test]
    fn test_visualization_wire_order_is_captured() {
        let result: InferenceResult = serde_json::from_str(SAMPLE).unwrap();
        let names: Vec<&str> = result
            .visualization
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["conv1", "conv1.relu", "fc"]);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        // SAMPLE carries "model_version"; also nest an extra field deeper
        let with_extra = SAMPLE.replace(
            r#""shape": [2, 2]"#,
            r#""shape": [2, 2], "dtype": "f32""#,
        );
        let result: Result<InferenceResult, _> = serde_json::from_str(&with_extra);
        assert!(result.is_ok());
    }

    #[test]
    fn test_shape_label() {
        let t = ActivationTensor {
            shape: vec![16, 8, 4],
            values: vec![],
        };
        assert_eq!(t.shape_label(), "16 x 8 x 4");
    }

    #[test]
    fn test_ragged_rows_decode() {
        let json = r#"{"shape": [2, 3], "values": [[1.0, 2.0, 3.0], [4.0]]}"#;
        let t: ActivationTensor = serde_json::from_str(json).unwrap();
        assert_eq!(t.values[0].len(), 3);
        assert_eq!(t.values[1].len(), 1);
    }
}
