//! Image OCR adapter
//!
//! The only place that knows the engine's grouped output shape.

use std::path::Path;

use crate::engine::{Detection, OcrEngine};

use super::types::{OcrError, RecognitionItem};

impl From<Detection> for RecognitionItem {
    fn from(detection: Detection) -> Self {
        let score = if detection.confidence.is_finite() {
            detection.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            text: detection.text,
            score,
            bbox: detection.quad,
        }
    }
}

/// Run the engine once on `image` and flatten its groups in emission order.
pub fn recognize_image(engine: &dyn OcrEngine, image: &Path) -> Result<Vec<RecognitionItem>, OcrError> {
    let groups = engine.recognize(image)?;
    let items: Vec<RecognitionItem> = groups
        .into_iter()
        .flatten()
        .map(RecognitionItem::from)
        .collect();

    tracing::debug!(
        engine = engine.name(),
        image = %image.display(),
        items = items.len(),
        "Recognized image"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{detection, MockEngine};

    #[test]
    fn test_flattens_groups_in_order() {
        let engine = MockEngine::with_sample_text();
        let items = recognize_image(&engine, Path::new("scan.png")).unwrap();

        let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["Hello", "World", "Total 42"]);
        assert_eq!(items[0].bbox, [[10.0, 10.0], [60.0, 10.0], [60.0, 30.0], [10.0, 30.0]]);
        assert_eq!(engine.calls(), 1);
    }

    #[test]
    fn test_scores_are_clamped() {
        let engine = MockEngine::new(vec![vec![
            detection("hot", 1.7, 0.0, 0.0, 1.0, 1.0),
            detection("cold", -0.2, 0.0, 0.0, 1.0, 1.0),
            detection("nan", f32::NAN, 0.0, 0.0, 1.0, 1.0),
        ]]);
        let items = recognize_image(&engine, Path::new("scan.png")).unwrap();
        let scores: Vec<f32> = items.iter().map(|i| i.score).collect();
        assert_eq!(scores, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_output_is_empty_list() {
        let engine = MockEngine::new(Vec::new());
        assert!(recognize_image(&engine, Path::new("blank.png")).unwrap().is_empty());
    }

    #[test]
    fn test_engine_error_propagates() {
        let engine = MockEngine::failing_on(1);
        let err = recognize_image(&engine, Path::new("broken.png")).unwrap_err();
        assert!(matches!(err, OcrError::Recognition(_)));
    }
}
