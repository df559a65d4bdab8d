use serde::Serialize;

use crate::detection::domain::detected_face::DetectedFace;

/// Everything the UI renders about detection, in one place.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetectionState {
    pub faces: Vec<DetectedFace>,
    pub is_detecting: bool,
    pub is_webcam_active: bool,
    pub is_model_loaded: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetFaces(Vec<DetectedFace>),
    SetIsDetecting(bool),
    SetIsWebcamActive(bool),
    SetIsModelLoaded(bool),
    SetError(Option<String>),
    ClearFaces,
}

/// Apply one action. Each action touches exactly one field.
pub fn reduce(mut state: FaceDetectionState, action: Action) -> FaceDetectionState {
    match action {
        Action::SetFaces(faces) => state.faces = faces,
        Action::SetIsDetecting(v) => state.is_detecting = v,
        Action::SetIsWebcamActive(v) => state.is_webcam_active = v,
        Action::SetIsModelLoaded(v) => state.is_model_loaded = v,
        Action::SetError(error) => state.error = error,
        Action::ClearFaces => state.faces.clear(),
    }
    state
}
